use kurbo::{Point, Rect};

use crate::foundation::error::{RacebarError, RacebarResult};

/// Inner padding (and outer padding) of the rank band scale, in band units.
pub const BAND_PADDING: f64 = 0.1;

/// Chart margins in pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Margin {
    /// Space above the first bar (the axis lives here).
    pub top: f64,
    /// Space right of the longest bar.
    pub right: f64,
    /// Space below the last bar.
    pub bottom: f64,
    /// Space left of the bar origin.
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 30.0,
            right: 30.0,
            bottom: 10.0,
            left: 0.0,
        }
    }
}

/// Fixed layout parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutOpts {
    /// Total width in pixels.
    pub width: f64,
    /// Height of one rank slot in pixels.
    pub bar_size: f64,
    /// Margins.
    pub margin: Margin,
}

impl Default for LayoutOpts {
    fn default() -> Self {
        Self {
            width: 1200.0,
            bar_size: 30.0,
            margin: Margin::default(),
        }
    }
}

impl LayoutOpts {
    /// Reject sizes that leave no drawable area.
    pub fn validate(&self) -> RacebarResult<()> {
        if !self.bar_size.is_finite() || self.bar_size <= 0.0 {
            return Err(RacebarError::validation("layout bar_size must be > 0"));
        }
        let m = self.margin;
        if [m.top, m.right, m.bottom, m.left]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(RacebarError::validation(
                "layout margins must be finite and >= 0",
            ));
        }
        if !self.width.is_finite() || self.width <= m.left + m.right {
            return Err(RacebarError::validation(
                "layout width must exceed the horizontal margins",
            ));
        }
        Ok(())
    }
}

/// Continuous linear mapping from values to pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    /// Map `domain` onto `range`.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Domain bounds as given.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Range bounds as given.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Map a value into range space. A degenerate domain maps everything to the range midpoint.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = d1 - d0;
        let t = if denom == 0.0 || !denom.is_finite() {
            0.5
        } else {
            (x - d0) / denom
        };
        r0 + t * (r1 - r0)
    }

    /// Round tick values inside the domain, about `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (mut lo, mut hi) = self.domain;
        if count == 0 || !lo.is_finite() || !hi.is_finite() {
            return Vec::new();
        }
        if lo == hi {
            return vec![lo];
        }
        if lo > hi {
            std::mem::swap(&mut lo, &mut hi);
        }
        let step = nice_step((hi - lo) / count as f64);
        if step == 0.0 {
            return vec![lo, hi];
        }

        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

fn nice_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let base = 10_f64.powf(power);
    let error = step / base;
    let nice = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };
    nice * base
}

/// Pixel-rounded band scale over ranks `0..count`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandScale {
    start: f64,
    step: f64,
    bandwidth: f64,
    count: usize,
}

impl BandScale {
    /// Fit `count` bands into `range` with equal inner/outer `padding`, centred, with the band
    /// start and width rounded to whole pixels.
    pub fn new(range: (f64, f64), count: usize, padding: f64) -> Self {
        let (r0, r1) = range;
        let n = count as f64;
        let span = r1 - r0;
        let step = (span / (n - padding + padding * 2.0).max(1.0)).floor();
        let start = (r0 + (span - step * (n - padding)) * 0.5).round();
        let bandwidth = (step * (1.0 - padding)).round();
        Self {
            start,
            step,
            bandwidth,
            count,
        }
    }

    /// Top edge of the band for `rank`. Fractional ranks interpolate between bands.
    pub fn position(&self, rank: f64) -> f64 {
        self.start + self.step * rank
    }

    /// Band height.
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Distance between consecutive band starts.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of bands.
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Resolved geometry for a chart showing `n` ranked slots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    opts: LayoutOpts,
    n: usize,
    height: f64,
    y: BandScale,
}

impl Layout {
    /// Lay out `n` slots. The band scale has `n + 1` bands so clamped entries have a slot to
    /// slide into just below the last visible bar.
    pub fn new(opts: LayoutOpts, n: usize) -> Self {
        let m = opts.margin;
        let slots = n as f64;
        let height = m.top + opts.bar_size * slots + m.bottom;
        let y = BandScale::new(
            (m.top, m.top + opts.bar_size * (slots + 1.0 + BAND_PADDING)),
            n + 1,
            BAND_PADDING,
        );
        Self { opts, n, height, y }
    }

    /// Options this layout was built from.
    pub fn opts(&self) -> &LayoutOpts {
        &self.opts
    }

    /// Number of visible slots.
    pub fn slots(&self) -> usize {
        self.n
    }

    /// Total width.
    pub fn width(&self) -> f64 {
        self.opts.width
    }

    /// Total height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// `0 0 width height`.
    pub fn view_box(&self) -> Rect {
        Rect::new(0.0, 0.0, self.opts.width, self.height)
    }

    /// Rank band scale.
    pub fn y(&self) -> &BandScale {
        &self.y
    }

    /// Value scale for a frame whose largest value is `domain_max`.
    pub fn x(&self, domain_max: f64) -> LinearScale {
        let m = self.opts.margin;
        LinearScale::new((0.0, domain_max), (m.left, self.opts.width - m.right))
    }

    /// Bar rectangle for an entry at (possibly fractional) `rank` with `value`.
    pub fn bar_rect(&self, x: &LinearScale, rank: f64, value: f64) -> Rect {
        let y0 = self.y.position(rank);
        Rect::new(x.map(0.0), y0, x.map(value), y0 + self.y.bandwidth()).abs()
    }

    /// Where a bar's label is anchored: the bar's value end, at the band's top edge.
    pub fn label_anchor(&self, x: &LinearScale, rank: f64, value: f64) -> Point {
        Point::new(x.map(value), self.y.position(rank))
    }

    /// Number of axis ticks requested for this width.
    pub fn tick_count(&self) -> usize {
        (self.opts.width / 150.0).floor().max(0.0) as usize
    }

    /// Length of the tick gridlines, reaching down through the visible slots.
    pub fn tick_extent(&self) -> f64 {
        self.opts.bar_size * (self.n as f64 + BAND_PADDING)
    }

    /// Bottom-right anchor of the timestamp caption.
    pub fn caption_anchor(&self) -> Point {
        Point::new(
            self.opts.width - 30.0,
            self.opts.margin.top + self.opts.bar_size * (self.n as f64 - 0.45),
        )
    }
}
