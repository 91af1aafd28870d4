use std::{fmt::Write as _, sync::Arc, time::Duration};

use crate::{
    chart::{caption::format_thousands, transform::Chart},
    foundation::error::{RacebarError, RacebarResult},
    playback::{
        step::{FrameSample, Generation, StepPlan, TransitionHandle},
        surface::DrawSurface,
    },
};

const FONT: &str = "sans-serif";

/// Render one sampled frame of `chart` as a standalone SVG document.
///
/// The structure mirrors a classic bar chart race: value axis along the top with gridlines
/// through the bars, translucent bars, right-aligned name/value labels at each bar's end and
/// the timestamp caption in the lower right.
pub fn frame_svg(
    chart: &Chart,
    sample: &FrameSample,
    caption: Option<&str>,
) -> RacebarResult<String> {
    write_frame(chart, sample, caption).map_err(|e| RacebarError::render(e.to_string()))
}

fn write_frame(
    chart: &Chart,
    sample: &FrameSample,
    caption: Option<&str>,
) -> Result<String, std::fmt::Error> {
    let layout = chart.layout();
    let (w, h) = (layout.width(), layout.height());
    let x = layout.x(sample.x_domain_max);
    let band = layout.y().bandwidth();
    let bar_size = layout.opts().bar_size;

    let mut out = String::with_capacity(4096);
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    )?;
    writeln!(out, r#"<rect width="{w}" height="{h}" fill="white"/>"#)?;

    writeln!(
        out,
        r#"<g transform="translate(0,{})" font-family="{FONT}" font-size="10" text-anchor="middle">"#,
        layout.opts().margin.top
    )?;
    let extent = layout.tick_extent();
    for (i, tick) in x.ticks(layout.tick_count()).into_iter().enumerate() {
        let tx = x.map(tick);
        let stroke = if i == 0 { "black" } else { "white" };
        writeln!(
            out,
            r#"<g transform="translate({tx:.2},0)"><line y2="{extent:.2}" stroke="{stroke}"/>"#
        )?;
        if i > 0 {
            writeln!(out, r#"<text y="-3">{}</text>"#, format_thousands(tick))?;
        }
        writeln!(out, "</g>")?;
    }
    writeln!(out, "</g>")?;

    writeln!(out, r#"<g fill-opacity="0.6">"#)?;
    for bar in &sample.bars {
        let r = layout.bar_rect(&x, bar.at.rank, bar.at.value);
        writeln!(
            out,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"#,
            r.x0,
            r.y0,
            r.width(),
            r.height(),
            bar.color.to_css_hex()
        )?;
    }
    writeln!(out, "</g>")?;

    writeln!(
        out,
        r#"<g font-family="{FONT}" font-size="10" font-weight="bold" text-anchor="end">"#
    )?;
    for bar in &sample.bars {
        let p = layout.label_anchor(&x, bar.at.rank, bar.at.value);
        writeln!(
            out,
            r#"<text transform="translate({:.2},{:.2})" x="-6" y="{:.2}" dy="-0.25em">{}<tspan fill-opacity="0.6" font-weight="normal" x="-6" dy="1.15em">{}</tspan></text>"#,
            p.x,
            p.y,
            band / 2.0,
            escape_xml(&bar.name),
            format_thousands(bar.at.value)
        )?;
    }
    writeln!(out, "</g>")?;

    if let Some(text) = caption {
        let c = layout.caption_anchor();
        writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}" dy="0.32em" text-anchor="end" font-family="{FONT}" font-size="{bar_size}" font-weight="bold">{}</text>"#,
            c.x,
            c.y,
            escape_xml(text)
        )?;
    }
    writeln!(out, "</svg>")?;
    Ok(out)
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Reference [`DrawSurface`] that remembers the latest step and renders SVG snapshots on demand.
#[derive(Debug, Default)]
pub struct SvgSurface {
    chart: Option<Arc<Chart>>,
    generation: Option<Generation>,
    step: Option<(Arc<StepPlan>, TransitionHandle)>,
    caption: Option<String>,
}

impl SvgSurface {
    /// An empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence currently owning the surface.
    pub fn generation(&self) -> Option<Generation> {
        self.generation
    }

    /// Caption currently shown.
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// The step being animated and its timing.
    pub fn step(&self) -> Option<(&Arc<StepPlan>, &TransitionHandle)> {
        self.step.as_ref().map(|(p, t)| (p, t))
    }

    /// The surface as it looks at `now`. `None` before anything was drawn.
    pub fn snapshot(&self, now: Duration) -> RacebarResult<Option<String>> {
        let (Some(chart), Some((plan, transition))) = (&self.chart, &self.step) else {
            return Ok(None);
        };
        let sample = plan.sample(transition.progress(now), transition.ease);
        frame_svg(chart, &sample, self.caption.as_deref()).map(Some)
    }

    fn accept(&mut self, plan: &Arc<StepPlan>, transition: &TransitionHandle) {
        if self.generation != Some(transition.generation) {
            tracing::warn!(
                generation = transition.generation.0,
                "update from a sequence that does not own the surface"
            );
            return;
        }
        self.step = Some((Arc::clone(plan), *transition));
    }
}

impl DrawSurface for SvgSurface {
    fn begin(&mut self, chart: &Arc<Chart>, generation: Generation) {
        self.chart = Some(Arc::clone(chart));
        self.generation = Some(generation);
        self.step = None;
        self.caption = None;
    }

    fn update_axis(&mut self, plan: &Arc<StepPlan>, transition: &TransitionHandle) {
        self.accept(plan, transition);
    }

    fn update_bars(&mut self, plan: &Arc<StepPlan>, transition: &TransitionHandle) {
        self.accept(plan, transition);
    }

    fn update_labels(&mut self, plan: &Arc<StepPlan>, transition: &TransitionHandle) {
        self.accept(plan, transition);
    }

    fn set_caption(&mut self, text: &str) {
        self.caption = Some(text.to_owned());
    }
}
