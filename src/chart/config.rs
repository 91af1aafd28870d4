use std::time::Duration;

use crate::{
    animation::ease::Ease,
    chart::{layout::LayoutOpts, transform::Chart},
    foundation::error::{RacebarError, RacebarResult},
    table::element::ElementData,
};

/// The free-text "max ranks shown" parameter, as the host hands it over.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum RankParam {
    /// Numeric parameter.
    Number(f64),
    /// Text parameter (usually digits typed into a panel field).
    Text(String),
}

impl RankParam {
    /// Parsed cutoff. Blank, zero, negative, or non-numeric input means "no cutoff".
    pub fn cutoff(&self) -> Option<usize> {
        let raw = match self {
            Self::Number(v) => *v,
            Self::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return None;
                }
                match s.parse::<f64>() {
                    Ok(v) => v,
                    Err(_) => {
                        tracing::warn!(rank = s, "ignoring non-numeric rank parameter");
                        return None;
                    }
                }
            }
        };

        if !raw.is_finite() || raw < 0.0 {
            tracing::warn!(rank = raw, "ignoring out-of-range rank parameter");
            return None;
        }
        let n = raw.floor();
        if n < 1.0 {
            return None;
        }
        Some(n as usize)
    }
}

/// Column selections and parameters bound to one chart.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChartConfig {
    /// Column id holding timestamps.
    #[serde(default)]
    pub date: Option<String>,
    /// Column id holding category labels.
    #[serde(default)]
    pub category: Option<String>,
    /// Column id holding measures.
    #[serde(default)]
    pub value: Option<String>,
    /// Maximum number of ranks shown.
    #[serde(default)]
    pub rank: Option<RankParam>,
}

impl ChartConfig {
    /// Effective rank cutoff, if one was configured.
    pub fn cutoff(&self) -> Option<usize> {
        self.rank.as_ref().and_then(RankParam::cutoff)
    }
}

/// Playback pacing.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlaybackOpts {
    /// Timer period and per-keyframe transition length, in milliseconds.
    pub duration_ms: u64,
    /// Easing applied to each transition.
    pub ease: Ease,
}

impl Default for PlaybackOpts {
    fn default() -> Self {
        Self {
            duration_ms: 1000,
            ease: Ease::Linear,
        }
    }
}

impl PlaybackOpts {
    /// Per-keyframe period.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// A zero period would tick forever without advancing time.
    pub fn validate(&self) -> RacebarResult<()> {
        if self.duration_ms == 0 {
            return Err(RacebarError::validation("playback duration_ms must be > 0"));
        }
        Ok(())
    }
}

/// Everything the host binds to a chart, as one JSON document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChartInput {
    /// Column selections and rank parameter.
    #[serde(default)]
    pub config: ChartConfig,
    /// Bound table.
    #[serde(default)]
    pub element: ElementData,
    /// Playback pacing.
    #[serde(default)]
    pub playback: PlaybackOpts,
    /// Layout constants.
    #[serde(default)]
    pub layout: LayoutOpts,
}

impl ChartInput {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> RacebarResult<Self> {
        let input: Self = serde_json::from_str(s)?;
        input.validate()?;
        Ok(input)
    }

    /// Parse and validate JSON from a reader.
    pub fn from_reader(r: impl std::io::Read) -> RacebarResult<Self> {
        let input: Self = serde_json::from_reader(r)?;
        input.validate()?;
        Ok(input)
    }

    /// Validate playback and layout options.
    pub fn validate(&self) -> RacebarResult<()> {
        self.playback.validate()?;
        self.layout.validate()
    }

    /// Run the transform pipeline over the bound table.
    pub fn chart(&self) -> Chart {
        Chart::transform(&self.config, &self.element, self.layout)
    }
}
