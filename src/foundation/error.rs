/// Crate-wide result alias.
pub type RacebarResult<T> = Result<T, RacebarError>;

/// Errors raised at the crate boundary.
///
/// The transform and sequencing pipeline itself absorbs malformed input by defaulting, so these
/// only surface from option validation, input parsing, and frame output.
#[derive(thiserror::Error, Debug)]
pub enum RacebarError {
    /// Invalid options or input shape.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid playback request (e.g. a keyframe index outside the timeline).
    #[error("playback error: {0}")]
    Playback(String),

    /// SVG parsing, rasterization, or image output failed.
    #[error("render error: {0}")]
    Render(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RacebarError {
    /// Build a [`RacebarError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RacebarError::Playback`].
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Build a [`RacebarError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`RacebarError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for RacebarError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}
