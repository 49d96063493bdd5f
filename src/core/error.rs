use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid scene config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("reduced width cutoff ({reduced}px) must be above the mobile breakpoint ({mobile}px)")]
    WidthOrder { mobile: u32, reduced: u32 },
    #[error("dormant idle threshold ({dormant}ms) must be above the quiet threshold ({quiet}ms)")]
    IdleOrder { quiet: u64, dormant: u64 },
}

/// Failures the scene contains internally. None of these reach the host page;
/// they are logged and mapped onto controller events.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("missing element #{0}")]
    MissingElement(String),
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("graphics context lost")]
    ContextLost,
    #[error(transparent)]
    Config(#[from] ConfigError),
}
