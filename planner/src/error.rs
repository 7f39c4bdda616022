use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("missing parameter {0}")]
    MissingParam(&'static str),

    #[error("parameter {key} has unparsable value {value:?}")]
    InvalidParam { key: &'static str, value: String },

    #[error("parameter {key} must be a positive, finite headway, got {value} s")]
    InvalidGap { key: &'static str, value: f32 },

    #[error("failed to read parameter {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid planner config: {0}")]
    InvalidConfig(String),
}
