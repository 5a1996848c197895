use thiserror::Error;

#[derive(Error, Debug)]
pub enum PicError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Physics constraint violated: {0}")]
    PhysicsViolation(String),

    #[error("Shape mismatch for {what}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        what: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Transform is not bound to any arrays: {0}")]
    TransformUnbound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type PicResult<T> = Result<T, PicError>;
