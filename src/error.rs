use thiserror::Error;

pub type Result<T> = std::result::Result<T, PackError>;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("invalid {axis} {value}: must be between 0 and {max}", max = u32::MAX)]
    InvalidDimension { axis: &'static str, value: i64 },

    #[error("invalid quantity {0}: must be between 0 and {max}", max = u32::MAX)]
    InvalidQuantity(i64),

    #[error("{count} unit items requested, at most {max} allowed")]
    TooManyUnits { count: u64, max: usize },

    #[error("invalid {name} {value}: must be finite and not negative")]
    InvalidFactor { name: &'static str, value: f64 },

    #[error("{0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
