#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("layout {name} must be a positive finite number, got {value}")]
    InvalidDimension { name: &'static str, value: f64 },
    #[error("circle padding must be a non-negative finite number, got {value}")]
    InvalidPadding { value: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
