#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("node {index} has a non-finite position")]
    NonFiniteCoordinate { index: usize },

    #[error("node {index} lies beyond the supported coordinate range")]
    CoordinateOutOfRange { index: usize },

    #[error("charge provider returned a non-finite charge for node {index}")]
    NonFiniteCharge { index: usize },

    #[error("charge for node {index} exceeds the supported magnitude")]
    ChargeOutOfRange { index: usize },

    #[error("invalid option `{name}`: {value}")]
    InvalidOption { name: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
