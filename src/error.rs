use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid length: expected {0} bytes, found {1} bytes")]
    BadLength(usize, usize),
    #[error("Insufficient seed: expected at least {expected} bytes, found {found} bytes")]
    InsufficientSeed { expected: usize, found: usize },
    #[error("Malformed signature: {0}")]
    MalformedSignature(String),
    #[error("Signature tree exhausted: no one-time keys left to sign with")]
    KeyExhausted,
    #[error("One-time key was already used to sign a different message")]
    KeyReused,
    #[error("Invalid tree shape: {0}")]
    InvalidShape(String),
    #[error("Signature budget of {budget} bytes is below the minimum of {minimum} bytes")]
    BudgetTooSmall { budget: usize, minimum: usize },
}

impl From<std::array::TryFromSliceError> for Error {
    fn from(e: std::array::TryFromSliceError) -> Self {
        Error::MalformedSignature(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
