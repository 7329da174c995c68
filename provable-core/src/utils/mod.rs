pub mod errors;

pub use errors::ProvableError;

pub type Result<T> = std::result::Result<T, ProvableError>;
