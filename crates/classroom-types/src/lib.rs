pub mod session;
pub mod validation;
pub mod event;
pub mod config;
pub mod error;


pub use error::{DirectoryError, ValidationError};
pub type Result<T> = std::result::Result<T, DirectoryError>;
