//! IR validation: structural checks that run before any synthesis.
pub mod error;
pub mod validator;

pub use error::{ValidationError, ValidationErrorKind};
pub use validator::Validator;
