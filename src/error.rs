//! Error codes shared by every error type in the crate.

/// Grepable, stable code for an error class, independent of its message.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}
