//! Imports for syntax extensions.

pub use crate::IntoBaseUrl as _;
pub use crate::secrecy::ExposeSecret as _;
