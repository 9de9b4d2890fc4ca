//! Utility functions for common operations.
//!
//! - **Text processing**: terminal-safe output (control-char stripping)
//!   and fixed-length previews
//! - **URL validation**: base-URL policy for the generative-AI endpoint
//!
//! # Examples
//!
//! ```
//! use healthwire::util::{preview, strip_control_chars, validate_base_url};
//!
//! let safe = strip_control_chars("\x1b[31mStay hydrated\x1b[0m");
//! assert_eq!(safe, "Stay hydrated");
//!
//! assert_eq!(preview("New guidelines for diabetes prevention", 14), "New guidelines...");
//!
//! assert!(validate_base_url("https://generativelanguage.googleapis.com").is_ok());
//! ```

mod text;
mod url_validator;

pub use text::{capitalize, preview, strip_control_chars};
pub use url_validator::{validate_base_url, UrlValidationError};
