//! Error types for the Haystack data model and its codecs.
//!
//! Every fallible operation in this crate returns [`Result`], whose error side
//! is the single [`Error`] enum. Errors are raised at the point of failure and
//! propagate to the caller; the codecs and the filter evaluator never recover
//! internally.
//!
//! ## Error Categories
//!
//! - **Parse errors**: malformed Zinc, JSON or filter text, with a 1-based line number
//! - **Lookup errors**: checked lookups of a tag name, record or watch that does not exist
//! - **Invalid arguments**: a value or structure built from an out-of-range or malformed payload
//! - **Call errors**: an error grid surfaced as a Rust error
//!
//! ## Examples
//!
//! ```rust
//! use serde_haystack::{from_zinc_str, Error};
//!
//! let result = from_zinc_str("ver:\"3.0\"\nname\n\"unterminated\n");
//! assert!(matches!(result, Err(Error::Parse { line: 3, .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed Zinc, JSON or filter syntax.
    ///
    /// `line` is 1-based; it is 0 when the input has no line structure
    /// (for example a JSON scalar payload).
    #[error("Parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    /// Checked lookup of a tag or column name that does not exist.
    #[error("Unknown name: {0}")]
    UnknownName(String),

    /// Checked lookup of an entity by reference that does not resolve.
    #[error("Unknown rec: {0}")]
    UnknownRec(String),

    /// Checked lookup of a watch subscription that does not exist.
    #[error("Unknown watch: {0}")]
    UnknownWatch(String),

    /// A value or structure was constructed from a malformed payload.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The value cannot be expressed in the selected format version.
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// A server answered with an error grid.
    #[error("Call error: {dis}")]
    Call { dis: String, trace: Option<String> },

    /// JSON document could not be read or written.
    #[error("JSON error: {0}")]
    Json(String),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Creates a parse error at the given 1-based line.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_haystack::Error;
    ///
    /// let err = Error::parse(10, "Expected ','");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn parse<T: fmt::Display>(line: usize, msg: T) -> Self {
        Error::Parse {
            line,
            msg: msg.to_string(),
        }
    }

    /// Creates an invalid-argument error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_haystack::Error;
    ///
    /// let err = Error::invalid("Invalid tag name: Foo");
    /// assert!(err.to_string().contains("Foo"));
    /// ```
    pub fn invalid<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidArgument(msg.to_string())
    }

    /// Creates an unsupported type error for values a format version cannot carry.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the line number of a parse error, if this is one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_haystack::Error;
    ///
    /// assert_eq!(Error::parse(4, "bad").line(), Some(4));
    /// assert_eq!(Error::invalid("bad").line(), None);
    /// ```
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Parse { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
