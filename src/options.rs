//! Configuration options for the Zinc and JSON writers.
//!
//! This module provides types to customize encoder output:
//!
//! - [`CodecOptions`]: Main configuration struct
//! - [`Version`]: Zinc format version to emit
//!
//! ## Examples
//!
//! ```rust
//! use serde_haystack::{to_zinc_string_with_options, CodecOptions, Grid, Version};
//!
//! let grid = Grid::empty();
//!
//! let options = CodecOptions::new().with_version(Version::V2);
//! let zinc = to_zinc_string_with_options(&grid, options).unwrap();
//! assert!(zinc.starts_with("ver:\"2.0\""));
//! ```

/// Zinc format version.
///
/// Version 2.0 predates lists, symbols and typed strings and writes binary
/// MIME types unquoted; the writer rejects values it cannot express.
///
/// # Examples
///
/// ```rust
/// use serde_haystack::Version;
///
/// assert_eq!(Version::V2.as_str(), "2.0");
/// assert_eq!(Version::default(), Version::V3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Version {
    V2,
    #[default]
    V3,
}

impl Version {
    /// The version string written in a grid header.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Version::V2 => "2.0",
            Version::V3 => "3.0",
        }
    }
}

/// Configuration options for the writers.
///
/// `version` applies to Zinc output; JSON is always written as version 3.0.
/// `pretty` indents JSON output and has no effect on Zinc.
///
/// # Examples
///
/// ```rust
/// use serde_haystack::{CodecOptions, Version};
///
/// let options = CodecOptions::new();
/// assert_eq!(options.version, Version::V3);
/// assert!(!options.pretty);
///
/// let options = CodecOptions::pretty().with_version(Version::V2);
/// assert!(options.pretty);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodecOptions {
    pub version: Version,
    pub pretty: bool,
}

impl CodecOptions {
    /// Creates default options (Zinc 3.0, compact output).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for indented JSON output.
    #[must_use]
    pub fn pretty() -> Self {
        CodecOptions {
            pretty: true,
            ..Default::default()
        }
    }

    /// Sets the Zinc version to write.
    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}
