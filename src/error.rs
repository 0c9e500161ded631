//! Error types for the COLLADA library.

use thiserror::Error;

/// Errors that can occur while reading a COLLADA document.
///
/// Every error aborts the parse it occurred in; no partial document is
/// returned. Use [`Error::kind`] to tell validation, format and structural
/// failures apart.
#[derive(Error, Debug)]
pub enum Error {
    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    /// XML attribute parsing error
    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// A builder was asked to construct an entity with a required field unset
    #[error("Missing required field `{field}` for {entity}")]
    MissingField {
        /// The entity being built
        entity: &'static str,
        /// The field that was never set
        field: &'static str,
    },

    /// Projection fields violate the aspect-ratio / dimension exclusivity
    #[error("Invalid projection: {0}")]
    InvalidProjection(String),

    /// Text that should be a float is not one
    #[error("Invalid float value '{value}'")]
    InvalidFloat {
        /// The offending text
        value: String,
        /// The underlying parse error
        #[source]
        source: std::num::ParseFloatError,
    },

    /// Text that should be an integer is not one
    #[error("Invalid integer value '{value}'")]
    InvalidInteger {
        /// The offending text
        value: String,
        /// The underlying parse error
        #[source]
        source: std::num::ParseIntError,
    },

    /// Malformed URI reference
    #[error("Invalid URI '{value}'")]
    InvalidUri {
        /// The offending text
        value: String,
        /// The underlying URL error, when the URL parser produced one
        #[source]
        source: Option<url::ParseError>,
    },

    /// Unrecognized enumerated token (filter mode, up axis, ...)
    #[error("Invalid {kind} token '{value}'")]
    InvalidToken {
        /// What kind of token was expected
        kind: &'static str,
        /// The offending text
        value: String,
    },

    /// Invalid timestamp format
    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),

    /// An element carried the wrong number of values
    #[error("<{element}> expects {expected} values, found {found}")]
    InvalidValueCount {
        /// Element name
        element: String,
        /// Human-readable expected count
        expected: String,
        /// Number of values actually found
        found: usize,
    },

    /// A close tag did not match the element currently being built
    #[error("Mismatched closing tag: expected </{expected}>, found </{found}>")]
    TagMismatch {
        /// Tag of the current mode
        expected: String,
        /// Tag that was closed
        found: String,
    },

    /// Internal consistency failure of the parser
    #[error("Structural error: {0}")]
    Structural(String),
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required field was missing or field groups conflicted
    Validation,
    /// Leaf text did not parse as the expected value
    Format,
    /// Parser invariant broken or malformed nesting
    Structural,
    /// Failure reported by the XML tokenizer
    Xml,
    /// Failure reading the underlying stream
    Io,
}

impl Error {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingField { .. } | Error::InvalidProjection(_) => ErrorKind::Validation,
            Error::InvalidFloat { .. }
            | Error::InvalidInteger { .. }
            | Error::InvalidUri { .. }
            | Error::InvalidToken { .. }
            | Error::InvalidTimestamp(_)
            | Error::InvalidValueCount { .. } => ErrorKind::Format,
            Error::TagMismatch { .. } | Error::Structural(_) => ErrorKind::Structural,
            Error::XmlParse(_) | Error::XmlAttribute(_) | Error::Utf8(_) => ErrorKind::Xml,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type alias for COLLADA operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_kinds() {
        let missing = Error::MissingField {
            entity: "Image",
            field: "source",
        };
        assert_eq!(missing.kind(), ErrorKind::Validation);
        assert_eq!(
            missing.to_string(),
            "Missing required field `source` for Image"
        );

        let mismatch = Error::TagMismatch {
            expected: "node".to_string(),
            found: "mesh".to_string(),
        };
        assert_eq!(mismatch.kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_float_error_keeps_cause() {
        let source = "abc".parse::<f32>().unwrap_err();
        let err = Error::InvalidFloat {
            value: "abc".to_string(),
            source,
        };
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.source().is_some());
    }
}
