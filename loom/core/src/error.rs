//! Error Types
//!
//! Every recoverable failure in the core is one of the [`LoomError`] kinds.
//!
//! # Policy
//!
//! The core never panics on user-level input. Operations that can fail return
//! [`LoomResult`]; the public property API converts an error into a logged
//! `false` and leaves the target bag untouched.

use thiserror::Error;

use crate::transport::TransportError;

/// Result alias used throughout the crate
pub type LoomResult<T> = Result<T, LoomError>;

/// Errors reported by the property engine, the view graph and the session bridge
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LoomError {
    /// A value cannot be coerced to the type the tag requires
    #[error("incompatible type of \"{tag}\" property value: {value}")]
    IncompatibleType {
        /// Normalized property tag
        tag: String,
        /// Debug rendering of the rejected value
        value: String,
    },

    /// A string value failed to parse
    #[error("invalid {what} format: \"{text}\"")]
    InvalidFormat {
        /// What was being parsed (color, size, angle, .rui text, ...)
        what: &'static str,
        /// The offending text (or parser diagnostic)
        text: String,
    },

    /// The tag is not recognized by the target bag
    #[error("property \"{tag}\" is not supported by {owner}")]
    UnknownTag {
        /// Normalized property tag
        tag: String,
        /// Name of the bag that rejected the tag
        owner: &'static str,
    },

    /// An index is outside the valid range
    #[error("\"{tag}\" index {index} is out of range (0..{len})")]
    OutOfRange {
        /// Property or operation name
        tag: String,
        /// Requested index
        index: i64,
        /// Number of valid entries
        len: usize,
    },

    /// `ViewByID` (or an html-id lookup) did not find a view
    #[error("view \"{path}\" not found")]
    NotFound {
        /// The id path that failed to resolve
        path: String,
    },

    /// Outbound write attempted with no active bridge
    #[error("no active bridge, \"{operation}\" dropped")]
    BridgeDisconnected {
        /// The dropped operation
        operation: String,
    },

    /// A getter-RPC did not receive an answer within the bridge timeout
    #[error("getter \"{function}\" (answer {answer_id}) timed out after {timeout_ms} ms")]
    GetterTimeout {
        /// Browser helper that was called
        function: String,
        /// Correlation id of the request
        answer_id: u64,
        /// Configured timeout
        timeout_ms: u64,
    },

    /// An image, string or raw resource is missing
    #[error("resource \"{name}\" not found")]
    ResourceMissing {
        /// Resource name or constant reference
        name: String,
    },

    /// Failure in the underlying transport
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl LoomError {
    /// Build an [`LoomError::IncompatibleType`] from any debuggable value
    pub fn incompatible(tag: &str, value: &impl std::fmt::Debug) -> Self {
        Self::IncompatibleType {
            tag: tag.to_string(),
            value: format!("{value:?}"),
        }
    }

    /// Build an [`LoomError::InvalidFormat`]
    pub fn invalid(what: &'static str, text: impl Into<String>) -> Self {
        Self::InvalidFormat {
            what,
            text: text.into(),
        }
    }

    /// Build an [`LoomError::UnknownTag`]
    pub fn unknown_tag(tag: &str, owner: &'static str) -> Self {
        Self::UnknownTag {
            tag: tag.to_string(),
            owner,
        }
    }

    /// Lookup misses are expected at runtime and are logged at `warn` level;
    /// everything else is an error.
    #[must_use]
    pub fn is_lookup_miss(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::ResourceMissing { .. })
    }

    /// Report this error to the log without propagating it
    pub fn log(&self) {
        if self.is_lookup_miss() {
            tracing::warn!(error = %self, "lookup failed");
        } else {
            tracing::error!(error = %self, "operation rejected");
        }
    }
}

/// Log an error result and collapse it into a flag
pub(crate) fn report<T>(result: LoomResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            e.log();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LoomError::incompatible("width", &true);
        assert_eq!(
            err.to_string(),
            "incompatible type of \"width\" property value: true"
        );

        let err = LoomError::invalid("color", "#12");
        assert_eq!(err.to_string(), "invalid color format: \"#12\"");
    }

    #[test]
    fn test_lookup_miss_classification() {
        assert!(LoomError::NotFound { path: "a/b".into() }.is_lookup_miss());
        assert!(LoomError::ResourceMissing { name: "logo".into() }.is_lookup_miss());
        assert!(!LoomError::unknown_tag("foo", "border").is_lookup_miss());
    }

    #[test]
    fn test_report_collapses_errors() {
        assert_eq!(report::<u8>(Ok(3)), Some(3));
        assert_eq!(report::<u8>(Err(LoomError::invalid("size", "x"))), None);
    }
}
