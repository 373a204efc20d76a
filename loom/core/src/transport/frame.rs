//! Frame Protocol
//!
//! Both directions carry UTF-8 text frames:
//!
//! ```text
//! server -> browser   JavaScript statements, newline separated
//!                     updateCSSProperty('id000003', 'width', '10px');
//!
//! browser -> server   one `.rui` object per frame
//!                     click-event{id=id000001, timeStamp=1700, button=0}
//! ```
//!
//! # Security
//!
//! - Maximum frame size is enforced in both directions
//! - An inbound frame that does not parse is a protocol error; the reader
//!   logs it and keeps the connection open

use crate::data::DataObject;

use super::TransportError;

/// Maximum frame size (10 MB)
pub const MAX_FRAME_SIZE: usize = 10 * 1024 * 1024;

/// Parse an inbound frame into its command object
///
/// # Errors
///
/// Returns [`TransportError::Protocol`] if the frame is oversized, empty or
/// not a `.rui` object.
pub fn decode_inbound(text: &str) -> Result<DataObject, TransportError> {
    if text.len() > MAX_FRAME_SIZE {
        return Err(TransportError::Protocol(format!(
            "Frame too large: {} bytes (max: {})",
            text.len(),
            MAX_FRAME_SIZE
        )));
    }
    if text.trim().is_empty() {
        return Err(TransportError::Protocol("Empty frame".to_string()));
    }
    DataObject::parse(text).map_err(|e| TransportError::Protocol(e.to_string()))
}

/// Check an outbound script before it is queued
///
/// # Errors
///
/// Returns [`TransportError::SendFailed`] for scripts over [`MAX_FRAME_SIZE`].
pub fn check_outbound(script: &str) -> Result<(), TransportError> {
    if script.len() > MAX_FRAME_SIZE {
        return Err(TransportError::SendFailed(format!(
            "Script too large: {} bytes (max: {})",
            script.len(),
            MAX_FRAME_SIZE
        )));
    }
    Ok(())
}

/// Accumulates script statements between nested start/finish brackets
///
/// Only the outermost `finish` yields the collected frame.
#[derive(Debug, Default)]
pub struct ScriptBatch {
    buffer: String,
    depth: usize,
}

impl ScriptBatch {
    /// Create an idle batch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a bracket; returns `true` for the outermost one
    pub fn start(&mut self) -> bool {
        self.depth += 1;
        self.depth == 1
    }

    /// Whether a bracket is open
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.depth > 0
    }

    /// Append a statement (a newline is added when missing)
    pub fn push(&mut self, script: &str) {
        self.buffer.push_str(script);
        if !script.ends_with('\n') {
            self.buffer.push('\n');
        }
    }

    /// Close a bracket; the collected frame once the outermost one closes
    pub fn finish(&mut self) -> Option<String> {
        match self.depth {
            0 => None,
            1 => {
                self.depth = 0;
                self.take()
            }
            _ => {
                self.depth -= 1;
                None
            }
        }
    }

    /// Take whatever has been collected so far, keeping the bracket open
    pub fn take(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_inbound() {
        let object = decode_inbound("click-event{id=id000001, button=0}").unwrap();
        assert_eq!(object.tag(), "click-event");
        assert_eq!(object.property_value("id"), Some("id000001"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_inbound("  "), Err(TransportError::Protocol(_))));
        assert!(matches!(
            decode_inbound("click-event{id="),
            Err(TransportError::Protocol(_))
        ));
    }

    #[test]
    fn test_oversized_frames() {
        let big = "x".repeat(MAX_FRAME_SIZE + 1);
        assert!(decode_inbound(&big).is_err());
        assert!(check_outbound(&big).is_err());
        assert!(check_outbound("scanElementsSize();").is_ok());
    }

    #[test]
    fn test_nested_batches_collapse() {
        let mut batch = ScriptBatch::new();
        assert!(batch.start());
        batch.push("a();");
        assert!(!batch.start());
        batch.push("b();\n");
        assert_eq!(batch.finish(), None);
        assert!(batch.is_open());
        assert_eq!(batch.finish().as_deref(), Some("a();\nb();\n"));
        assert!(!batch.is_open());
        assert_eq!(batch.finish(), None);
    }

    #[test]
    fn test_empty_batch_yields_nothing() {
        let mut batch = ScriptBatch::new();
        batch.start();
        assert_eq!(batch.finish(), None);
    }
}
