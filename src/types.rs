//! Core types for capture results and the error taxonomy.

use serde::Serialize;

/// How top-level browser documents are discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStrategy {
    /// Enumerate shell-hosted browser instances.
    Shell,
    /// Scan native top-level windows by window-class name.
    NativeWindow,
}

impl DiscoveryStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryStrategy::Shell => "shell",
            DiscoveryStrategy::NativeWindow => "native-window",
        }
    }
}

/// One admitted top-level window and the HTML bodies of its frame tree.
///
/// `fragments` holds the root's own body (when retrievable) followed by all
/// descendant bodies in depth-first, left-to-right order, already decoded to
/// UTF-8. It serializes as `frames` on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureResult {
    /// Top-level document URL at the moment of admission.
    pub url: String,
    #[serde(rename = "frames")]
    pub fragments: Vec<String>,
    /// Unix timestamp of the capture.
    pub captured_at: i64,
}

/// All results of one capture call, in enumeration order.
pub type CaptureOutput = Vec<CaptureResult>;

/// Per-node failures inside the browser-automation boundary.
///
/// These are expected, recoverable conditions (cross-origin restriction,
/// window closed mid-walk, unresponsive process). They are always absorbed
/// locally by skipping the affected node or branch and never surface to the
/// caller.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("document URL unreadable: {0}")]
    UrlUnreadable(String),

    #[error("frame body unreadable: {0}")]
    BodyUnreadable(String),

    #[error("child frame collection unreadable: {0}")]
    ChildrenUnreadable(String),

    #[error("document retrieval timed out")]
    Timeout,
}

/// Errors that fail a whole capture call.
///
/// Once enumeration has begun nothing is fatal; the only error here is a
/// failure to bring up the automation subsystem before the first discovery
/// attempt, which is distinct from a zero-result capture.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("automation subsystem initialization failed: {0}")]
    AutomationInit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_as_str() {
        assert_eq!(DiscoveryStrategy::Shell.as_str(), "shell");
        assert_eq!(DiscoveryStrategy::NativeWindow.as_str(), "native-window");
    }

    #[test]
    fn test_capture_result_serializes_fragments_as_frames() {
        let result = CaptureResult {
            url: "http://example.com/".to_string(),
            fragments: vec!["<html></html>".to_string()],
            captured_at: 12345,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["url"], "http://example.com/");
        assert_eq!(json["frames"][0], "<html></html>");
        assert!(json.get("fragments").is_none());
    }
}
