//! Browser root discovery.
//!
//! This module defines the capability traits the core consumes from the
//! browser-automation boundary and provides [`SystemEnumerator`], the
//! platform-backed implementation. Two interchangeable strategies exist:
//! shell-hosted browser enumeration and native top-level window scanning by
//! window-class name. The core is indifferent to which strategy supplied a
//! handle.

use crate::types::{AccessError, CaptureError};
#[cfg(not(windows))]
use tracing::debug;

#[cfg(windows)]
mod win32;

/// A node in a document's frame hierarchy.
///
/// `body` returns the node's outer HTML as raw bytes in the document's
/// source code page. A node may become inaccessible mid-traversal
/// (cross-origin restriction, window already closed); that is an expected,
/// recoverable condition reported as [`AccessError`], not a fatal one.
pub trait FrameNode {
    fn body(&self) -> Result<Vec<u8>, AccessError>;

    /// Child frames in stable, index-based order. An empty vec means the
    /// node is a leaf.
    fn child_frames(&self) -> Result<Vec<Box<dyn FrameNode>>, AccessError>;
}

/// An opaque reference to one top-level browser document.
///
/// Held only transiently during one capture call; never persisted.
pub trait RootHandle {
    fn url(&self) -> Result<String, AccessError>;
    fn root_frame(&self) -> Box<dyn FrameNode>;
}

/// Supplies the set of top-level browser documents to consider.
///
/// An unavailable automation subsystem yields an empty vec from either
/// method; a capture with no visible browsers is a normal outcome, not an
/// error.
pub trait RootEnumerator {
    /// Enumerate all currently open shell-hosted browser instances.
    fn enumerate_shell_roots(&self) -> Vec<Box<dyn RootHandle>>;

    /// Enumerate top-level windows matching `class_names`, selecting those
    /// hosting an embedded browser control.
    fn enumerate_window_roots(&self, class_names: &[String]) -> Vec<Box<dyn RootHandle>>;
}

/// Production enumerator backed by the platform automation subsystem.
///
/// Construction performs the one-time subsystem initialization; this is the
/// only step of a capture that can fail as a whole. Teardown happens on
/// drop.
pub struct SystemEnumerator {
    #[cfg(windows)]
    _apartment: win32::ComApartment,
    document_timeout_ms: u32,
}

impl SystemEnumerator {
    pub fn new(document_timeout_ms: u32) -> Result<Self, CaptureError> {
        Ok(Self {
            #[cfg(windows)]
            _apartment: win32::ComApartment::new()
                .map_err(|e| CaptureError::AutomationInit(e.to_string()))?,
            document_timeout_ms,
        })
    }
}

#[cfg(windows)]
impl RootEnumerator for SystemEnumerator {
    fn enumerate_shell_roots(&self) -> Vec<Box<dyn RootHandle>> {
        win32::enumerate_shell_roots()
    }

    fn enumerate_window_roots(&self, class_names: &[String]) -> Vec<Box<dyn RootHandle>> {
        win32::enumerate_window_roots(class_names, self.document_timeout_ms)
    }
}

#[cfg(not(windows))]
impl RootEnumerator for SystemEnumerator {
    fn enumerate_shell_roots(&self) -> Vec<Box<dyn RootHandle>> {
        debug!("shell browser automation unavailable on this platform");
        vec![]
    }

    fn enumerate_window_roots(&self, _class_names: &[String]) -> Vec<Box<dyn RootHandle>> {
        let _ = self.document_timeout_ms;
        debug!("native window scanning unavailable on this platform");
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerator_init_succeeds() {
        let enumerator = SystemEnumerator::new(1000);
        assert!(enumerator.is_ok());
    }

    #[cfg(not(windows))]
    #[test]
    fn test_unavailable_subsystem_yields_empty_sets() {
        let enumerator = SystemEnumerator::new(1000).unwrap();
        assert!(enumerator.enumerate_shell_roots().is_empty());
        assert!(enumerator
            .enumerate_window_roots(&["IEFrame".to_string()])
            .is_empty());
    }
}
