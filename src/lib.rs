//! frame-capture - rendered-HTML capture from live browser windows.
//!
//! This crate enumerates open browser windows on the desktop, admits the
//! ones whose top-level URL matches a prefix whitelist, and walks each
//! admitted window's frame hierarchy depth-first, collecting the HTML body
//! of every qualifying frame:
//!
//! - **Whitelist**: prefix-based admission policy for top-level URLs
//! - **FrameTreeWalker**: pre-order frame walk with per-node failure isolation
//! - **CaptureService**: discovery -> filter -> walk -> result assembly
//!
//! # Architecture
//!
//! Discovery is abstracted behind the [`RootEnumerator`] trait with two
//! strategies: shell-hosted browser enumeration and native top-level window
//! scanning by class name. The core depends only on the [`FrameNode`] and
//! [`RootHandle`] capability traits, so it runs unchanged against an
//! in-memory fake tree in tests. Fragments travel as raw code-page bytes
//! until the [`TextEncodingBridge`] decodes them at the output edge.

pub mod capture;
pub mod config;
pub mod discovery;
pub mod encoding;
pub mod types;
pub mod walker;
pub mod whitelist;

// Re-export commonly used types
pub use capture::CaptureService;
pub use config::Config;
pub use discovery::{FrameNode, RootEnumerator, RootHandle, SystemEnumerator};
pub use encoding::TextEncodingBridge;
pub use types::{AccessError, CaptureError, CaptureOutput, CaptureResult, DiscoveryStrategy};
pub use walker::FrameTreeWalker;
pub use whitelist::Whitelist;
