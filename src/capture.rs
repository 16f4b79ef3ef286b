//! Capture orchestration.
//!
//! Ties the pieces together for one capture call: root discovery, whitelist
//! filtering, the frame-tree walk, and assembly of per-window results in
//! enumeration order.

use crate::discovery::{RootEnumerator, RootHandle};
use crate::encoding::TextEncodingBridge;
use crate::types::{CaptureOutput, CaptureResult, DiscoveryStrategy};
use crate::walker::FrameTreeWalker;
use crate::whitelist::Whitelist;
use tracing::{debug, info, trace};

/// Runs one end-to-end capture over a root enumerator.
///
/// Everything is created fresh per call and nothing is cached across calls;
/// each invocation is an independent snapshot.
pub struct CaptureService {
    whitelist: Whitelist,
    walker: FrameTreeWalker,
    bridge: TextEncodingBridge,
}

impl CaptureService {
    pub fn new(whitelist: Whitelist, walker: FrameTreeWalker, bridge: TextEncodingBridge) -> Self {
        Self {
            whitelist,
            walker,
            bridge,
        }
    }

    /// Discover roots with the selected strategy, admit the whitelisted
    /// ones, and walk each admitted frame tree.
    ///
    /// `window_classes` is consulted only by the native-window strategy. An
    /// empty output (no roots, none matching, discovery unavailable) is a
    /// valid non-error result.
    pub fn capture(
        &self,
        enumerator: &dyn RootEnumerator,
        strategy: DiscoveryStrategy,
        window_classes: &[String],
    ) -> CaptureOutput {
        let roots = match strategy {
            DiscoveryStrategy::Shell => enumerator.enumerate_shell_roots(),
            DiscoveryStrategy::NativeWindow => enumerator.enumerate_window_roots(window_classes),
        };
        debug!(
            "{} discovery found {} candidate root(s)",
            strategy.as_str(),
            roots.len()
        );

        let mut output = CaptureOutput::new();
        for root in &roots {
            if let Some(result) = self.capture_root(root.as_ref()) {
                output.push(result);
            }
        }

        info!(
            "capture finished: {} window(s) of {} candidate(s)",
            output.len(),
            roots.len()
        );
        output
    }

    /// Capture one root, or `None` if it is inaccessible or not admitted.
    fn capture_root(&self, root: &dyn RootHandle) -> Option<CaptureResult> {
        let url = match root.url() {
            Ok(url) => url,
            Err(e) => {
                debug!("skipping root with unreadable URL: {}", e);
                return None;
            }
        };

        match self.whitelist.matched_rule(&url) {
            Some(rule) => debug!("admitting '{}' (rule '{}')", url, rule),
            None if self.whitelist.is_empty() => debug!("admitting '{}' (whitelist empty)", url),
            None => {
                trace!("'{}' not in whitelist, skipping", url);
                return None;
            }
        }

        let raw = self.walker.walk(root.root_frame().as_ref());
        let fragments: Vec<String> = raw
            .iter()
            .map(|bytes| self.bridge.to_portable_text(bytes))
            .collect();
        debug!("'{}' yielded {} fragment(s)", url, fragments.len());

        Some(CaptureResult {
            url,
            fragments,
            captured_at: chrono::Utc::now().timestamp(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccessError;
    use crate::discovery::FrameNode;

    #[derive(Clone, Default)]
    struct FakeFrame {
        body: Option<Vec<u8>>,
        children: Vec<FakeFrame>,
    }

    impl FrameNode for FakeFrame {
        fn body(&self) -> Result<Vec<u8>, AccessError> {
            self.body
                .clone()
                .ok_or_else(|| AccessError::BodyUnreadable("fake".into()))
        }

        fn child_frames(&self) -> Result<Vec<Box<dyn FrameNode>>, AccessError> {
            Ok(self
                .children
                .iter()
                .map(|c| Box::new(c.clone()) as Box<dyn FrameNode>)
                .collect())
        }
    }

    struct FakeRoot {
        url: Option<String>,
        frame: FakeFrame,
    }

    impl RootHandle for FakeRoot {
        fn url(&self) -> Result<String, AccessError> {
            self.url
                .clone()
                .ok_or_else(|| AccessError::UrlUnreadable("fake".into()))
        }

        fn root_frame(&self) -> Box<dyn FrameNode> {
            Box::new(self.frame.clone())
        }
    }

    struct FakeEnumerator {
        roots: Vec<FakeRoot>,
    }

    impl RootEnumerator for FakeEnumerator {
        fn enumerate_shell_roots(&self) -> Vec<Box<dyn RootHandle>> {
            self.roots
                .iter()
                .map(|r| {
                    Box::new(FakeRoot {
                        url: r.url.clone(),
                        frame: r.frame.clone(),
                    }) as Box<dyn RootHandle>
                })
                .collect()
        }

        fn enumerate_window_roots(&self, _class_names: &[String]) -> Vec<Box<dyn RootHandle>> {
            vec![]
        }
    }

    fn service(whitelist: Vec<&str>) -> CaptureService {
        CaptureService::new(
            Whitelist::new(whitelist.into_iter().map(String::from).collect()),
            FrameTreeWalker::new(100, 32),
            TextEncodingBridge::new("utf-8"),
        )
    }

    fn root(url: &str, body: &str) -> FakeRoot {
        FakeRoot {
            url: Some(url.to_string()),
            frame: FakeFrame {
                body: Some(body.as_bytes().to_vec()),
                children: vec![],
            },
        }
    }

    #[test]
    fn test_whitelist_filters_roots() {
        let long_body = "x".repeat(160);
        let enumerator = FakeEnumerator {
            roots: vec![
                root("http://example.com/page", &long_body),
                root("http://other.com", &"y".repeat(200)),
            ],
        };

        let output = service(vec!["http://example.com"]).capture(
            &enumerator,
            DiscoveryStrategy::Shell,
            &[],
        );

        assert_eq!(output.len(), 1);
        assert_eq!(output[0].url, "http://example.com/page");
        assert_eq!(output[0].fragments.len(), 1);
    }

    #[test]
    fn test_zero_roots_is_empty_output_not_error() {
        let enumerator = FakeEnumerator { roots: vec![] };
        let output = service(vec![]).capture(&enumerator, DiscoveryStrategy::Shell, &[]);
        assert!(output.is_empty());
    }

    #[test]
    fn test_native_strategy_with_no_candidates_is_empty() {
        let enumerator = FakeEnumerator {
            roots: vec![root("http://example.com", "ignored for native")],
        };
        let output = service(vec![]).capture(
            &enumerator,
            DiscoveryStrategy::NativeWindow,
            &["IEFrame".to_string()],
        );
        assert!(output.is_empty());
    }

    #[test]
    fn test_unreadable_url_skips_root_only() {
        let enumerator = FakeEnumerator {
            roots: vec![
                FakeRoot {
                    url: None,
                    frame: FakeFrame::default(),
                },
                root("http://example.com", "body"),
            ],
        };

        let output = service(vec![]).capture(&enumerator, DiscoveryStrategy::Shell, &[]);
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].url, "http://example.com");
    }

    #[test]
    fn test_results_keep_enumeration_order_and_duplicates() {
        let enumerator = FakeEnumerator {
            roots: vec![
                root("http://example.com/b", "second window"),
                root("http://example.com/a", "first alphabetically"),
                root("http://example.com/b", "same url again"),
            ],
        };

        let output = service(vec![]).capture(&enumerator, DiscoveryStrategy::Shell, &[]);
        let urls: Vec<_> = output.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "http://example.com/b",
                "http://example.com/a",
                "http://example.com/b"
            ]
        );
    }

    #[test]
    fn test_small_root_body_with_qualifying_child() {
        let child_body = "c".repeat(150);
        let enumerator = FakeEnumerator {
            roots: vec![FakeRoot {
                url: Some("http://example.com".to_string()),
                frame: FakeFrame {
                    body: Some(b"tiny root".to_vec()),
                    children: vec![FakeFrame {
                        body: Some(child_body.as_bytes().to_vec()),
                        children: vec![],
                    }],
                },
            }],
        };

        let output = service(vec![]).capture(&enumerator, DiscoveryStrategy::Shell, &[]);
        assert_eq!(output[0].fragments, vec!["tiny root".to_string(), child_body]);
    }
}
