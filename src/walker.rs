//! Depth-first extraction of HTML bodies from a frame hierarchy.
//!
//! The walker visits a document's frame tree in pre-order, collecting raw
//! body bytes while isolating every per-node failure: an unreadable body or
//! child collection degrades to "nothing emitted on that branch" and never
//! aborts sibling branches or the overall capture.

use crate::discovery::FrameNode;
use tracing::{debug, trace};

/// Byte length a non-root body must exceed to be emitted.
pub const DEFAULT_MIN_FRAGMENT_LEN: usize = 100;

/// Recursion cap; reaching it stops descent rather than overflowing the stack.
pub const DEFAULT_MAX_FRAME_DEPTH: usize = 32;

/// Walks a frame tree and collects qualifying HTML bodies.
///
/// The root's body is always emitted when retrievable. Every descendant
/// body must strictly exceed `min_fragment_len` bytes, which discards the
/// boilerplate of ad, tracker, and blank utility frames.
pub struct FrameTreeWalker {
    min_fragment_len: usize,
    max_frame_depth: usize,
}

impl FrameTreeWalker {
    pub fn new(min_fragment_len: usize, max_frame_depth: usize) -> Self {
        Self {
            min_fragment_len,
            max_frame_depth,
        }
    }

    /// Collect the bodies of `root` and its qualifying descendants in
    /// depth-first pre-order. Bodies are raw bytes in the document's source
    /// code page; decoding happens at the output edge.
    pub fn walk(&self, root: &dyn FrameNode) -> Vec<Vec<u8>> {
        let mut fragments = Vec::new();
        self.visit(root, 0, &mut fragments);
        fragments
    }

    fn visit(&self, node: &dyn FrameNode, depth: usize, out: &mut Vec<Vec<u8>>) {
        match node.body() {
            Ok(body) => {
                if depth == 0 || body.len() > self.min_fragment_len {
                    out.push(body);
                } else {
                    trace!(
                        "discarding {}-byte frame body at depth {} (below threshold {})",
                        body.len(),
                        depth,
                        self.min_fragment_len
                    );
                }
            }
            // A failed body read must not prevent descending: a child frame
            // may be independently accessible even when its parent is not.
            Err(e) => debug!("skipping unreadable frame body at depth {}: {}", depth, e),
        }

        if depth >= self.max_frame_depth {
            debug!(
                "frame depth cap {} reached, not descending further",
                self.max_frame_depth
            );
            return;
        }

        match node.child_frames() {
            Ok(children) => {
                for child in &children {
                    self.visit(child.as_ref(), depth + 1, out);
                }
            }
            Err(e) => trace!("child frames unreadable at depth {}: {}", depth, e),
        }
    }
}

impl Default for FrameTreeWalker {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_FRAGMENT_LEN, DEFAULT_MAX_FRAME_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccessError;

    /// In-memory frame tree for exercising the walker without a browser.
    #[derive(Clone, Default)]
    struct FakeFrame {
        body: Option<Vec<u8>>,
        children: Vec<FakeFrame>,
        children_unreadable: bool,
    }

    impl FakeFrame {
        fn with_body(body: &str) -> Self {
            Self {
                body: Some(body.as_bytes().to_vec()),
                ..Default::default()
            }
        }

        fn broken_body() -> Self {
            Self::default()
        }

        fn child(mut self, child: FakeFrame) -> Self {
            self.children.push(child);
            self
        }
    }

    impl FrameNode for FakeFrame {
        fn body(&self) -> Result<Vec<u8>, AccessError> {
            self.body
                .clone()
                .ok_or_else(|| AccessError::BodyUnreadable("fake".into()))
        }

        fn child_frames(&self) -> Result<Vec<Box<dyn FrameNode>>, AccessError> {
            if self.children_unreadable {
                return Err(AccessError::ChildrenUnreadable("fake".into()));
            }
            Ok(self
                .children
                .iter()
                .map(|c| Box::new(c.clone()) as Box<dyn FrameNode>)
                .collect())
        }
    }

    fn walk_strings(walker: &FrameTreeWalker, root: &FakeFrame) -> Vec<String> {
        walker
            .walk(root)
            .into_iter()
            .map(|b| String::from_utf8(b).unwrap())
            .collect()
    }

    #[test]
    fn test_root_body_always_emitted_regardless_of_length() {
        let walker = FrameTreeWalker::default();
        let root = FakeFrame::with_body("tiny");

        assert_eq!(walk_strings(&walker, &root), vec!["tiny"]);
    }

    #[test]
    fn test_non_root_body_gated_by_threshold() {
        let walker = FrameTreeWalker::new(10, DEFAULT_MAX_FRAME_DEPTH);
        let root = FakeFrame::with_body("root")
            .child(FakeFrame::with_body("short"))
            .child(FakeFrame::with_body("long enough to qualify"));

        assert_eq!(
            walk_strings(&walker, &root),
            vec!["root", "long enough to qualify"]
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        // Exactly at the threshold is not enough; it must be exceeded.
        let walker = FrameTreeWalker::new(5, DEFAULT_MAX_FRAME_DEPTH);
        let root = FakeFrame::with_body("r")
            .child(FakeFrame::with_body("12345"))
            .child(FakeFrame::with_body("123456"));

        assert_eq!(walk_strings(&walker, &root), vec!["r", "123456"]);
    }

    #[test]
    fn test_preorder_with_nested_frames() {
        let walker = FrameTreeWalker::new(0, DEFAULT_MAX_FRAME_DEPTH);
        let root = FakeFrame::with_body("a")
            .child(FakeFrame::with_body("b").child(FakeFrame::with_body("c")))
            .child(FakeFrame::with_body("d"));

        assert_eq!(walk_strings(&walker, &root), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_broken_body_still_descends_into_children() {
        let walker = FrameTreeWalker::new(0, DEFAULT_MAX_FRAME_DEPTH);
        let root = FakeFrame::broken_body()
            .child(FakeFrame::with_body("child1"))
            .child(FakeFrame::with_body("child2"));

        assert_eq!(walk_strings(&walker, &root), vec!["child1", "child2"]);
    }

    #[test]
    fn test_unreadable_children_terminate_branch_only() {
        let walker = FrameTreeWalker::new(0, DEFAULT_MAX_FRAME_DEPTH);
        let mut sealed = FakeFrame::with_body("sealed");
        sealed.children_unreadable = true;
        // A hidden child under the sealed branch must never be reached.
        sealed.children.push(FakeFrame::with_body("hidden"));

        let root = FakeFrame::with_body("root")
            .child(sealed)
            .child(FakeFrame::with_body("sibling"));

        assert_eq!(walk_strings(&walker, &root), vec!["root", "sealed", "sibling"]);
    }

    #[test]
    fn test_depth_cap_stops_descent() {
        // Chain of depth 10 with a cap of 3: nodes at depth 0..=3 are
        // visited, nothing deeper.
        let mut node = FakeFrame::with_body("d9");
        for i in (0..9).rev() {
            node = FakeFrame::with_body(&format!("d{}", i)).child(node);
        }

        let walker = FrameTreeWalker::new(0, 3);
        assert_eq!(walk_strings(&walker, &node), vec!["d0", "d1", "d2", "d3"]);
    }

    #[test]
    fn test_depth_cap_is_inclusive_and_keeps_sibling_order() {
        // Cap 2 on a chain reaching depth 3: the node at the cap is still
        // emitted, the one below it is not, and siblings of the capped
        // branch are unaffected.
        let root = FakeFrame::with_body("d0")
            .child(
                FakeFrame::with_body("d1")
                    .child(FakeFrame::with_body("d2").child(FakeFrame::with_body("d3"))),
            )
            .child(FakeFrame::with_body("sibling"));

        let walker = FrameTreeWalker::new(0, 2);
        assert_eq!(
            walk_strings(&walker, &root),
            vec!["d0", "d1", "d2", "sibling"]
        );
    }

    #[test]
    fn test_leaf_has_no_descendants() {
        let walker = FrameTreeWalker::new(0, DEFAULT_MAX_FRAME_DEPTH);
        let root = FakeFrame::with_body("only");
        assert_eq!(walk_strings(&walker, &root), vec!["only"]);
    }
}
