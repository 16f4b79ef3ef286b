//! Conversion of captured fragments from their source code page to UTF-8.
//!
//! Browser bodies arrive as raw bytes in the local code page of the
//! captured process. This bridge decodes them at the output edge, after the
//! frame walk, so the core never carries encoding concerns.

use encoding_rs::Encoding;
use tracing::warn;

/// Decodes raw fragment bytes from a configured source encoding to UTF-8.
pub struct TextEncodingBridge {
    source: &'static Encoding,
}

impl TextEncodingBridge {
    /// Build a bridge for a WHATWG encoding label such as `gbk` or
    /// `windows-1252`. An unknown label falls back to UTF-8 with a warning.
    pub fn new(label: &str) -> Self {
        let source = Encoding::for_label(label.as_bytes()).unwrap_or_else(|| {
            warn!("unknown encoding label '{}', falling back to utf-8", label);
            encoding_rs::UTF_8
        });
        Self { source }
    }

    /// Decode one fragment.
    ///
    /// A fragment whose bytes are not valid in the source encoding decodes
    /// to an empty string instead of failing the capture, so the fragment
    /// sequence keeps its positions. This is the one place content is lost
    /// without an explicit skip, hence the warning.
    pub fn to_portable_text(&self, bytes: &[u8]) -> String {
        let (text, _, had_errors) = self.source.decode(bytes);
        if had_errors {
            warn!(
                "dropping {}-byte fragment undecodable as {}",
                bytes.len(),
                self.source.name()
            );
            return String::new();
        }
        text.into_owned()
    }

    pub fn encoding_name(&self) -> &'static str {
        self.source.name()
    }
}

impl Default for TextEncodingBridge {
    fn default() -> Self {
        Self::new("gbk")
    }
}
