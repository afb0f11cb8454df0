use std::borrow::Cow;

use unicode_segmentation::UnicodeSegmentation;

/// Grapheme-aware shortening used when request content is written to the log.
pub trait Ellipsis {
    /// Keeps the first `len` extended grapheme clusters and appends `...` when
    /// anything was cut. A length of 0 yields the empty string.
    fn truncate_ellipsis(&self, len: usize) -> Cow<'_, str>;

    /// Same as [`Ellipsis::truncate_ellipsis`], with line breaks folded into
    /// `⏎` so a pasted snippet stays on one log line.
    fn log_excerpt(&self, len: usize) -> String {
        self.truncate_ellipsis(len)
            .replace("\r\n", "⏎")
            .replace('\n', "⏎")
    }
}

impl Ellipsis for str {
    fn truncate_ellipsis(&self, len: usize) -> Cow<'_, str> {
        if len == 0 {
            return Cow::Borrowed("");
        }
        match self.grapheme_indices(true).nth(len) {
            None => Cow::Borrowed(self),
            Some((cut, _)) => Cow::Owned(format!("{}...", &self[..cut])),
        }
    }
}
