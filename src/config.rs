//! Parser configuration.

/// Options controlling how strictly a document is read.
///
/// ```rust
/// use collada_rs::ParserConfig;
///
/// let config = ParserConfig::strict().with_max_depth(Some(64));
/// assert!(config.strict_tags);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserConfig {
    /// Report a close tag that does not match the element being built as
    /// [`Error::TagMismatch`](crate::Error::TagMismatch) instead of
    /// ignoring it.
    pub strict_tags: bool,
    /// Maximum nesting depth of tracked elements, unlimited when `None`.
    pub max_depth: Option<usize>,
}

impl ParserConfig {
    /// Creates the default (lenient, unlimited) configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that reports mismatched close tags.
    pub fn strict() -> Self {
        Self {
            strict_tags: true,
            ..Self::default()
        }
    }

    /// Configuration that ignores mismatched close tags.
    pub fn lenient() -> Self {
        Self::default()
    }

    /// Sets `strict_tags`.
    pub fn with_strict_tags(mut self, strict_tags: bool) -> Self {
        self.strict_tags = strict_tags;
        self
    }

    /// Sets `max_depth`.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }
}
