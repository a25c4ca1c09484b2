//! Character-by-character reveal of terminal agent responses
//!
//! The cursor is pure state advanced by a timer task owned by the
//! controller. Exactly one reveal runs at a time: starting a new one
//! aborts the previous task, and controller teardown aborts the pending
//! task so no state updates fire after the view is gone.

/// Reveal cursor for one specific message index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealCursor {
    /// Transcript index of the message being revealed
    pub index: usize,
    /// Number of characters currently visible
    pub revealed: usize,
    /// Total character count of the full content
    pub total: usize,
}

impl RevealCursor {
    pub fn new(index: usize, content: &str) -> Self {
        Self {
            index,
            revealed: 0,
            total: content.chars().count(),
        }
    }

    /// Advance one character; returns `true` while more remain
    pub fn advance(&mut self) -> bool {
        if self.revealed < self.total {
            self.revealed += 1;
        }
        self.revealed < self.total
    }

    pub fn is_done(&self) -> bool {
        self.revealed >= self.total
    }

    /// The visible prefix of `content` at the current cursor.
    ///
    /// Indexing is by character, matching `total`, so multi-byte content
    /// never splits mid-codepoint.
    pub fn visible<'a>(&self, content: &'a str) -> &'a str {
        if self.is_done() {
            return content;
        }
        match content.char_indices().nth(self.revealed) {
            Some((byte_index, _)) => &content[..byte_index],
            None => content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_to_completion() {
        let content = "done";
        let mut cursor = RevealCursor::new(3, content);
        assert_eq!(cursor.visible(content), "");

        assert!(cursor.advance());
        assert_eq!(cursor.visible(content), "d");

        assert!(cursor.advance());
        assert!(cursor.advance());
        // Last advance returns false: nothing further remains.
        assert!(!cursor.advance());
        assert!(cursor.is_done());
        assert_eq!(cursor.visible(content), "done");
    }

    #[test]
    fn test_advance_is_idempotent_at_end() {
        let mut cursor = RevealCursor::new(0, "ab");
        cursor.advance();
        cursor.advance();
        assert!(cursor.is_done());
        assert!(!cursor.advance());
        assert_eq!(cursor.revealed, 2);
    }

    #[test]
    fn test_empty_content_is_immediately_done() {
        let cursor = RevealCursor::new(0, "");
        assert!(cursor.is_done());
        assert!(!cursor.clone().advance());
    }

    #[test]
    fn test_multibyte_content_splits_on_char_boundary() {
        let content = "é8€";
        let mut cursor = RevealCursor::new(0, content);
        assert_eq!(cursor.total, 3);
        cursor.advance();
        assert_eq!(cursor.visible(content), "é");
        cursor.advance();
        assert_eq!(cursor.visible(content), "é8");
        cursor.advance();
        assert_eq!(cursor.visible(content), "é8€");
    }
}
