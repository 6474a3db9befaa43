use canvas_protocol::ElementId;

/// Text cursor inside a focused leaf, measured in characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caret {
    pub element_id: ElementId,
    pub offset: usize,
}

impl Caret {
    pub fn new(element_id: ElementId, offset: usize) -> Self {
        Self { element_id, offset }
    }

    /// Pull the offset back inside `text` if it overshoots
    pub fn clamp_to(&mut self, text: &str) {
        self.offset = self.offset.min(char_len(text));
    }
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of the `offset`-th character, or the end of `text`
pub fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        let mut caret = Caret::new(ElementId::new("x"), 10);
        caret.clamp_to("héllo");
        assert_eq!(caret.offset, 5);

        caret.clamp_to("hello world");
        assert_eq!(caret.offset, 5);
    }

    #[test]
    fn test_byte_index_counts_chars() {
        assert_eq!(byte_index("héllo", 2), 3);
        assert_eq!(byte_index("abc", 9), 3);
    }
}
