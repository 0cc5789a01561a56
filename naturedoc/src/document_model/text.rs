//! Text leaves and inline marks
//!
//! A text node is a span of characters with a consistent set of marks.
//! Marks are stored as a set, so applying the same mark twice is a no-op and
//! the order in which marks were applied is not observable.

use std::fmt;

/// Inline text style attached to a [`Text`] node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
}

impl Mark {
    /// Every mark, in canonical order (innermost wrapper first when rendered)
    pub const ALL: [Mark; 5] = [
        Mark::Bold,
        Mark::Italic,
        Mark::Underline,
        Mark::Strikethrough,
        Mark::Code,
    ];

    /// Name used in the stored encoding
    pub fn as_str(self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Underline => "underline",
            Mark::Strikethrough => "strikethrough",
            Mark::Code => "code",
        }
    }

    /// Parse a mark name, accepting the short aliases older content used
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "bold" | "strong" | "b" => Some(Mark::Bold),
            "italic" | "em" | "i" => Some(Mark::Italic),
            "underline" | "u" => Some(Mark::Underline),
            "strikethrough" | "strike" | "del" | "s" => Some(Mark::Strikethrough),
            "code" => Some(Mark::Code),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Bit used for this mark in the editor's numeric `format` field
    fn editor_bit(self) -> u64 {
        match self {
            Mark::Bold => 1,
            Mark::Italic => 2,
            Mark::Strikethrough => 4,
            Mark::Underline => 8,
            Mark::Code => 16,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of marks
///
/// Iteration always yields marks in [`Mark::ALL`] order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MarkSet(u8);

impl MarkSet {
    /// The empty set
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn contains(self, mark: Mark) -> bool {
        self.0 & mark.bit() != 0
    }

    /// Add a mark, returning `true` if it was not already present
    pub fn insert(&mut self, mark: Mark) -> bool {
        let added = !self.contains(mark);
        self.0 |= mark.bit();
        added
    }

    /// Remove a mark, returning `true` if it was present
    pub fn remove(&mut self, mark: Mark) -> bool {
        let present = self.contains(mark);
        self.0 &= !mark.bit();
        present
    }

    /// Iterate over the marks in canonical order
    pub fn iter(self) -> impl Iterator<Item = Mark> {
        Mark::ALL.into_iter().filter(move |mark| self.contains(*mark))
    }

    /// Decode the editor's numeric `format` bitmask
    ///
    /// Bits the document model has no mark for (subscript, superscript,
    /// highlight) are ignored.
    pub fn from_editor_format(format: u64) -> Self {
        Mark::ALL
            .into_iter()
            .filter(|mark| format & mark.editor_bit() != 0)
            .collect()
    }
}

impl FromIterator<Mark> for MarkSet {
    fn from_iter<I: IntoIterator<Item = Mark>>(iter: I) -> Self {
        let mut set = MarkSet::empty();
        for mark in iter {
            set.insert(mark);
        }
        set
    }
}

/// A run of text with marks applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// The text content (unescaped)
    pub value: String,

    /// Styles applied to the whole run
    pub marks: MarkSet,
}

impl Text {
    /// Create a new plain text run
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            marks: MarkSet::empty(),
        }
    }

    /// Create a new text run with the given marks
    pub fn with_marks(value: impl Into<String>, marks: impl IntoIterator<Item = Mark>) -> Self {
        Self {
            value: value.into(),
            marks: marks.into_iter().collect(),
        }
    }

    /// Check if this text run has any formatting applied
    pub fn has_formatting(&self) -> bool {
        !self.marks.is_empty()
    }

    /// Copy of this run with `mark` applied
    pub fn with_mark(&self, mark: Mark) -> Self {
        let mut marks = self.marks;
        marks.insert(mark);
        Self {
            value: self.value.clone(),
            marks,
        }
    }

    /// Copy of this run with `mark` removed
    pub fn without_mark(&self, mark: Mark) -> Self {
        let mut marks = self.marks;
        marks.remove(mark);
        Self {
            value: self.value.clone(),
            marks,
        }
    }

    /// Copy of this run with `mark` toggled, as the editor toolbar does it
    pub fn toggled(&self, mark: Mark) -> Self {
        if self.marks.contains(mark) {
            self.without_mark(mark)
        } else {
            self.with_mark(mark)
        }
    }
}
