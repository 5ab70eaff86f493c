//! # Text Boxes
//!
//! Rectangular blocks of text that compose vertically and horizontally.
//! Used by the graph renderer to lay out its ASCII diagrams.
//!
//! A box is a list of lines and a width (the longest line, in characters).
//! Shorter lines are padded with spaces when a box is placed to the left of
//! another, so columns line up.

use std::fmt;

/// An immutable rectangular block of text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextBox {
    lines: Vec<String>,
    width: usize,
}

impl TextBox {
    /// A box holding `text`, one line per `\n`-separated segment.
    ///
    /// The empty string gives a box one line high and zero wide.
    #[must_use]
    pub fn leaf(text: impl AsRef<str>) -> Self {
        Self::from_lines(text.as_ref().split('\n').map(str::to_owned).collect())
    }

    /// A box with no lines.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// `count` copies of `line`, one per line.
    #[must_use]
    pub fn repeat(line: &str, count: usize) -> Self {
        Self::from_lines(vec![line.to_owned(); count])
    }

    /// All `boxes` stacked top to bottom.
    #[must_use]
    pub fn stack<I>(boxes: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        boxes.into_iter().fold(Self::empty(), Self::above)
    }

    /// `self` on top of `below`.
    #[must_use]
    pub fn above(mut self, below: Self) -> Self {
        self.width = self.width.max(below.width);
        self.lines.extend(below.lines);
        self
    }

    /// `self` to the left of `right`. The result is as tall as the taller of
    /// the two; the shorter one is padded with blank lines at the bottom.
    #[must_use]
    pub fn beside(self, right: Self) -> Self {
        let height = self.height().max(right.height());
        let pad = self.width;

        let lines = (0..height)
            .map(|i| {
                let left = self.lines.get(i).map_or("", String::as_str);
                let right = right.lines.get(i).map_or("", String::as_str);
                format!("{left:<pad$}{right}")
            })
            .collect();

        Self::from_lines(lines)
    }

    /// Number of lines.
    #[must_use]
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Length of the longest line, in characters.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// The lines of the box, unpadded.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn from_lines(lines: Vec<String>) -> Self {
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        Self { lines, width }
    }
}

/// Lines joined with `\n`, trailing spaces removed.
impl fmt::Display for TextBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
