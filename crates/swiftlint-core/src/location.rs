//! Positions, byte ranges, and line/column locations.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::PathBuf;

/// Absolute byte offset into a file's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position(pub usize);

impl Position {
    /// Returns the raw byte offset.
    #[must_use]
    pub fn offset(self) -> usize {
        self.0
    }

    /// Returns a position `bytes` further into the file.
    #[must_use]
    pub fn advanced_by(self, bytes: usize) -> Self {
        Self(self.0 + bytes)
    }
}

/// Half-open byte span `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ByteRange {
    /// First byte of the span.
    pub start: usize,
    /// One past the last byte of the span.
    pub end: usize,
}

impl ByteRange {
    /// Creates a new range.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the span in bytes.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true when the span covers no bytes.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Returns true if `offset` lies inside the span.
    #[must_use]
    pub fn contains(self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Start of the span as a [`Position`].
    #[must_use]
    pub fn start_position(self) -> Position {
        Position(self.start)
    }
}

/// Translates byte offsets into 1-based line and column numbers.
///
/// Columns are counted in bytes, so a location always round-trips to the
/// same [`Position`].
#[derive(Debug, Clone)]
pub struct LocationConverter {
    line_starts: Vec<usize>,
    len: usize,
}

impl LocationConverter {
    /// Builds a converter for `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Returns `(line, column)` for a position; positions past the end clamp to it.
    #[must_use]
    pub fn location(&self, position: Position) -> (usize, usize) {
        let offset = position.0.min(self.len);
        let index = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (index + 1, offset - self.line_starts[index] + 1)
    }

    /// Returns the position for a 1-based `(line, column)` pair.
    #[must_use]
    pub fn position(&self, line: usize, column: usize) -> Option<Position> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let offset = start + column.checked_sub(1)?;
        (offset <= self.len).then_some(Position(offset))
    }

    /// Byte range of a 1-based line, excluding its newline.
    #[must_use]
    pub fn line_range(&self, line: usize) -> Option<ByteRange> {
        let index = line.checked_sub(1)?;
        let start = *self.line_starts.get(index)?;
        let end = self
            .line_starts
            .get(index + 1)
            .map_or(self.len, |next| next - 1);
        Some(ByteRange::new(start, end))
    }

    /// Number of lines, counting a trailing partial line.
    #[must_use]
    pub fn line_count(&self) -> usize {
        if self.line_starts.last() == Some(&self.len) && self.len > 0 {
            self.line_starts.len() - 1
        } else {
            self.line_starts.len()
        }
    }
}

/// A user-facing point in a file.
///
/// `character` is `None` when a location denotes a whole line. Ordering is
/// by line, then character, with `None` sorting before any column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path, absent for in-memory sources.
    pub file: Option<PathBuf>,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed), if known.
    pub character: Option<usize>,
}

impl Location {
    /// Creates a location with explicit values.
    #[must_use]
    pub fn new(file: Option<PathBuf>, line: usize, character: Option<usize>) -> Self {
        Self {
            file,
            line,
            character,
        }
    }

    /// Creates a location from a byte position.
    #[must_use]
    pub fn from_position(
        file: Option<PathBuf>,
        converter: &LocationConverter,
        position: Position,
    ) -> Self {
        let (line, column) = converter.location(position);
        Self::new(file, line, Some(column))
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then(self.character.cmp(&other.character))
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let file = self
            .file
            .as_ref()
            .map_or_else(|| "<nopath>".to_string(), |p| p.display().to_string());
        write!(f, "{file}:{}", self.line)?;
        if let Some(character) = self.character {
            write!(f, ":{character}")?;
        }
        Ok(())
    }
}
