use std::fmt::Display;
use std::ops::Range;

/// Number of bytes of surrounding text captured on each side of an error.
const EXCERPT_RADIUS: usize = 24;

/// A location within a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
	/// 1-indexed line number.
	pub line: usize,
	/// 1-indexed column number, counted in characters.
	pub column: usize,
	/// 0-indexed byte offset from the start of the template.
	pub offset: usize,
}

impl Default for Point {
	fn default() -> Self {
		Self {
			line: 1,
			column: 1,
			offset: 0,
		}
	}
}

impl Point {
	pub fn new(line: usize, column: usize, offset: usize) -> Self {
		Self {
			line,
			column,
			offset,
		}
	}

	/// Resolve the line and column of a byte `offset` within `source`. Offsets
	/// past the end, or inside a multi-byte character, are clamped back to the
	/// nearest character boundary.
	pub fn locate(source: &str, offset: usize) -> Self {
		let offset = floor_char_boundary(source, offset);
		let mut point = Self::default();
		point.advance_str(&source[..offset]);
		point
	}

	/// Move the point forward over `text`.
	pub fn advance_str(&mut self, text: &str) {
		for ch in text.chars() {
			if ch == '\n' {
				self.line += 1;
				self.column = 1;
			} else {
				self.column += 1;
			}
		}

		self.offset += text.len();
	}
}

impl Display for Point {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.line, self.column)
	}
}

/// Copy the text covered by `range` together with a little surrounding
/// context, for use in diagnostics.
pub(crate) fn excerpt(source: &str, range: Range<usize>) -> String {
	let start = floor_char_boundary(source, range.start.saturating_sub(EXCERPT_RADIUS));
	let end = ceil_char_boundary(source, range.end.saturating_add(EXCERPT_RADIUS));
	source[start..end].to_string()
}

fn floor_char_boundary(source: &str, offset: usize) -> usize {
	let mut offset = offset.min(source.len());
	while !source.is_char_boundary(offset) {
		offset -= 1;
	}
	offset
}

fn ceil_char_boundary(source: &str, offset: usize) -> usize {
	let mut offset = offset.min(source.len());
	while !source.is_char_boundary(offset) {
		offset += 1;
	}
	offset
}
