use std::ops::Range;

use crate::MismatchKind;
use crate::StampError;
use crate::StampResult;

pub(crate) const OPEN_DELIMITER: &str = "{{";
pub(crate) const CLOSE_DELIMITER: &str = "}}";

/// A piece of a template produced by [`scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
	/// Text copied to the output unchanged.
	Raw(&'a str),
	/// A `{{...}}` directive.
	Tag {
		/// The payload between the delimiters with surrounding whitespace
		/// trimmed.
		payload: Range<usize>,
		/// The whole tag, delimiters included.
		tag: Range<usize>,
	},
}

/// Split a template into raw text and directive payloads.
///
/// Any `_` run followed by a newline directly after a closing `}}` is
/// dropped, which lets a directive sit on its own line without leaving a
/// blank line in the output.
pub(crate) fn scan(template: &str) -> StampResult<Vec<Segment<'_>>> {
	let mut segments = vec![];
	let mut cursor = 0;

	while cursor < template.len() {
		let rest = &template[cursor..];
		let open = rest.find(OPEN_DELIMITER).map(|index| index + cursor);
		let close = rest.find(CLOSE_DELIMITER).map(|index| index + cursor);

		let open = match (open, close) {
			(_, Some(close)) if open.is_none_or(|open| close < open) => {
				return Err(stray_close(template, close));
			}
			(Some(open), _) => open,
			(None, _) => {
				segments.push(Segment::Raw(rest));
				break;
			}
		};

		if open > cursor {
			segments.push(Segment::Raw(&template[cursor..open]));
		}

		let inner_start = open + OPEN_DELIMITER.len();
		let inner = &template[inner_start..];

		let Some(close) = inner.find(CLOSE_DELIMITER).map(|index| index + inner_start) else {
			return Err(StampError::tag_mismatch(
				template,
				MismatchKind::UnclosedDelimiter,
				open..template.len(),
			));
		};

		if let Some(nested) = inner
			.find(OPEN_DELIMITER)
			.map(|index| index + inner_start)
			.filter(|nested| *nested < close)
		{
			return Err(StampError::tag_mismatch(
				template,
				MismatchKind::NestedOpen,
				nested..nested + OPEN_DELIMITER.len(),
			));
		}

		let tag_end = close + CLOSE_DELIMITER.len();
		segments.push(Segment::Tag {
			payload: trimmed(template, inner_start..close),
			tag: open..tag_end,
		});

		cursor = skip_newline_markers(template, tag_end);
	}

	Ok(segments)
}

fn stray_close(template: &str, close: usize) -> StampError {
	StampError::tag_mismatch(
		template,
		MismatchKind::StrayClose,
		close..close + CLOSE_DELIMITER.len(),
	)
}

/// Narrow `range` so it excludes leading and trailing whitespace.
pub(crate) fn trimmed(template: &str, range: Range<usize>) -> Range<usize> {
	let text = &template[range.clone()];
	let start = range.start + (text.len() - text.trim_start().len());
	let end = range.end - (text.len() - text.trim_end().len());

	start..end.max(start)
}

/// Advance past every `_\n`, `__\r\n`, ... marker starting at `offset`.
fn skip_newline_markers(template: &str, mut offset: usize) -> usize {
	loop {
		let rest = &template[offset..];
		let underscores = rest.len() - rest.trim_start_matches('_').len();

		if underscores == 0 {
			return offset;
		}

		let after = &rest[underscores..];
		let newline = if after.starts_with('\n') {
			1
		} else if after.starts_with("\r\n") {
			2
		} else {
			return offset;
		};

		offset += underscores + newline;
	}
}
