use std::ops::Range;

use logos::Logos;

use crate::Point;
use crate::StampError;
use crate::StampResult;
use crate::position::excerpt;
use crate::tokens::Token;

/// A cursor over the tokens of one directive payload.
///
/// The payload is lexed eagerly so that lexing errors surface before parsing
/// starts. Spans are kept relative to the whole template so that errors can
/// point at the right line and column.
pub(crate) struct TokenStream<'a> {
	/// The complete template the payload was taken from.
	template: &'a str,
	/// The lexed tokens with their absolute byte spans.
	tokens: Vec<(Token, Range<usize>)>,
	/// Current index into `tokens`.
	cursor: usize,
	/// Absolute offset of the end of the payload.
	end: usize,
}

impl<'a> TokenStream<'a> {
	pub(crate) fn new(template: &'a str, range: Range<usize>) -> StampResult<Self> {
		let base = range.start;
		let end = range.end;
		let mut tokens = vec![];

		for (result, span) in Token::lexer(&template[range]).spanned() {
			let span = (span.start + base)..(span.end + base);

			match result {
				Ok(token) => tokens.push((token, span)),
				Err(()) => {
					let slice = &template[span.clone()];
					let message = if slice.starts_with(['"', '\'']) {
						"malformed string literal".to_string()
					} else {
						format!("unexpected character `{slice}`")
					};

					return Err(syntax_error(template, message, span));
				}
			}
		}

		Ok(Self {
			template,
			tokens,
			cursor: 0,
			end,
		})
	}

	pub(crate) fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.cursor).map(|(token, _)| token)
	}

	/// Look `distance` tokens past the current one.
	pub(crate) fn peek_ahead(&self, distance: usize) -> Option<&Token> {
		self.tokens
			.get(self.cursor + distance)
			.map(|(token, _)| token)
	}

	pub(crate) fn next(&mut self) -> Option<(Token, Range<usize>)> {
		let item = self.tokens.get(self.cursor).cloned();
		if item.is_some() {
			self.cursor += 1;
		}
		item
	}

	/// Consume the current token when it equals `expected`.
	pub(crate) fn eat(&mut self, expected: &Token) -> bool {
		if self.peek() == Some(expected) {
			self.cursor += 1;
			true
		} else {
			false
		}
	}

	/// Consume `expected` or fail with a syntax error naming it.
	pub(crate) fn expect(&mut self, expected: &Token) -> StampResult<Range<usize>> {
		match self.tokens.get(self.cursor) {
			Some((token, span)) if token == expected => {
				let span = span.clone();
				self.cursor += 1;
				Ok(span)
			}
			_ => Err(self.unexpected(&format!("expected `{expected}`"))),
		}
	}

	pub(crate) fn is_done(&self) -> bool {
		self.cursor >= self.tokens.len()
	}

	/// The span of the current token, or an empty span at the end of the
	/// payload.
	pub(crate) fn span(&self) -> Range<usize> {
		self.tokens
			.get(self.cursor)
			.map_or(self.end..self.end, |(_, span)| span.clone())
	}

	/// The end of the most recently consumed token.
	pub(crate) fn last_end(&self) -> usize {
		self.cursor
			.checked_sub(1)
			.and_then(|index| self.tokens.get(index))
			.map_or(self.end, |(_, span)| span.end)
	}

	/// The template text covered by `span`.
	pub(crate) fn slice(&self, span: Range<usize>) -> &'a str {
		&self.template[span]
	}

	pub(crate) fn error(&self, message: impl Into<String>, span: Range<usize>) -> StampError {
		syntax_error(self.template, message, span)
	}

	/// Describe the current token as unexpected. Operators outside the
	/// grammar are reported as unsupported instead.
	pub(crate) fn unexpected(&self, hint: &str) -> StampError {
		let span = self.span();

		match self.peek() {
			None => self.error(format!("unexpected end of expression, {hint}"), span),
			Some(Token::Forbidden) => self.unsupported(span),
			Some(_) => {
				let text = self.slice(span.clone());
				self.error(format!("unexpected `{text}`, {hint}"), span)
			}
		}
	}

	pub(crate) fn unsupported(&self, span: Range<usize>) -> StampError {
		let text = self.slice(span.clone());
		self.error(
			format!("`{text}` is not supported in template expressions"),
			span,
		)
	}

	pub(crate) fn invalid_target(&self, span: Range<usize>) -> StampError {
		StampError::InvalidAssignmentTarget {
			location: Point::locate(self.template, span.start),
			snippet: excerpt(self.template, span),
		}
	}
}

pub(crate) fn syntax_error(
	template: &str,
	message: impl Into<String>,
	span: Range<usize>,
) -> StampError {
	StampError::ExpressionSyntax {
		message: message.into(),
		location: Point::locate(template, span.start),
		snippet: excerpt(template, span),
	}
}
