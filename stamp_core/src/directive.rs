use std::ops::Range;

use crate::AssignmentOperator;
use crate::BinaryOperator;
use crate::Expression;
use crate::ForBinding;
use crate::StampResult;
use crate::expression::parse_fragment;
use crate::lexer::TokenStream;
use crate::lexer::syntax_error;
use crate::scanner::trimmed;

/// A classified directive payload.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Directive {
	/// Only `//` comments. Renders nothing.
	Comment,
	Expression(Expression),
	VarDecl {
		name: String,
		value: Expression,
	},
	If(Expression),
	ElseIf(Expression),
	Else,
	EndIf,
	For {
		binding: ForBinding,
		iterable: Expression,
	},
	EndFor,
}

impl Directive {
	/// The keyword that introduced this directive, if any.
	pub(crate) fn keyword(&self) -> &'static str {
		match self {
			Self::Comment | Self::Expression(_) => "",
			Self::VarDecl { .. } => "var",
			Self::If(_) => "if",
			Self::ElseIf(_) => "elseif",
			Self::Else => "else",
			Self::EndIf => "endif",
			Self::For { .. } => "for",
			Self::EndFor => "endfor",
		}
	}
}

/// Classify the payload covered by `payload`, which is already trimmed.
pub(crate) fn classify(template: &str, payload: Range<usize>) -> StampResult<Directive> {
	if payload.is_empty() {
		return Ok(Directive::Expression(Expression::string("")));
	}

	let start = skip_comment_lines(template, payload.clone());
	let text = &template[start..payload.end];

	if text.starts_with("//") {
		return Ok(Directive::Comment);
	}

	let word_end = text
		.find(|ch: char| !is_identifier_char(ch))
		.unwrap_or(text.len());
	let keyword = &text[..word_end];
	let argument = start + word_end..payload.end;

	match keyword {
		"if" => {
			let condition = parse_argument(template, keyword, argument)?;
			Ok(Directive::If(condition))
		}
		"elseif" => {
			let condition = parse_argument(template, keyword, argument)?;
			Ok(Directive::ElseIf(condition))
		}
		"else" => {
			expect_no_argument(template, keyword, argument)?;
			Ok(Directive::Else)
		}
		"endif" => {
			expect_no_argument(template, keyword, argument)?;
			Ok(Directive::EndIf)
		}
		"for" => {
			let span = argument.clone();
			let expression = parse_argument(template, keyword, argument)?;
			for_loop(template, expression, span)
		}
		"endfor" => {
			expect_no_argument(template, keyword, argument)?;
			Ok(Directive::EndFor)
		}
		"var" => {
			let span = argument.clone();
			let expression = parse_argument(template, keyword, argument)?;
			var_declaration(template, expression, span)
		}
		_ => parse_fragment(template, start..payload.end).map(Directive::Expression),
	}
}

fn is_identifier_char(ch: char) -> bool {
	ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Skip leading lines that are blank or only hold a `//` comment. The last
/// line is never skipped.
fn skip_comment_lines(template: &str, payload: Range<usize>) -> usize {
	let mut start = payload.start;

	while let Some(newline) = template[start..payload.end].find('\n') {
		let line = template[start..start + newline].trim();

		if !line.is_empty() && !line.starts_with("//") {
			break;
		}

		start += newline + 1;
	}

	trimmed(template, start..payload.end).start
}

/// Parse the expression after `keyword`, which must be separated from it by
/// whitespace.
fn parse_argument(template: &str, keyword: &str, argument: Range<usize>) -> StampResult<Expression> {
	let text = &template[argument.clone()];

	if text.is_empty() {
		return Err(syntax_error(
			template,
			format!("`{keyword}` requires an expression"),
			argument.start - keyword.len()..argument.end,
		));
	}

	if !text.starts_with(char::is_whitespace) {
		return Err(syntax_error(
			template,
			format!("expected whitespace after `{keyword}`"),
			argument,
		));
	}

	parse_fragment(template, trimmed(template, argument))
}

/// Closers accept nothing but a trailing comment.
fn expect_no_argument(template: &str, keyword: &str, argument: Range<usize>) -> StampResult<()> {
	let stream = TokenStream::new(template, argument.clone())?;

	if stream.is_done() {
		return Ok(());
	}

	Err(syntax_error(
		template,
		format!("`{keyword}` does not take an argument"),
		trimmed(template, argument),
	))
}

/// Accept `name in iterable` or `key, value in iterable`.
fn for_loop(template: &str, expression: Expression, span: Range<usize>) -> StampResult<Directive> {
	let invalid = || {
		syntax_error(
			template,
			"expected `name in iterable` or `key, value in iterable` after `for`",
			trimmed(template, span.clone()),
		)
	};

	let (key, binary) = match expression {
		Expression::Sequence(items) => {
			let [first, second]: [Expression; 2] = items.try_into().map_err(|_| invalid())?;
			let Expression::Identifier(key) = first else {
				return Err(invalid());
			};
			(Some(key), second)
		}
		other => (None, other),
	};

	let Expression::Binary {
		op: BinaryOperator::In,
		left,
		right,
	} = binary
	else {
		return Err(invalid());
	};

	let Expression::Identifier(value) = *left else {
		return Err(invalid());
	};

	let binding = match key {
		Some(key) => ForBinding::KeyValue { key, value },
		None => ForBinding::Single(value),
	};

	Ok(Directive::For {
		binding,
		iterable: *right,
	})
}

/// Accept `name = value`.
fn var_declaration(
	template: &str,
	expression: Expression,
	span: Range<usize>,
) -> StampResult<Directive> {
	match expression {
		Expression::Assignment {
			op: AssignmentOperator::Assign,
			target,
			value,
		} => {
			Ok(Directive::VarDecl {
				name: target,
				value: *value,
			})
		}
		_ => {
			Err(syntax_error(
				template,
				"expected `name = value` after `var`",
				trimmed(template, span),
			))
		}
	}
}
