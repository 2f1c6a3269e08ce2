use std::fmt::Display;
use std::ops::Range;

use miette::Diagnostic;
use thiserror::Error;

use crate::Point;
use crate::position::excerpt;

#[derive(Debug, Clone, Diagnostic, Error)]
#[non_exhaustive]
pub enum StampError {
	#[error("tag mismatch at {location}: {kind}")]
	#[diagnostic(
		code(stamp::tag_mismatch),
		help("every `{{{{` needs a closing `}}}}`, every `if` an `endif` and every `for` an `endfor`")
	)]
	TagMismatch {
		kind: MismatchKind,
		location: Point,
		snippet: String,
	},

	#[error("expression syntax error at {location}: {message}")]
	#[diagnostic(code(stamp::expression_syntax))]
	ExpressionSyntax {
		message: String,
		location: Point,
		snippet: String,
	},

	#[error("invalid assignment target at {location}")]
	#[diagnostic(
		code(stamp::invalid_assignment_target),
		help("only a bare identifier can be assigned, e.g. `{{{{ total = total + 1 }}}}`")
	)]
	InvalidAssignmentTarget { location: Point, snippet: String },

	#[error("cannot iterate over {found} value at {location}")]
	#[diagnostic(
		code(stamp::invalid_iterable),
		help("`for` accepts lists and maps; falsy values render nothing")
	)]
	InvalidIterable { found: &'static str, location: Point },

	#[error("cannot read property `{property}` of undefined")]
	#[diagnostic(
		code(stamp::null_member_access),
		help("use optional chaining (`?.`) when the value may be missing")
	)]
	NullMemberAccess { property: String },

	#[error("`{name}` is not a function")]
	#[diagnostic(code(stamp::not_callable))]
	NotCallable { name: String },

	#[error("cannot spread {found} value")]
	#[diagnostic(
		code(stamp::invalid_spread),
		help("lists and strings can be spread into calls and arrays")
	)]
	InvalidSpread { found: &'static str },

	#[error("operator `{operator}` cannot be applied to {found} value")]
	#[diagnostic(code(stamp::invalid_operand))]
	InvalidOperand {
		operator: &'static str,
		found: &'static str,
	},

	#[error("unknown method `{method}` on {found} value")]
	#[diagnostic(code(stamp::unknown_method))]
	UnknownMethod { method: String, found: &'static str },

	#[error("invalid argument for `{name}`: {reason}")]
	#[diagnostic(code(stamp::invalid_argument))]
	InvalidArgument { name: String, reason: String },

	#[error("a context must be built from a map, found {found} value")]
	#[diagnostic(code(stamp::invalid_context))]
	InvalidContext { found: &'static str },
}

impl StampError {
	pub(crate) fn tag_mismatch(template: &str, kind: MismatchKind, span: Range<usize>) -> Self {
		Self::TagMismatch {
			kind,
			location: Point::locate(template, span.start),
			snippet: excerpt(template, span),
		}
	}

	/// Returns true for every structural pairing error: unbalanced
	/// delimiters, unclosed directives and misplaced closers.
	pub fn is_tag_mismatch(&self) -> bool {
		matches!(self, Self::TagMismatch { .. })
	}

	/// The template location attached to this error, if any.
	pub fn location(&self) -> Option<Point> {
		match self {
			Self::TagMismatch { location, .. }
			| Self::ExpressionSyntax { location, .. }
			| Self::InvalidAssignmentTarget { location, .. }
			| Self::InvalidIterable { location, .. } => Some(*location),
			_ => None,
		}
	}
}

/// The block directives that must be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
	If,
	For,
}

impl Display for BlockKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::If => write!(f, "if"),
			Self::For => write!(f, "for"),
		}
	}
}

/// What went wrong when pairing delimiters or directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum MismatchKind {
	/// A `{{` was found before the previous `{{` was closed.
	NestedOpen,
	/// A `{{` is never closed.
	UnclosedDelimiter,
	/// A `}}` has no opening `{{`.
	StrayClose,
	/// An `if` or `for` directive is still open at the end of the template.
	UnclosedDirective(BlockKind),
	/// `elseif`, `else` or `endif` without an open `if` branch to attach to.
	WrongIfPair(&'static str),
	/// `endfor` without an open `for`.
	WrongForPair,
}

impl Display for MismatchKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::NestedOpen => write!(f, "`{{{{` opened before the previous tag was closed"),
			Self::UnclosedDelimiter => write!(f, "`{{{{` is never closed"),
			Self::StrayClose => write!(f, "`}}}}` has no opening `{{{{`"),
			Self::UnclosedDirective(kind) => write!(f, "`{kind}` is never closed"),
			Self::WrongIfPair(directive) => {
				write!(f, "wrong pair of if: `{directive}` has no open `if` to attach to")
			}
			Self::WrongForPair => write!(f, "wrong pair of for: `endfor` has no open `for`"),
		}
	}
}

pub type StampResult<T> = Result<T, StampError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
