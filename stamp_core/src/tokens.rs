use std::fmt::Display;

use float_cmp::approx_eq;
use logos::Lexer;
use logos::Logos;

/// Tokens of the directive expression language.
///
/// Operators that are deliberately left out of the grammar are still lexed
/// (as [`Token::Forbidden`]) so that the parser can name them when rejecting
/// the expression.
#[derive(Logos, Debug, Clone)]
#[logos(skip(r"[ \t\r\n\f]+|//[^\n]*", allow_greedy = true))]
pub enum Token {
	/// `(`
	#[token("(")]
	ParenOpen,
	/// `)`
	#[token(")")]
	ParenClose,
	/// `[`
	#[token("[")]
	BracketOpen,
	/// `]`
	#[token("]")]
	BracketClose,
	/// `{`
	#[token("{")]
	BraceOpen,
	/// `}`
	#[token("}")]
	BraceClose,
	/// `,`
	#[token(",")]
	Comma,
	/// `:`
	#[token(":")]
	Colon,
	/// `?`
	#[token("?")]
	Question,
	/// `?.`
	#[token("?.")]
	QuestionDot,
	/// `.`
	#[token(".")]
	Dot,
	/// `...`
	#[token("...")]
	Ellipsis,

	#[token("+")]
	Plus,
	#[token("-")]
	Minus,
	#[token("*")]
	Star,
	#[token("/")]
	Slash,
	#[token("%")]
	Percent,
	#[token("~")]
	Tilde,
	#[token("!")]
	Bang,

	#[token("==")]
	EqEq,
	#[token("===")]
	EqEqEq,
	#[token("!=")]
	NotEq,
	#[token("!==")]
	NotEqEq,
	#[token("<")]
	Lt,
	#[token(">")]
	Gt,
	#[token("<=")]
	LtEq,
	#[token(">=")]
	GtEq,
	#[token("&&")]
	AndAnd,
	#[token("||")]
	OrOr,
	#[token("??")]
	Nullish,

	#[token("=")]
	Assign,
	#[token("+=")]
	PlusAssign,
	#[token("-=")]
	MinusAssign,
	#[token("*=")]
	StarAssign,
	#[token("/=")]
	SlashAssign,
	#[token("%=")]
	PercentAssign,
	#[token("**=")]
	PowAssign,
	#[token("&&=")]
	AndAssign,
	#[token("||=")]
	OrAssign,
	#[token("??=")]
	NullishAssign,

	/// `true`
	#[token("true")]
	True,
	/// `false`
	#[token("false")]
	False,
	/// `null`
	#[token("null")]
	Null,
	/// `undefined`
	#[token("undefined")]
	Undefined,
	/// `in`
	#[token("in")]
	In,

	/// A number, e.g. `42`, `0.5`, `1e3` or `0xff`.
	#[regex(r"(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?", decimal)]
	#[regex(r"0[xX][0-9a-fA-F]+", hexadecimal)]
	Number(f64),
	/// A quoted string with its escapes already resolved.
	#[regex(r#""(?:[^"\\\n]|\\.)*""#, unquote)]
	#[regex(r"'(?:[^'\\\n]|\\.)*'", unquote)]
	String(String),
	/// An identifier, e.g. `nodeID`.
	#[regex(r"[\p{L}_$][\p{L}\p{N}_$]*", |lex| lex.slice().to_string())]
	Ident(String),

	/// An operator or symbol outside the template grammar.
	#[token("++")]
	#[token("--")]
	#[token("=>")]
	#[token("**")]
	#[token("&")]
	#[token("|")]
	#[token("^")]
	#[token("<<")]
	#[token(">>")]
	#[token(">>>")]
	#[token("&=")]
	#[token("|=")]
	#[token("^=")]
	#[token("<<=")]
	#[token(">>=")]
	#[token(">>>=")]
	#[token(";")]
	#[token("`")]
	#[token("#")]
	#[token("@")]
	Forbidden,
}

fn decimal(lex: &mut Lexer<'_, Token>) -> Option<f64> {
	lex.slice().parse().ok()
}

fn hexadecimal(lex: &mut Lexer<'_, Token>) -> Option<f64> {
	u64::from_str_radix(&lex.slice()[2..], 16)
		.ok()
		.map(|value| value as f64)
}

fn unquote(lex: &mut Lexer<'_, Token>) -> Option<String> {
	let slice = lex.slice();
	unescape(&slice[1..slice.len() - 1])
}

/// Resolve the backslash escapes of a quoted string body. Returns `None` for
/// malformed `\x` and `\u` escapes.
pub(crate) fn unescape(body: &str) -> Option<String> {
	if !body.contains('\\') {
		return Some(body.to_string());
	}

	let mut result = String::with_capacity(body.len());
	let mut chars = body.chars();

	while let Some(ch) = chars.next() {
		if ch != '\\' {
			result.push(ch);
			continue;
		}

		let escaped = match chars.next()? {
			'n' => '\n',
			'r' => '\r',
			't' => '\t',
			'b' => '\u{8}',
			'f' => '\u{c}',
			'v' => '\u{b}',
			'0' => '\0',
			'x' => {
				let digits: String = chars.by_ref().take(2).collect();
				hex_char(&digits, 2)?
			}
			'u' => {
				let rest = chars.as_str();
				if let Some(braced) = rest.strip_prefix('{') {
					let end = braced.find('}')?;
					let ch = hex_char(&braced[..end], end.max(1))?;
					chars = braced[end + 1..].chars();
					ch
				} else {
					let digits: String = chars.by_ref().take(4).collect();
					hex_char(&digits, 4)?
				}
			}
			other => other,
		};

		result.push(escaped);
	}

	Some(result)
}

fn hex_char(digits: &str, expected_len: usize) -> Option<char> {
	if digits.len() != expected_len {
		return None;
	}

	u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
}

impl PartialEq for Token {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Token::Number(value), Token::Number(other_value)) => {
				approx_eq!(f64, *value, *other_value, ulps = 2)
			}
			(Token::String(value), Token::String(other_value))
			| (Token::Ident(value), Token::Ident(other_value)) => value == other_value,
			_ => std::mem::discriminant(self) == std::mem::discriminant(other),
		}
	}
}

impl Display for Token {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let symbol = match self {
			Token::ParenOpen => "(",
			Token::ParenClose => ")",
			Token::BracketOpen => "[",
			Token::BracketClose => "]",
			Token::BraceOpen => "{",
			Token::BraceClose => "}",
			Token::Comma => ",",
			Token::Colon => ":",
			Token::Question => "?",
			Token::QuestionDot => "?.",
			Token::Dot => ".",
			Token::Ellipsis => "...",
			Token::Plus => "+",
			Token::Minus => "-",
			Token::Star => "*",
			Token::Slash => "/",
			Token::Percent => "%",
			Token::Tilde => "~",
			Token::Bang => "!",
			Token::EqEq => "==",
			Token::EqEqEq => "===",
			Token::NotEq => "!=",
			Token::NotEqEq => "!==",
			Token::Lt => "<",
			Token::Gt => ">",
			Token::LtEq => "<=",
			Token::GtEq => ">=",
			Token::AndAnd => "&&",
			Token::OrOr => "||",
			Token::Nullish => "??",
			Token::Assign => "=",
			Token::PlusAssign => "+=",
			Token::MinusAssign => "-=",
			Token::StarAssign => "*=",
			Token::SlashAssign => "/=",
			Token::PercentAssign => "%=",
			Token::PowAssign => "**=",
			Token::AndAssign => "&&=",
			Token::OrAssign => "||=",
			Token::NullishAssign => "??=",
			Token::True => "true",
			Token::False => "false",
			Token::Null => "null",
			Token::Undefined => "undefined",
			Token::In => "in",
			Token::Forbidden => "forbidden operator",
			Token::Number(number) => return write!(f, "{number}"),
			Token::String(string) => return write!(f, "{string:?}"),
			Token::Ident(ident) => return write!(f, "{ident}"),
		};

		write!(f, "{symbol}")
	}
}
