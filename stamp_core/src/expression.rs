use std::ops::Range;

use crate::StampResult;
use crate::ast::*;
use crate::lexer::TokenStream;
use crate::tokens::Token;
use crate::value::format_number;

/// Words that belong to the host scripting language but have no meaning in a
/// template. They can still be used as property names (`item.default`).
const RESERVED_WORDS: &[&str] = &[
	"async",
	"await",
	"break",
	"case",
	"catch",
	"class",
	"const",
	"continue",
	"debugger",
	"default",
	"delete",
	"do",
	"else",
	"export",
	"extends",
	"finally",
	"for",
	"function",
	"if",
	"import",
	"instanceof",
	"let",
	"new",
	"of",
	"return",
	"super",
	"switch",
	"this",
	"throw",
	"try",
	"typeof",
	"var",
	"void",
	"while",
	"with",
	"yield",
];

pub(crate) fn is_reserved_word(word: &str) -> bool {
	RESERVED_WORDS.contains(&word)
}

/// Parse a standalone expression.
///
/// ```rust
/// use stamp_core::Expression;
/// use stamp_core::parse_expression;
///
/// let expression = parse_expression("user?.name ?? 'anonymous'").unwrap();
/// assert!(matches!(expression, Expression::Logical { .. }));
/// ```
pub fn parse_expression(text: &str) -> StampResult<Expression> {
	parse_fragment(text, 0..text.len())
}

/// Parse the part of `template` covered by `range` as one expression. Error
/// locations are reported relative to the whole template.
pub(crate) fn parse_fragment(template: &str, range: Range<usize>) -> StampResult<Expression> {
	let mut parser = ExpressionParser {
		stream: TokenStream::new(template, range)?,
	};

	if parser.stream.is_done() {
		return Err(parser.stream.unexpected("expected an expression"));
	}

	let expression = parser.parse_sequence()?;

	if !parser.stream.is_done() {
		return Err(parser.stream.unexpected("expected the end of the expression"));
	}

	Ok(expression)
}

/// The binary operators that can continue an expression, with their binding
/// level. Higher levels bind tighter.
enum Infix {
	Binary(BinaryOperator),
	Logical(LogicalOperator),
}

fn infix_operator(token: &Token) -> Option<(u8, Infix)> {
	let operator = match token {
		Token::Nullish => (1, Infix::Logical(LogicalOperator::Nullish)),
		Token::OrOr => (1, Infix::Logical(LogicalOperator::Or)),
		Token::AndAnd => (2, Infix::Logical(LogicalOperator::And)),
		Token::EqEq => (3, Infix::Binary(BinaryOperator::Equal)),
		Token::EqEqEq => (3, Infix::Binary(BinaryOperator::StrictEqual)),
		Token::NotEq => (3, Infix::Binary(BinaryOperator::NotEqual)),
		Token::NotEqEq => (3, Infix::Binary(BinaryOperator::StrictNotEqual)),
		Token::Lt => (4, Infix::Binary(BinaryOperator::Less)),
		Token::Gt => (4, Infix::Binary(BinaryOperator::Greater)),
		Token::LtEq => (4, Infix::Binary(BinaryOperator::LessEqual)),
		Token::GtEq => (4, Infix::Binary(BinaryOperator::GreaterEqual)),
		Token::In => (4, Infix::Binary(BinaryOperator::In)),
		Token::Plus => (5, Infix::Binary(BinaryOperator::Add)),
		Token::Minus => (5, Infix::Binary(BinaryOperator::Subtract)),
		Token::Star => (6, Infix::Binary(BinaryOperator::Multiply)),
		Token::Slash => (6, Infix::Binary(BinaryOperator::Divide)),
		Token::Percent => (6, Infix::Binary(BinaryOperator::Remainder)),
		_ => return None,
	};

	Some(operator)
}

fn assignment_operator(token: &Token) -> Option<AssignmentOperator> {
	let operator = match token {
		Token::Assign => AssignmentOperator::Assign,
		Token::PlusAssign => AssignmentOperator::Add,
		Token::MinusAssign => AssignmentOperator::Subtract,
		Token::StarAssign => AssignmentOperator::Multiply,
		Token::SlashAssign => AssignmentOperator::Divide,
		Token::PercentAssign => AssignmentOperator::Remainder,
		Token::PowAssign => AssignmentOperator::Power,
		Token::AndAssign => AssignmentOperator::And,
		Token::OrAssign => AssignmentOperator::Or,
		Token::NullishAssign => AssignmentOperator::Nullish,
		_ => return None,
	};

	Some(operator)
}

/// Property names after `.` may be any identifier, including keywords.
fn property_name(token: &Token) -> Option<String> {
	match token {
		Token::Ident(name) => Some(name.clone()),
		Token::True | Token::False | Token::Null | Token::Undefined | Token::In => {
			Some(token.to_string())
		}
		_ => None,
	}
}

fn mixes_nullish(op: LogicalOperator, operand: Option<LogicalOperator>) -> bool {
	match operand {
		Some(operand) => (op == LogicalOperator::Nullish) != (operand == LogicalOperator::Nullish),
		None => false,
	}
}

struct ExpressionParser<'a> {
	stream: TokenStream<'a>,
}

impl ExpressionParser<'_> {
	/// `a, b, c`
	fn parse_sequence(&mut self) -> StampResult<Expression> {
		let first = self.parse_assignment()?;

		if self.stream.peek() != Some(&Token::Comma) {
			return Ok(first);
		}

		let mut items = vec![first];
		while self.stream.eat(&Token::Comma) {
			items.push(self.parse_assignment()?);
		}

		Ok(Expression::Sequence(items))
	}

	/// `target = value` and the compound forms. Right associative.
	fn parse_assignment(&mut self) -> StampResult<Expression> {
		let start = self.stream.span().start;
		let left = self.parse_conditional()?;

		let Some(op) = self.stream.peek().and_then(assignment_operator) else {
			return Ok(left);
		};

		let Expression::Identifier(target) = left else {
			return Err(self.stream.invalid_target(start..self.stream.last_end()));
		};

		self.stream.next();
		let value = self.parse_assignment()?;

		Ok(Expression::Assignment {
			op,
			target,
			value: Box::new(value),
		})
	}

	/// `test ? consequent : alternate`
	fn parse_conditional(&mut self) -> StampResult<Expression> {
		let test = self.parse_binary(0)?;

		if !self.stream.eat(&Token::Question) {
			return Ok(test);
		}

		let consequent = self.parse_assignment()?;
		self.stream.expect(&Token::Colon)?;
		let alternate = self.parse_assignment()?;

		Ok(Expression::Conditional {
			test: Box::new(test),
			consequent: Box::new(consequent),
			alternate: Box::new(alternate),
		})
	}

	/// Precedence climbing over the binary and logical operators. All of them
	/// are left associative.
	fn parse_binary(&mut self, min_power: u8) -> StampResult<Expression> {
		self.parse_binary_operand(min_power).map(|(expression, _)| expression)
	}

	/// Like [`Self::parse_binary`] but also reports the logical operator that
	/// joins the top of the returned expression, when one does. `??` can only
	/// be combined with `||` or `&&` through parentheses.
	fn parse_binary_operand(
		&mut self,
		min_power: u8,
	) -> StampResult<(Expression, Option<LogicalOperator>)> {
		let mut left = self.parse_unary()?;
		let mut left_logical = None;

		loop {
			let Some((level, operator)) = self.stream.peek().and_then(infix_operator) else {
				break;
			};

			let power = level * 2;
			if power < min_power {
				break;
			}

			let span = self.stream.span();
			self.stream.next();
			let (right, right_logical) = self.parse_binary_operand(power + 1)?;
			let right = Box::new(right);
			let boxed_left = Box::new(left);

			left = match operator {
				Infix::Binary(op) => {
					left_logical = None;
					Expression::Binary {
						op,
						left: boxed_left,
						right,
					}
				}
				Infix::Logical(op) => {
					if mixes_nullish(op, left_logical) || mixes_nullish(op, right_logical) {
						return Err(self.stream.error(
							"`??` cannot be mixed with `||` or `&&` without parentheses",
							span,
						));
					}

					left_logical = Some(op);
					Expression::Logical {
						op,
						left: boxed_left,
						right,
					}
				}
			};
		}

		Ok((left, left_logical))
	}

	fn parse_unary(&mut self) -> StampResult<Expression> {
		let op = match self.stream.peek() {
			Some(Token::Plus) => UnaryOperator::Plus,
			Some(Token::Minus) => UnaryOperator::Minus,
			Some(Token::Tilde) => UnaryOperator::BitNot,
			Some(Token::Bang) => UnaryOperator::Not,
			_ => return self.parse_postfix(),
		};

		self.stream.next();
		let argument = self.parse_unary()?;

		Ok(Expression::Unary {
			op,
			argument: Box::new(argument),
		})
	}

	/// Member access and calls, e.g. `a.b?.[c](d)`.
	fn parse_postfix(&mut self) -> StampResult<Expression> {
		let start = self.stream.span().start;
		let mut expression = self.parse_primary()?;

		loop {
			match self.stream.peek() {
				Some(Token::Dot) => {
					self.stream.next();
					let name = self.parse_property_name()?;
					expression = member(expression, Property::Named(name), false);
				}
				Some(Token::BracketOpen) => {
					self.stream.next();
					let property = self.parse_sequence()?;
					self.stream.expect(&Token::BracketClose)?;
					expression = member(expression, Property::Computed(Box::new(property)), false);
				}
				Some(Token::ParenOpen) => {
					self.stream.next();
					let arguments = self.parse_elements(&Token::ParenClose)?;
					let callee = self.callee(expression, start)?;
					expression = Expression::Call {
						callee,
						arguments,
						optional: false,
					};
				}
				Some(Token::QuestionDot) => {
					self.stream.next();

					match self.stream.peek() {
						Some(Token::BracketOpen) => {
							self.stream.next();
							let property = self.parse_sequence()?;
							self.stream.expect(&Token::BracketClose)?;
							expression =
								member(expression, Property::Computed(Box::new(property)), true);
						}
						Some(Token::ParenOpen) => {
							self.stream.next();
							let arguments = self.parse_elements(&Token::ParenClose)?;
							let callee = self.callee(expression, start)?;
							expression = Expression::Call {
								callee,
								arguments,
								optional: true,
							};
						}
						_ => {
							let name = self.parse_property_name()?;
							expression = member(expression, Property::Named(name), true);
						}
					}
				}
				_ => break,
			}
		}

		Ok(expression)
	}

	fn parse_property_name(&mut self) -> StampResult<String> {
		match self.stream.peek().and_then(property_name) {
			Some(name) => {
				self.stream.next();
				Ok(name)
			}
			None => Err(self.stream.unexpected("expected a property name")),
		}
	}

	/// Only identifiers and member expressions can be called.
	fn callee(&self, expression: Expression, start: usize) -> StampResult<Callee> {
		match expression {
			Expression::Identifier(name) => Ok(Callee::Identifier(name)),
			Expression::Member(access) => Ok(Callee::Member(access)),
			_ => {
				Err(self.stream.error(
					"only names and member expressions can be called",
					start..self.stream.last_end(),
				))
			}
		}
	}

	fn parse_primary(&mut self) -> StampResult<Expression> {
		let span = self.stream.span();

		let expression = match self.stream.peek() {
			Some(Token::Number(number)) => Expression::number(*number),
			Some(Token::String(text)) => Expression::string(text.clone()),
			Some(Token::True) => Expression::Literal(Literal::Bool(true)),
			Some(Token::False) => Expression::Literal(Literal::Bool(false)),
			Some(Token::Null | Token::Undefined) => Expression::Literal(Literal::Null),
			Some(Token::Ident(name)) => {
				if is_reserved_word(name) {
					return Err(self.stream.unsupported(span));
				}

				Expression::Identifier(name.clone())
			}
			Some(Token::ParenOpen) => {
				self.stream.next();
				let inner = self.parse_sequence()?;
				self.stream.expect(&Token::ParenClose)?;
				return Ok(inner);
			}
			Some(Token::BracketOpen) => {
				self.stream.next();
				let elements = self.parse_elements(&Token::BracketClose)?;
				return Ok(Expression::Array(elements));
			}
			Some(Token::BraceOpen) => {
				self.stream.next();
				return self.parse_object();
			}
			_ => return Err(self.stream.unexpected("expected an expression")),
		};

		self.stream.next();
		Ok(expression)
	}

	/// Comma separated items up to `close`, with optional spreads and a
	/// trailing comma.
	fn parse_elements(&mut self, close: &Token) -> StampResult<Vec<Element>> {
		let mut elements = vec![];

		loop {
			if self.stream.eat(close) {
				break;
			}

			let element = if self.stream.eat(&Token::Ellipsis) {
				Element::Spread(self.parse_assignment()?)
			} else {
				Element::Item(self.parse_assignment()?)
			};
			elements.push(element);

			if !self.stream.eat(&Token::Comma) {
				self.stream.expect(close)?;
				break;
			}
		}

		Ok(elements)
	}

	/// `{ key: value, [computed]: value, shorthand, ...spread }`
	fn parse_object(&mut self) -> StampResult<Expression> {
		let mut entries = vec![];

		loop {
			if self.stream.eat(&Token::BraceClose) {
				break;
			}

			entries.push(self.parse_object_entry()?);

			if !self.stream.eat(&Token::Comma) {
				self.stream.expect(&Token::BraceClose)?;
				break;
			}
		}

		Ok(Expression::Object(entries))
	}

	fn parse_object_entry(&mut self) -> StampResult<ObjectEntry> {
		let span = self.stream.span();

		let key = match self.stream.peek() {
			Some(Token::Ellipsis) => {
				self.stream.next();
				return Ok(ObjectEntry::Spread(self.parse_assignment()?));
			}
			Some(Token::BracketOpen) => {
				self.stream.next();
				let key = self.parse_assignment()?;
				self.stream.expect(&Token::BracketClose)?;
				self.stream.expect(&Token::Colon)?;
				return Ok(ObjectEntry::Property {
					key: PropertyKey::Computed(key),
					value: self.parse_assignment()?,
				});
			}
			Some(Token::Ident(name))
				if matches!(
					self.stream.peek_ahead(1),
					Some(Token::Comma | Token::BraceClose)
				) =>
			{
				if is_reserved_word(name) {
					return Err(self.stream.unsupported(span));
				}

				let name = name.clone();
				self.stream.next();
				return Ok(ObjectEntry::Property {
					key: PropertyKey::Named(name.clone()),
					value: Expression::Identifier(name),
				});
			}
			Some(Token::String(text)) => text.clone(),
			Some(Token::Number(number)) => format_number(*number),
			Some(token) => {
				match property_name(token) {
					Some(name) => name,
					None => return Err(self.stream.unexpected("expected a property key")),
				}
			}
			None => return Err(self.stream.unexpected("expected a property key")),
		};

		self.stream.next();
		self.stream.expect(&Token::Colon)?;

		Ok(ObjectEntry::Property {
			key: PropertyKey::Named(key),
			value: self.parse_assignment()?,
		})
	}
}

fn member(object: Expression, property: Property, optional: bool) -> Expression {
	Expression::Member(MemberAccess {
		object: Box::new(object),
		property,
		optional,
	})
}
