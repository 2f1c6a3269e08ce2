use std::fmt::Display;

/// A parsed directive expression.
///
/// Only the shapes the template grammar allows can be represented: a call's
/// callee is an identifier or a member access and an assignment target is a
/// bare name.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
	Literal(Literal),
	Identifier(String),
	Member(MemberAccess),
	Unary {
		op: UnaryOperator,
		argument: Box<Expression>,
	},
	Binary {
		op: BinaryOperator,
		left: Box<Expression>,
		right: Box<Expression>,
	},
	Logical {
		op: LogicalOperator,
		left: Box<Expression>,
		right: Box<Expression>,
	},
	Conditional {
		test: Box<Expression>,
		consequent: Box<Expression>,
		alternate: Box<Expression>,
	},
	Assignment {
		op: AssignmentOperator,
		target: String,
		value: Box<Expression>,
	},
	Sequence(Vec<Expression>),
	Call {
		callee: Callee,
		arguments: Vec<Element>,
		/// `f?.()`
		optional: bool,
	},
	Array(Vec<Element>),
	Object(Vec<ObjectEntry>),
}

impl Expression {
	/// Shorthand for a string literal.
	pub fn string(value: impl Into<String>) -> Self {
		Self::Literal(Literal::String(value.into()))
	}

	/// Shorthand for a number literal.
	pub fn number(value: f64) -> Self {
		Self::Literal(Literal::Number(value))
	}

	/// Shorthand for an identifier reference.
	pub fn identifier(name: impl Into<String>) -> Self {
		Self::Identifier(name.into())
	}

	/// The identifier name when this expression is a bare identifier.
	pub fn as_identifier(&self) -> Option<&str> {
		match self {
			Self::Identifier(name) => Some(name),
			_ => None,
		}
	}

	/// True for expressions that only exist for their side effects and so
	/// render nothing when they make up a whole directive.
	pub fn is_silent(&self) -> bool {
		matches!(self, Self::Assignment { .. } | Self::Sequence(_))
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
	/// `null` and `undefined`.
	Null,
	Bool(bool),
	Number(f64),
	String(String),
}

/// `object.name`, `object[expr]` and their optional-chained forms.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccess {
	pub object: Box<Expression>,
	pub property: Property,
	/// Set on the link written as `?.`.
	pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Property {
	/// `.name`
	Named(String),
	/// `[expr]`
	Computed(Box<Expression>),
}

/// The only expressions that can be called.
#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
	Identifier(String),
	Member(MemberAccess),
}

/// An item of an array literal or call argument list.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
	Item(Expression),
	/// `...expr`
	Spread(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectEntry {
	Property { key: PropertyKey, value: Expression },
	/// `...expr`
	Spread(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
	/// An identifier, string or number key.
	Named(String),
	/// `[expr]`
	Computed(Expression),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
	Plus,
	Minus,
	BitNot,
	Not,
}

impl UnaryOperator {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Plus => "+",
			Self::Minus => "-",
			Self::BitNot => "~",
			Self::Not => "!",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
	Add,
	Subtract,
	Multiply,
	Divide,
	Remainder,
	/// `==` and `===` share strict semantics but keep their spelling.
	Equal,
	StrictEqual,
	NotEqual,
	StrictNotEqual,
	Less,
	Greater,
	LessEqual,
	GreaterEqual,
	In,
}

impl BinaryOperator {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Add => "+",
			Self::Subtract => "-",
			Self::Multiply => "*",
			Self::Divide => "/",
			Self::Remainder => "%",
			Self::Equal => "==",
			Self::StrictEqual => "===",
			Self::NotEqual => "!=",
			Self::StrictNotEqual => "!==",
			Self::Less => "<",
			Self::Greater => ">",
			Self::LessEqual => "<=",
			Self::GreaterEqual => ">=",
			Self::In => "in",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
	And,
	Or,
	Nullish,
}

impl LogicalOperator {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::And => "&&",
			Self::Or => "||",
			Self::Nullish => "??",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
	Assign,
	Add,
	Subtract,
	Multiply,
	Divide,
	Remainder,
	Power,
	And,
	Or,
	Nullish,
}

impl AssignmentOperator {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Assign => "=",
			Self::Add => "+=",
			Self::Subtract => "-=",
			Self::Multiply => "*=",
			Self::Divide => "/=",
			Self::Remainder => "%=",
			Self::Power => "**=",
			Self::And => "&&=",
			Self::Or => "||=",
			Self::Nullish => "??=",
		}
	}
}

macro_rules! display_as_str {
	($($name:ident),*) => {
		$(
			impl Display for $name {
				fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
					f.write_str(self.as_str())
				}
			}
		)*
	};
}

display_as_str!(
	UnaryOperator,
	BinaryOperator,
	LogicalOperator,
	AssignmentOperator
);
