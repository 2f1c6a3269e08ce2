use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Write;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::StampResult;

/// The signature every native callable shares.
pub type NativeFn = dyn Fn(&[Value]) -> StampResult<Value> + Send + Sync;

/// A dynamically typed template value.
///
/// Lists and maps are reference counted so copying a context for an `if` or
/// `for` body never deep-copies the data it points at.
#[derive(Debug, Clone, Default)]
pub enum Value {
	/// Both `null` and `undefined`, and the value of any missing name.
	#[default]
	Null,
	Bool(bool),
	Number(f64),
	String(String),
	List(Arc<Vec<Value>>),
	Map(Arc<IndexMap<String, Value>>),
	Function(Function),
}

impl Value {
	/// Build a list value.
	pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
		Self::List(Arc::new(items.into_iter().collect()))
	}

	/// Build a map value that keeps the order of `entries`.
	pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
		Self::Map(Arc::new(
			entries
				.into_iter()
				.map(|(key, value)| (key.into(), value))
				.collect(),
		))
	}

	/// Wrap a native function.
	pub fn function<F>(name: impl Into<String>, call: F) -> Self
	where
		F: Fn(&[Value]) -> StampResult<Value> + Send + Sync + 'static,
	{
		Self::Function(Function::new(name, call))
	}

	/// The name used for this kind of value in error messages.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "boolean",
			Self::Number(_) => "number",
			Self::String(_) => "string",
			Self::List(_) => "list",
			Self::Map(_) => "map",
			Self::Function(_) => "function",
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// `null`, `false`, `0`, `NaN` and `""` are falsy. Everything else,
	/// including empty lists and maps, is truthy.
	pub fn is_truthy(&self) -> bool {
		match self {
			Self::Null => false,
			Self::Bool(value) => *value,
			Self::Number(number) => *number != 0.0 && !number.is_nan(),
			Self::String(text) => !text.is_empty(),
			Self::List(_) | Self::Map(_) | Self::Function(_) => true,
		}
	}

	/// Numeric conversion used by arithmetic. Values without a sensible
	/// number become `NaN`.
	pub fn to_number(&self) -> f64 {
		match self {
			Self::Bool(value) => f64::from(u8::from(*value)),
			Self::Number(number) => *number,
			Self::String(text) => parse_number(text),
			Self::Null | Self::List(_) | Self::Map(_) | Self::Function(_) => f64::NAN,
		}
	}

	/// The number as a list index, when it is a non-negative integer.
	pub(crate) fn as_index(&self) -> Option<usize> {
		match self {
			Self::Number(number) if *number >= 0.0 && number.fract() == 0.0 => {
				Some(*number as usize)
			}
			Self::String(text) if is_canonical_index(text) => text.parse().ok(),
			_ => None,
		}
	}

	/// The text used when this value is a map key.
	pub(crate) fn to_key(&self) -> String {
		match self {
			Self::String(text) => text.clone(),
			other => other.to_string(),
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(text) => Some(text),
			_ => None,
		}
	}

	fn write_nested(&self, output: &mut String) -> std::fmt::Result {
		match self {
			Self::Null => output.write_str("null"),
			Self::String(text) => write!(output, "{text:?}"),
			other => write!(output, "{other}"),
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Null => f.write_str("undefined"),
			Self::Bool(value) => write!(f, "{value}"),
			Self::Number(number) => f.write_str(&format_number(*number)),
			Self::String(text) => f.write_str(text),
			Self::List(items) => {
				let mut output = String::from("[");
				for (index, item) in items.iter().enumerate() {
					if index > 0 {
						output.push_str(", ");
					}
					item.write_nested(&mut output)?;
				}
				output.push(']');
				f.write_str(&output)
			}
			Self::Map(entries) => {
				let mut output = String::from("{");
				for (index, (key, value)) in entries.iter().enumerate() {
					if index > 0 {
						output.push_str(", ");
					}
					write!(output, "{key:?}: ")?;
					value.write_nested(&mut output)?;
				}
				output.push('}');
				f.write_str(&output)
			}
			Self::Function(function) => write!(f, "[function {}]", function.name()),
		}
	}
}

/// Strict equality: different kinds never compare equal.
impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Null, Self::Null) => true,
			(Self::Bool(left), Self::Bool(right)) => left == right,
			(Self::Number(left), Self::Number(right)) => left == right,
			(Self::String(left), Self::String(right)) => left == right,
			(Self::List(left), Self::List(right)) => left == right,
			(Self::Map(left), Self::Map(right)) => left == right,
			(Self::Function(left), Self::Function(right)) => left == right,
			_ => false,
		}
	}
}

/// A native function exposed to templates.
#[derive(Clone)]
pub struct Function {
	name: Arc<str>,
	call: Arc<NativeFn>,
}

impl Function {
	pub fn new<F>(name: impl Into<String>, call: F) -> Self
	where
		F: Fn(&[Value]) -> StampResult<Value> + Send + Sync + 'static,
	{
		Self {
			name: Arc::from(name.into()),
			call: Arc::new(call),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn call(&self, arguments: &[Value]) -> StampResult<Value> {
		(self.call)(arguments)
	}
}

impl Debug for Function {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Function").field(&self.name).finish()
	}
}

impl PartialEq for Function {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.call, &other.call)
	}
}

/// Render a number the way templates print it: integral values without a
/// fractional part and `-0` as `0`.
pub fn format_number(number: f64) -> String {
	if number.is_nan() {
		return "NaN".to_string();
	}

	if number.is_infinite() {
		return if number > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
	}

	if number == 0.0 {
		return "0".to_string();
	}

	if number.fract() == 0.0 && number.abs() < 1e21 {
		return format!("{number:.0}");
	}

	number.to_string()
}

/// Plain decimal digits without a sign or leading zero, so `"01"` and `"+1"`
/// never name a list slot.
fn is_canonical_index(text: &str) -> bool {
	match text.as_bytes() {
		[b'0'] => true,
		[b'1'..=b'9', rest @ ..] => rest.iter().all(u8::is_ascii_digit),
		_ => false,
	}
}

/// Parse text as a number the way arithmetic coerces strings.
pub(crate) fn parse_number(text: &str) -> f64 {
	let text = text.trim();

	if text.is_empty() {
		return 0.0;
	}

	if let Some(hex) = text
		.strip_prefix("0x")
		.or_else(|| text.strip_prefix("0X"))
	{
		return u64::from_str_radix(hex, 16).map_or(f64::NAN, |value| value as f64);
	}

	let (sign, unsigned) = match text.as_bytes()[0] {
		b'-' => (-1.0, &text[1..]),
		b'+' => (1.0, &text[1..]),
		_ => (1.0, text),
	};

	if unsigned == "Infinity" {
		return sign * f64::INFINITY;
	}

	let is_numeric = unsigned
		.bytes()
		.all(|byte| byte.is_ascii_digit() || matches!(byte, b'.' | b'e' | b'E' | b'+' | b'-'));

	if !is_numeric || !unsigned.starts_with(|ch: char| ch.is_ascii_digit() || ch == '.') {
		return f64::NAN;
	}

	unsigned.parse::<f64>().map_or(f64::NAN, |value| sign * value)
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::Number(f64::from(value))
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Number(value as f64)
	}
}

impl From<usize> for Value {
	fn from(value: usize) -> Self {
		Self::Number(value as f64)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Self::List(Arc::new(value))
	}
}

impl From<IndexMap<String, Value>> for Value {
	fn from(value: IndexMap<String, Value>) -> Self {
		Self::Map(Arc::new(value))
	}
}

impl From<Function> for Value {
	fn from(value: Function) -> Self {
		Self::Function(value)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Self::Null,
			serde_json::Value::Bool(value) => Self::Bool(value),
			serde_json::Value::Number(number) => Self::Number(number.as_f64().unwrap_or(f64::NAN)),
			serde_json::Value::String(text) => Self::String(text),
			serde_json::Value::Array(items) => Self::list(items.into_iter().map(Self::from)),
			serde_json::Value::Object(entries) => {
				Self::map(entries.into_iter().map(|(key, value)| (key, Self::from(value))))
			}
		}
	}
}
