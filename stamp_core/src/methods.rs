use crate::StampError;
use crate::StampResult;
use crate::Value;
use crate::value::format_number;

static NULL: Value = Value::Null;

/// Longest string `repeat`, `padStart` and `padEnd` will build.
const MAX_STRING_LENGTH: usize = 1 << 28;

/// Read `key` from `object`. Missing properties are `null`.
pub(crate) fn get_property(object: &Value, key: &Value) -> Value {
	match object {
		Value::Map(entries) => entries.get(&key.to_key()).cloned().unwrap_or_default(),
		Value::List(items) => {
			if key.as_str() == Some("length") {
				return Value::from(items.len());
			}

			key.as_index()
				.and_then(|index| items.get(index).cloned())
				.unwrap_or_default()
		}
		Value::String(text) => {
			if key.as_str() == Some("length") {
				return Value::from(text.chars().count());
			}

			key.as_index()
				.and_then(|index| text.chars().nth(index))
				.map(|ch| Value::String(ch.to_string()))
				.unwrap_or_default()
		}
		_ => Value::Null,
	}
}

/// Call `object.name(arguments)`.
///
/// A function stored in a map wins over everything else so that namespaces
/// like `Object.keys` and user supplied callables work.
pub(crate) fn call_method(object: &Value, name: &str, arguments: &[Value]) -> StampResult<Value> {
	match object {
		Value::Map(entries) => {
			match entries.get(name) {
				Some(Value::Function(function)) => function.call(arguments),
				_ => {
					Err(StampError::NotCallable {
						name: name.to_string(),
					})
				}
			}
		}
		Value::String(text) => string_method(text, name, arguments),
		Value::List(items) => list_method(items, name, arguments),
		Value::Number(number) => number_method(*number, name, arguments),
		other => Err(unknown(other, name)),
	}
}

fn unknown(object: &Value, name: &str) -> StampError {
	StampError::UnknownMethod {
		method: name.to_string(),
		found: object.kind_name(),
	}
}

fn argument(arguments: &[Value], index: usize) -> &Value {
	arguments.get(index).unwrap_or(&NULL)
}

/// Text of an optional argument, falling back to `default` when it is missing.
fn text_argument(arguments: &[Value], index: usize, default: &str) -> String {
	match argument(arguments, index) {
		Value::Null => default.to_string(),
		value => value.to_string(),
	}
}

/// Resolve a possibly negative position against `len`, clamping to the
/// valid range.
fn relative_index(value: &Value, len: usize, default: usize) -> usize {
	if value.is_null() {
		return default;
	}

	let number = value.to_number();
	if number.is_nan() {
		return 0;
	}

	let number = number.trunc();
	if number < 0.0 {
		(len as f64 + number).max(0.0) as usize
	} else {
		number.min(len as f64) as usize
	}
}

fn count_argument(name: &str, value: &Value) -> StampResult<usize> {
	let number = value.to_number();

	if number.is_finite() && number >= 0.0 {
		Ok(number as usize)
	} else {
		Err(StampError::InvalidArgument {
			name: name.to_string(),
			reason: format!("expected a non-negative count, found {value}"),
		})
	}
}

fn too_long(name: &str) -> StampError {
	StampError::InvalidArgument {
		name: name.to_string(),
		reason: format!("the result would be longer than {MAX_STRING_LENGTH} characters"),
	}
}

fn char_index(haystack: &str, needle: &str) -> Option<usize> {
	haystack
		.find(needle)
		.map(|byte| haystack[..byte].chars().count())
}

fn pad(text: &str, name: &str, arguments: &[Value], at_start: bool) -> StampResult<Value> {
	let width = count_argument(name, argument(arguments, 0))?;
	let fill = text_argument(arguments, 1, " ");
	let current = text.chars().count();

	if width <= current || fill.is_empty() {
		return Ok(Value::from(text));
	}

	if width > MAX_STRING_LENGTH {
		return Err(too_long(name));
	}

	let padding: String = fill.chars().cycle().take(width - current).collect();

	Ok(Value::String(if at_start {
		padding + text
	} else {
		format!("{text}{padding}")
	}))
}

fn string_method(text: &str, name: &str, arguments: &[Value]) -> StampResult<Value> {
	let value = match name {
		"toUpperCase" => Value::String(text.to_uppercase()),
		"toLowerCase" => Value::String(text.to_lowercase()),
		"trim" => Value::from(text.trim()),
		"trimStart" => Value::from(text.trim_start()),
		"trimEnd" => Value::from(text.trim_end()),
		"padStart" => return pad(text, name, arguments, true),
		"padEnd" => return pad(text, name, arguments, false),
		"startsWith" => Value::Bool(text.starts_with(&text_argument(arguments, 0, "undefined"))),
		"endsWith" => Value::Bool(text.ends_with(&text_argument(arguments, 0, "undefined"))),
		"includes" => Value::Bool(text.contains(&text_argument(arguments, 0, "undefined"))),
		"indexOf" => {
			let needle = text_argument(arguments, 0, "undefined");
			Value::Number(char_index(text, &needle).map_or(-1.0, |index| index as f64))
		}
		"slice" => {
			let chars: Vec<char> = text.chars().collect();
			let start = relative_index(argument(arguments, 0), chars.len(), 0);
			let end = relative_index(argument(arguments, 1), chars.len(), chars.len());
			Value::String(chars.get(start..end.max(start)).unwrap_or_default().iter().collect())
		}
		"split" => {
			let parts: Vec<Value> = match argument(arguments, 0) {
				Value::Null => vec![Value::from(text)],
				separator => {
					let separator = separator.to_string();
					if separator.is_empty() {
						text.chars().map(|ch| Value::String(ch.to_string())).collect()
					} else {
						text.split(separator.as_str()).map(Value::from).collect()
					}
				}
			};

			let limit = match argument(arguments, 1) {
				Value::Null => parts.len(),
				value => count_argument(name, value)?,
			};

			Value::list(parts.into_iter().take(limit))
		}
		"repeat" => {
			let count = count_argument(name, argument(arguments, 0))?;
			match text.len().checked_mul(count) {
				Some(length) if length <= MAX_STRING_LENGTH => Value::String(text.repeat(count)),
				_ => return Err(too_long(name)),
			}
		}
		"replace" => {
			let pattern = text_argument(arguments, 0, "undefined");
			let replacement = text_argument(arguments, 1, "undefined");
			Value::String(text.replacen(&pattern, &replacement, 1))
		}
		"replaceAll" => {
			let pattern = text_argument(arguments, 0, "undefined");
			let replacement = text_argument(arguments, 1, "undefined");
			Value::String(text.replace(&pattern, &replacement))
		}
		_ => return Err(unknown(&Value::from(text), name)),
	};

	Ok(value)
}

fn list_method(items: &[Value], name: &str, arguments: &[Value]) -> StampResult<Value> {
	let value = match name {
		"join" => {
			let separator = text_argument(arguments, 0, ",");
			let parts: Vec<String> = items
				.iter()
				.map(|item| {
					match item {
						Value::Null => String::new(),
						other => other.to_string(),
					}
				})
				.collect();
			Value::String(parts.join(&separator))
		}
		"includes" => Value::Bool(items.contains(argument(arguments, 0))),
		"indexOf" => {
			let needle = argument(arguments, 0);
			Value::Number(
				items
					.iter()
					.position(|item| item == needle)
					.map_or(-1.0, |index| index as f64),
			)
		}
		"slice" => {
			let start = relative_index(argument(arguments, 0), items.len(), 0);
			let end = relative_index(argument(arguments, 1), items.len(), items.len());
			Value::list(
				items
					.get(start..end.max(start))
					.unwrap_or_default()
					.iter()
					.cloned(),
			)
		}
		"concat" => {
			let mut joined = items.to_vec();
			for argument in arguments {
				match argument {
					Value::List(more) => joined.extend(more.iter().cloned()),
					other => joined.push(other.clone()),
				}
			}
			Value::from(joined)
		}
		_ => return Err(unknown(&Value::list(items.iter().cloned()), name)),
	};

	Ok(value)
}

fn number_method(number: f64, name: &str, arguments: &[Value]) -> StampResult<Value> {
	match name {
		"toString" => {
			let radix = match argument(arguments, 0) {
				Value::Null => 10,
				value => value.to_number() as i64,
			};

			to_radix(number, radix).map(Value::String)
		}
		"toFixed" => {
			let digits = count_argument(name, argument(arguments, 0)).unwrap_or(0);
			if digits > 100 {
				return Err(StampError::InvalidArgument {
					name: name.to_string(),
					reason: "digits must be between 0 and 100".to_string(),
				});
			}

			Ok(Value::String(format!("{number:.digits$}")))
		}
		_ => Err(unknown(&Value::Number(number), name)),
	}
}

fn to_radix(number: f64, radix: i64) -> StampResult<String> {
	if !(2..=36).contains(&radix) {
		return Err(StampError::InvalidArgument {
			name: "toString".to_string(),
			reason: "radix must be between 2 and 36".to_string(),
		});
	}

	if radix == 10 || !number.is_finite() {
		return Ok(format_number(number));
	}

	if number.fract() != 0.0 {
		return Err(StampError::InvalidArgument {
			name: "toString".to_string(),
			reason: "only integers can be printed in a radix other than 10".to_string(),
		});
	}

	let radix = radix as u32;
	let mut magnitude = number.abs() as u128;
	let mut digits = vec![];

	loop {
		let digit = (magnitude % u128::from(radix)) as u32;
		digits.push(char::from_digit(digit, radix).unwrap_or('0'));
		magnitude /= u128::from(radix);
		if magnitude == 0 {
			break;
		}
	}

	if number < 0.0 {
		digits.push('-');
	}

	Ok(digits.into_iter().rev().collect())
}
