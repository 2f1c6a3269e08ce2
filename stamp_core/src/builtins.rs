use std::sync::LazyLock;

use indexmap::IndexMap;

use crate::StampError;
use crate::StampResult;
use crate::Value;

/// Largest list `range` will build.
const MAX_RANGE_LENGTH: usize = 1 << 24;

/// Names that resolve when the context does not define them.
static BUILTINS: LazyLock<IndexMap<&'static str, Value>> = LazyLock::new(|| {
	IndexMap::from([
		("range", Value::function("range", range)),
		(
			"Object",
			Value::map([
				("keys", Value::function("Object.keys", object_keys)),
				("values", Value::function("Object.values", object_values)),
				("entries", Value::function("Object.entries", object_entries)),
			]),
		),
		(
			"Array",
			Value::map([(
				"isArray",
				Value::function("Array.isArray", |arguments: &[Value]| {
					Ok(Value::Bool(matches!(arguments.first(), Some(Value::List(_)))))
				}),
			)]),
		),
		(
			"Math",
			Value::map([
				("min", Value::function("Math.min", math_min)),
				("max", Value::function("Math.max", math_max)),
				("floor", unary_math("Math.floor", f64::floor)),
				("ceil", unary_math("Math.ceil", f64::ceil)),
				("round", unary_math("Math.round", |number| (number + 0.5).floor())),
				("abs", unary_math("Math.abs", f64::abs)),
				(
					"pow",
					Value::function("Math.pow", |arguments: &[Value]| {
						let base = number_at(arguments, 0);
						let exponent = number_at(arguments, 1);
						Ok(Value::Number(base.powf(exponent)))
					}),
				),
			]),
		),
		(
			"String",
			Value::function("String", |arguments: &[Value]| {
				Ok(Value::String(
					arguments.first().map(ToString::to_string).unwrap_or_default(),
				))
			}),
		),
		(
			"Number",
			Value::function("Number", |arguments: &[Value]| {
				Ok(Value::Number(arguments.first().map_or(0.0, Value::to_number)))
			}),
		),
	])
});

/// Look up a builtin by name.
pub fn builtin(name: &str) -> Option<Value> {
	BUILTINS.get(name).cloned()
}

/// The names of every builtin, in declaration order.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
	BUILTINS.keys().copied()
}

fn number_at(arguments: &[Value], index: usize) -> f64 {
	arguments.get(index).map_or(f64::NAN, Value::to_number)
}

fn unary_math(name: &'static str, operation: fn(f64) -> f64) -> Value {
	Value::function(name, move |arguments: &[Value]| {
		Ok(Value::Number(operation(number_at(arguments, 0))))
	})
}

/// Half open, like Python: `range(3)` is `[0, 1, 2]`, `range(1, 7, 2)` is
/// `[1, 3, 5]` and a negative step counts down.
fn range(arguments: &[Value]) -> StampResult<Value> {
	let numbers = arguments
		.iter()
		.take(3)
		.map(|argument| {
			match argument {
				Value::Number(number) if number.is_finite() => Ok(*number),
				other => {
					Err(StampError::InvalidArgument {
						name: "range".to_string(),
						reason: format!("expected a finite number, found {} value", other.kind_name()),
					})
				}
			}
		})
		.collect::<StampResult<Vec<f64>>>()?;

	let (start, end, step) = match numbers.as_slice() {
		[] => (0.0, 0.0, 1.0),
		[end] => (0.0, *end, 1.0),
		[start, end] => (*start, *end, 1.0),
		[start, end, step, ..] => (*start, *end, *step),
	};

	if step == 0.0 {
		return Err(StampError::InvalidArgument {
			name: "range".to_string(),
			reason: "step must not be zero".to_string(),
		});
	}

	let count = ((end - start) / step).ceil();
	if count > MAX_RANGE_LENGTH as f64 {
		return Err(StampError::InvalidArgument {
			name: "range".to_string(),
			reason: format!("more than {MAX_RANGE_LENGTH} items requested"),
		});
	}

	let count = if count > 0.0 { count as usize } else { 0 };
	let items = (0..count).map(|index| Value::Number(start + index as f64 * step));

	Ok(Value::list(items))
}

fn object_keys(arguments: &[Value]) -> StampResult<Value> {
	let keys = match require_object("Object.keys", arguments)? {
		Value::Map(entries) => entries.keys().map(|key| Value::from(key.as_str())).collect(),
		Value::List(items) => (0..items.len()).map(|index| Value::from(index.to_string())).collect(),
		_ => vec![],
	};

	Ok(Value::from(keys))
}

fn object_values(arguments: &[Value]) -> StampResult<Value> {
	let values = match require_object("Object.values", arguments)? {
		Value::Map(entries) => entries.values().cloned().collect(),
		Value::List(items) => items.to_vec(),
		_ => vec![],
	};

	Ok(Value::from(values))
}

fn object_entries(arguments: &[Value]) -> StampResult<Value> {
	let entries = match require_object("Object.entries", arguments)? {
		Value::Map(entries) => {
			entries
				.iter()
				.map(|(key, value)| Value::list([Value::from(key.as_str()), value.clone()]))
				.collect()
		}
		Value::List(items) => {
			items
				.iter()
				.enumerate()
				.map(|(index, value)| Value::list([Value::from(index.to_string()), value.clone()]))
				.collect()
		}
		_ => vec![],
	};

	Ok(Value::from(entries))
}

fn require_object<'a>(name: &str, arguments: &'a [Value]) -> StampResult<&'a Value> {
	match arguments.first() {
		Some(Value::Null) | None => {
			Err(StampError::InvalidArgument {
				name: name.to_string(),
				reason: "cannot convert undefined to an object".to_string(),
			})
		}
		Some(value) => Ok(value),
	}
}

fn math_min(arguments: &[Value]) -> StampResult<Value> {
	let min = arguments
		.iter()
		.map(Value::to_number)
		.try_fold(f64::INFINITY, |min, number| {
			(!number.is_nan()).then(|| min.min(number))
		});

	Ok(Value::Number(min.unwrap_or(f64::NAN)))
}

fn math_max(arguments: &[Value]) -> StampResult<Value> {
	let max = arguments
		.iter()
		.map(Value::to_number)
		.try_fold(f64::NEG_INFINITY, |max, number| {
			(!number.is_nan()).then(|| max.max(number))
		});

	Ok(Value::Number(max.unwrap_or(f64::NAN)))
}
