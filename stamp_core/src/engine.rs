use std::cmp::Ordering;
use std::fmt::Write;

use indexmap::IndexMap;

use crate::AssignmentOperator;
use crate::BinaryOperator;
use crate::Callee;
use crate::Context;
use crate::Document;
use crate::DocumentNode;
use crate::Element;
use crate::Expression;
use crate::ForBinding;
use crate::ForLoop;
use crate::Literal;
use crate::LogicalOperator;
use crate::ObjectEntry;
use crate::Property;
use crate::PropertyKey;
use crate::StampError;
use crate::StampResult;
use crate::UnaryOperator;
use crate::Value;
use crate::builtins::builtin;
use crate::methods::call_method;
use crate::methods::get_property;
use crate::parse;

/// The output of one item of a batch render.
#[derive(Debug)]
pub struct Rendered {
	/// The name the context was given.
	pub name: String,
	/// The rendered text, or the error that stopped this item.
	pub output: StampResult<String>,
}

impl Rendered {
	pub fn is_ok(&self) -> bool {
		self.output.is_ok()
	}
}

/// Render `document` against `context`.
///
/// Assignments and `var` declarations at the top level of the template
/// update `context` in place. Bodies of `if` and `for` blocks work on a copy,
/// so nothing they assign is visible once the block ends.
pub fn render(document: &Document, context: &mut Context) -> StampResult<String> {
	let mut output = String::new();
	render_nodes(document.nodes(), context, &mut output)?;
	tracing::trace!(bytes = output.len(), "rendered document");

	Ok(output)
}

/// Parse and render `template` in one step.
pub fn render_template(template: impl AsRef<str>, context: &mut Context) -> StampResult<String> {
	render(&parse(template)?, context)
}

/// Render `document` once for every named context, keeping their order.
///
/// A failing item does not stop the batch: every item carries its own
/// result and the caller decides whether to skip or abort.
pub fn render_batch<N, I>(document: &Document, contexts: I) -> Vec<Rendered>
where
	N: Into<String>,
	I: IntoIterator<Item = (N, Context)>,
{
	contexts
		.into_iter()
		.map(|(name, mut context)| {
			let name = name.into();
			let output = render(document, &mut context);

			match &output {
				Ok(text) => tracing::debug!(%name, bytes = text.len(), "rendered batch item"),
				Err(error) => tracing::debug!(%name, %error, "batch item failed"),
			}

			Rendered { name, output }
		})
		.collect()
}

/// Parse `template` once and render it for every named context.
pub fn render_template_batch<N, I>(template: impl AsRef<str>, contexts: I) -> StampResult<Vec<Rendered>>
where
	N: Into<String>,
	I: IntoIterator<Item = (N, Context)>,
{
	let document = parse(template)?;
	Ok(render_batch(&document, contexts))
}

fn render_nodes(
	nodes: &[DocumentNode],
	context: &mut Context,
	output: &mut String,
) -> StampResult<()> {
	for node in nodes {
		match node {
			DocumentNode::Raw(text) => output.push_str(text),
			DocumentNode::Expression(expression) => {
				let value = evaluate(expression, context)?;

				if !expression.is_silent() {
					write!(output, "{value}").ok();
				}
			}
			DocumentNode::VarDecl { name, value } => {
				let value = evaluate(value, context)?;
				context.insert(name.clone(), value);
			}
			DocumentNode::IfChain(branches) => {
				for branch in branches {
					let matched = match &branch.condition {
						Some(condition) => evaluate(condition, context)?.is_truthy(),
						None => true,
					};

					if matched {
						let mut scope = context.clone();
						render_nodes(&branch.body, &mut scope, output)?;
						break;
					}
				}
			}
			DocumentNode::For(for_loop) => render_for(for_loop, context, output)?,
		}
	}

	Ok(())
}

/// Every iteration starts from a fresh copy of the context as it was before
/// the loop.
fn render_for(for_loop: &ForLoop, context: &mut Context, output: &mut String) -> StampResult<()> {
	let iterable = evaluate(&for_loop.iterable, context)?;

	let items: Vec<(Value, Value)> = match &iterable {
		Value::List(items) => {
			items
				.iter()
				.enumerate()
				.map(|(index, item)| (Value::from(index), item.clone()))
				.collect()
		}
		Value::Map(entries) => {
			entries
				.iter()
				.map(|(key, value)| (Value::from(key.as_str()), value.clone()))
				.collect()
		}
		other if !other.is_truthy() => return Ok(()),
		other => {
			return Err(StampError::InvalidIterable {
				found: other.kind_name(),
				location: for_loop.location,
			});
		}
	};

	tracing::trace!(iterations = items.len(), location = %for_loop.location, "rendering for loop");

	for (key, value) in items {
		let mut scope = context.clone();

		match &for_loop.binding {
			ForBinding::Single(name) => {
				scope.insert(name.clone(), value);
			}
			ForBinding::KeyValue {
				key: key_name,
				value: value_name,
			} => {
				scope.insert(key_name.clone(), key);
				scope.insert(value_name.clone(), value);
			}
		}

		render_nodes(&for_loop.body, &mut scope, output)?;
	}

	Ok(())
}

/// Context entries shadow builtins. Unknown names are `null`.
fn resolve(name: &str, context: &Context) -> Value {
	context
		.lookup(name)
		.cloned()
		.or_else(|| builtin(name))
		.unwrap_or_default()
}

/// Evaluate an expression against `context`.
pub fn evaluate(expression: &Expression, context: &mut Context) -> StampResult<Value> {
	match expression {
		Expression::Literal(literal) => Ok(literal_value(literal)),
		Expression::Identifier(name) => Ok(resolve(name, context)),
		Expression::Member(_) | Expression::Call { .. } => {
			Ok(evaluate_chain(expression, context)?.unwrap_or_default())
		}
		Expression::Unary { op, argument } => {
			let argument = evaluate(argument, context)?;
			Ok(unary(*op, &argument))
		}
		Expression::Binary { op, left, right } => {
			let left = evaluate(left, context)?;
			let right = evaluate(right, context)?;
			binary(*op, &left, &right)
		}
		Expression::Logical { op, left, right } => {
			let left = evaluate(left, context)?;
			let use_left = match op {
				LogicalOperator::And => !left.is_truthy(),
				LogicalOperator::Or => left.is_truthy(),
				LogicalOperator::Nullish => !left.is_null(),
			};

			if use_left {
				Ok(left)
			} else {
				evaluate(right, context)
			}
		}
		Expression::Conditional {
			test,
			consequent,
			alternate,
		} => {
			if evaluate(test, context)?.is_truthy() {
				evaluate(consequent, context)
			} else {
				evaluate(alternate, context)
			}
		}
		Expression::Assignment { op, target, value } => {
			assign(*op, target, value, context)?;
			Ok(Value::String(String::new()))
		}
		Expression::Sequence(items) => {
			let mut text = String::new();
			for item in items {
				let value = evaluate(item, context)?;
				write!(text, "{value}").ok();
			}
			Ok(Value::String(text))
		}
		Expression::Array(elements) => Ok(Value::from(evaluate_elements(elements, context)?)),
		Expression::Object(entries) => evaluate_object(entries, context),
	}
}

fn literal_value(literal: &Literal) -> Value {
	match literal {
		Literal::Null => Value::Null,
		Literal::Bool(value) => Value::Bool(*value),
		Literal::Number(number) => Value::Number(*number),
		Literal::String(text) => Value::String(text.clone()),
	}
}

/// Evaluate member accesses and calls. `None` means an optional link met a
/// `null` base, which short circuits the rest of the chain.
fn evaluate_chain(expression: &Expression, context: &mut Context) -> StampResult<Option<Value>> {
	match expression {
		Expression::Member(access) => {
			let Some(object) = evaluate_chain(&access.object, context)? else {
				return Ok(None);
			};

			if object.is_null() && access.optional {
				return Ok(None);
			}

			let key = property_key(&access.property, context)?;

			if object.is_null() {
				return Err(StampError::NullMemberAccess {
					property: key.to_key(),
				});
			}

			Ok(Some(get_property(&object, &key)))
		}
		Expression::Call {
			callee: Callee::Identifier(name),
			arguments,
			optional,
		} => {
			let target = resolve(name, context);

			if target.is_null() && *optional {
				return Ok(None);
			}

			let arguments = evaluate_elements(arguments, context)?;

			match target {
				Value::Function(function) => function.call(&arguments).map(Some),
				_ => Err(StampError::NotCallable { name: name.clone() }),
			}
		}
		Expression::Call {
			callee: Callee::Member(access),
			arguments,
			optional,
		} => {
			let Some(object) = evaluate_chain(&access.object, context)? else {
				return Ok(None);
			};

			if object.is_null() && access.optional {
				return Ok(None);
			}

			let key = property_key(&access.property, context)?;
			let name = key.to_key();

			if object.is_null() {
				return Err(StampError::NullMemberAccess { property: name });
			}

			if *optional && matches!(&object, Value::Map(_)) && get_property(&object, &key).is_null() {
				return Ok(None);
			}

			let arguments = evaluate_elements(arguments, context)?;
			call_method(&object, &name, &arguments).map(Some)
		}
		other => evaluate(other, context).map(Some),
	}
}

fn property_key(property: &Property, context: &mut Context) -> StampResult<Value> {
	match property {
		Property::Named(name) => Ok(Value::String(name.clone())),
		Property::Computed(expression) => evaluate(expression, context),
	}
}

/// Evaluate array items or call arguments, expanding spreads.
fn evaluate_elements(elements: &[Element], context: &mut Context) -> StampResult<Vec<Value>> {
	let mut values = Vec::with_capacity(elements.len());

	for element in elements {
		match element {
			Element::Item(expression) => values.push(evaluate(expression, context)?),
			Element::Spread(expression) => {
				match evaluate(expression, context)? {
					Value::List(items) => values.extend(items.iter().cloned()),
					Value::String(text) => {
						values.extend(text.chars().map(|ch| Value::String(ch.to_string())));
					}
					other => {
						return Err(StampError::InvalidSpread {
							found: other.kind_name(),
						});
					}
				}
			}
		}
	}

	Ok(values)
}

fn evaluate_object(entries: &[ObjectEntry], context: &mut Context) -> StampResult<Value> {
	let mut map = IndexMap::new();

	for entry in entries {
		match entry {
			ObjectEntry::Property { key, value } => {
				let key = match key {
					PropertyKey::Named(name) => name.clone(),
					PropertyKey::Computed(expression) => evaluate(expression, context)?.to_key(),
				};
				let value = evaluate(value, context)?;
				map.insert(key, value);
			}
			ObjectEntry::Spread(expression) => {
				match evaluate(expression, context)? {
					Value::Map(more) => {
						map.extend(more.iter().map(|(key, value)| (key.clone(), value.clone())));
					}
					Value::List(items) => {
						map.extend(
							items
								.iter()
								.enumerate()
								.map(|(index, value)| (index.to_string(), value.clone())),
						);
					}
					_ => {}
				}
			}
		}
	}

	Ok(Value::from(map))
}

fn assign(
	op: AssignmentOperator,
	target: &str,
	value: &Expression,
	context: &mut Context,
) -> StampResult<()> {
	let next = match op {
		AssignmentOperator::Assign => evaluate(value, context)?,
		AssignmentOperator::And | AssignmentOperator::Or | AssignmentOperator::Nullish => {
			let current = resolve(target, context);
			let keep = match op {
				AssignmentOperator::And => !current.is_truthy(),
				AssignmentOperator::Or => current.is_truthy(),
				_ => !current.is_null(),
			};

			if keep {
				return Ok(());
			}

			evaluate(value, context)?
		}
		AssignmentOperator::Power => {
			let base = resolve(target, context).to_number();
			let exponent = evaluate(value, context)?.to_number();
			Value::Number(base.powf(exponent))
		}
		AssignmentOperator::Add => compound(BinaryOperator::Add, target, value, context)?,
		AssignmentOperator::Subtract => compound(BinaryOperator::Subtract, target, value, context)?,
		AssignmentOperator::Multiply => compound(BinaryOperator::Multiply, target, value, context)?,
		AssignmentOperator::Divide => compound(BinaryOperator::Divide, target, value, context)?,
		AssignmentOperator::Remainder => compound(BinaryOperator::Remainder, target, value, context)?,
	};

	context.insert(target.to_string(), next);
	Ok(())
}

/// `target op= value` for the operators that map onto a binary operator.
fn compound(
	op: BinaryOperator,
	target: &str,
	value: &Expression,
	context: &mut Context,
) -> StampResult<Value> {
	let left = resolve(target, context);
	let right = evaluate(value, context)?;
	binary(op, &left, &right)
}

fn unary(op: UnaryOperator, argument: &Value) -> Value {
	match op {
		UnaryOperator::Plus => Value::Number(argument.to_number()),
		UnaryOperator::Minus => Value::Number(-argument.to_number()),
		UnaryOperator::BitNot => Value::Number(f64::from(!to_int32(argument.to_number()))),
		UnaryOperator::Not => Value::Bool(!argument.is_truthy()),
	}
}

/// Wrap a number to a signed 32 bit integer the way bitwise operators do.
fn to_int32(number: f64) -> i32 {
	if !number.is_finite() {
		return 0;
	}

	number.trunc().rem_euclid(4_294_967_296.0) as u32 as i32
}

fn binary(op: BinaryOperator, left: &Value, right: &Value) -> StampResult<Value> {
	let value = match op {
		BinaryOperator::Add => {
			if is_textual(left) || is_textual(right) {
				Value::String(format!("{left}{right}"))
			} else {
				Value::Number(left.to_number() + right.to_number())
			}
		}
		BinaryOperator::Subtract => Value::Number(left.to_number() - right.to_number()),
		BinaryOperator::Multiply => Value::Number(left.to_number() * right.to_number()),
		BinaryOperator::Divide => Value::Number(left.to_number() / right.to_number()),
		BinaryOperator::Remainder => Value::Number(left.to_number() % right.to_number()),
		BinaryOperator::Equal | BinaryOperator::StrictEqual => Value::Bool(left == right),
		BinaryOperator::NotEqual | BinaryOperator::StrictNotEqual => Value::Bool(left != right),
		BinaryOperator::Less => Value::Bool(compare(left, right) == Some(Ordering::Less)),
		BinaryOperator::Greater => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
		BinaryOperator::LessEqual => {
			Value::Bool(matches!(
				compare(left, right),
				Some(Ordering::Less | Ordering::Equal)
			))
		}
		BinaryOperator::GreaterEqual => {
			Value::Bool(matches!(
				compare(left, right),
				Some(Ordering::Greater | Ordering::Equal)
			))
		}
		BinaryOperator::In => Value::Bool(contains(left, right)?),
	};

	Ok(value)
}

fn is_textual(value: &Value) -> bool {
	matches!(value, Value::String(_) | Value::List(_) | Value::Map(_))
}

/// Strings compare by content, everything else numerically. `NaN` is
/// unordered.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
	match (left, right) {
		(Value::String(left), Value::String(right)) => Some(left.cmp(right)),
		_ => left.to_number().partial_cmp(&right.to_number()),
	}
}

/// `key in container`
fn contains(key: &Value, container: &Value) -> StampResult<bool> {
	match container {
		Value::Map(entries) => Ok(entries.contains_key(&key.to_key())),
		Value::List(items) => Ok(key.as_index().is_some_and(|index| index < items.len())),
		Value::String(text) => Ok(text.contains(&key.to_key())),
		other => {
			Err(StampError::InvalidOperand {
				operator: BinaryOperator::In.as_str(),
				found: other.kind_name(),
			})
		}
	}
}
