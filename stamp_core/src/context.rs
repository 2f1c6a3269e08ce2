use derive_more::Deref;
use derive_more::DerefMut;
use indexmap::IndexMap;

use crate::StampError;
use crate::StampResult;
use crate::Value;

/// The names a template renders against, in insertion order.
///
/// Cloning a context is shallow: lists and maps are shared with the copy.
/// Assignments and `var` declarations are the only things that change it.
#[derive(Debug, Clone, Default, PartialEq, Deref, DerefMut)]
pub struct Context(IndexMap<String, Value>);

impl Context {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build a context from a JSON object. Any other JSON value is rejected.
	pub fn from_json(value: serde_json::Value) -> StampResult<Self> {
		match value {
			serde_json::Value::Object(entries) => {
				Ok(entries
					.into_iter()
					.map(|(key, value)| (key, Value::from(value)))
					.collect())
			}
			other => {
				Err(StampError::InvalidContext {
					found: Value::from(other).kind_name(),
				})
			}
		}
	}

	/// Bind `name`, replacing any previous value.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
		self.0.insert(name.into(), value.into());
		self
	}

	/// Look up `name`. Missing names are `None`.
	pub fn lookup(&self, name: &str) -> Option<&Value> {
		self.0.get(name)
	}

	/// Consume the context and return its entries.
	pub fn into_inner(self) -> IndexMap<String, Value> {
		self.0
	}
}

impl<K: Into<String>> FromIterator<(K, Value)> for Context {
	fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
		Self(
			iter.into_iter()
				.map(|(key, value)| (key.into(), value))
				.collect(),
		)
	}
}

impl From<IndexMap<String, Value>> for Context {
	fn from(entries: IndexMap<String, Value>) -> Self {
		Self(entries)
	}
}

impl TryFrom<serde_json::Value> for Context {
	type Error = StampError;

	fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
		Self::from_json(value)
	}
}
