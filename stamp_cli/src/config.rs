use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use stamp_core::Context;

use crate::CliError;
use crate::CliResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["stamp.toml", ".stamp.toml"];

/// Configuration loaded from a `stamp.toml` file.
///
/// ```toml
/// template = "templates/node.awl"
/// output_dir = "out"
///
/// [data]
/// plant = "plant.json"
///
/// [[rules]]
/// name = "GD8"
/// outfile = "Node_Data.awl"
/// append = true
///
/// [rules.vars]
/// node_name = "GD8"
/// nodeID = 8078
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StampConfig {
	/// The template every rule renders, relative to the project root.
	pub template: PathBuf,
	/// Directory that rule outfiles are written to. Defaults to the project
	/// root.
	#[serde(default)]
	pub output_dir: Option<PathBuf>,
	/// Map of namespace name to a data file, relative to the project root.
	/// Each namespace is visible to every rule.
	#[serde(default)]
	pub data: BTreeMap<String, PathBuf>,
	#[serde(default)]
	pub rules: Vec<Rule>,
}

/// One named render of the configured template.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
	pub name: String,
	/// Output file, relative to `output_dir`. When absent the rendered text
	/// is printed to stdout.
	#[serde(default)]
	pub outfile: Option<PathBuf>,
	/// Append to `outfile` instead of replacing it.
	#[serde(default)]
	pub append: bool,
	/// Names added on top of the shared data namespaces.
	#[serde(default)]
	pub vars: toml::Table,
}

impl StampConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config at `explicit` when given, otherwise the first
	/// discovered config file at `root`.
	pub fn discover(root: &Path, explicit: Option<&Path>) -> CliResult<(PathBuf, Self)> {
		let path = match explicit {
			Some(path) => root.join(path),
			None => {
				Self::resolve_path(root).ok_or_else(|| {
					CliError::MissingConfig {
						root: root.display().to_string(),
					}
				})?
			}
		};

		let config = Self::load(&path)?;
		Ok((path, config))
	}

	pub fn load(path: &Path) -> CliResult<Self> {
		let content = read_file(path)?;

		toml::from_str(&content).map_err(|error| {
			CliError::ConfigParse {
				path: path.display().to_string(),
				reason: error.to_string(),
			}
		})
	}

	/// Read every `[data]` file into one context keyed by namespace.
	pub fn load_data(&self, root: &Path) -> CliResult<Context> {
		let mut context = Context::new();

		for (namespace, relative) in &self.data {
			let value = load_data_file(&root.join(relative))?;
			tracing::debug!(%namespace, path = %relative.display(), "loaded data namespace");
			context.set(namespace.as_str(), value);
		}

		Ok(context)
	}

	/// Build the named contexts for every rule, in declaration order.
	pub fn rule_contexts(&self, shared: &Context) -> CliResult<Vec<(String, Context)>> {
		self.rules
			.iter()
			.map(|rule| {
				let mut context = shared.clone();
				for (name, value) in &rule.vars {
					let value = toml_to_json(value.clone(), &rule.name)?;
					context.set(name.as_str(), value);
				}
				Ok((rule.name.clone(), context))
			})
			.collect()
	}

	/// Where a rule's output goes. `None` means stdout.
	pub fn output_path(&self, root: &Path, rule: &Rule) -> Option<PathBuf> {
		let outfile = rule.outfile.as_ref()?;
		let dir = self
			.output_dir
			.as_ref()
			.map_or_else(|| root.to_path_buf(), |dir| root.join(dir));

		Some(dir.join(outfile))
	}
}

/// Read a text file, reporting the path on failure.
pub fn read_file(path: &Path) -> CliResult<String> {
	std::fs::read_to_string(path).map_err(|source| {
		CliError::Read {
			path: path.display().to_string(),
			source,
		}
	})
}

/// Read a data file, choosing its format from the file extension.
pub fn load_data_file(path: &Path) -> CliResult<serde_json::Value> {
	let content = std::fs::read_to_string(path).map_err(|error| {
		CliError::DataFile {
			path: path.display().to_string(),
			reason: error.to_string(),
		}
	})?;
	let format = path
		.extension()
		.and_then(|extension| extension.to_str())
		.unwrap_or("")
		.to_ascii_lowercase();

	parse_data_file(&content, &format, &path.display().to_string())
}

/// Read a data file whose top level must be a map and turn it into a render
/// context.
pub fn load_context(path: &Path) -> CliResult<Context> {
	Context::from_json(load_data_file(path)?).map_err(|source| {
		CliError::InvalidData {
			path: path.display().to_string(),
			source,
		}
	})
}

/// Parse a data file's content into a `serde_json::Value` based on its
/// format.
pub fn parse_data_file(
	content: &str,
	format: &str,
	path_display: &str,
) -> CliResult<serde_json::Value> {
	let data_error = |reason: String| {
		CliError::DataFile {
			path: path_display.to_string(),
			reason,
		}
	};

	match format {
		"text" | "txt" => Ok(serde_json::Value::String(content.to_string())),
		"json" => serde_json::from_str(content).map_err(|error| data_error(error.to_string())),
		"toml" => {
			let value: toml::Value =
				toml::from_str(content).map_err(|error| data_error(error.to_string()))?;
			toml_to_json(value, path_display)
		}
		"yaml" | "yml" => serde_yaml_ng::from_str(content).map_err(|error| data_error(error.to_string())),
		other => {
			Err(CliError::UnsupportedDataFormat {
				format: other.to_string(),
				path: path_display.to_string(),
			})
		}
	}
}

/// Convert a `toml::Value` to a `serde_json::Value`.
fn toml_to_json(value: toml::Value, path_display: &str) -> CliResult<serde_json::Value> {
	let json = match value {
		toml::Value::String(text) => serde_json::Value::String(text),
		toml::Value::Integer(integer) => serde_json::Value::from(integer),
		toml::Value::Float(float) => {
			serde_json::Number::from_f64(float)
				.map(serde_json::Value::Number)
				.ok_or_else(|| {
					CliError::DataFile {
						path: path_display.to_string(),
						reason: format!("`{float}` cannot be used as a template number"),
					}
				})?
		}
		toml::Value::Boolean(boolean) => serde_json::Value::Bool(boolean),
		toml::Value::Datetime(datetime) => serde_json::Value::String(datetime.to_string()),
		toml::Value::Array(items) => {
			let items: CliResult<Vec<serde_json::Value>> = items
				.into_iter()
				.map(|item| toml_to_json(item, path_display))
				.collect();
			serde_json::Value::Array(items?)
		}
		toml::Value::Table(table) => {
			let mut map = serde_json::Map::new();
			for (key, value) in table {
				map.insert(key, toml_to_json(value, path_display)?);
			}
			serde_json::Value::Object(map)
		}
	};

	Ok(json)
}
