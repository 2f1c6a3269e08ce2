use miette::Diagnostic;
use stamp_core::StampError;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
pub enum CliError {
	#[error("failed to read `{path}`")]
	#[diagnostic(code(stamp::io))]
	Read {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write `{path}`")]
	#[diagnostic(code(stamp::io))]
	Write {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("no `stamp.toml` or `.stamp.toml` found in `{root}`")]
	#[diagnostic(
		code(stamp::missing_config),
		help("create a `stamp.toml` with a `template` and some `[[rules]]`, or pass `--config`")
	)]
	MissingConfig { root: String },

	#[error("failed to parse `{path}`: {reason}")]
	#[diagnostic(code(stamp::config_parse))]
	ConfigParse { path: String, reason: String },

	#[error("failed to load data file `{path}`: {reason}")]
	#[diagnostic(code(stamp::data_file))]
	DataFile { path: String, reason: String },

	#[error("unsupported data format `{format}` for `{path}`")]
	#[diagnostic(
		code(stamp::unsupported_data_format),
		help("use a `.json`, `.toml`, `.yaml`, `.yml` or `.txt` file")
	)]
	UnsupportedDataFormat { format: String, path: String },

	#[error("the data in `{path}` cannot be used as a template context")]
	#[diagnostic(code(stamp::invalid_data))]
	InvalidData {
		path: String,
		#[source]
		#[diagnostic_source]
		source: StampError,
	},

	#[error("template `{path}` is invalid")]
	#[diagnostic(code(stamp::template))]
	Template {
		path: String,
		#[source]
		#[diagnostic_source]
		source: StampError,
	},

	#[error("failed to render `{path}`")]
	#[diagnostic(code(stamp::render))]
	Render {
		path: String,
		#[source]
		#[diagnostic_source]
		source: StampError,
	},

	#[error("rule `{name}` failed to render")]
	#[diagnostic(code(stamp::rule))]
	Rule {
		name: String,
		#[source]
		#[diagnostic_source]
		source: StampError,
	},

	#[error("{count} of {total} rules failed")]
	#[diagnostic(code(stamp::rules_failed))]
	RulesFailed { count: usize, total: usize },
}

pub type CliResult<T> = Result<T, CliError>;
