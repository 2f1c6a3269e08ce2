use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

pub use config::*;
pub use error::*;

mod config;
#[allow(unused_assignments)]
mod error;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Generate configuration files and code from `{{...}}` templates.",
	long_about = "stamp renders plain text templates against structured data.\n\nTemplates hold \
	              `{{...}}` directives: expressions, `if`/`elseif`/`else`/`endif` branches and \
	              `for`/`endfor` loops. Data comes from JSON, TOML or YAML files.\n\nQuick \
	              start:\n  stamp render node.awl --data node.json   Render one template\n  stamp \
	              check node.awl                         Validate a template\n  stamp generate    \
	              Render every rule in stamp.toml"
)]
pub struct StampCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory. Relative template, data and
	/// output paths are resolved against it.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Render one template against one data file.
	///
	/// The data file format is chosen by its extension: `.json`, `.toml`,
	/// `.yaml` or `.yml`. Without `--data` the template renders against an
	/// empty context.
	Render {
		/// The template to render.
		template: PathBuf,

		/// A data file whose top level map becomes the render context.
		#[arg(long, short)]
		data: Option<PathBuf>,

		/// Write the output to this file instead of stdout.
		#[arg(long, short)]
		output: Option<PathBuf>,
	},
	/// Parse a template and report structural errors without rendering it.
	///
	/// Exits with a non-zero status code when a tag is unbalanced, a
	/// directive is misplaced or an expression is outside the template
	/// grammar.
	Check {
		/// The template to check.
		template: PathBuf,
	},
	/// Render the configured template once for every rule in `stamp.toml`.
	///
	/// Each rule's context is the shared `[data]` namespaces overlaid with
	/// the rule's own `vars`. Rules with an `outfile` write to it (inside
	/// `output_dir`); the others print to stdout.
	Generate {
		/// Use this config file instead of discovering `stamp.toml` or
		/// `.stamp.toml` in the project root.
		#[arg(long, short)]
		config: Option<PathBuf>,

		/// Print what would be written without touching any file.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Skip failing rules instead of stopping at the first one. The
		/// command still exits with a non-zero status code.
		#[arg(long, default_value_t = false)]
		keep_going: bool,
	},
}
