use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use clap::Parser;
use owo_colors::OwoColorize;
use stamp_cli::CliError;
use stamp_cli::CliResult;
use stamp_cli::Commands;
use stamp_cli::StampCli;
use stamp_cli::StampConfig;
use stamp_cli::load_context;
use stamp_cli::read_file;
use stamp_core::Context;
use stamp_core::Document;
use stamp_core::parse;
use stamp_core::render_batch;
use tracing_subscriber::EnvFilter;

static USE_COLOR: AtomicBool = AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = StampCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Render {
			template,
			data,
			output,
		}) => run_render(&args, template, data.as_deref(), output.as_deref()),
		Some(Commands::Check { template }) => run_check(&args, template),
		Some(Commands::Generate {
			config,
			dry_run,
			keep_going,
		}) => run_generate(&args, config.as_deref(), *dry_run, *keep_going),
		None => {
			eprintln!("No subcommand specified. Run `stamp --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(error) = result {
		let report: miette::Report = error.into();
		eprintln!("{report:?}");
		process::exit(1);
	}
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

fn resolve_root(args: &StampCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_template(path: &Path) -> CliResult<Document> {
	let content = read_file(path)?;
	let document = parse(&content).map_err(|source| {
		CliError::Template {
			path: path.display().to_string(),
			source,
		}
	})?;

	tracing::debug!(path = %path.display(), nodes = document.nodes().len(), "loaded template");
	Ok(document)
}

fn write_output(path: &Path, text: &str, append: bool) -> CliResult<()> {
	let write_error = |source| {
		CliError::Write {
			path: path.display().to_string(),
			source,
		}
	};

	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).map_err(write_error)?;
	}

	let mut file = OpenOptions::new()
		.create(true)
		.write(true)
		.append(append)
		.truncate(!append)
		.open(path)
		.map_err(write_error)?;

	file.write_all(text.as_bytes()).map_err(write_error)
}

fn run_render(
	args: &StampCli,
	template: &Path,
	data: Option<&Path>,
	output: Option<&Path>,
) -> CliResult<()> {
	let root = resolve_root(args);
	let template_path = root.join(template);
	let document = load_template(&template_path)?;

	let mut context = match data {
		Some(data) => load_context(&root.join(data))?,
		None => Context::new(),
	};

	let rendered = document.render(&mut context).map_err(|source| {
		CliError::Render {
			path: template_path.display().to_string(),
			source,
		}
	})?;

	match output {
		Some(output) => {
			let output_path = root.join(output);
			write_output(&output_path, &rendered, false)?;
			println!("{} {}", colored!("wrote", green), output_path.display());
		}
		None => print!("{rendered}"),
	}

	Ok(())
}

fn run_check(args: &StampCli, template: &Path) -> CliResult<()> {
	let root = resolve_root(args);
	let template_path = root.join(template);
	let document = load_template(&template_path)?;

	println!(
		"{} {} is valid",
		colored!("ok", green),
		template_path.display()
	);

	if args.verbose {
		println!("{:<12} {}", "top level", document.nodes().len());
	}

	Ok(())
}

fn run_generate(
	args: &StampCli,
	config: Option<&Path>,
	dry_run: bool,
	keep_going: bool,
) -> CliResult<()> {
	let root = resolve_root(args);
	let (config_path, config) = StampConfig::discover(&root, config)?;
	tracing::debug!(path = %config_path.display(), rules = config.rules.len(), "loaded config");

	let document = load_template(&root.join(&config.template))?;
	let shared = config.load_data(&root)?;
	let results = render_batch(&document, config.rule_contexts(&shared)?);
	let total = results.len();
	let mut failures = 0;

	for (rule, rendered) in config.rules.iter().zip(results) {
		let text = match rendered.output {
			Ok(text) => text,
			Err(source) if keep_going => {
				failures += 1;
				tracing::warn!(rule = %rendered.name, "skipping rule that failed to render");
				let report: miette::Report = CliError::Rule {
					name: rendered.name,
					source,
				}
				.into();
				eprintln!("{report:?}");
				continue;
			}
			Err(source) => {
				return Err(CliError::Rule {
					name: rendered.name,
					source,
				});
			}
		};

		let verb = if rule.append { "append" } else { "write" };

		match config.output_path(&root, rule) {
			Some(path) if dry_run => {
				println!(
					"{} {} to {} ({} bytes)",
					colored!(format!("would {verb}"), yellow),
					rule.name,
					path.display(),
					text.len()
				);
			}
			Some(path) => {
				write_output(&path, &text, rule.append)?;
				tracing::debug!(rule = %rule.name, path = %path.display(), verb, "wrote rule output");
			}
			None => print!("{text}"),
		}
	}

	if failures > 0 {
		return Err(CliError::RulesFailed {
			count: failures,
			total,
		});
	}

	if !dry_run {
		eprintln!(
			"{}",
			colored!(format!("Generated {total} rule(s)"), bold)
		);
	}

	Ok(())
}
