use rstest::rstest;
use serde_json::json;
use similar_asserts::assert_eq;
use stamp_cli::CliError;
use stamp_cli::StampConfig;
use stamp_cli::load_context;
use stamp_cli::parse_data_file;
use stamp_core::AnyEmptyResult;
use stamp_core::Context;
use stamp_core::StampError;
use stamp_core::Value;

#[rstest]
#[case::json("json", r#"{"id": 8078, "tags": ["a"]}"#)]
#[case::toml("toml", "id = 8078\ntags = [\"a\"]\n")]
#[case::yaml("yaml", "id: 8078\ntags:\n  - a\n")]
#[case::yml("yml", "{id: 8078, tags: [a]}")]
fn parse_structured_data(#[case] format: &str, #[case] content: &str) -> AnyEmptyResult {
	let value = parse_data_file(content, format, "data")?;
	assert_eq!(value, json!({"id": 8078, "tags": ["a"]}));

	Ok(())
}

#[test]
fn parse_toml_keeps_key_order() -> AnyEmptyResult {
	let value = parse_data_file("zeta = 1\nalpha = 2\n[mid]\ny = 1\nx = 2\n", "toml", "data.toml")?;
	let serialized = serde_json::to_string(&value)?;
	assert_eq!(serialized, r#"{"zeta":1,"alpha":2,"mid":{"y":1,"x":2}}"#);

	Ok(())
}

#[test]
fn load_context_rejects_data_that_is_not_a_map() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let path = tmp.path().join("list.json");
	std::fs::write(&path, "[1, 2]")?;

	let result = load_context(&path);
	assert!(matches!(
		result,
		Err(CliError::InvalidData {
			source: StampError::InvalidContext { found: "list" },
			..
		})
	));

	Ok(())
}

#[test]
fn parse_text_data() -> AnyEmptyResult {
	let value = parse_data_file("raw contents\n", "txt", "notes.txt")?;
	assert_eq!(value, json!("raw contents\n"));

	Ok(())
}

#[test]
fn parse_rejects_unknown_format() {
	let result = parse_data_file("x = 1", "ini", "data.ini");
	assert!(matches!(
		result,
		Err(CliError::UnsupportedDataFormat { ref format, .. }) if format == "ini"
	));
}

#[test]
fn parse_rejects_nan_in_toml() {
	let result = parse_data_file("value = nan\n", "toml", "data.toml");
	assert!(matches!(result, Err(CliError::DataFile { .. })));
}

#[test]
fn rule_vars_overlay_shared_data() -> AnyEmptyResult {
	let config: StampConfig = toml::from_str(
		r#"template = "t.stamp"

[[rules]]
name = "first"
vars = { plant = "override", extra = true }

[[rules]]
name = "second"
"#,
	)?;

	let mut shared = Context::new();
	shared.set("plant", Value::from("shared"));

	let contexts = config.rule_contexts(&shared)?;
	let names: Vec<&str> = contexts.iter().map(|(name, _)| name.as_str()).collect();
	assert_eq!(names, vec!["first", "second"]);

	assert_eq!(contexts[0].1.lookup("plant"), Some(&Value::from("override")));
	assert_eq!(contexts[0].1.lookup("extra"), Some(&Value::Bool(true)));
	assert_eq!(contexts[1].1.lookup("plant"), Some(&Value::from("shared")));
	assert_eq!(contexts[1].1.lookup("extra"), None);

	Ok(())
}

#[test]
fn output_paths_resolve_inside_output_dir() -> AnyEmptyResult {
	let config: StampConfig = toml::from_str(
		r#"template = "t.stamp"
output_dir = "out"

[[rules]]
name = "file"
outfile = "a.txt"

[[rules]]
name = "stdout"
"#,
	)?;

	let root = std::path::Path::new("/project");
	assert_eq!(
		config.output_path(root, &config.rules[0]),
		Some(root.join("out").join("a.txt"))
	);
	assert_eq!(config.output_path(root, &config.rules[1]), None);

	Ok(())
}

#[test]
fn resolve_path_prefers_stamp_toml() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	assert_eq!(StampConfig::resolve_path(tmp.path()), None);

	std::fs::write(tmp.path().join(".stamp.toml"), "template = \"t\"\n")?;
	assert_eq!(
		StampConfig::resolve_path(tmp.path()),
		Some(tmp.path().join(".stamp.toml"))
	);

	std::fs::write(tmp.path().join("stamp.toml"), "template = \"t\"\n")?;
	assert_eq!(
		StampConfig::resolve_path(tmp.path()),
		Some(tmp.path().join("stamp.toml"))
	);

	Ok(())
}
