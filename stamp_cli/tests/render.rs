mod common;

use rstest::rstest;
use stamp_core::AnyEmptyResult;

#[test]
fn render_prints_to_stdout() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("nodes.txt.stamp"),
		"{{for i, node in nodes}}_\n{{i}}:{{node}}\n{{endfor}}",
	)?;
	std::fs::write(tmp.path().join("data.json"), r#"{"nodes": ["GD8", "GD9"]}"#)?;

	common::stamp_cmd()
		.arg("render")
		.arg("nodes.txt.stamp")
		.arg("--data")
		.arg("data.json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("0:GD8\n1:GD9\n");

	Ok(())
}

#[rstest]
#[case::json("data.json", r#"{"name": "stamp", "tags": ["a", "b"]}"#)]
#[case::toml("data.toml", "name = \"stamp\"\ntags = [\"a\", \"b\"]\n")]
#[case::yaml("data.yaml", "name: stamp\ntags:\n  - a\n  - b\n")]
#[case::yml("data.yml", "name: stamp\ntags: [a, b]\n")]
fn render_reads_data_by_extension(#[case] file: &str, #[case] content: &str) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("hello.stamp"), "Hello {{name}} {{tags.join('+')}}!")?;
	std::fs::write(tmp.path().join(file), content)?;

	common::stamp_cmd()
		.arg("render")
		.arg("hello.stamp")
		.arg("--data")
		.arg(file)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("Hello stamp a+b!");

	Ok(())
}

#[test]
fn render_without_data_uses_an_empty_context() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("plain.stamp"),
		"{{1 + 1}} {{missing ?? 'default'}}",
	)?;

	common::stamp_cmd()
		.arg("render")
		.arg("plain.stamp")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("2 default");

	Ok(())
}

#[test]
fn render_writes_output_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("block.stamp"), "{{var id = 8078}}ID := {{id}};\n")?;

	common::stamp_cmd()
		.arg("render")
		.arg("block.stamp")
		.arg("--output")
		.arg("out/block.awl")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("wrote"));

	let written = std::fs::read_to_string(tmp.path().join("out/block.awl"))?;
	similar_asserts::assert_eq!(written, "ID := 8078;\n");

	Ok(())
}

#[test]
fn render_rejects_unsupported_data_format() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("t.stamp"), "{{x}}")?;
	std::fs::write(tmp.path().join("data.ini"), "x = 1\n")?;

	common::stamp_cmd()
		.arg("render")
		.arg("t.stamp")
		.arg("--data")
		.arg("data.ini")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(1)
		.stderr(predicates::str::contains("stamp::unsupported_data_format"));

	Ok(())
}

#[test]
fn render_rejects_data_that_is_not_a_map() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("t.stamp"), "{{x}}")?;
	std::fs::write(tmp.path().join("data.json"), "[1, 2]")?;

	common::stamp_cmd()
		.arg("render")
		.arg("t.stamp")
		.arg("--data")
		.arg("data.json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.stderr(predicates::str::contains("stamp::invalid_data"));

	Ok(())
}

#[test]
fn render_rejects_malformed_data() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("t.stamp"), "{{x}}")?;
	std::fs::write(tmp.path().join("data.json"), "{not json")?;

	common::stamp_cmd()
		.arg("render")
		.arg("t.stamp")
		.arg("--data")
		.arg("data.json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.stderr(predicates::str::contains("stamp::data_file"));

	Ok(())
}

#[test]
fn render_reports_runtime_errors() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("t.stamp"), "before {{a.b}} after")?;

	common::stamp_cmd()
		.arg("render")
		.arg("t.stamp")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(1)
		.stdout(predicates::str::is_empty())
		.stderr(predicates::str::contains("stamp::render"))
		.stderr(predicates::str::contains("cannot read property"));

	Ok(())
}

#[test]
fn render_without_subcommand_fails() {
	common::stamp_cmd()
		.assert()
		.failure()
		.stderr(predicates::str::contains("No subcommand specified"));
}
