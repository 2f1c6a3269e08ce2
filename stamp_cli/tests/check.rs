mod common;

use rstest::rstest;
use stamp_core::AnyEmptyResult;

#[test]
fn check_accepts_valid_template() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("node.stamp"),
		"{{// header}}_\n{{for k, v in inputs}}{{k}}={{v ?? 'none'}}\n{{endfor}}{{if \
		 x}}a{{elseif y}}b{{else}}c{{endif}}",
	)?;

	common::stamp_cmd()
		.arg("check")
		.arg("node.stamp")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("is valid"));

	Ok(())
}

#[test]
fn check_does_not_evaluate_expressions() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("lazy.stamp"), "{{missing.value}}{{for x in 5}}{{endfor}}")?;

	common::stamp_cmd()
		.arg("check")
		.arg("lazy.stamp")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	Ok(())
}

#[test]
fn check_verbose_shows_node_count() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("t.stamp"), "a{{b}}c")?;

	common::stamp_cmd()
		.arg("check")
		.arg("t.stamp")
		.arg("--verbose")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("top level"));

	Ok(())
}

#[rstest]
#[case::unclosed_if("{{if x}}abc", "tag mismatch at 1:1")]
#[case::stray_endfor("text\n{{endfor}}", "tag mismatch at 2:1")]
#[case::unclosed_delimiter("abc {{ x", "tag mismatch at 1:5")]
#[case::stray_close("abc }}", "tag mismatch at 1:5")]
#[case::unsupported_operator("{{ a ** 2 }}", "expression syntax error at 1:6")]
#[case::statement("{{a; b}}", "expression syntax error at 1:4")]
#[case::member_assignment("{{a.b = 1}}", "invalid assignment target at 1:3")]
fn check_reports_invalid_templates(#[case] template: &str, #[case] message: &str) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("bad.stamp"), template)?;

	common::stamp_cmd()
		.arg("check")
		.arg("bad.stamp")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(1)
		.stderr(predicates::str::contains("stamp::template"))
		.stderr(predicates::str::contains(message));

	Ok(())
}

#[test]
fn check_reports_missing_template() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::stamp_cmd()
		.arg("check")
		.arg("missing.stamp")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.stderr(predicates::str::contains("stamp::io"));

	Ok(())
}
