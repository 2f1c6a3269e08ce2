use serde_json::json;

use crate::*;

/// A template using every block directive, balanced.
pub(crate) const BALANCED_TEMPLATE: &str = "{{if a}}A{{for x in L}}{{x}}{{endfor}}{{elseif \
                                            b}}B{{else}}C{{endif}}";

/// The directive tags of [`BALANCED_TEMPLATE`] that open or close a block.
pub(crate) const BALANCED_BLOCK_TAGS: &[&str] =
	&["{{if a}}", "{{for x in L}}", "{{endfor}}", "{{endif}}"];

/// A node configuration template in the style the generator is used for.
pub(crate) const NODE_TEMPLATE: &str = "{{// node data block}}_
DATA_BLOCK \"{{node_name}}\"
{{for i, input in inputs}}_
  IN{{i}} : {{input.type}}; // {{input.comment ?? 'no comment'}}
{{endfor}}_
{{if enabled}}_
  ENABLED := TRUE;
{{else}}_
  ENABLED := FALSE;
{{endif}}_
END_DATA_BLOCK
";

pub(crate) fn context(data: serde_json::Value) -> Context {
	Context::from_json(data).expect("fixture data must be a JSON object")
}

pub(crate) fn render_json(template: &str, data: serde_json::Value) -> StampResult<String> {
	render_template(template, &mut context(data))
}

pub(crate) fn node_context() -> Context {
	context(json!({
		"node_name": "GD8",
		"enabled": true,
		"inputs": [
			{ "type": "BOOL", "comment": "door open" },
			{ "type": "INT" },
		],
	}))
}

pub(crate) fn named_contexts() -> Vec<(&'static str, Context)> {
	vec![
		("first", context(json!({ "n": 1 }))),
		("second", context(json!({ "n": 2 }))),
		("broken", context(json!({ "n": "text" }))),
		("third", context(json!({ "n": 3 }))),
	]
}

/// A native function that doubles its first argument.
pub(crate) fn double_function() -> Value {
	Value::function("double", |arguments: &[Value]| {
		Ok(Value::Number(
			arguments.first().map_or(f64::NAN, Value::to_number) * 2.0,
		))
	})
}
