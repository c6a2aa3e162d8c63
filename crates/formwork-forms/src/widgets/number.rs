//! Integer and decimal inputs

use crate::control::{Control, ControlKind};
use crate::descriptor::FieldDescriptor;
use crate::renderer::{FieldProps, RenderStrategy, UserInput, attr_value, base_control};
use serde_json::{Number, Value};

fn number_control(props: &FieldProps<'_>, step: Option<String>) -> Control {
	let field = props.field;
	base_control(props, ControlKind::Input {
		input_type: "number".to_string(),
	})
	.attr("step", step)
	.attr("min", attr_value(&field.min))
	.attr("max", attr_value(&field.max))
}

/// Leading integer of `s`, ignoring anything after it ("12px" is 12).
fn parse_int_prefix(s: &str) -> Option<i64> {
	let s = s.trim_start();
	let digits_start = usize::from(s.starts_with(['-', '+']));
	let end = s[digits_start..]
		.find(|c: char| !c.is_ascii_digit())
		.map_or(s.len(), |i| i + digits_start);
	if end == digits_start {
		return None;
	}
	s[..end].parse().ok()
}

/// Longest leading decimal of `s` ("1.5e3kg" is 1500).
fn parse_float_prefix(s: &str) -> Option<f64> {
	let s = s.trim_start();
	(1..=s.len())
		.rev()
		.filter(|&end| s.is_char_boundary(end))
		.find_map(|end| {
			let candidate = &s[..end];
			// "inf" and "nan" parse in Rust but are not numbers here
			if candidate.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
				return None;
			}
			candidate.parse::<f64>().ok()
		})
		.filter(|f| f.is_finite())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerInput;

impl RenderStrategy for IntegerInput {
	fn name(&self) -> &'static str {
		"int"
	}

	fn render(&self, props: &FieldProps<'_>) -> Control {
		number_control(props, Some("1".to_string()))
	}

	/// Empty or unparsable input becomes `null`.
	fn coerce(&self, _field: &FieldDescriptor, _current: &Value, input: UserInput) -> Value {
		match input {
			UserInput::Text(s) => parse_int_prefix(&s).map_or(Value::Null, Value::from),
			other => other.into_raw(),
		}
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NumberInput;

impl RenderStrategy for NumberInput {
	fn name(&self) -> &'static str {
		"number"
	}

	fn render(&self, props: &FieldProps<'_>) -> Control {
		number_control(props, attr_value(&props.field.step))
	}

	fn coerce(&self, _field: &FieldDescriptor, _current: &Value, input: UserInput) -> Value {
		match input {
			UserInput::Text(s) => parse_float_prefix(&s)
				.and_then(Number::from_f64)
				.map_or(Value::Null, Value::Number),
			other => other.into_raw(),
		}
	}
}
