use crate::control::{Control, ControlKind};
use crate::descriptor::FieldDescriptor;
use crate::renderer::{FieldProps, RenderStrategy, UserInput, base_control};
use serde_json::Value;

/// Single checkbox bound to a boolean.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckboxInput;

impl RenderStrategy for CheckboxInput {
	fn name(&self) -> &'static str {
		"checkbox"
	}

	fn render(&self, props: &FieldProps<'_>) -> Control {
		let mut control = base_control(props, ControlKind::Checkbox);
		control.value = Value::Bool(control.value.as_bool().unwrap_or(false));
		control
	}

	fn coerce(&self, _field: &FieldDescriptor, current: &Value, input: UserInput) -> Value {
		match input {
			UserInput::Checked(checked) => Value::Bool(checked),
			UserInput::Pick(_) => Value::Bool(!current.as_bool().unwrap_or(false)),
			UserInput::Text(s) => Value::Bool(matches!(s.as_str(), "true" | "on" | "1")),
			other => other.into_raw(),
		}
	}
}
