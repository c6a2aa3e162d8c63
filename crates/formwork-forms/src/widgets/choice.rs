//! Choice widgets: select, radio, toggle and checkbox groups

use crate::control::{Control, ControlKind, ControlOption};
use crate::descriptor::{Choice, FieldDescriptor};
use crate::renderer::{FieldProps, RenderStrategy, UserInput, base_control};
use crate::utils::{display_value, filter_unique, toggle};
use serde_json::Value;

/// Label of the empty select option
pub const EMPTY_OPTION_LABEL: &str = "\u{2014}";

fn choices(field: &FieldDescriptor) -> &[Choice] {
	field.choices.as_deref().unwrap_or(&[])
}

fn options(field: &FieldDescriptor, with_ids: bool, selected: impl Fn(&str) -> bool) -> Vec<ControlOption> {
	choices(field)
		.iter()
		.map(|c| ControlOption {
			value: c.value.clone(),
			label: c.label.clone(),
			selected: selected(&c.value),
			id: with_ids.then(|| format!("{}-{}", field.name, c.value)),
		})
		.collect()
}

/// Selected keys of a multi-value field.
fn selected_keys(value: &Value) -> Vec<String> {
	match value {
		Value::Array(items) => filter_unique(&items.iter().map(display_value).collect::<Vec<_>>()),
		Value::Null => Vec::new(),
		other => vec![display_value(other)],
	}
}

/// Native dropdown; offers an empty option unless the field disallows it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectInput;

impl RenderStrategy for SelectInput {
	fn name(&self) -> &'static str {
		"select"
	}

	fn render(&self, props: &FieldProps<'_>) -> Control {
		let field = props.field;
		let mut control = base_control(props, ControlKind::Select);
		let current = display_value(&control.value);
		if field.allow_empty {
			control.options.push(ControlOption {
				value: String::new(),
				label: EMPTY_OPTION_LABEL.to_string(),
				selected: current.is_empty(),
				id: None,
			});
		}
		control.options.extend(options(field, false, |v| v == current));
		control.value = Value::String(current);
		control
	}

	fn coerce(&self, _field: &FieldDescriptor, _current: &Value, input: UserInput) -> Value {
		match input {
			UserInput::Text(s) | UserInput::Pick(s) => Value::String(s),
			other => other.into_raw(),
		}
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RadioInput;

impl RenderStrategy for RadioInput {
	fn name(&self) -> &'static str {
		"radio"
	}

	fn render(&self, props: &FieldProps<'_>) -> Control {
		let mut control = base_control(props, ControlKind::Radio);
		let current = control.value.as_str().map(str::to_string);
		control.options = options(props.field, true, |v| current.as_deref() == Some(v));
		control
	}

	fn coerce(&self, _field: &FieldDescriptor, _current: &Value, input: UserInput) -> Value {
		match input {
			UserInput::Text(s) | UserInput::Pick(s) => Value::String(s),
			other => other.into_raw(),
		}
	}
}

/// Button group; the active choice is the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToggleInput;

impl RenderStrategy for ToggleInput {
	fn name(&self) -> &'static str {
		"toggle"
	}

	fn render(&self, props: &FieldProps<'_>) -> Control {
		let mut control = base_control(props, ControlKind::Toggle);
		let current = control.value.as_str().map(str::to_string);
		control.options = options(props.field, false, |v| current.as_deref() == Some(v));
		control.companion = Some(display_value(&control.value));
		control
	}

	fn coerce(&self, _field: &FieldDescriptor, _current: &Value, input: UserInput) -> Value {
		match input {
			UserInput::Text(s) | UserInput::Pick(s) => Value::String(s),
			other => other.into_raw(),
		}
	}
}

/// One checkbox per choice; the value is the ordered list of checked keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckboxesInput;

impl RenderStrategy for CheckboxesInput {
	fn name(&self) -> &'static str {
		"checkboxes"
	}

	fn render(&self, props: &FieldProps<'_>) -> Control {
		let mut control = base_control(props, ControlKind::Checkboxes);
		let selected = selected_keys(&control.value);
		control.options = options(props.field, true, |v| selected.iter().any(|s| s == v));
		control.companion = Some(selected.join(","));
		control.value = Value::Array(selected.into_iter().map(Value::String).collect());
		control
	}

	/// Picking a choice toggles it; text from the companion input replaces
	/// the whole selection.
	fn coerce(&self, _field: &FieldDescriptor, current: &Value, input: UserInput) -> Value {
		let selected = match input {
			UserInput::Pick(key) => toggle(&selected_keys(current), &key),
			UserInput::Text(joined) => filter_unique(
				&joined
					.split(',')
					.filter(|s| !s.is_empty())
					.map(str::to_string)
					.collect::<Vec<_>>(),
			),
			other => return other.into_raw(),
		};
		Value::Array(selected.into_iter().map(Value::String).collect())
	}
}
