//! Headless control descriptions
//!
//! A [`Control`] is plain data: what a rendering layer needs to draw one
//! field. Attributes are advisory; nothing here enforces them.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Shape of the control to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlKind {
	/// `<input type=...>`
	Input { input_type: String },
	Checkbox,
	Select,
	Radio,
	/// Button group where one choice is active
	Toggle,
	/// One checkbox per choice
	Checkboxes,
	/// Separate date and time inputs, see [`Control::parts`]
	Datetime,
	File { accept: Option<String> },
	Captcha,
	Hidden,
}

/// One entry of a choice control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlOption {
	pub value: String,
	pub label: String,
	pub selected: bool,
	/// Element id, `{field}-{value}` for radio and checkbox groups
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
}

/// Everything needed to draw one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Control {
	pub kind: ControlKind,
	pub name: String,
	pub id: String,
	/// `None` when the label is hidden
	pub label: Option<String>,
	/// Value as it should appear in the control
	pub value: Value,
	pub disabled: bool,
	pub required: bool,
	pub autofocus: bool,
	/// Advisory attributes: min, max, step, pattern, placeholder, ...
	pub attrs: IndexMap<String, String>,
	pub options: Vec<ControlOption>,
	pub error: Option<String>,
	pub help_text: Option<String>,
	/// Invisible input carrying the joined value so required checks still
	/// see the field
	pub companion: Option<String>,
	/// Sub-inputs, e.g. the date and time halves of a datetime field
	pub parts: Vec<Control>,
}

impl Control {
	pub fn new(kind: ControlKind, name: impl Into<String>) -> Self {
		let name = name.into();
		Self {
			kind,
			id: name.clone(),
			name,
			label: None,
			value: Value::Null,
			disabled: false,
			required: false,
			autofocus: false,
			attrs: IndexMap::new(),
			options: Vec::new(),
			error: None,
			help_text: None,
			companion: None,
			parts: Vec::new(),
		}
	}

	/// Set an attribute, skipping `None`.
	pub fn attr(mut self, key: &str, value: Option<String>) -> Self {
		if let Some(value) = value {
			self.attrs.insert(key.to_string(), value);
		}
		self
	}

	pub fn get_attr(&self, key: &str) -> Option<&str> {
		self.attrs.get(key).map(String::as_str)
	}

	pub fn selected_values(&self) -> Vec<&str> {
		self.options
			.iter()
			.filter(|o| o.selected)
			.map(|o| o.value.as_str())
			.collect()
	}
}
