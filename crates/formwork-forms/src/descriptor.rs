//! Field descriptors
//!
//! A [`FieldDescriptor`] is declarative metadata for one input. Descriptors
//! are owned by the caller and never mutated while rendering; derived values
//! such as the display title are computed on demand.

use crate::error::{FormError, FormResult};
use crate::utils::as_title;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Symbolic field type tag.
///
/// Tags without a built-in widget are kept as [`FieldType::Other`] so that
/// registry overrides can target them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
	#[default]
	Text,
	Bool,
	Select,
	Checkboxes,
	Toggle,
	Radio,
	Int,
	Number,
	Date,
	Time,
	Datetime,
	Recaptcha,
	File,
	Hidden,
	Other(String),
}

impl FieldType {
	pub fn as_str(&self) -> &str {
		match self {
			Self::Text => "text",
			Self::Bool => "bool",
			Self::Select => "select",
			Self::Checkboxes => "checkboxes",
			Self::Toggle => "toggle",
			Self::Radio => "radio",
			Self::Int => "int",
			Self::Number => "number",
			Self::Date => "date",
			Self::Time => "time",
			Self::Datetime => "datetime",
			Self::Recaptcha => "recaptcha",
			Self::File => "file",
			Self::Hidden => "hidden",
			Self::Other(tag) => tag,
		}
	}
}

impl From<&str> for FieldType {
	fn from(tag: &str) -> Self {
		match tag {
			"text" => Self::Text,
			"bool" => Self::Bool,
			"select" => Self::Select,
			"checkboxes" => Self::Checkboxes,
			"toggle" => Self::Toggle,
			"radio" => Self::Radio,
			"int" => Self::Int,
			"number" => Self::Number,
			"date" => Self::Date,
			"time" => Self::Time,
			"datetime" => Self::Datetime,
			"recaptcha" => Self::Recaptcha,
			"file" => Self::File,
			"hidden" => Self::Hidden,
			other => Self::Other(other.to_string()),
		}
	}
}

impl From<String> for FieldType {
	fn from(tag: String) -> Self {
		Self::from(tag.as_str())
	}
}

impl From<FieldType> for String {
	fn from(field_type: FieldType) -> Self {
		field_type.as_str().to_string()
	}
}

impl fmt::Display for FieldType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One option of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Choice {
	pub value: String,
	pub label: String,
}

impl Choice {
	pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			value: value.into(),
			label: label.into(),
		}
	}
}

impl From<&str> for Choice {
	fn from(value: &str) -> Self {
		Self::new(value, as_title(value))
	}
}

impl TryFrom<Value> for Choice {
	type Error = FormError;

	/// A bare string, or an object whose `value` is a string. A missing or
	/// empty label is derived from the value.
	fn try_from(raw: Value) -> FormResult<Self> {
		match &raw {
			Value::String(value) => Ok(Self::from(value.as_str())),
			Value::Object(map) => {
				let value = map
					.get("value")
					.and_then(Value::as_str)
					.ok_or_else(|| FormError::InvalidChoice(raw.to_string()))?;
				let label = match map.get("label").and_then(Value::as_str) {
					Some(label) if !label.is_empty() => label.to_string(),
					_ => as_title(value),
				};
				Ok(Self::new(value, label))
			}
			_ => Err(FormError::InvalidChoice(raw.to_string())),
		}
	}
}

/// `placeholder: true` asks for the field title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Placeholder {
	UseTitle(bool),
	Text(String),
}

fn default_true() -> bool {
	true
}

/// Declarative description of one form input
///
/// # Examples
///
/// ```
/// use formwork_forms::{FieldDescriptor, FieldType};
///
/// let age = FieldDescriptor::new("age", FieldType::Int).required().min(0).max(130);
/// assert_eq!(age.display_title(), "Age");
/// assert!(age.required);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
	/// Unique within a field set; assigned from the map key when omitted
	#[serde(default)]
	pub name: String,
	#[serde(rename = "type", default)]
	pub field_type: FieldType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(default)]
	pub required: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub choices: Option<Vec<Choice>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub step: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pattern: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min_length: Option<usize>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_length: Option<usize>,
	#[serde(default)]
	pub disabled: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub placeholder: Option<Placeholder>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub help_text: Option<String>,
	#[serde(default = "default_true")]
	pub show_label: bool,
	/// Select fields only: offer an empty option
	#[serde(default = "default_true")]
	pub allow_empty: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub autocomplete: Option<String>,
	/// Request focus on first render
	#[serde(default)]
	pub focus: bool,
	/// Accepted MIME types for file fields
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file_types: Option<Vec<String>>,
	/// File fields: read content as a data URL instead of text
	#[serde(default)]
	pub binary_data: bool,
}

impl FieldDescriptor {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			title: None,
			required: false,
			default: None,
			choices: None,
			min: None,
			max: None,
			step: None,
			pattern: None,
			min_length: None,
			max_length: None,
			disabled: false,
			placeholder: None,
			help_text: None,
			show_label: true,
			allow_empty: true,
			autocomplete: None,
			focus: false,
			file_types: None,
			binary_data: false,
		}
	}

	pub fn text(name: impl Into<String>) -> Self {
		Self::new(name, FieldType::Text)
	}

	/// Title to display: the explicit title, or one derived from the name.
	pub fn display_title(&self) -> String {
		match &self.title {
			Some(title) if !title.is_empty() => title.clone(),
			_ => as_title(&self.name),
		}
	}

	/// Resolved placeholder text, if any.
	pub fn placeholder_text(&self) -> Option<String> {
		match &self.placeholder {
			Some(Placeholder::UseTitle(true)) => Some(self.display_title()),
			Some(Placeholder::Text(text)) if !text.is_empty() => Some(text.clone()),
			_ => None,
		}
	}

	pub fn title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn default_value(mut self, value: Value) -> Self {
		self.default = Some(value);
		self
	}

	pub fn choices<I, C>(mut self, choices: I) -> Self
	where
		I: IntoIterator<Item = C>,
		C: Into<Choice>,
	{
		self.choices = Some(choices.into_iter().map(Into::into).collect());
		self
	}

	/// Choices from raw JSON values, failing on malformed entries.
	pub fn try_choices(mut self, raw: Vec<Value>) -> FormResult<Self> {
		self.choices = Some(
			raw.into_iter()
				.map(Choice::try_from)
				.collect::<FormResult<Vec<_>>>()?,
		);
		Ok(self)
	}

	pub fn min(mut self, min: impl Into<Value>) -> Self {
		self.min = Some(min.into());
		self
	}

	pub fn max(mut self, max: impl Into<Value>) -> Self {
		self.max = Some(max.into());
		self
	}

	pub fn step(mut self, step: impl Into<Value>) -> Self {
		self.step = Some(step.into());
		self
	}

	pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
		self.pattern = Some(pattern.into());
		self
	}

	pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
		self.min_length = min;
		self.max_length = max;
		self
	}

	pub fn disabled(mut self) -> Self {
		self.disabled = true;
		self
	}

	pub fn placeholder(mut self, placeholder: Placeholder) -> Self {
		self.placeholder = Some(placeholder);
		self
	}

	pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
		self.help_text = Some(help_text.into());
		self
	}

	pub fn hide_label(mut self) -> Self {
		self.show_label = false;
		self
	}

	pub fn disallow_empty(mut self) -> Self {
		self.allow_empty = false;
		self
	}

	pub fn autocomplete(mut self, autocomplete: impl Into<String>) -> Self {
		self.autocomplete = Some(autocomplete.into());
		self
	}

	pub fn focus(mut self) -> Self {
		self.focus = true;
		self
	}

	pub fn file_types<I, S>(mut self, types: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.file_types = Some(types.into_iter().map(Into::into).collect());
		self
	}

	pub fn binary_data(mut self) -> Self {
		self.binary_data = true;
		self
	}
}

/// Ordered mapping of field name to descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldSet {
	fields: IndexMap<String, FieldDescriptor>,
}

impl FieldSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build from a keyed map; each descriptor takes its key as its name.
	pub fn from_map(map: IndexMap<String, FieldDescriptor>) -> Self {
		let fields = map
			.into_iter()
			.map(|(name, mut field)| {
				field.name = name.clone();
				(name, field)
			})
			.collect();
		Self { fields }
	}

	/// Parse a JSON object of `name -> descriptor`.
	///
	/// # Examples
	///
	/// ```
	/// use formwork_forms::{FieldSet, FieldType};
	/// use serde_json::json;
	///
	/// let fields = FieldSet::from_json(json!({
	///     "age": {"type": "int", "required": true},
	///     "colour": {"type": "select", "choices": ["red", {"value": "dark_blue"}]},
	/// })).unwrap();
	/// assert_eq!(fields.get("age").unwrap().field_type, FieldType::Int);
	/// assert_eq!(fields.get("colour").unwrap().choices.as_ref().unwrap()[1].label, "Dark Blue");
	/// ```
	pub fn from_json(value: Value) -> FormResult<Self> {
		let map: IndexMap<String, FieldDescriptor> = serde_json::from_value(value)?;
		Ok(Self::from_map(map))
	}

	/// Append `field`, replacing any field of the same name in place.
	pub fn push(&mut self, field: FieldDescriptor) {
		self.fields.insert(field.name.clone(), field);
	}

	pub fn with(mut self, field: FieldDescriptor) -> Self {
		self.push(field);
		self
	}

	pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
		self.fields.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.fields.contains_key(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
		self.fields.values()
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.fields.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}
}

impl FromIterator<FieldDescriptor> for FieldSet {
	fn from_iter<T: IntoIterator<Item = FieldDescriptor>>(iter: T) -> Self {
		let mut set = Self::new();
		for field in iter {
			set.push(field);
		}
		set
	}
}

impl<'de> Deserialize<'de> for FieldSet {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		IndexMap::<String, FieldDescriptor>::deserialize(deserializer).map(Self::from_map)
	}
}
