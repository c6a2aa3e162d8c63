//! File inputs
//!
//! Reading is asynchronous and happens outside of rendering: the form calls
//! [`read_file`] with the selection and stores the resulting value and
//! local error.

use crate::control::{Control, ControlKind};
use crate::descriptor::FieldDescriptor;
use crate::error::{FormError, FormResult};
use crate::renderer::{FieldProps, RenderStrategy, base_control};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::UNIX_EPOCH;

const CHOOSE_FILE_LABEL: &str = "Choose file...";
const OCTET_STREAM: &str = "application/octet-stream";

/// A file picked by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSelection {
	pub name: String,
	/// MIME type as reported by the picker, may be empty
	pub mime: String,
	/// Milliseconds since the Unix epoch
	pub last_modified: i64,
	pub bytes: Vec<u8>,
}

impl FileSelection {
	pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
		Self {
			name: name.into(),
			mime: mime.into(),
			last_modified: 0,
			bytes: bytes.into(),
		}
	}

	pub fn last_modified(mut self, millis: i64) -> Self {
		self.last_modified = millis;
		self
	}

	/// Read a file from disk, guessing the MIME type from its extension.
	pub async fn from_path(path: impl AsRef<Path>) -> FormResult<Self> {
		let path = path.as_ref();
		let io_err = |source| FormError::FileRead {
			path: path.display().to_string(),
			source,
		};
		let bytes = tokio::fs::read(path).await.map_err(io_err)?;
		let metadata = tokio::fs::metadata(path).await.map_err(io_err)?;
		let last_modified = metadata
			.modified()
			.ok()
			.and_then(|t| t.duration_since(UNIX_EPOCH).ok())
			.map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX));
		let name = path
			.file_name()
			.map(|n| n.to_string_lossy().into_owned())
			.unwrap_or_default();
		let mime = mime_guess::from_path(path)
			.first()
			.map(|m| m.essence_str().to_string())
			.unwrap_or_default();

		Ok(Self {
			name,
			mime,
			last_modified,
			bytes,
		})
	}
}

/// Value stored for a successfully read file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileValue {
	pub name: String,
	pub last_modified: i64,
	/// UTF-8 text, or a `data:` URL for binary fields
	pub content: String,
}

/// Outcome of reading a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRead {
	/// `null` when the file was rejected
	pub value: Value,
	pub error: Option<String>,
}

/// Check the MIME type against the field's accepted types and read the
/// content.
pub async fn read_file(field: &FieldDescriptor, selection: FileSelection) -> FileRead {
	if let Some(types) = &field.file_types
		&& !types.iter().any(|t| *t == selection.mime)
	{
		let error = format!(
			"Unexpected file type {}, expected {}",
			selection.mime,
			types.join(", ")
		);
		tracing::debug!(field = %field.name, file = %selection.name, "{}", error);
		return FileRead {
			value: Value::Null,
			error: Some(error),
		};
	}

	let content = if field.binary_data {
		let mime = if selection.mime.is_empty() {
			OCTET_STREAM
		} else {
			selection.mime.as_str()
		};
		format!("data:{};base64,{}", mime, STANDARD.encode(&selection.bytes))
	} else {
		String::from_utf8_lossy(&selection.bytes).into_owned()
	};

	let value = FileValue {
		name: selection.name,
		last_modified: selection.last_modified,
		content,
	};
	FileRead {
		value: serde_json::to_value(value).unwrap_or(Value::Null),
		error: None,
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileInput;

impl RenderStrategy for FileInput {
	fn name(&self) -> &'static str {
		"file"
	}

	fn render(&self, props: &FieldProps<'_>) -> Control {
		let field = props.field;
		let accept = field.file_types.as_ref().map(|types| types.join(","));
		let mut control = base_control(props, ControlKind::File { accept });
		let chosen = control
			.value
			.get("name")
			.and_then(Value::as_str)
			.map(str::to_string);
		let file_label = chosen
			.or_else(|| field.placeholder_text())
			.unwrap_or_else(|| CHOOSE_FILE_LABEL.to_string());
		control.attrs.insert("file_label".to_string(), file_label);
		control
	}
}
