//! Date, time and datetime inputs
//!
//! Date and time fields carry fallback placeholders and patterns for
//! renderers without native pickers. Datetime values are stored as
//! `{date}T{time}` and gain a `±HH:MM` offset once both halves form a valid
//! datetime.

use crate::control::{Control, ControlKind};
use crate::descriptor::FieldDescriptor;
use crate::renderer::{FieldProps, RenderStrategy, UserInput, attr_value, base_control};
use chrono::{FixedOffset, Local, NaiveDateTime, Offset, TimeZone};
use serde_json::Value;

pub const DATE_PLACEHOLDER: &str = "dd/mm/yyyy";
pub const DATE_PATTERN: &str = r"([0-2]\d|30|31)/(0\d|10|11|12)/(19|20)\d{2}";
pub const TIME_PLACEHOLDER: &str = "HH:MM";
pub const TIME_PATTERN: &str = r"([01]\d|2[0-3])[-:.][0-5]\d";

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

fn temporal_control(
	props: &FieldProps<'_>,
	input_type: &str,
	placeholder: &str,
	pattern: &str,
) -> Control {
	let field = props.field;
	let mut control = base_control(props, ControlKind::Input {
		input_type: input_type.to_string(),
	});
	control
		.attrs
		.entry("placeholder".to_string())
		.or_insert_with(|| placeholder.to_string());
	control
		.attr("pattern", Some(field.pattern.clone().unwrap_or_else(|| pattern.to_string())))
		.attr("min", attr_value(&field.min))
		.attr("max", attr_value(&field.max))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateInput;

impl RenderStrategy for DateInput {
	fn name(&self) -> &'static str {
		"date"
	}

	fn render(&self, props: &FieldProps<'_>) -> Control {
		temporal_control(props, "date", DATE_PLACEHOLDER, DATE_PATTERN)
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeInput;

impl RenderStrategy for TimeInput {
	fn name(&self) -> &'static str {
		"time"
	}

	fn render(&self, props: &FieldProps<'_>) -> Control {
		temporal_control(props, "time", TIME_PLACEHOLDER, TIME_PATTERN)
	}
}

/// Split a stored datetime into its date and time halves, dropping any
/// offset.
///
/// # Examples
///
/// ```
/// use formwork_forms::widgets::temporal::split_datetime;
///
/// assert_eq!(split_datetime("2024-03-01T10:30+01:00"), ("2024-03-01", "10:30"));
/// assert_eq!(split_datetime("2024-03-01"), ("", ""));
/// ```
pub fn split_datetime(value: &str) -> (&str, &str) {
	match value.split_once('T') {
		Some((date, rest)) => (date, strip_offset(rest)),
		None => ("", ""),
	}
}

/// Drop a trailing `±HH:MM`; `-` inside the time itself is a separator.
fn strip_offset(time: &str) -> &str {
	let Some(split) = time.len().checked_sub(6) else {
		return time;
	};
	let tail = &time.as_bytes()[split..];
	let is_offset = matches!(tail[0], b'+' | b'-')
		&& tail[1..3].iter().all(u8::is_ascii_digit)
		&& tail[3] == b':'
		&& tail[4..].iter().all(u8::is_ascii_digit);
	if is_offset { &time[..split] } else { time }
}

/// `+HH:MM` / `-HH:MM` form of an offset.
pub fn display_offset(offset: FixedOffset) -> String {
	let seconds = offset.local_minus_utc();
	let sign = if seconds < 0 { '-' } else { '+' };
	let minutes = seconds.abs() / 60;
	format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

/// Separate date and time inputs combined into one value.
///
/// The offset appended to complete values is the local timezone's offset
/// for that instant unless a fixed offset is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatetimeInput {
	offset: Option<FixedOffset>,
}

impl DatetimeInput {
	pub fn with_offset(offset: FixedOffset) -> Self {
		Self {
			offset: Some(offset),
		}
	}

	fn offset_for(&self, naive: &NaiveDateTime) -> Option<FixedOffset> {
		match self.offset {
			Some(offset) => Some(offset),
			None => Local
				.from_local_datetime(naive)
				.earliest()
				.map(|dt| dt.offset().fix()),
		}
	}

	/// Combine both halves, appending the offset when they parse.
	pub fn combine(&self, date: &str, time: &str) -> String {
		let combined = format!("{}T{}", date, time);
		let parsed = DATETIME_FORMATS
			.iter()
			.find_map(|format| NaiveDateTime::parse_from_str(&combined, format).ok());
		match parsed.and_then(|naive| self.offset_for(&naive)) {
			Some(offset) => format!("{}{}", combined, display_offset(offset)),
			// not a full datetime yet, keep the partial value so the field still changes
			None => combined,
		}
	}
}

impl RenderStrategy for DatetimeInput {
	fn name(&self) -> &'static str {
		"datetime"
	}

	fn render(&self, props: &FieldProps<'_>) -> Control {
		let field = props.field;
		let mut control = base_control(props, ControlKind::Datetime);
		let stored = control.value.as_str().unwrap_or_default().to_string();
		let (date, time) = split_datetime(&stored);

		let part = |suffix: &str, input_type: &str, value: &str, placeholder: &str, pattern: &str| {
			let mut part = temporal_control(props, input_type, placeholder, pattern);
			part.name = format!("{}-{}", field.name, suffix);
			part.id = part.name.clone();
			part.label = None;
			part.help_text = None;
			part.value = Value::String(value.to_string());
			part
		};
		let mut date_part = part("date", "date", date, DATE_PLACEHOLDER, DATE_PATTERN);
		let mut time_part = part("time", "time", time, TIME_PLACEHOLDER, TIME_PATTERN);
		// min and max bound the date only
		time_part.attrs.shift_remove("min");
		time_part.attrs.shift_remove("max");
		date_part.error = None;
		time_part.error = None;

		control.parts = vec![date_part, time_part];
		control
	}

	/// A blank half keeps the previous value of that half.
	fn coerce(&self, _field: &FieldDescriptor, current: &Value, input: UserInput) -> Value {
		let stored = current.as_str().unwrap_or_default();
		let (old_date, old_time) = split_datetime(stored);
		let (date, time) = match input {
			UserInput::Date(d) if !d.is_empty() => (d, old_time.to_string()),
			UserInput::Time(t) if !t.is_empty() => (old_date.to_string(), t),
			UserInput::Date(_) | UserInput::Time(_) => (old_date.to_string(), old_time.to_string()),
			other => return other.into_raw(),
		};
		Value::String(self.combine(&date, &time))
	}
}
