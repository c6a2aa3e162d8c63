//! Built-in render strategies, one per [`FieldType`](crate::FieldType).

pub mod checkbox;
pub mod choice;
pub mod file;
pub mod general;
pub mod number;
pub mod recaptcha;
pub mod temporal;

pub use checkbox::CheckboxInput;
pub use choice::{CheckboxesInput, RadioInput, SelectInput, ToggleInput};
pub use file::{FileInput, FileRead, FileSelection, FileValue, read_file};
pub use general::{GeneralInput, HiddenInput};
pub use number::{IntegerInput, NumberInput};
pub use recaptcha::{CaptchaWidget, LoadState, WidgetLoader};
pub use temporal::{DateInput, DatetimeInput, TimeInput};
