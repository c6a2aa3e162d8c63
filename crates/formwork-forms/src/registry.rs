//! Field type dispatch
//!
//! [`FieldRegistry::resolve`] picks the render strategy for a field type:
//! caller overrides first, then the built-in table, then a generic text
//! input. Resolution never fails.

use crate::descriptor::FieldType;
use crate::renderer::RenderStrategy;
use crate::widgets::{
	CaptchaWidget, CheckboxInput, CheckboxesInput, DateInput, DatetimeInput, FileInput,
	GeneralInput, HiddenInput, IntegerInput, NumberInput, RadioInput, SelectInput, TimeInput,
	ToggleInput, WidgetLoader,
};
use formwork_conf::Settings;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Caller-supplied strategies keyed by type tag.
pub type Overrides = HashMap<String, Arc<dyn RenderStrategy>>;

pub struct FieldRegistry {
	builtins: HashMap<FieldType, Arc<dyn RenderStrategy>>,
	fallback: Arc<dyn RenderStrategy>,
	captcha: Arc<CaptchaWidget>,
}

impl FieldRegistry {
	pub fn new() -> Self {
		let captcha = Arc::new(CaptchaWidget::detached());
		let mut builtins: HashMap<FieldType, Arc<dyn RenderStrategy>> = HashMap::new();
		builtins.insert(FieldType::Bool, Arc::new(CheckboxInput));
		builtins.insert(FieldType::Select, Arc::new(SelectInput));
		builtins.insert(FieldType::Checkboxes, Arc::new(CheckboxesInput));
		builtins.insert(FieldType::Toggle, Arc::new(ToggleInput));
		builtins.insert(FieldType::Radio, Arc::new(RadioInput));
		builtins.insert(FieldType::Int, Arc::new(IntegerInput));
		builtins.insert(FieldType::Number, Arc::new(NumberInput));
		builtins.insert(FieldType::Date, Arc::new(DateInput));
		builtins.insert(FieldType::Time, Arc::new(TimeInput));
		builtins.insert(FieldType::Datetime, Arc::new(DatetimeInput::default()));
		builtins.insert(FieldType::Recaptcha, captcha.clone());
		builtins.insert(FieldType::File, Arc::new(FileInput));
		builtins.insert(FieldType::Hidden, Arc::new(HiddenInput));

		Self {
			builtins,
			fallback: Arc::new(GeneralInput),
			captcha,
		}
	}

	/// Use `loader` for captcha fields.
	pub fn with_widget_loader(self, loader: Arc<dyn WidgetLoader>, settings: &Settings) -> Self {
		self.with_captcha(Arc::new(CaptchaWidget::new(loader, settings)))
	}

	pub fn with_captcha(mut self, captcha: Arc<CaptchaWidget>) -> Self {
		self.builtins.insert(FieldType::Recaptcha, captcha.clone());
		self.captcha = captcha;
		self
	}

	/// Replace the built-in strategy for `field_type`.
	pub fn register(mut self, field_type: FieldType, strategy: Arc<dyn RenderStrategy>) -> Self {
		self.builtins.insert(field_type, strategy);
		self
	}

	pub fn captcha(&self) -> &Arc<CaptchaWidget> {
		&self.captcha
	}

	pub fn fallback(&self) -> &Arc<dyn RenderStrategy> {
		&self.fallback
	}

	/// Strategy for `field_type`
	///
	/// # Examples
	///
	/// ```
	/// use formwork_forms::{FieldRegistry, FieldType, Overrides};
	/// use std::sync::Arc;
	///
	/// let registry = FieldRegistry::new();
	/// let overrides = Overrides::new();
	/// let a = registry.resolve(&FieldType::from("colour_wheel"), &overrides);
	/// let b = registry.resolve(&FieldType::from("colour_wheel"), &overrides);
	/// assert!(Arc::ptr_eq(&a, &b));
	/// assert!(Arc::ptr_eq(&a, registry.fallback()));
	/// ```
	pub fn resolve(&self, field_type: &FieldType, overrides: &Overrides) -> Arc<dyn RenderStrategy> {
		overrides
			.get(field_type.as_str())
			.or_else(|| self.builtins.get(field_type))
			.unwrap_or(&self.fallback)
			.clone()
	}
}

impl Default for FieldRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for FieldRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut types: Vec<&str> = self.builtins.keys().map(FieldType::as_str).collect();
		types.sort_unstable();
		f.debug_struct("FieldRegistry")
			.field("builtins", &types)
			.field("fallback", &self.fallback.name())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::control::Control;
	use crate::renderer::FieldProps;
	use proptest::prelude::*;
	use rstest::rstest;

	struct Stars;

	impl RenderStrategy for Stars {
		fn name(&self) -> &'static str {
			"stars"
		}

		fn render(&self, props: &FieldProps<'_>) -> Control {
			GeneralInput.render(props)
		}
	}

	#[rstest]
	#[case("bool", "checkbox")]
	#[case("select", "select")]
	#[case("checkboxes", "checkboxes")]
	#[case("toggle", "toggle")]
	#[case("radio", "radio")]
	#[case("int", "int")]
	#[case("number", "number")]
	#[case("date", "date")]
	#[case("time", "time")]
	#[case("datetime", "datetime")]
	#[case("recaptcha", "recaptcha")]
	#[case("file", "file")]
	#[case("hidden", "hidden")]
	#[case("text", "general")]
	#[case("email", "general")]
	fn test_builtin_table(#[case] tag: &str, #[case] strategy: &str) {
		let registry = FieldRegistry::new();
		assert_eq!(
			registry.resolve(&FieldType::from(tag), &Overrides::new()).name(),
			strategy
		);
	}

	#[rstest]
	fn test_override_wins_over_builtin_and_fallback() {
		let registry = FieldRegistry::new();
		let mut overrides = Overrides::new();
		overrides.insert("int".to_string(), Arc::new(Stars));
		overrides.insert("rating".to_string(), Arc::new(Stars));

		assert_eq!(registry.resolve(&FieldType::Int, &overrides).name(), "stars");
		assert_eq!(registry.resolve(&FieldType::from("rating"), &overrides).name(), "stars");
		assert_eq!(registry.resolve(&FieldType::Bool, &overrides).name(), "checkbox");
	}

	#[rstest]
	fn test_register_replaces_builtin() {
		let registry = FieldRegistry::new().register(FieldType::Select, Arc::new(Stars));
		assert_eq!(registry.resolve(&FieldType::Select, &Overrides::new()).name(), "stars");
	}

	proptest! {
		#[test]
		fn prop_unknown_tags_resolve_to_the_same_fallback(tag in "[a-z_]{1,12}") {
			let registry = FieldRegistry::new();
			let field_type = FieldType::from(tag.as_str());
			prop_assume!(matches!(field_type, FieldType::Other(_)));

			let first = registry.resolve(&field_type, &Overrides::new());
			let second = registry.resolve(&field_type, &Overrides::new());

			prop_assert!(Arc::ptr_eq(&first, &second));
			prop_assert!(Arc::ptr_eq(&first, registry.fallback()));
		}
	}
}
