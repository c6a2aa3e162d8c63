//! Choice and confirmation dialogs
//!
//! [`choice_modal`] returns the dialog to draw and a [`PendingChoice`] that
//! resolves once the user answers. Dismissing the dialog, or dropping it
//! unanswered, answers with the first choice.

use crate::error::{UiError, UiResult};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::oneshot;

pub const DEFAULT_CONFIRM_MESSAGE: &str = "Are you sure you want to continue?";
pub const DEFAULT_BUTTON_COLOUR: &str = "secondary";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice<T> {
	pub answer: T,
	pub text: String,
	/// Button colour, `secondary` when unset
	pub colour: Option<String>,
}

impl<T> Choice<T> {
	pub fn new(answer: T, text: impl Into<String>) -> Self {
		Self {
			answer,
			text: text.into(),
			colour: None,
		}
	}

	pub fn colour(mut self, colour: impl Into<String>) -> Self {
		self.colour = Some(colour.into());
		self
	}

	pub fn button_colour(&self) -> &str {
		self.colour.as_deref().unwrap_or(DEFAULT_BUTTON_COLOUR)
	}
}

#[derive(Debug)]
pub struct ChoiceDialog<T: Clone> {
	message: String,
	choices: Vec<Choice<T>>,
	resolve: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T: Clone> ChoiceDialog<T> {
	pub fn message(&self) -> &str {
		&self.message
	}

	pub fn choices(&self) -> &[Choice<T>] {
		&self.choices
	}

	/// Open until answered or dismissed.
	pub fn is_open(&self) -> bool {
		self.resolve.lock().is_some()
	}

	/// Answer with the choice at `index`; out of range indexes are ignored.
	pub fn choose(&self, index: usize) {
		if let Some(choice) = self.choices.get(index) {
			self.finish(choice.answer.clone());
		}
	}

	pub fn dismiss(&self) {
		if let Some(first) = self.choices.first() {
			self.finish(first.answer.clone());
		}
	}

	fn finish(&self, answer: T) {
		if let Some(resolve) = self.resolve.lock().take() {
			// The receiver may already be gone; nobody is waiting then.
			let _ = resolve.send(answer);
		}
	}
}

impl<T: Clone> Drop for ChoiceDialog<T> {
	fn drop(&mut self) {
		self.dismiss();
	}
}

/// Resolves with the dialog's answer.
#[derive(Debug)]
pub struct PendingChoice<T> {
	receiver: oneshot::Receiver<T>,
	fallback: T,
}

impl<T> PendingChoice<T> {
	pub async fn answer(self) -> T {
		self.receiver.await.unwrap_or(self.fallback)
	}
}

/// Show `message` with one button per choice.
pub fn choice_modal<T: Clone>(
	message: impl Into<String>,
	choices: Vec<Choice<T>>,
) -> UiResult<(ChoiceDialog<T>, PendingChoice<T>)> {
	let fallback = choices.first().ok_or(UiError::NoChoices)?.answer.clone();
	Ok(open(message.into(), choices, fallback))
}

fn open<T: Clone>(
	message: String,
	choices: Vec<Choice<T>>,
	fallback: T,
) -> (ChoiceDialog<T>, PendingChoice<T>) {
	let (sender, receiver) = oneshot::channel();
	let dialog = ChoiceDialog {
		message,
		choices,
		resolve: Mutex::new(Some(sender)),
	};
	(dialog, PendingChoice { receiver, fallback })
}

#[derive(Debug, Clone, Default)]
pub struct ConfirmOptions {
	pub message: Option<String>,
	pub continue_text: Option<String>,
	pub continue_colour: Option<String>,
	pub cancel_text: Option<String>,
	pub cancel_colour: Option<String>,
}

/// Cancel/Continue dialog answering `false`/`true`.
pub fn confirm_modal(options: ConfirmOptions) -> (ChoiceDialog<bool>, PendingChoice<bool>) {
	let cancel = Choice {
		answer: false,
		text: options.cancel_text.unwrap_or_else(|| "Cancel".to_string()),
		colour: options.cancel_colour,
	};
	let proceed = Choice {
		answer: true,
		text: options
			.continue_text
			.unwrap_or_else(|| "Continue".to_string()),
		colour: Some(
			options
				.continue_colour
				.unwrap_or_else(|| "primary".to_string()),
		),
	};
	let message = options
		.message
		.unwrap_or_else(|| DEFAULT_CONFIRM_MESSAGE.to_string());
	open(message, vec![cancel, proceed], false)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_choose_resolves_answer() {
		let (dialog, pending) = choice_modal(
			"Keep changes?",
			vec![Choice::new("discard", "Discard"), Choice::new("keep", "Keep")],
		)
		.unwrap();

		dialog.choose(1);

		assert!(!dialog.is_open());
		assert_eq!(pending.answer().await, "keep");
	}

	#[rstest]
	#[tokio::test]
	async fn test_dismiss_resolves_first_choice() {
		let (dialog, pending) =
			choice_modal("Pick", vec![Choice::new(1, "One"), Choice::new(2, "Two")]).unwrap();

		dialog.dismiss();
		dialog.choose(1);

		assert_eq!(pending.answer().await, 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_dropping_dialog_resolves_first_choice() {
		let (dialog, pending) =
			choice_modal("Pick", vec![Choice::new('a', "A"), Choice::new('b', "B")]).unwrap();
		drop(dialog);
		assert_eq!(pending.answer().await, 'a');
	}

	#[rstest]
	fn test_no_choices_is_error() {
		let result = choice_modal::<bool>("Empty", vec![]);
		assert!(matches!(result, Err(UiError::NoChoices)));
	}

	#[rstest]
	#[tokio::test]
	async fn test_confirm_defaults() {
		// Arrange
		let (dialog, pending) = confirm_modal(ConfirmOptions::default());

		// Assert
		assert_eq!(dialog.message(), "Are you sure you want to continue?");
		let choices = dialog.choices();
		assert_eq!(choices[0].text, "Cancel");
		assert_eq!(choices[0].button_colour(), "secondary");
		assert!(!choices[0].answer);
		assert_eq!(choices[1].text, "Continue");
		assert_eq!(choices[1].button_colour(), "primary");
		assert!(choices[1].answer);

		// Act
		dialog.choose(1);
		assert!(pending.answer().await);
	}

	#[rstest]
	#[tokio::test]
	async fn test_confirm_custom_labels() {
		let (dialog, pending) = confirm_modal(ConfirmOptions {
			message: Some("Delete 3 items?".into()),
			continue_text: Some("Delete".into()),
			continue_colour: Some("danger".into()),
			..ConfirmOptions::default()
		});

		assert_eq!(dialog.choices()[1].button_colour(), "danger");
		dialog.dismiss();
		assert!(!pending.answer().await);
	}
}
