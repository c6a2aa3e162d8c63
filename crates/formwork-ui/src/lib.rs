//! Headless UI primitives for formwork
//!
//! This crate provides:
//! - Toast messages with countdown, hover pause and closing animation timing
//! - Desktop notifications that fall back to toasts while the user is active
//! - Modals addressed by the current location, including modal forms
//! - Choice and confirmation dialogs resolved through a future
//! - Error, not-found and loading placeholders
//!
//! Nothing here draws anything: each primitive exposes the state a renderer
//! needs and the actions a user can take.

pub mod confirm;
pub mod error;
pub mod errors;
pub mod modal;
pub mod notify;
pub mod toast;

pub use confirm::{Choice, ChoiceDialog, ConfirmOptions, PendingChoice, choice_modal, confirm_modal};
pub use error::{UiError, UiResult};
pub use errors::ErrorView;
pub use modal::{
	History, MODAL_BODY_CLASS, MODAL_FOOTER_CLASS, MemoryHistory, ModalForm, ModalRoute, ModalView,
	NavigationType,
};
pub use notify::{
	ActivityTracker, Delivery, DesktopNotification, DesktopNotifications, Message, Notifier,
	Permission,
};
pub use toast::{Toast, ToastOptions, ToastStatus, Toaster};
