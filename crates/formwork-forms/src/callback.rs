//! Cloneable callback wrapper used for form hooks.
//!
//! ## Example
//!
//! ```
//! use formwork_forms::Callback;
//!
//! let double = Callback::new(|n: i32| n * 2);
//! assert_eq!(double.call(21), 42);
//! ```

use std::fmt;
use std::sync::Arc;

/// A type-safe, cloneable callback.
///
/// `Callback` wraps a function in an `Arc`, so clones share the same
/// function and can be handed to any number of owners.
///
/// ## Type Parameters
///
/// - `Args`: The argument type the callback receives
/// - `Ret`: The return type of the callback (defaults to `()`)
pub struct Callback<Args, Ret = ()> {
	inner: Arc<dyn Fn(Args) -> Ret + Send + Sync + 'static>,
}

impl<Args, Ret> Callback<Args, Ret> {
	/// Creates a new Callback from a function or closure.
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(Args) -> Ret + Send + Sync + 'static,
	{
		Self { inner: Arc::new(f) }
	}

	/// Calls the callback with the given arguments.
	pub fn call(&self, args: Args) -> Ret {
		(self.inner)(args)
	}

	/// Whether two callbacks share the same function.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl<Args, Ret> Clone for Callback<Args, Ret> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<Args, Ret> fmt::Debug for Callback<Args, Ret> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Callback").finish_non_exhaustive()
	}
}

impl<F, Args, Ret> From<F> for Callback<Args, Ret>
where
	F: Fn(Args) -> Ret + Send + Sync + 'static,
{
	fn from(f: F) -> Self {
		Self::new(f)
	}
}
