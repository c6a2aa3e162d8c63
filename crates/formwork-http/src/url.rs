//! Request URL resolution

use crate::error::{RequestError, RequestResult};
use std::fmt;
use std::sync::Arc;

type UrlBuilderFn = Arc<dyn Fn(&str) -> RequestResult<String> + Send + Sync>;

/// Resolve a request path against the configured API domain.
///
/// - absolute `http://` / `https://` URLs are returned unchanged
/// - relative paths must start with `/`
/// - domain `localhost` maps to `http://localhost:8000`
/// - any other domain maps to `https://{domain}`
/// - without a domain the path is returned unchanged
///
/// # Examples
///
/// ```
/// use formwork_http::make_url;
///
/// assert_eq!(make_url("/x/", Some("api.example.com")).unwrap(), "https://api.example.com/x/");
/// assert_eq!(make_url("/x/", Some("localhost")).unwrap(), "http://localhost:8000/x/");
/// assert_eq!(make_url("/x/", None).unwrap(), "/x/");
/// assert!(make_url("x/", None).is_err());
/// ```
pub fn make_url(path: &str, domain: Option<&str>) -> RequestResult<String> {
	if path.starts_with("http:/") || path.starts_with("https:/") {
		return Ok(path.to_string());
	}
	if !path.starts_with('/') {
		return Err(RequestError::InvalidPath(path.to_string()));
	}
	Ok(match domain {
		Some("localhost") => format!("http://localhost:8000{}", path),
		Some(domain) if !domain.is_empty() => format!("https://{}{}", domain, path),
		_ => path.to_string(),
	})
}

/// How [`crate::Requests`] turns a path into a URL.
#[derive(Clone)]
pub enum UrlResolver {
	/// [`make_url`] against an optional domain
	Domain(Option<String>),
	/// Caller-supplied builder
	Custom(UrlBuilderFn),
}

impl UrlResolver {
	pub fn custom<F>(f: F) -> Self
	where
		F: Fn(&str) -> RequestResult<String> + Send + Sync + 'static,
	{
		Self::Custom(Arc::new(f))
	}

	pub fn resolve(&self, path: &str) -> RequestResult<String> {
		match self {
			Self::Domain(domain) => make_url(path, domain.as_deref()),
			Self::Custom(f) => f(path),
		}
	}
}

impl Default for UrlResolver {
	fn default() -> Self {
		Self::Domain(None)
	}
}

impl fmt::Debug for UrlResolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Domain(domain) => f.debug_tuple("Domain").field(domain).finish(),
			Self::Custom(_) => f.write_str("Custom(..)"),
		}
	}
}
