//! JSON request helper for formwork
//!
//! This crate provides:
//! - URL resolution against a configured API domain
//! - Query string building with repeated keys for list values
//! - A configurable status policy separating expected responses, structured
//!   failures and unexpected statuses
//! - A transport seam with a reqwest implementation that keeps cookies
//!
//! ```no_run
//! use formwork_http::{RequestConfig, Requests};
//! use formwork_conf::Settings;
//! use serde_json::json;
//!
//! # async fn run() -> formwork_http::RequestResult<()> {
//! let requests = Requests::from_settings(&Settings::default())?;
//! let response = requests
//!     .get("/items/", RequestConfig::new().arg("page", json!(2)))
//!     .await?;
//! println!("{}", response.data);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod policy;
pub mod query;
pub mod submit;
pub mod transport;
pub mod url;

pub use client::{RequestConfig, Requests, Response};
pub use error::{RequestContext, RequestError, RequestResult};
pub use policy::{StatusClass, StatusPolicy};
pub use query::build_query;
pub use submit::SubmitTarget;
pub use transport::{
	HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, ReqwestTransportBuilder,
	TransportError,
};
pub use url::{UrlResolver, make_url};

pub use http::Method;
