//! Query-string construction

use serde_json::Value;

/// Build a `?key=value&...` query string.
///
/// Array values are repeated as one `key=value` pair per element, in order.
/// `null` values (and `null` array elements) are omitted. Keys and values
/// are percent-encoded. Returns an empty string when nothing remains.
///
/// # Examples
///
/// ```
/// use formwork_http::build_query;
/// use serde_json::json;
///
/// let args = [("tag", json!(["a", "b"])), ("page", json!(2)), ("q", json!(null))];
/// assert_eq!(build_query(args.iter().map(|(k, v)| (*k, v))), "?tag=a&tag=b&page=2");
/// ```
pub fn build_query<'a, I, K>(args: I) -> String
where
	I: IntoIterator<Item = (K, &'a Value)>,
	K: AsRef<str>,
{
	let mut pairs = Vec::new();
	for (name, value) in args {
		let name = name.as_ref();
		match value {
			Value::Array(items) => {
				for item in items {
					push_pair(&mut pairs, name, item);
				}
			}
			other => push_pair(&mut pairs, name, other),
		}
	}
	if pairs.is_empty() {
		String::new()
	} else {
		format!("?{}", pairs.join("&"))
	}
}

fn push_pair(pairs: &mut Vec<String>, name: &str, value: &Value) {
	let Some(text) = scalar_text(value) else {
		return;
	};
	pairs.push(format!(
		"{}={}",
		urlencoding::encode(name),
		urlencoding::encode(&text)
	));
}

fn scalar_text(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(s) => Some(s.clone()),
		Value::Bool(b) => Some(b.to_string()),
		Value::Number(n) => Some(n.to_string()),
		nested => Some(nested.to_string()),
	}
}
