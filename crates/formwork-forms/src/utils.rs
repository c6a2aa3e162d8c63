//! Small helpers shared by the widgets and the controller

use serde_json::Value;

/// Human readable title derived from a field name.
///
/// Underscores and hyphens become spaces and the first character of every
/// word is upper-cased; everything else is left untouched.
///
/// # Examples
///
/// ```
/// use formwork_forms::utils::as_title;
///
/// assert_eq!(as_title("first_name"), "First Name");
/// assert_eq!(as_title("date-of-birth"), "Date Of Birth");
/// assert_eq!(as_title("iOS"), "IOS");
/// ```
pub fn as_title(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	let mut in_word = false;
	for c in s.chars() {
		let c = if c == '_' || c == '-' { ' ' } else { c };
		if c.is_alphanumeric() {
			if in_word {
				out.push(c);
			} else {
				out.extend(c.to_uppercase());
			}
			in_word = true;
		} else {
			out.push(c);
			in_word = false;
		}
	}
	out
}

/// Drop repeated items, keeping the first occurrence of each.
pub fn filter_unique<T: PartialEq + Clone>(items: &[T]) -> Vec<T> {
	let mut out: Vec<T> = Vec::with_capacity(items.len());
	for item in items {
		if !out.contains(item) {
			out.push(item.clone());
		}
	}
	out
}

/// Symmetric-difference toggle: remove `key` when present, append otherwise.
///
/// # Examples
///
/// ```
/// use formwork_forms::utils::toggle;
///
/// let selected = vec!["a".to_string(), "b".to_string()];
/// let once = toggle(&selected, "c");
/// assert_eq!(once, ["a", "b", "c"]);
/// assert_eq!(toggle(&once, "c"), selected);
/// ```
pub fn toggle(selected: &[String], key: &str) -> Vec<String> {
	let mut out = filter_unique(selected);
	match out.iter().position(|v| v == key) {
		Some(index) => {
			out.remove(index);
		}
		None => out.push(key.to_string()),
	}
	out
}

/// Whether a value counts as "nothing entered".
///
/// `null`, `false`, the empty string and the empty list are blank; `0` is a
/// real answer and is not.
pub fn is_blank(value: Option<&Value>) -> bool {
	match value {
		None | Some(Value::Null) | Some(Value::Bool(false)) => true,
		Some(Value::String(s)) => s.is_empty(),
		Some(Value::Array(items)) => items.is_empty(),
		Some(_) => false,
	}
}

/// Blank, or a zero number.
///
/// Only initial values seeded into a submission use this rule; a `0` typed
/// by the user still counts as entered.
pub fn is_falsy(value: &Value) -> bool {
	match value {
		Value::Number(n) => n.as_f64() == Some(0.0),
		other => is_blank(Some(other)),
	}
}

/// String form of a scalar value as shown inside a text control.
pub(crate) fn display_value(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		Value::Array(items) => items
			.iter()
			.map(display_value)
			.collect::<Vec<_>>()
			.join(","),
		other => other.to_string(),
	}
}

/// Join a passed-in error with a control-local one, keeping both.
pub fn merge_errors(passed: Option<&str>, local: Option<&str>) -> Option<String> {
	match (passed, local) {
		(Some(p), Some(l)) => Some(format!("{}, {}", p, l)),
		(Some(e), None) | (None, Some(e)) => Some(e.to_string()),
		(None, None) => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("first_name", "First Name")]
	#[case("date-of-birth", "Date Of Birth")]
	#[case("already Title", "Already Title")]
	#[case("email", "Email")]
	#[case("address_line_2", "Address Line 2")]
	#[case("", "")]
	fn test_as_title(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(as_title(input), expected);
	}

	#[rstest]
	fn test_filter_unique_keeps_first_occurrence() {
		assert_eq!(filter_unique(&[1, 2, 3, 2, 4]), vec![1, 2, 3, 4]);
	}

	#[rstest]
	#[case(None, true)]
	#[case(Some(json!(null)), true)]
	#[case(Some(json!(false)), true)]
	#[case(Some(json!("")), true)]
	#[case(Some(json!([])), true)]
	#[case(Some(json!(0)), false)]
	#[case(Some(json!(true)), false)]
	#[case(Some(json!("x")), false)]
	#[case(Some(json!(["a"])), false)]
	fn test_is_blank(#[case] value: Option<Value>, #[case] blank: bool) {
		assert_eq!(is_blank(value.as_ref()), blank);
	}

	#[rstest]
	#[case(json!(0), true)]
	#[case(json!(0.0), true)]
	#[case(json!(null), true)]
	#[case(json!(""), true)]
	#[case(json!(3), false)]
	#[case(json!("0"), false)]
	fn test_is_falsy(#[case] value: Value, #[case] falsy: bool) {
		assert_eq!(is_falsy(&value), falsy);
	}

	#[rstest]
	#[case(Some("server"), Some("local"), Some("server, local"))]
	#[case(Some("server"), None, Some("server"))]
	#[case(None, Some("local"), Some("local"))]
	#[case(None, None, None)]
	fn test_merge_errors(
		#[case] passed: Option<&str>,
		#[case] local: Option<&str>,
		#[case] expected: Option<&str>,
	) {
		assert_eq!(merge_errors(passed, local).as_deref(), expected);
	}

	proptest! {
		#[test]
		fn prop_toggle_twice_is_identity(
			selected in proptest::collection::btree_set("[a-e]", 0..5),
			key in "[a-g]",
		) {
			let selected: Vec<String> = selected.into_iter().collect();
			let twice = toggle(&toggle(&selected, &key), &key);
			let mut sorted_twice = twice.clone();
			sorted_twice.sort();
			prop_assert_eq!(sorted_twice, selected);
		}

		#[test]
		fn prop_toggle_result_is_unique(
			selected in proptest::collection::vec("[a-c]", 0..6),
			key in "[a-c]",
		) {
			let toggled = toggle(&selected, &key);
			prop_assert_eq!(filter_unique(&toggled), toggled);
		}
	}
}
