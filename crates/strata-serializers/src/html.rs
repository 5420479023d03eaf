//! Nested structure in form-encoded keys
//!
//! Form data is flat, so nesting is encoded in the key names:
//!
//! - `profile.name=x` or `profile[name]=x` for a nested object
//! - `tags[0]=a&tags[1]=b` for a list of scalars
//! - `items[0]name=x` or `items[0].name=x` for a list of objects

use crate::input::Input;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use strata_http::QueryDict;

// `prefix.key...` or `prefix[key]...`
static DICT_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^([^.\[]+)(?:\.(.+)|\[([^\]]+)\](.*))$")
		.expect("DICT_KEY_REGEX: invalid regex pattern")
});

// `prefix[index]rest`
static LIST_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^([^\[]*)\[([0-9]+)\](.*)$").expect("LIST_KEY_REGEX: invalid regex pattern")
});

/// Collect the keys nested under `prefix` into their own dictionary
///
/// # Examples
///
/// ```
/// use strata_http::QueryDict;
/// use strata_serializers::html::parse_html_dict;
///
/// let dict = QueryDict::parse("profile.name=Ann&profile[age]=3&other=1").unwrap();
/// let nested = parse_html_dict(&dict, "profile");
/// assert_eq!(nested.get("name"), Some("Ann"));
/// assert_eq!(nested.get("age"), Some("3"));
/// assert_eq!(nested.len(), 2);
/// ```
pub fn parse_html_dict(dict: &QueryDict, prefix: &str) -> QueryDict {
	let mut nested = QueryDict::new();
	for (key, values) in dict.iter_lists() {
		let Some(caps) = DICT_KEY_REGEX.captures(key) else {
			continue;
		};
		if &caps[1] != prefix {
			continue;
		}
		let inner = match (caps.get(2), caps.get(3)) {
			(Some(dotted), _) => dotted.as_str().to_string(),
			(None, Some(bracketed)) => {
				let rest = caps.get(4).map_or("", |m| m.as_str());
				format!("{}{}", bracketed.as_str(), rest)
			}
			(None, None) => continue,
		};
		nested.set_list(inner, values.to_vec());
	}
	nested
}

enum ListItem {
	Scalar(String),
	Object(QueryDict),
}

/// Collect `prefix[N]...` keys into a list ordered by index
///
/// Returns `None` when no key matches.
///
/// # Examples
///
/// ```
/// use strata_http::QueryDict;
/// use strata_serializers::html::parse_html_list;
/// use strata_serializers::Input;
/// use serde_json::json;
///
/// let dict = QueryDict::parse("tags[1]=b&tags[0]=a").unwrap();
/// let items = parse_html_list(&dict, "tags").unwrap();
/// assert_eq!(items, vec![Input::from(json!("a")), Input::from(json!("b"))]);
///
/// assert!(parse_html_list(&dict, "other").is_none());
/// ```
pub fn parse_html_list(dict: &QueryDict, prefix: &str) -> Option<Vec<Input>> {
	let mut items: BTreeMap<usize, ListItem> = BTreeMap::new();
	for (key, values) in dict.iter_lists() {
		let Some(caps) = LIST_KEY_REGEX.captures(key) else {
			continue;
		};
		if &caps[1] != prefix {
			continue;
		}
		let Ok(index) = caps[2].parse::<usize>() else {
			continue;
		};
		let rest = caps[3].strip_prefix('.').unwrap_or(&caps[3]);
		if rest.is_empty() {
			if let Some(last) = values.last() {
				items.insert(index, ListItem::Scalar(last.clone()));
			}
			continue;
		}
		match items.get_mut(&index) {
			Some(ListItem::Object(object)) => object.set_list(rest, values.to_vec()),
			_ => {
				let mut object = QueryDict::new();
				object.set_list(rest, values.to_vec());
				items.insert(index, ListItem::Object(object));
			}
		}
	}

	if items.is_empty() {
		return None;
	}
	Some(
		items
			.into_values()
			.map(|item| match item {
				ListItem::Scalar(value) => Input::Json(Value::String(value)),
				ListItem::Object(object) => Input::Form(object),
			})
			.collect(),
	)
}

/// Keys of `dict` that index into the list `prefix`, with the prefix removed
///
/// The result parses back into items with `parse_html_list(&keys, "")`.
///
/// # Examples
///
/// ```
/// use strata_http::QueryDict;
/// use strata_serializers::html::list_keys;
///
/// let dict = QueryDict::parse("items[0]name=a&items[1].name=b&other=1").unwrap();
/// let keys = list_keys(&dict, "items");
/// assert_eq!(keys.get("[0]name"), Some("a"));
/// assert_eq!(keys.get("[1].name"), Some("b"));
/// assert_eq!(keys.len(), 2);
/// ```
pub fn list_keys(dict: &QueryDict, prefix: &str) -> QueryDict {
	let mut keys = QueryDict::new();
	for (key, values) in dict.iter_lists() {
		if let Some(caps) = LIST_KEY_REGEX.captures(key)
			&& &caps[1] == prefix
		{
			keys.set_list(&key[prefix.len()..], values.to_vec());
		}
	}
	keys
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("nested[one]=1")]
	#[case("nested.one=1")]
	fn test_parse_html_dict_notations(#[case] query: &str) {
		let dict = QueryDict::parse(query).unwrap();
		let nested = parse_html_dict(&dict, "nested");
		assert_eq!(nested.get("one"), Some("1"));
	}

	#[rstest]
	fn test_parse_html_dict_keeps_deeper_keys_parseable() {
		let dict = QueryDict::parse("a[b][c]=1&a.d.e=2").unwrap();
		let level_one = parse_html_dict(&dict, "a");

		assert_eq!(level_one.get("b[c]"), Some("1"));
		assert_eq!(level_one.get("d.e"), Some("2"));
		assert_eq!(parse_html_dict(&level_one, "b").get("c"), Some("1"));
		assert_eq!(parse_html_dict(&level_one, "d").get("e"), Some("2"));
	}

	#[rstest]
	fn test_parse_html_dict_ignores_other_prefixes() {
		let dict = QueryDict::parse("nestedx[one]=1&nested=2").unwrap();
		assert!(parse_html_dict(&dict, "nested").is_empty());
	}

	#[rstest]
	fn test_parse_html_list_of_objects() {
		let dict = QueryDict::parse("items[1]example=3&items[0].example=2").unwrap();
		let items = parse_html_list(&dict, "items").unwrap();

		assert_eq!(items.len(), 2);
		let Input::Form(first) = &items[0] else {
			panic!("expected form item");
		};
		assert_eq!(first.get("example"), Some("2"));
	}

	#[rstest]
	fn test_list_keys_round_trip_through_parse_html_list() {
		let dict = QueryDict::parse("items[0]example=2&items[1]example=3&items=x").unwrap();
		let keys = list_keys(&dict, "items");

		assert_eq!(keys.len(), 2);
		let items = parse_html_list(&keys, "").unwrap();
		assert_eq!(items.len(), 2);
	}

	#[rstest]
	fn test_parse_html_list_without_prefix() {
		let dict = QueryDict::parse("[0]=x&[2]=z").unwrap();
		let items = parse_html_list(&dict, "").unwrap();
		assert_eq!(
			items,
			vec![
				Input::Json(Value::String("x".into())),
				Input::Json(Value::String("z".into()))
			]
		);
	}
}
