//! Multi-value form data
//!
//! A [`QueryDict`] maps each key to an ordered list of values, the way
//! `application/x-www-form-urlencoded` bodies and query strings carry them.
//! Single-value access returns the last value given for a key.

use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

/// Errors raised while decoding form-encoded data
#[derive(Debug, thiserror::Error)]
pub enum QueryDictError {
	#[error("Failed to decode form data: {0}")]
	Decode(#[from] serde_urlencoded::de::Error),
}

/// An ordered multi-value dictionary
///
/// Keys keep the order in which they were first seen.
///
/// # Examples
///
/// ```
/// use strata_http::QueryDict;
///
/// let dict = QueryDict::parse("tag=a&tag=b&name=x").unwrap();
/// assert_eq!(dict.get("tag"), Some("b"));
/// assert_eq!(dict.get_list("tag"), &["a".to_string(), "b".to_string()]);
/// assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["tag", "name"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDict {
	entries: IndexMap<String, Vec<String>>,
}

impl QueryDict {
	/// Create an empty dictionary
	pub fn new() -> Self {
		Self::default()
	}

	/// Decode a form-encoded string
	///
	/// An empty string produces an empty dictionary.
	///
	/// # Examples
	///
	/// ```
	/// use strata_http::QueryDict;
	///
	/// assert!(QueryDict::parse("").unwrap().is_empty());
	///
	/// let dict = QueryDict::parse("nested%5Bone%5D=1").unwrap();
	/// assert_eq!(dict.get("nested[one]"), Some("1"));
	/// ```
	pub fn parse(input: &str) -> Result<Self, QueryDictError> {
		let pairs: Vec<(String, String)> = serde_urlencoded::from_str(input)?;
		Ok(pairs.into_iter().collect())
	}

	/// Last value for `key`
	pub fn get(&self, key: &str) -> Option<&str> {
		self.get_list(key).last().map(String::as_str)
	}

	/// All values for `key`, empty when the key is missing
	pub fn get_list(&self, key: &str) -> &[String] {
		self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
	}

	/// Add a value to the list kept for `key`
	pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.entries
			.entry(key.into())
			.or_default()
			.push(value.into());
	}

	/// Replace every value of `key`
	pub fn set_list(&mut self, key: impl Into<String>, values: Vec<String>) {
		self.entries.insert(key.into(), values);
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	/// Iterate over `(key, values)` pairs
	pub fn iter_lists(&self) -> impl Iterator<Item = (&str, &[String])> {
		self.entries
			.iter()
			.map(|(k, values)| (k.as_str(), values.as_slice()))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Convert to a JSON object
	///
	/// Keys with one value map to a string, keys with several values map to
	/// an array of strings.
	///
	/// # Examples
	///
	/// ```
	/// use strata_http::QueryDict;
	/// use serde_json::json;
	///
	/// let dict = QueryDict::parse("a=1&b=2&b=3").unwrap();
	/// assert_eq!(dict.to_value(), json!({"a": "1", "b": ["2", "3"]}));
	/// ```
	pub fn to_value(&self) -> serde_json::Value {
		let map = self
			.entries
			.iter()
			.map(|(key, values)| {
				let value = match values.as_slice() {
					[single] => serde_json::Value::String(single.clone()),
					many => serde_json::Value::Array(
						many.iter().cloned().map(serde_json::Value::String).collect(),
					),
				};
				(key.clone(), value)
			})
			.collect();
		serde_json::Value::Object(map)
	}
}

impl<K, V> FromIterator<(K, V)> for QueryDict
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut dict = Self::new();
		for (key, value) in iter {
			dict.append(key, value);
		}
		dict
	}
}

impl FromStr for QueryDict {
	type Err = QueryDictError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl fmt::Display for QueryDict {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let pairs: Vec<(&str, &str)> = self
			.entries
			.iter()
			.flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str())))
			.collect();
		let encoded = serde_urlencoded::to_string(pairs).map_err(|_| fmt::Error)?;
		f.write_str(&encoded)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_parse_empty() {
		let dict = QueryDict::parse("").unwrap();
		assert!(dict.is_empty());
		assert_eq!(dict.len(), 0);
	}

	#[rstest]
	fn test_parse_repeated_keys_keep_order() {
		let dict = QueryDict::parse("b=1&a=2&b=3").unwrap();

		assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["b", "a"]);
		assert_eq!(dict.get("b"), Some("3"));
		assert_eq!(dict.get_list("b"), &["1".to_string(), "3".to_string()]);
	}

	#[rstest]
	fn test_parse_bracket_keys_unencoded() {
		let dict = QueryDict::parse("nested[one]=1").unwrap();
		assert_eq!(dict.get("nested[one]"), Some("1"));
	}

	#[rstest]
	fn test_parse_plus_as_space() {
		let dict = QueryDict::parse("name=John+Doe").unwrap();
		assert_eq!(dict.get("name"), Some("John Doe"));
	}

	#[rstest]
	fn test_missing_key() {
		let dict = QueryDict::parse("a=1").unwrap();

		assert_eq!(dict.get("b"), None);
		assert!(dict.get_list("b").is_empty());
		assert!(!dict.contains_key("b"));
	}

	#[rstest]
	fn test_set_list_replaces_values() {
		let mut dict: QueryDict = [("a", "1"), ("a", "2")].into_iter().collect();
		dict.set_list("a", vec!["9".to_string()]);

		assert_eq!(dict.get_list("a"), &["9".to_string()]);
	}

	#[rstest]
	#[case(10)]
	#[case(50_000)]
	fn test_parse_many_distinct_keys(#[case] count: usize) {
		let body = (0..count)
			.map(|i| format!("k{}={}", i, i))
			.collect::<Vec<_>>()
			.join("&");
		let dict = QueryDict::parse(&body).unwrap();

		assert_eq!(dict.len(), count);
		assert_eq!(dict.keys().next(), Some("k0"));
		assert_eq!(dict.keys().last(), Some(format!("k{}", count - 1).as_str()));
		assert_eq!(dict.get(&format!("k{}", count / 2)), Some((count / 2).to_string().as_str()));
	}

	#[rstest]
	fn test_set_list_keeps_first_insertion_position() {
		let mut dict: QueryDict = [("a", "1"), ("b", "2")].into_iter().collect();
		dict.set_list("a", vec!["3".to_string()]);

		assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["a", "b"]);
	}

	#[rstest]
	fn test_display_encodes_pairs() {
		let dict: QueryDict = [("q", "a b"), ("q", "c")].into_iter().collect();
		assert_eq!(dict.to_string(), "q=a+b&q=c");
	}

	#[rstest]
	fn test_from_str() {
		let dict: QueryDict = "x=1".parse().unwrap();
		assert_eq!(dict.get("x"), Some("1"));
	}
}
