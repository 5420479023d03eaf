//! Validation errors and error message templates
//!
//! Validation failures form a tree that mirrors the shape of the input:
//! a list of messages for a leaf field, a map of field name to detail for a
//! serializer, and a list of per-item details for a list.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A single human-readable error with a machine-readable code
///
/// Serializes as the bare message string.
///
/// # Examples
///
/// ```
/// use strata_serializers::ErrorMessage;
///
/// let msg = ErrorMessage::new("This field is required.", "required");
/// assert_eq!(msg, "This field is required.");
/// assert_eq!(msg.code(), "required");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
	message: String,
	code: String,
}

impl ErrorMessage {
	pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			code: code.into(),
		}
	}

	pub fn message(&self) -> &str {
		&self.message
	}

	pub fn code(&self) -> &str {
		&self.code
	}
}

impl fmt::Display for ErrorMessage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.message)
	}
}

impl PartialEq<str> for ErrorMessage {
	fn eq(&self, other: &str) -> bool {
		self.message == other
	}
}

impl PartialEq<&str> for ErrorMessage {
	fn eq(&self, other: &&str) -> bool {
		self.message == *other
	}
}

impl Serialize for ErrorMessage {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.message)
	}
}

/// Error tree produced by validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
	/// Messages attached to one value
	Messages(Vec<ErrorMessage>),
	/// Errors keyed by field name
	Fields(BTreeMap<String, ErrorDetail>),
	/// Errors of a list, one entry per item (empty `Fields` for valid items)
	Items(Vec<ErrorDetail>),
}

impl ErrorDetail {
	/// A detail holding one message
	pub fn message(message: impl Into<String>, code: impl Into<String>) -> Self {
		ErrorDetail::Messages(vec![ErrorMessage::new(message, code)])
	}

	/// A detail with no errors
	pub fn empty() -> Self {
		ErrorDetail::Fields(BTreeMap::new())
	}

	/// Whether the tree holds no message at all
	pub fn is_empty(&self) -> bool {
		match self {
			ErrorDetail::Messages(messages) => messages.is_empty(),
			ErrorDetail::Fields(fields) => fields.values().all(ErrorDetail::is_empty),
			ErrorDetail::Items(items) => items.iter().all(ErrorDetail::is_empty),
		}
	}

	/// Errors of a single field, if this is a field map
	pub fn get(&self, field: &str) -> Option<&ErrorDetail> {
		match self {
			ErrorDetail::Fields(fields) => fields.get(field),
			_ => None,
		}
	}

	/// Same tree with every message replaced by its code
	///
	/// # Examples
	///
	/// ```
	/// use strata_serializers::ErrorDetail;
	/// use serde_json::json;
	///
	/// let detail = ErrorDetail::message("This field may not be null.", "null");
	/// assert_eq!(detail.codes(), json!(["null"]));
	/// ```
	pub fn codes(&self) -> serde_json::Value {
		match self {
			ErrorDetail::Messages(messages) => serde_json::Value::Array(
				messages
					.iter()
					.map(|m| serde_json::Value::String(m.code.clone()))
					.collect(),
			),
			ErrorDetail::Fields(fields) => serde_json::Value::Object(
				fields
					.iter()
					.map(|(k, v)| (k.clone(), v.codes()))
					.collect(),
			),
			ErrorDetail::Items(items) => {
				serde_json::Value::Array(items.iter().map(ErrorDetail::codes).collect())
			}
		}
	}

	/// Combine two error trees
	///
	/// Messages concatenate, field maps merge key by key and item lists merge
	/// position by position. Messages meeting a field map are filed under
	/// `non_field_key`. Any other pair of shapes keeps `self`.
	///
	/// # Examples
	///
	/// ```
	/// use strata_serializers::{ErrorDetail, ValidationError};
	/// use serde_json::json;
	///
	/// let keyed = ValidationError::for_field("end", ErrorDetail::message("Before start.", "order"));
	/// let merged = ErrorDetail::message("Too long.", "span")
	///     .merge(keyed.into_detail(), "non_field_errors");
	/// assert_eq!(
	///     merged.to_value(),
	///     json!({"end": ["Before start."], "non_field_errors": ["Too long."]})
	/// );
	/// ```
	pub fn merge(self, other: ErrorDetail, non_field_key: &str) -> ErrorDetail {
		match (self, other) {
			(ErrorDetail::Messages(mut first), ErrorDetail::Messages(second)) => {
				first.extend(second);
				ErrorDetail::Messages(first)
			}
			(ErrorDetail::Fields(mut first), ErrorDetail::Fields(second)) => {
				for (name, detail) in second {
					let merged = match first.remove(&name) {
						Some(existing) => existing.merge(detail, non_field_key),
						None => detail,
					};
					first.insert(name, merged);
				}
				ErrorDetail::Fields(first)
			}
			(ErrorDetail::Items(first), ErrorDetail::Items(second)) => {
				let mut second = second.into_iter();
				let mut merged: Vec<ErrorDetail> = first
					.into_iter()
					.map(|item| match second.next() {
						Some(other) => item.merge(other, non_field_key),
						None => item,
					})
					.collect();
				merged.extend(second);
				ErrorDetail::Items(merged)
			}
			(ErrorDetail::Fields(mut fields), ErrorDetail::Messages(messages))
			| (ErrorDetail::Messages(messages), ErrorDetail::Fields(mut fields)) => {
				let merged = match fields.remove(non_field_key) {
					Some(existing) => existing.merge(ErrorDetail::Messages(messages), non_field_key),
					None => ErrorDetail::Messages(messages),
				};
				fields.insert(non_field_key.to_string(), merged);
				ErrorDetail::Fields(fields)
			}
			(kept, dropped) => {
				tracing::warn!(%dropped, "cannot merge error details of different shapes");
				kept
			}
		}
	}

	/// JSON form of the tree
	pub fn to_value(&self) -> serde_json::Value {
		match self {
			ErrorDetail::Messages(messages) => serde_json::Value::Array(
				messages
					.iter()
					.map(|m| serde_json::Value::String(m.message.clone()))
					.collect(),
			),
			ErrorDetail::Fields(fields) => serde_json::Value::Object(
				fields
					.iter()
					.map(|(k, v)| (k.clone(), v.to_value()))
					.collect(),
			),
			ErrorDetail::Items(items) => {
				serde_json::Value::Array(items.iter().map(ErrorDetail::to_value).collect())
			}
		}
	}
}

impl fmt::Display for ErrorDetail {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_value())
	}
}

impl Serialize for ErrorDetail {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			ErrorDetail::Messages(messages) => {
				let mut seq = serializer.serialize_seq(Some(messages.len()))?;
				for message in messages {
					seq.serialize_element(message)?;
				}
				seq.end()
			}
			ErrorDetail::Fields(fields) => {
				let mut map = serializer.serialize_map(Some(fields.len()))?;
				for (name, detail) in fields {
					map.serialize_entry(name, detail)?;
				}
				map.end()
			}
			ErrorDetail::Items(items) => {
				let mut seq = serializer.serialize_seq(Some(items.len()))?;
				for item in items {
					seq.serialize_element(item)?;
				}
				seq.end()
			}
		}
	}
}

/// Raised when a value fails validation
///
/// # Examples
///
/// ```
/// use strata_serializers::ValidationError;
///
/// let err = ValidationError::with_code("Must be even.", "even");
/// assert_eq!(err.detail().codes(), serde_json::json!(["even"]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{detail}")]
pub struct ValidationError {
	detail: ErrorDetail,
}

impl ValidationError {
	/// An error with code `invalid`
	pub fn new(message: impl Into<String>) -> Self {
		Self::with_code(message, "invalid")
	}

	pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
		Self {
			detail: ErrorDetail::message(message, code),
		}
	}

	pub fn from_detail(detail: ErrorDetail) -> Self {
		Self { detail }
	}

	/// Errors keyed by a single field name
	pub fn for_field(field: impl Into<String>, detail: ErrorDetail) -> Self {
		let mut fields = BTreeMap::new();
		fields.insert(field.into(), detail);
		Self::from_detail(ErrorDetail::Fields(fields))
	}

	pub fn detail(&self) -> &ErrorDetail {
		&self.detail
	}

	pub fn into_detail(self) -> ErrorDetail {
		self.detail
	}
}

impl From<ErrorMessage> for ValidationError {
	fn from(message: ErrorMessage) -> Self {
		Self::from_detail(ErrorDetail::Messages(vec![message]))
	}
}

/// Errors from misusing a serializer or rendering its output
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializerError {
	/// `validated_data`, `errors` or `data` read before `is_valid()`
	#[error("You must call `is_valid()` before accessing `{accessor}`")]
	NotValidated { accessor: &'static str },
	/// A value could not be converted to its output representation
	#[error("Cannot represent field `{field}`: {message}")]
	Representation { field: String, message: String },
}

impl SerializerError {
	/// A representation error not yet attributed to a field
	pub fn representation(message: impl Into<String>) -> Self {
		SerializerError::Representation {
			field: String::new(),
			message: message.into(),
		}
	}

	/// Attribute a representation error to `name`, prefixing any inner path
	///
	/// # Examples
	///
	/// ```
	/// use strata_serializers::SerializerError;
	///
	/// let err = SerializerError::representation("bad").in_field("two").in_field("nested");
	/// assert_eq!(err.to_string(), "Cannot represent field `nested.two`: bad");
	/// ```
	pub fn in_field(self, name: &str) -> Self {
		match self {
			SerializerError::Representation { field, message } => {
				let field = if field.is_empty() {
					name.to_string()
				} else {
					format!("{}.{}", name, field)
				};
				SerializerError::Representation { field, message }
			}
			other => other,
		}
	}
}

/// Message templates keyed by error code
///
/// Templates may contain `{name}` placeholders filled by [`ErrorMessages::render`].
///
/// # Examples
///
/// ```
/// use strata_serializers::ErrorMessages;
///
/// let messages = ErrorMessages::new()
///     .with("max_value", "Ensure this value is less than or equal to {max_value}.");
/// let msg = messages.render("max_value", &[("max_value", "10".to_string())]);
/// assert_eq!(msg, "Ensure this value is less than or equal to 10.");
/// assert_eq!(msg.code(), "max_value");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMessages {
	templates: BTreeMap<String, String>,
}

impl ErrorMessages {
	pub fn new() -> Self {
		Self::default()
	}

	/// Messages shared by every field
	pub fn base() -> Self {
		Self::new()
			.with("required", "This field is required.")
			.with("null", "This field may not be null.")
	}

	pub fn with(mut self, code: impl Into<String>, template: impl Into<String>) -> Self {
		self.set(code, template);
		self
	}

	pub fn set(&mut self, code: impl Into<String>, template: impl Into<String>) {
		self.templates.insert(code.into(), template.into());
	}

	pub fn get(&self, code: &str) -> Option<&str> {
		self.templates.get(code).map(String::as_str)
	}

	pub fn contains(&self, code: &str) -> bool {
		self.templates.contains_key(code)
	}

	/// Copy of `self` with `overrides` applied on top
	pub fn merged(&self, overrides: &ErrorMessages) -> Self {
		let mut merged = self.clone();
		for (code, template) in &overrides.templates {
			merged.set(code.clone(), template.clone());
		}
		merged
	}

	/// Render the template for `code`
	///
	/// An unknown code renders a generic message so validation can still
	/// report the failure.
	pub fn render(&self, code: &str, params: &[(&str, String)]) -> ErrorMessage {
		match self.get(code) {
			Some(template) => ErrorMessage::new(format_template(template, params), code),
			None => {
				tracing::warn!(code, "no error message template registered");
				ErrorMessage::new(format!("Invalid value ({}).", code), code)
			}
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.templates
			.iter()
			.map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

fn format_template(template: &str, params: &[(&str, String)]) -> String {
	params
		.iter()
		.fold(template.to_string(), |acc, (name, value)| {
			acc.replace(&format!("{{{}}}", name), value)
		})
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_error_detail_serializes_as_plain_json() {
		let mut fields = BTreeMap::new();
		fields.insert(
			"items".to_string(),
			ErrorDetail::Items(vec![
				ErrorDetail::empty(),
				ErrorDetail::message("A valid integer is required.", "invalid"),
			]),
		);
		let detail = ErrorDetail::Fields(fields);

		assert_eq!(
			serde_json::to_value(&detail).unwrap(),
			json!({"items": [{}, ["A valid integer is required."]]})
		);
		assert_eq!(serde_json::to_value(&detail).unwrap(), detail.to_value());
	}

	#[rstest]
	fn test_error_detail_is_empty() {
		assert!(ErrorDetail::empty().is_empty());
		assert!(ErrorDetail::Items(vec![ErrorDetail::empty(), ErrorDetail::empty()]).is_empty());
		assert!(!ErrorDetail::message("x", "invalid").is_empty());
	}

	#[rstest]
	fn test_codes_mirror_tree() {
		let err = ValidationError::for_field("age", ErrorDetail::message("Too big", "max_value"));
		assert_eq!(err.detail().codes(), json!({"age": ["max_value"]}));
	}

	#[rstest]
	fn test_merge_fields_recursively() {
		let first = ValidationError::for_field("start", ErrorDetail::message("Bad start.", "invalid"));
		let second = ValidationError::for_field("start", ErrorDetail::message("Too early.", "early"));
		let third = ValidationError::for_field("end", ErrorDetail::message("Bad end.", "invalid"));

		let merged = first
			.into_detail()
			.merge(second.into_detail(), "non_field_errors")
			.merge(third.into_detail(), "non_field_errors");
		assert_eq!(
			merged.to_value(),
			json!({"start": ["Bad start.", "Too early."], "end": ["Bad end."]})
		);
	}

	#[rstest]
	fn test_merge_items_by_position() {
		let first = ErrorDetail::Items(vec![ErrorDetail::empty(), ErrorDetail::message("a", "x")]);
		let second = ErrorDetail::Items(vec![
			ErrorDetail::message("b", "y"),
			ErrorDetail::message("c", "z"),
			ErrorDetail::message("d", "w"),
		]);

		assert_eq!(
			first.merge(second, "non_field_errors").to_value(),
			json!([{"non_field_errors": ["b"]}, ["a", "c"], ["d"]])
		);
	}

	#[rstest]
	fn test_merge_mismatched_shapes_keeps_first() {
		let items = ErrorDetail::Items(vec![ErrorDetail::message("a", "x")]);
		let merged = items
			.clone()
			.merge(ErrorDetail::message("b", "y"), "non_field_errors");
		assert_eq!(merged, items);
	}

	#[rstest]
	fn test_render_with_missing_template() {
		let msg = ErrorMessages::new().render("odd", &[]);
		assert_eq!(msg.code(), "odd");
		assert_eq!(msg, "Invalid value (odd).");
	}

	#[rstest]
	fn test_merged_overrides_take_precedence() {
		let overrides = ErrorMessages::new().with("null", "Give me something.");
		let merged = ErrorMessages::base().merged(&overrides);

		assert_eq!(merged.get("null"), Some("Give me something."));
		assert_eq!(merged.get("required"), Some("This field is required."));
	}

	#[rstest]
	fn test_validation_error_display() {
		let err = ValidationError::new("bad");
		assert_eq!(err.to_string(), r#"["bad"]"#);
	}
}
