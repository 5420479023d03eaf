//! Raw input handed to serializers and fields

use serde_json::Value;
use strata_http::QueryDict;

/// Primitive data as it arrives from a client
///
/// JSON bodies arrive as [`Input::Json`]. Form bodies and query strings
/// arrive as [`Input::Form`], where every value is a string and nested
/// structures are spelled out in the keys (`nested.one`, `items[0]name`).
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
	Json(Value),
	Form(QueryDict),
}

impl Input {
	pub fn is_form(&self) -> bool {
		matches!(self, Input::Form(_))
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Input::Json(Value::Null))
	}

	/// Whether the input is a key/value mapping
	pub fn is_mapping(&self) -> bool {
		matches!(self, Input::Form(_) | Input::Json(Value::Object(_)))
	}

	pub fn as_json(&self) -> Option<&Value> {
		match self {
			Input::Json(value) => Some(value),
			Input::Form(_) => None,
		}
	}

	/// JSON view of the input, flattening form data with [`QueryDict::to_value`]
	pub fn to_value(&self) -> Value {
		match self {
			Input::Json(value) => value.clone(),
			Input::Form(dict) => dict.to_value(),
		}
	}

	pub fn into_value(self) -> Value {
		match self {
			Input::Json(value) => value,
			Input::Form(dict) => dict.to_value(),
		}
	}

	/// Type name used in error messages
	///
	/// # Examples
	///
	/// ```
	/// use strata_serializers::Input;
	/// use serde_json::json;
	///
	/// assert_eq!(Input::from(json!("x")).type_name(), "string");
	/// assert_eq!(Input::from(json!([1])).type_name(), "array");
	/// ```
	pub fn type_name(&self) -> &'static str {
		match self {
			Input::Json(value) => json_type_name(value),
			Input::Form(_) => "object",
		}
	}
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

impl From<Value> for Input {
	fn from(value: Value) -> Self {
		Input::Json(value)
	}
}

impl From<QueryDict> for Input {
	fn from(dict: QueryDict) -> Self {
		Input::Form(dict)
	}
}
