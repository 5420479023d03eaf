use crate::context::ValidationContext;
use crate::errors::{ErrorMessages, SerializerError};
use crate::fields::{Field, FieldBuilder, FieldOptions, FieldResult};
use crate::input::Input;
use serde_json::Value;
use std::sync::LazyLock;

static MESSAGES: LazyLock<ErrorMessages> =
	LazyLock::new(|| ErrorMessages::base().with("invalid", "Must be a valid boolean."));

const TRUE_VALUES: &[&str] = &[
	"t", "T", "y", "Y", "yes", "Yes", "YES", "true", "True", "TRUE", "on", "On", "ON", "1",
];
const FALSE_VALUES: &[&str] = &[
	"f", "F", "n", "N", "no", "No", "NO", "false", "False", "FALSE", "off", "Off", "OFF", "0",
];
const NULL_VALUES: &[&str] = &["null", "Null", "NULL", ""];

/// Boolean field accepting common textual spellings
///
/// An unchecked checkbox sends nothing, so a boolean missing from form input
/// is read as `false`.
#[derive(Debug, Clone, Default)]
pub struct BooleanField {
	options: FieldOptions,
}

impl BooleanField {
	pub fn new() -> Self {
		Self::default()
	}

	fn parse(value: &Value) -> Option<bool> {
		match value {
			Value::Bool(flag) => Some(*flag),
			Value::String(raw) if TRUE_VALUES.contains(&raw.as_str()) => Some(true),
			Value::String(raw) if FALSE_VALUES.contains(&raw.as_str()) => Some(false),
			Value::Number(number) => match number.as_f64() {
				Some(n) if n == 1.0 => Some(true),
				Some(n) if n == 0.0 => Some(false),
				_ => None,
			},
			_ => None,
		}
	}
}

impl FieldBuilder for BooleanField {
	fn options_mut(&mut self) -> &mut FieldOptions {
		&mut self.options
	}
}

impl Field for BooleanField {
	fn options(&self) -> &FieldOptions {
		&self.options
	}

	fn default_error_messages(&self) -> &ErrorMessages {
		&MESSAGES
	}

	fn default_empty_html(&self) -> Option<Value> {
		Some(Value::Bool(false))
	}

	fn get_initial(&self) -> Value {
		self.options.initial.clone().unwrap_or(Value::Bool(false))
	}

	fn to_internal_value(&self, data: Input, _ctx: &ValidationContext) -> FieldResult<Value> {
		let Input::Json(value) = data else {
			return Err(self.fail("invalid", &[]));
		};
		if let Some(flag) = Self::parse(&value) {
			return Ok(Value::Bool(flag));
		}
		if self.options.allow_null
			&& let Value::String(raw) = &value
			&& NULL_VALUES.contains(&raw.as_str())
		{
			return Ok(Value::Null);
		}
		Err(self.fail("invalid", &[]))
	}

	fn to_representation(&self, value: &Value) -> Result<Value, SerializerError> {
		Ok(match Self::parse(value) {
			Some(flag) => Value::Bool(flag),
			None => Value::Bool(match value {
				Value::Null => false,
				Value::String(raw) => !raw.is_empty(),
				Value::Array(items) => !items.is_empty(),
				Value::Object(map) => !map.is_empty(),
				_ => true,
			}),
		})
	}
}
