use crate::context::ValidationContext;
use crate::errors::{ErrorMessages, SerializerError};
use crate::fields::{Field, FieldBuilder, FieldOptions, FieldResult};
use crate::input::Input;
use crate::validators::{MaxValueValidator, MinValueValidator, Validator};
use serde_json::{Number, Value};
use std::sync::{Arc, LazyLock};

const MAX_STRING_LENGTH: usize = 1000;

static MESSAGES: LazyLock<ErrorMessages> = LazyLock::new(|| {
	ErrorMessages::base()
		.with("invalid", "A valid number is required.")
		.with(
			"max_value",
			"Ensure this value is less than or equal to {max_value}.",
		)
		.with(
			"min_value",
			"Ensure this value is greater than or equal to {min_value}.",
		)
		.with("max_string_length", "String value too large.")
});

/// FloatField for floating-point number input
#[derive(Debug, Clone, Default)]
pub struct FloatField {
	options: FieldOptions,
	pub max_value: Option<f64>,
	pub min_value: Option<f64>,
}

impl FloatField {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn max_value(mut self, max_value: f64) -> Self {
		self.max_value = Some(max_value);
		self
	}

	pub fn min_value(mut self, min_value: f64) -> Self {
		self.min_value = Some(min_value);
		self
	}
}

impl FieldBuilder for FloatField {
	fn options_mut(&mut self) -> &mut FieldOptions {
		&mut self.options
	}
}

impl Field for FloatField {
	fn options(&self) -> &FieldOptions {
		&self.options
	}

	fn default_error_messages(&self) -> &ErrorMessages {
		&MESSAGES
	}

	fn to_internal_value(&self, data: Input, _ctx: &ValidationContext) -> FieldResult<Value> {
		let num = match data {
			Input::Json(Value::Number(number)) => number.as_f64(),
			Input::Json(Value::String(raw)) => {
				if raw.len() > MAX_STRING_LENGTH {
					return Err(self.fail("max_string_length", &[]));
				}
				raw.trim().parse::<f64>().ok()
			}
			_ => None,
		};
		num.filter(|n| n.is_finite())
			.and_then(Number::from_f64)
			.map(Value::Number)
			.ok_or_else(|| self.fail("invalid", &[]))
	}

	fn to_representation(&self, value: &Value) -> Result<Value, SerializerError> {
		let represented = match value {
			Value::Number(number) => number.as_f64(),
			Value::String(raw) => raw.trim().parse::<f64>().ok(),
			_ => None,
		};
		represented
			.and_then(Number::from_f64)
			.map(Value::Number)
			.ok_or_else(|| SerializerError::representation(format!("{} is not a number", value)))
	}

	fn validators(&self) -> Vec<Arc<dyn Validator>> {
		let messages = self.error_messages();
		let mut validators: Vec<Arc<dyn Validator>> = Vec::new();
		if let Some(max) = self.max_value.and_then(Number::from_f64) {
			validators.push(Arc::new(
				MaxValueValidator::new(max).with_messages(messages.clone()),
			));
		}
		if let Some(min) = self.min_value.and_then(Number::from_f64) {
			validators.push(Arc::new(MinValueValidator::new(min).with_messages(messages)));
		}
		validators.extend(self.options.validators.iter().cloned());
		validators
	}
}
