use crate::context::ValidationContext;
use crate::errors::{ErrorMessages, SerializerError};
use crate::fields::{self, Field, FieldBuilder, FieldOptions, FieldResult};
use crate::input::Input;
use crate::validators::{MaxLengthValidator, MinLengthValidator, Validator};
use serde_json::Value;
use std::sync::{Arc, LazyLock};

static MESSAGES: LazyLock<ErrorMessages> = LazyLock::new(|| {
	ErrorMessages::base()
		.with("invalid", "Not a valid string.")
		.with("blank", "This field may not be blank.")
		.with(
			"max_length",
			"Ensure this field has no more than {max_length} characters.",
		)
		.with(
			"min_length",
			"Ensure this field has at least {min_length} characters.",
		)
});

/// Text field
///
/// Numbers are accepted and converted to their textual form. Surrounding
/// whitespace is trimmed unless `trim_whitespace(false)` is set.
///
/// # Examples
///
/// ```
/// use strata_serializers::{CharField, Field, Input, ValidationContext};
/// use serde_json::json;
///
/// let field = CharField::new().max_length(5);
/// let ctx = ValidationContext::default();
///
/// assert_eq!(field.run_validation(Some(Input::from(json!("  abc "))), &ctx).unwrap(), Some(json!("abc")));
/// assert!(field.run_validation(Some(Input::from(json!(""))), &ctx).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct CharField {
	options: FieldOptions,
	pub allow_blank: bool,
	pub trim_whitespace: bool,
	pub max_length: Option<usize>,
	pub min_length: Option<usize>,
}

impl Default for CharField {
	fn default() -> Self {
		Self {
			options: FieldOptions::default(),
			allow_blank: false,
			trim_whitespace: true,
			max_length: None,
			min_length: None,
		}
	}
}

impl CharField {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn allow_blank(mut self, allow_blank: bool) -> Self {
		self.allow_blank = allow_blank;
		self
	}

	pub fn trim_whitespace(mut self, trim_whitespace: bool) -> Self {
		self.trim_whitespace = trim_whitespace;
		self
	}

	pub fn max_length(mut self, max_length: usize) -> Self {
		self.max_length = Some(max_length);
		self
	}

	pub fn min_length(mut self, min_length: usize) -> Self {
		self.min_length = Some(min_length);
		self
	}

	fn is_blank(&self, raw: &str) -> bool {
		raw.is_empty() || (self.trim_whitespace && raw.trim().is_empty())
	}
}

impl FieldBuilder for CharField {
	fn options_mut(&mut self) -> &mut FieldOptions {
		&mut self.options
	}
}

impl Field for CharField {
	fn options(&self) -> &FieldOptions {
		&self.options
	}

	fn default_error_messages(&self) -> &ErrorMessages {
		&MESSAGES
	}

	fn allows_blank(&self) -> bool {
		self.allow_blank
	}

	fn run_validation(
		&self,
		data: Option<Input>,
		ctx: &ValidationContext,
	) -> FieldResult<Option<Value>> {
		if let Some(Input::Json(Value::String(raw))) = &data
			&& self.is_blank(raw)
		{
			if !self.allow_blank {
				return Err(self.fail("blank", &[]));
			}
			return Ok(Some(Value::String(String::new())));
		}
		fields::default_run_validation(self, data, ctx)
	}

	fn to_internal_value(&self, data: Input, _ctx: &ValidationContext) -> FieldResult<Value> {
		let text = match data {
			Input::Json(Value::String(raw)) => raw,
			Input::Json(Value::Number(number)) => number.to_string(),
			_ => return Err(self.fail("invalid", &[])),
		};
		Ok(Value::String(if self.trim_whitespace {
			text.trim().to_string()
		} else {
			text
		}))
	}

	fn to_representation(&self, value: &Value) -> Result<Value, SerializerError> {
		Ok(match value {
			Value::String(text) => Value::String(text.clone()),
			other => Value::String(other.to_string()),
		})
	}

	fn validators(&self) -> Vec<Arc<dyn Validator>> {
		let messages = self.error_messages();
		let mut validators: Vec<Arc<dyn Validator>> = Vec::new();
		if let Some(max) = self.max_length {
			validators.push(Arc::new(
				MaxLengthValidator::new(max).with_messages(messages.clone()),
			));
		}
		if let Some(min) = self.min_length {
			validators.push(Arc::new(MinLengthValidator::new(min).with_messages(messages)));
		}
		validators.extend(self.options.validators.iter().cloned());
		validators
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;
	use strata_http::QueryDict;

	fn ctx() -> ValidationContext {
		ValidationContext::with_max_depth(4, false)
	}

	fn validate(field: &CharField, value: Value) -> FieldResult<Option<Value>> {
		field.run_validation(Some(Input::Json(value)), &ctx())
	}

	#[rstest]
	fn test_charfield_trims_by_default() {
		assert_eq!(
			validate(&CharField::new(), json!("  hi  ")).unwrap(),
			Some(json!("hi"))
		);
		assert_eq!(
			validate(&CharField::new().trim_whitespace(false), json!("  hi  ")).unwrap(),
			Some(json!("  hi  "))
		);
	}

	#[rstest]
	#[case(json!(""))]
	#[case(json!("   "))]
	fn test_charfield_blank_rejected(#[case] value: Value) {
		let err = validate(&CharField::new(), value).unwrap_err();
		assert_eq!(err.detail().to_value(), json!(["This field may not be blank."]));
	}

	#[rstest]
	fn test_charfield_blank_allowed() {
		let field = CharField::new().allow_blank(true);
		assert_eq!(validate(&field, json!("   ")).unwrap(), Some(json!("")));
	}

	#[rstest]
	fn test_charfield_numbers_become_text() {
		assert_eq!(validate(&CharField::new(), json!(12)).unwrap(), Some(json!("12")));
	}

	#[rstest]
	#[case(json!(true))]
	#[case(json!([]))]
	#[case(json!({}))]
	fn test_charfield_invalid(#[case] value: Value) {
		let err = validate(&CharField::new(), value).unwrap_err();
		assert_eq!(err.detail().codes(), json!(["invalid"]));
	}

	#[rstest]
	fn test_charfield_length_bounds() {
		let field = CharField::new().min_length(2).max_length(3);

		assert_eq!(
			validate(&field, json!("a")).unwrap_err().detail().to_value(),
			json!(["Ensure this field has at least 2 characters."])
		);
		assert_eq!(
			validate(&field, json!("abcd")).unwrap_err().detail().to_value(),
			json!(["Ensure this field has no more than 3 characters."])
		);
	}

	#[rstest]
	fn test_charfield_form_empty_value_when_blank_allowed() {
		let input = Input::Form(QueryDict::parse("name=").unwrap());
		let field = CharField::new().allow_blank(true).required(false);

		assert_eq!(
			field.get_value("name", &input, &ctx()),
			Some(Input::Json(json!("")))
		);
	}
}
