//! Field declarations
//!
//! A field knows how to read its primitive value out of the input, turn it
//! into an internal value, validate it, and turn internal values back into
//! an output representation.
//!
//! Validation of one field follows the same steps for every field kind:
//!
//! 1. [`Field::get_value`] reads the primitive value (or finds it absent).
//! 2. [`Field::validate_empty_values`] settles absent and null values:
//!    skipped, defaulted, nulled, or rejected.
//! 3. [`Field::to_internal_value`] coerces a present value.
//! 4. [`Field::run_validators`] runs the attached validators.

pub mod boolean_field;
pub mod char_field;
pub mod float_field;
pub mod integer_field;

pub use boolean_field::BooleanField;
pub use char_field::CharField;
pub use float_field::FloatField;
pub use integer_field::IntegerField;

use crate::context::ValidationContext;
use crate::errors::{ErrorMessages, SerializerError, ValidationError};
use crate::input::Input;
use crate::validators::{self, Validator};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub type FieldResult<T> = Result<T, ValidationError>;

/// Options shared by every field kind
#[derive(Clone, Default)]
pub struct FieldOptions {
	/// `None` means "required unless read-only or defaulted"
	pub required: Option<bool>,
	pub allow_null: bool,
	pub read_only: bool,
	pub write_only: bool,
	/// Used when the field is absent from the input
	pub default: Option<Value>,
	/// Shown by unbound serializers
	pub initial: Option<Value>,
	/// Key read from instances and written to validated data
	pub source: Option<String>,
	pub validators: Vec<Arc<dyn Validator>>,
	/// Overrides for the field kind's default messages
	pub error_messages: ErrorMessages,
}

impl FieldOptions {
	pub fn is_required(&self) -> bool {
		self.required
			.unwrap_or(!self.read_only && self.default.is_none())
	}

	/// Key under which the field is read and written
	pub fn source_key<'a>(&'a self, field_name: &'a str) -> &'a str {
		self.source.as_deref().unwrap_or(field_name)
	}
}

impl fmt::Debug for FieldOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldOptions")
			.field("required", &self.required)
			.field("allow_null", &self.allow_null)
			.field("read_only", &self.read_only)
			.field("write_only", &self.write_only)
			.field("default", &self.default)
			.field("initial", &self.initial)
			.field("source", &self.source)
			.field("validators", &self.validators.len())
			.field("error_messages", &self.error_messages)
			.finish()
	}
}

/// Outcome of checking a value for absence or null
#[derive(Debug, Clone, PartialEq)]
pub enum EmptyValue {
	/// Leave the field out of the validated data
	Skip,
	/// The value is settled without further coercion
	Resolved(Value),
	/// The value is present and must be coerced
	Present(Input),
}

pub trait Field: fmt::Debug + Send + Sync {
	fn options(&self) -> &FieldOptions;

	/// Messages of the field kind, before per-field overrides
	fn default_error_messages(&self) -> &ErrorMessages;

	/// Coerce a present, non-empty primitive value
	fn to_internal_value(&self, data: Input, ctx: &ValidationContext) -> FieldResult<Value>;

	/// Convert an internal value to its output form
	fn to_representation(&self, value: &Value) -> Result<Value, SerializerError>;

	/// Message templates with per-field overrides applied
	fn error_messages(&self) -> ErrorMessages {
		self.default_error_messages()
			.merged(&self.options().error_messages)
	}

	fn fail(&self, code: &str, params: &[(&str, String)]) -> ValidationError {
		self.error_messages().render(code, params).into()
	}

	/// Value reported for a key missing from form input
	fn default_empty_html(&self) -> Option<Value> {
		None
	}

	/// Whether an empty string is an acceptable value
	fn allows_blank(&self) -> bool {
		false
	}

	/// Read the primitive value of `field_name` out of `data`
	///
	/// `None` means the field is absent.
	fn get_value(&self, field_name: &str, data: &Input, ctx: &ValidationContext) -> Option<Input> {
		default_get_value(self, field_name, data, ctx)
	}

	/// Value shown by an unbound serializer
	fn get_initial(&self) -> Value {
		self.options().initial.clone().unwrap_or(Value::Null)
	}

	/// Read the field's attribute from an instance
	fn get_attribute<'a>(&self, field_name: &str, instance: &'a Value) -> Option<&'a Value> {
		instance.get(self.options().source_key(field_name))
	}

	fn validate_empty_values(
		&self,
		data: Option<Input>,
		ctx: &ValidationContext,
	) -> FieldResult<EmptyValue> {
		default_validate_empty_values(self, data, ctx)
	}

	/// Validate a primitive value
	///
	/// `Ok(None)` means the field is skipped.
	fn run_validation(
		&self,
		data: Option<Input>,
		ctx: &ValidationContext,
	) -> FieldResult<Option<Value>> {
		default_run_validation(self, data, ctx)
	}

	/// Validators attached to the field, including those implied by its options
	fn validators(&self) -> Vec<Arc<dyn Validator>> {
		self.options().validators.clone()
	}

	fn run_validators(&self, value: &Value) -> FieldResult<()> {
		validators::run_all(&self.validators(), value)
	}
}

pub(crate) fn default_get_value<F: Field + ?Sized>(
	field: &F,
	field_name: &str,
	data: &Input,
	ctx: &ValidationContext,
) -> Option<Input> {
	match data {
		Input::Json(Value::Object(map)) => map.get(field_name).cloned().map(Input::Json),
		Input::Json(_) => None,
		Input::Form(dict) => {
			let Some(raw) = dict.get(field_name) else {
				if ctx.is_partial() {
					return None;
				}
				return field.default_empty_html().map(Input::Json);
			};
			if raw.is_empty() {
				let blank = field.allows_blank();
				if field.options().allow_null {
					return Some(Input::Json(if blank {
						Value::String(String::new())
					} else {
						Value::Null
					}));
				}
				if !field.options().is_required() {
					return blank.then(|| Input::Json(Value::String(String::new())));
				}
			}
			Some(Input::Json(Value::String(raw.to_string())))
		}
	}
}

pub(crate) fn default_validate_empty_values<F: Field + ?Sized>(
	field: &F,
	data: Option<Input>,
	ctx: &ValidationContext,
) -> FieldResult<EmptyValue> {
	let options = field.options();
	if options.read_only {
		return Ok(match &options.default {
			Some(default) if !ctx.is_partial() => EmptyValue::Resolved(default.clone()),
			_ => EmptyValue::Skip,
		});
	}

	let Some(data) = data else {
		if ctx.is_partial() {
			return Ok(EmptyValue::Skip);
		}
		if options.is_required() {
			return Err(field.fail("required", &[]));
		}
		return Ok(match &options.default {
			Some(default) => EmptyValue::Resolved(default.clone()),
			None => EmptyValue::Skip,
		});
	};

	if data.is_null() {
		if !options.allow_null {
			return Err(field.fail("null", &[]));
		}
		return Ok(EmptyValue::Resolved(Value::Null));
	}

	Ok(EmptyValue::Present(data))
}

pub(crate) fn default_run_validation<F: Field + ?Sized>(
	field: &F,
	data: Option<Input>,
	ctx: &ValidationContext,
) -> FieldResult<Option<Value>> {
	match field.validate_empty_values(data, ctx)? {
		EmptyValue::Skip => Ok(None),
		EmptyValue::Resolved(value) => Ok(Some(value)),
		EmptyValue::Present(input) => {
			let value = field.to_internal_value(input, ctx)?;
			field.run_validators(&value)?;
			Ok(Some(value))
		}
	}
}

/// Builder methods for the options every field shares
///
/// # Examples
///
/// ```
/// use strata_serializers::{Field, FieldBuilder, IntegerField};
/// use serde_json::json;
///
/// let field = IntegerField::new()
///     .required(false)
///     .allow_null(true)
///     .default_value(json!(0));
///
/// assert!(!field.options().is_required());
/// assert!(field.options().allow_null);
/// ```
pub trait FieldBuilder: Sized {
	fn options_mut(&mut self) -> &mut FieldOptions;

	fn required(mut self, required: bool) -> Self {
		self.options_mut().required = Some(required);
		self
	}

	fn allow_null(mut self, allow_null: bool) -> Self {
		self.options_mut().allow_null = allow_null;
		self
	}

	fn read_only(mut self, read_only: bool) -> Self {
		self.options_mut().read_only = read_only;
		self
	}

	fn write_only(mut self, write_only: bool) -> Self {
		self.options_mut().write_only = write_only;
		self
	}

	fn default_value(mut self, default: Value) -> Self {
		self.options_mut().default = Some(default);
		self
	}

	fn initial(mut self, initial: Value) -> Self {
		self.options_mut().initial = Some(initial);
		self
	}

	fn source(mut self, source: impl Into<String>) -> Self {
		self.options_mut().source = Some(source.into());
		self
	}

	fn validator(mut self, validator: impl Validator + 'static) -> Self {
		self.options_mut().validators.push(Arc::new(validator));
		self
	}

	fn error_message(mut self, code: impl Into<String>, template: impl Into<String>) -> Self {
		self.options_mut().error_messages.set(code, template);
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;
	use strata_http::QueryDict;

	fn ctx() -> ValidationContext {
		ValidationContext::with_max_depth(8, false)
	}

	#[rstest]
	fn test_required_defaults() {
		assert!(FieldOptions::default().is_required());

		let read_only = FieldOptions {
			read_only: true,
			..Default::default()
		};
		assert!(!read_only.is_required());

		let defaulted = FieldOptions {
			default: Some(json!(1)),
			..Default::default()
		};
		assert!(!defaulted.is_required());
	}

	#[rstest]
	fn test_missing_required_field() {
		let field = IntegerField::new();
		let err = field.run_validation(None, &ctx()).unwrap_err();
		assert_eq!(err.detail().to_value(), json!(["This field is required."]));
	}

	#[rstest]
	fn test_missing_optional_field_is_skipped() {
		let field = IntegerField::new().required(false);
		assert_eq!(field.run_validation(None, &ctx()).unwrap(), None);
	}

	#[rstest]
	fn test_missing_field_uses_default() {
		let field = IntegerField::new().default_value(json!(7));
		assert_eq!(field.run_validation(None, &ctx()).unwrap(), Some(json!(7)));
	}

	#[rstest]
	fn test_partial_skips_required() {
		let field = IntegerField::new();
		let partial = ValidationContext::with_max_depth(8, true);
		assert_eq!(field.run_validation(None, &partial).unwrap(), None);
	}

	#[rstest]
	fn test_null_rejected_unless_allowed() {
		let strict = IntegerField::new();
		let err = strict
			.run_validation(Some(Input::Json(Value::Null)), &ctx())
			.unwrap_err();
		assert_eq!(err.detail().codes(), json!(["null"]));

		let lenient = IntegerField::new().allow_null(true);
		assert_eq!(
			lenient
				.run_validation(Some(Input::Json(Value::Null)), &ctx())
				.unwrap(),
			Some(Value::Null)
		);
	}

	#[rstest]
	fn test_read_only_field_ignores_input() {
		let field = IntegerField::new().read_only(true);
		assert_eq!(
			field
				.run_validation(Some(Input::Json(json!("5"))), &ctx())
				.unwrap(),
			None
		);
	}

	#[rstest]
	fn test_form_empty_string_handling() {
		let dict = QueryDict::parse("count=").unwrap();
		let input = Input::Form(dict);

		let nullable = IntegerField::new().allow_null(true);
		assert_eq!(
			nullable.get_value("count", &input, &ctx()),
			Some(Input::Json(Value::Null))
		);

		let optional = IntegerField::new().required(false);
		assert_eq!(optional.get_value("count", &input, &ctx()), None);

		let required = IntegerField::new();
		assert_eq!(
			required.get_value("count", &input, &ctx()),
			Some(Input::Json(json!("")))
		);
	}

	#[rstest]
	fn test_custom_error_message_override() {
		let field = IntegerField::new().error_message("required", "Count is mandatory.");
		let err = field.run_validation(None, &ctx()).unwrap_err();
		assert_eq!(err.detail().to_value(), json!(["Count is mandatory."]));
	}

	#[rstest]
	fn test_attribute_read_through_source() {
		let field = IntegerField::new().source("total");
		let instance = json!({"total": 3, "count": 9});
		assert_eq!(field.get_attribute("count", &instance), Some(&json!(3)));
	}
}
