//! Reusable value validators
//!
//! Validators run after a field has converted its input to the internal
//! value. Every validator of a field runs, and all failures are reported
//! together.
//!
//! Closures of type `Fn(&Value) -> Result<(), ValidationError>` are
//! validators too:
//!
//! ```
//! use strata_serializers::validators::Validator;
//! use strata_serializers::ValidationError;
//! use serde_json::{json, Value};
//!
//! let even = |value: &Value| {
//!     if value.as_i64().is_some_and(|n| n % 2 == 0) {
//!         Ok(())
//!     } else {
//!         Err(ValidationError::with_code("Must be even.", "even"))
//!     }
//! };
//! assert!(even.validate(&json!(4)).is_ok());
//! assert!(even.validate(&json!(3)).is_err());
//! ```

use crate::errors::{ErrorMessage, ErrorMessages, ValidationError};
use crate::settings;
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::sync::Arc;

pub trait Validator: Send + Sync {
	fn validate(&self, value: &Value) -> Result<(), ValidationError>;
}

impl<F> Validator for F
where
	F: Fn(&Value) -> Result<(), ValidationError> + Send + Sync,
{
	fn validate(&self, value: &Value) -> Result<(), ValidationError> {
		self(value)
	}
}

/// Run every validator and merge their errors
///
/// Plain messages are concatenated. Errors keyed by field are merged into one
/// map, with plain messages filed under the non-field key.
pub fn run_all(validators: &[Arc<dyn Validator>], value: &Value) -> Result<(), ValidationError> {
	let non_field_key = &settings::get().non_field_errors_key;
	let merged = validators
		.iter()
		.filter_map(|validator| validator.validate(value).err())
		.map(ValidationError::into_detail)
		.reduce(|merged, detail| merged.merge(detail, non_field_key));
	match merged {
		Some(detail) => Err(ValidationError::from_detail(detail)),
		None => Ok(()),
	}
}

fn compare_numbers(value: &Number, limit: &Number) -> Option<Ordering> {
	match (value.as_i64(), limit.as_i64()) {
		(Some(v), Some(l)) => Some(v.cmp(&l)),
		_ => value.as_f64()?.partial_cmp(&limit.as_f64()?),
	}
}

fn render(
	messages: &ErrorMessages,
	code: &str,
	param: &str,
	value: String,
	fallback: &str,
) -> ErrorMessage {
	if messages.contains(code) {
		messages.render(code, &[(param, value)])
	} else {
		ErrorMessages::new()
			.with(code, fallback)
			.render(code, &[(param, value)])
	}
}

/// Rejects numbers greater than a limit
///
/// # Examples
///
/// ```
/// use strata_serializers::validators::{MaxValueValidator, Validator};
/// use serde_json::json;
///
/// let validator = MaxValueValidator::new(10);
/// assert!(validator.validate(&json!(10)).is_ok());
/// assert!(validator.validate(&json!(11)).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MaxValueValidator {
	limit: Number,
	messages: ErrorMessages,
}

impl MaxValueValidator {
	pub fn new(limit: impl Into<Number>) -> Self {
		Self {
			limit: limit.into(),
			messages: ErrorMessages::new(),
		}
	}

	/// Use the `max_value` template from `messages`
	pub fn with_messages(mut self, messages: ErrorMessages) -> Self {
		self.messages = messages;
		self
	}

	pub fn limit(&self) -> &Number {
		&self.limit
	}
}

impl Validator for MaxValueValidator {
	fn validate(&self, value: &Value) -> Result<(), ValidationError> {
		let Value::Number(number) = value else {
			return Ok(());
		};
		if compare_numbers(number, &self.limit) == Some(Ordering::Greater) {
			return Err(render(
				&self.messages,
				"max_value",
				"max_value",
				self.limit.to_string(),
				"Ensure this value is less than or equal to {max_value}.",
			)
			.into());
		}
		Ok(())
	}
}

/// Rejects numbers smaller than a limit
#[derive(Debug, Clone)]
pub struct MinValueValidator {
	limit: Number,
	messages: ErrorMessages,
}

impl MinValueValidator {
	pub fn new(limit: impl Into<Number>) -> Self {
		Self {
			limit: limit.into(),
			messages: ErrorMessages::new(),
		}
	}

	pub fn with_messages(mut self, messages: ErrorMessages) -> Self {
		self.messages = messages;
		self
	}

	pub fn limit(&self) -> &Number {
		&self.limit
	}
}

impl Validator for MinValueValidator {
	fn validate(&self, value: &Value) -> Result<(), ValidationError> {
		let Value::Number(number) = value else {
			return Ok(());
		};
		if compare_numbers(number, &self.limit) == Some(Ordering::Less) {
			return Err(render(
				&self.messages,
				"min_value",
				"min_value",
				self.limit.to_string(),
				"Ensure this value is greater than or equal to {min_value}.",
			)
			.into());
		}
		Ok(())
	}
}

// Characters for strings, elements for arrays.
fn length_of(value: &Value) -> Option<usize> {
	match value {
		Value::String(s) => Some(s.chars().count()),
		Value::Array(items) => Some(items.len()),
		_ => None,
	}
}

/// Rejects strings and arrays longer than a limit
///
/// # Examples
///
/// ```
/// use strata_serializers::validators::{MaxLengthValidator, Validator};
/// use serde_json::json;
///
/// let validator = MaxLengthValidator::new(3);
/// assert!(validator.validate(&json!("abc")).is_ok());
/// assert!(validator.validate(&json!([1, 2, 3, 4])).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MaxLengthValidator {
	limit: usize,
	messages: ErrorMessages,
}

impl MaxLengthValidator {
	pub fn new(limit: usize) -> Self {
		Self {
			limit,
			messages: ErrorMessages::new(),
		}
	}

	pub fn with_messages(mut self, messages: ErrorMessages) -> Self {
		self.messages = messages;
		self
	}
}

impl Validator for MaxLengthValidator {
	fn validate(&self, value: &Value) -> Result<(), ValidationError> {
		match length_of(value) {
			Some(len) if len > self.limit => Err(render(
				&self.messages,
				"max_length",
				"max_length",
				self.limit.to_string(),
				"Ensure this field has no more than {max_length} characters.",
			)
			.into()),
			_ => Ok(()),
		}
	}
}

/// Rejects strings and arrays shorter than a limit
#[derive(Debug, Clone)]
pub struct MinLengthValidator {
	limit: usize,
	messages: ErrorMessages,
}

impl MinLengthValidator {
	pub fn new(limit: usize) -> Self {
		Self {
			limit,
			messages: ErrorMessages::new(),
		}
	}

	pub fn with_messages(mut self, messages: ErrorMessages) -> Self {
		self.messages = messages;
		self
	}
}

impl Validator for MinLengthValidator {
	fn validate(&self, value: &Value) -> Result<(), ValidationError> {
		match length_of(value) {
			Some(len) if len < self.limit => Err(render(
				&self.messages,
				"min_length",
				"min_length",
				self.limit.to_string(),
				"Ensure this field has at least {min_length} characters.",
			)
			.into()),
			_ => Ok(()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::errors::ErrorDetail;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(json!(9), true)]
	#[case(json!(10), true)]
	#[case(json!(10.5), false)]
	#[case(json!(11), false)]
	fn test_max_value(#[case] value: Value, #[case] ok: bool) {
		assert_eq!(MaxValueValidator::new(10).validate(&value).is_ok(), ok);
	}

	#[rstest]
	fn test_max_value_ignores_non_numbers() {
		assert!(MaxValueValidator::new(1).validate(&json!("99")).is_ok());
	}

	#[rstest]
	fn test_min_value_message() {
		let err = MinValueValidator::new(5).validate(&json!(1)).unwrap_err();
		assert_eq!(
			err.detail().to_value(),
			json!(["Ensure this value is greater than or equal to 5."])
		);
	}

	#[rstest]
	fn test_length_counts_characters() {
		let validator = MaxLengthValidator::new(2);
		assert!(validator.validate(&json!("éé")).is_ok());
		assert!(validator.validate(&json!("ééé")).is_err());
	}

	#[rstest]
	fn test_custom_message_template() {
		let messages = ErrorMessages::new().with("min_length", "Need {min_length}+.");
		let err = MinLengthValidator::new(3)
			.with_messages(messages)
			.validate(&json!("ab"))
			.unwrap_err();
		assert_eq!(err.detail().to_value(), json!(["Need 3+."]));
	}

	#[rstest]
	fn test_run_all_collects_every_failure() {
		let validators: Vec<Arc<dyn Validator>> = vec![
			Arc::new(MaxValueValidator::new(1)),
			Arc::new(|_: &Value| Err::<(), _>(ValidationError::with_code("Nope.", "nope"))),
		];
		let err = run_all(&validators, &json!(5)).unwrap_err();

		assert_eq!(err.detail().codes(), json!(["max_value", "nope"]));
	}

	#[rstest]
	fn test_run_all_keeps_messages_next_to_keyed_errors() {
		let validators: Vec<Arc<dyn Validator>> = vec![
			Arc::new(MaxValueValidator::new(1)),
			Arc::new(|_: &Value| {
				Err::<(), _>(ValidationError::for_field(
					"end",
					ErrorDetail::message("Before start.", "order"),
				))
			}),
			Arc::new(|_: &Value| Err::<(), _>(ValidationError::with_code("Nope.", "nope"))),
		];
		let err = run_all(&validators, &json!(5)).unwrap_err();

		assert_eq!(
			err.detail().codes(),
			json!({"end": ["order"], "non_field_errors": ["max_value", "nope"]})
		);
	}

	#[rstest]
	fn test_run_all_passes_when_every_validator_passes() {
		let validators: Vec<Arc<dyn Validator>> = vec![
			Arc::new(MaxValueValidator::new(10)),
			Arc::new(MinValueValidator::new(0)),
		];
		assert!(run_all(&validators, &json!(5)).is_ok());
	}
}
