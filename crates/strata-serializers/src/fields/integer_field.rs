use crate::context::ValidationContext;
use crate::errors::{ErrorMessages, SerializerError};
use crate::fields::{Field, FieldBuilder, FieldOptions, FieldResult};
use crate::input::Input;
use crate::validators::{MaxValueValidator, MinValueValidator, Validator};
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, LazyLock};

/// Longest string accepted before parsing is attempted
const MAX_STRING_LENGTH: usize = 1000;

static MESSAGES: LazyLock<ErrorMessages> = LazyLock::new(|| {
	ErrorMessages::base()
		.with("invalid", "A valid integer is required.")
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

// A zero fraction is allowed: "3.0" and "3.00 " are both 3.
static ZERO_FRACTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\.0*\s*$").expect("ZERO_FRACTION_REGEX: invalid regex pattern")
});

/// Integer field accepting numbers and numeric strings
///
/// # Examples
///
/// ```
/// use strata_serializers::{Field, Input, IntegerField, ValidationContext};
/// use serde_json::json;
///
/// let field = IntegerField::new().max_value(10);
/// let ctx = ValidationContext::default();
///
/// assert_eq!(field.run_validation(Some(Input::from(json!("1"))), &ctx).unwrap(), Some(json!(1)));
/// assert!(field.run_validation(Some(Input::from(json!("11"))), &ctx).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct IntegerField {
	options: FieldOptions,
	pub max_value: Option<i64>,
	pub min_value: Option<i64>,
}

impl IntegerField {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn max_value(mut self, max_value: i64) -> Self {
		self.max_value = Some(max_value);
		self
	}

	pub fn min_value(mut self, min_value: i64) -> Self {
		self.min_value = Some(min_value);
		self
	}

	fn parse_str(&self, raw: &str) -> FieldResult<i64> {
		if raw.len() > MAX_STRING_LENGTH {
			return Err(self.fail("max_string_length", &[]));
		}
		ZERO_FRACTION_REGEX
			.replace(raw, "")
			.trim()
			.parse::<i64>()
			.map_err(|_| self.fail("invalid", &[]))
	}
}

impl FieldBuilder for IntegerField {
	fn options_mut(&mut self) -> &mut FieldOptions {
		&mut self.options
	}
}

impl Field for IntegerField {
	fn options(&self) -> &FieldOptions {
		&self.options
	}

	fn default_error_messages(&self) -> &ErrorMessages {
		&MESSAGES
	}

	fn to_internal_value(&self, data: Input, _ctx: &ValidationContext) -> FieldResult<Value> {
		let parsed = match data {
			Input::Json(Value::Number(number)) => {
				if let Some(i) = number.as_i64() {
					i
				} else if let Some(f) = number.as_f64()
					&& f.is_finite()
					&& f.fract() == 0.0
					&& f >= i64::MIN as f64
					// i64::MAX rounds up to 2^63 as a float, which does not fit
					&& f < i64::MAX as f64
				{
					f as i64
				} else {
					return Err(self.fail("invalid", &[]));
				}
			}
			Input::Json(Value::String(raw)) => self.parse_str(&raw)?,
			_ => return Err(self.fail("invalid", &[])),
		};
		Ok(Value::from(parsed))
	}

	fn to_representation(&self, value: &Value) -> Result<Value, SerializerError> {
		let represented = match value {
			Value::Number(number) => number
				.as_i64()
				.or_else(|| number.as_f64().map(|f| f.trunc() as i64)),
			Value::String(raw) => ZERO_FRACTION_REGEX.replace(raw, "").trim().parse().ok(),
			Value::Bool(flag) => Some(i64::from(*flag)),
			_ => None,
		};
		represented.map(Value::from).ok_or_else(|| {
			SerializerError::representation(format!("{} is not an integer", value))
		})
	}

	fn validators(&self) -> Vec<Arc<dyn Validator>> {
		let messages = self.error_messages();
		let mut validators: Vec<Arc<dyn Validator>> = Vec::new();
		if let Some(max) = self.max_value {
			validators.push(Arc::new(
				MaxValueValidator::new(max).with_messages(messages.clone()),
			));
		}
		if let Some(min) = self.min_value {
			validators.push(Arc::new(MinValueValidator::new(min).with_messages(messages)));
		}
		validators.extend(self.options.validators.iter().cloned());
		validators
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;
	use serde_json::json;

	fn validate(field: &IntegerField, value: Value) -> FieldResult<Option<Value>> {
		field.run_validation(Some(Input::Json(value)), &ValidationContext::with_max_depth(4, false))
	}

	#[rstest]
	#[case(json!(1), 1)]
	#[case(json!("1"), 1)]
	#[case(json!(" 42 "), 42)]
	#[case(json!("3.0"), 3)]
	#[case(json!("3.00"), 3)]
	#[case(json!(2.0), 2)]
	#[case(json!("-7"), -7)]
	fn test_integerfield_coercion(#[case] input: Value, #[case] expected: i64) {
		let field = IntegerField::new();
		assert_eq!(validate(&field, input).unwrap(), Some(json!(expected)));
	}

	#[rstest]
	#[case(json!("abc"))]
	#[case(json!("1.5"))]
	#[case(json!(1.5))]
	#[case(json!(true))]
	#[case(json!([1]))]
	#[case(json!({"n": 1}))]
	#[case(json!(""))]
	fn test_integerfield_invalid(#[case] input: Value) {
		let field = IntegerField::new();
		let err = validate(&field, input).unwrap_err();
		assert_eq!(err.detail().to_value(), json!(["A valid integer is required."]));
	}

	#[rstest]
	#[case(json!(9223372036854775808.0))]
	#[case(json!(1e300))]
	#[case(json!(-9223372036854777856.0))]
	fn test_integerfield_float_out_of_range(#[case] input: Value) {
		let err = validate(&IntegerField::new(), input).unwrap_err();
		assert_eq!(err.detail().codes(), json!(["invalid"]));
	}

	#[rstest]
	fn test_integerfield_float_at_lower_bound() {
		assert_eq!(
			validate(&IntegerField::new(), json!(-9223372036854775808.0)).unwrap(),
			Some(json!(i64::MIN))
		);
	}

	#[rstest]
	fn test_integerfield_string_too_long() {
		let field = IntegerField::new();
		let err = validate(&field, json!("1".repeat(1001))).unwrap_err();
		assert_eq!(err.detail().codes(), json!(["max_string_length"]));
	}

	#[rstest]
	fn test_integerfield_bounds() {
		let field = IntegerField::new().min_value(1).max_value(10);

		assert!(validate(&field, json!("10")).is_ok());
		assert_eq!(
			validate(&field, json!("11")).unwrap_err().detail().to_value(),
			json!(["Ensure this value is less than or equal to 10."])
		);
		assert_eq!(
			validate(&field, json!(0)).unwrap_err().detail().to_value(),
			json!(["Ensure this value is greater than or equal to 1."])
		);
	}

	#[rstest]
	fn test_integerfield_bound_message_override() {
		let field = IntegerField::new()
			.max_value(5)
			.error_message("max_value", "At most {max_value}, please.");
		let err = validate(&field, json!(6)).unwrap_err();
		assert_eq!(err.detail().to_value(), json!(["At most 5, please."]));
	}

	#[rstest]
	fn test_integerfield_bounds_and_custom_validators_aggregate() {
		let field = IntegerField::new()
			.max_value(5)
			.validator(|value: &Value| {
				if value.as_i64().is_some_and(|n| n % 2 == 0) {
					Ok(())
				} else {
					Err(crate::ValidationError::with_code("Must be even.", "even"))
				}
			});
		let err = validate(&field, json!(7)).unwrap_err();
		assert_eq!(err.detail().codes(), json!(["max_value", "even"]));
	}

	#[rstest]
	#[case(json!(5), json!(5))]
	#[case(json!("5"), json!(5))]
	#[case(json!(5.9), json!(5))]
	fn test_integerfield_representation(#[case] value: Value, #[case] expected: Value) {
		assert_eq!(IntegerField::new().to_representation(&value).unwrap(), expected);
	}

	#[rstest]
	fn test_integerfield_representation_error() {
		assert!(IntegerField::new().to_representation(&json!("x")).is_err());
	}

	proptest! {
		#[test]
		fn prop_numeric_strings_coerce(n in any::<i64>()) {
			let field = IntegerField::new();
			let result = validate(&field, json!(n.to_string())).unwrap();
			prop_assert_eq!(result, Some(json!(n)));
		}

		#[test]
		fn prop_max_value_is_inclusive(n in -1000i64..1000, limit in -1000i64..1000) {
			let field = IntegerField::new().max_value(limit);
			prop_assert_eq!(validate(&field, json!(n)).is_ok(), n <= limit);
		}
	}
}
