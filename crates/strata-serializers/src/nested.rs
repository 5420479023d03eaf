//! Serializers used as fields of other serializers
//!
//! [`NestedSerializer`] validates a nested object against a schema.
//! [`ListSerializer`] validates a list whose items all go through the same
//! child field, usually a nested serializer made with
//! [`NestedSerializer::many`].

use crate::context::ValidationContext;
use crate::errors::{ErrorDetail, ErrorMessages, SerializerError, ValidationError};
use crate::fields::{self, EmptyValue, Field, FieldBuilder, FieldOptions, FieldResult};
use crate::html;
use crate::input::Input;
use crate::serializer::{SerializerSchema, as_serializer_error};
use crate::settings;
use serde_json::Value;
use std::sync::{Arc, LazyLock};

static LIST_MESSAGES: LazyLock<ErrorMessages> = LazyLock::new(|| {
	ErrorMessages::base()
		.with(
			"not_a_list",
			"Expected a list of items but got type \"{input_type}\".",
		)
		.with("empty", "This list may not be empty.")
		.with(
			"max_length",
			"Ensure this field has no more than {max_length} elements.",
		)
		.with(
			"min_length",
			"Ensure this field has at least {min_length} elements.",
		)
});

fn non_field_error(err: ValidationError) -> ValidationError {
	ValidationError::for_field(settings::get().non_field_errors_key.clone(), err.into_detail())
}

/// A schema used as a field
///
/// # Examples
///
/// ```
/// use strata_serializers::{FieldBuilder, IntegerField, NestedSerializer, Serializer, SerializerSchema};
/// use serde_json::json;
///
/// let child = SerializerSchema::builder("Child")
///     .field("value", IntegerField::new())
///     .build();
/// let parent = SerializerSchema::builder("Parent")
///     .field("child", NestedSerializer::new(child).required(false))
///     .build();
///
/// let mut serializer = Serializer::with_data(parent, json!({}));
/// assert!(serializer.is_valid());
/// assert_eq!(serializer.validated_data().unwrap(), &json!({}));
/// ```
#[derive(Debug, Clone)]
pub struct NestedSerializer {
	schema: Arc<SerializerSchema>,
	options: FieldOptions,
}

impl NestedSerializer {
	pub fn new(schema: Arc<SerializerSchema>) -> Self {
		Self {
			schema,
			options: FieldOptions::default(),
		}
	}

	pub fn schema(&self) -> &Arc<SerializerSchema> {
		&self.schema
	}

	/// List of objects validated against this schema
	///
	/// Options set before `many()` apply to each item, options set after it
	/// apply to the list.
	pub fn many(self) -> ListSerializer {
		ListSerializer::new(self)
	}
}

impl FieldBuilder for NestedSerializer {
	fn options_mut(&mut self) -> &mut FieldOptions {
		&mut self.options
	}
}

impl Field for NestedSerializer {
	fn options(&self) -> &FieldOptions {
		&self.options
	}

	fn default_error_messages(&self) -> &ErrorMessages {
		self.schema.error_messages()
	}

	/// Form input reads `name.key` and `name[key]` entries; none at all
	/// means the nested object is absent.
	fn get_value(&self, field_name: &str, data: &Input, ctx: &ValidationContext) -> Option<Input> {
		match data {
			Input::Form(dict) => {
				let nested = html::parse_html_dict(dict, field_name);
				(!nested.is_empty()).then_some(Input::Form(nested))
			}
			Input::Json(_) => fields::default_get_value(self, field_name, data, ctx),
		}
	}

	fn get_initial(&self) -> Value {
		self.options
			.initial
			.clone()
			.unwrap_or_else(|| self.schema.initial())
	}

	/// Field validation, then serializer validators and object hooks
	///
	/// Object hooks only run once every field is valid. Their errors that
	/// are not keyed by field land under the non-field key.
	fn run_validation(
		&self,
		data: Option<Input>,
		ctx: &ValidationContext,
	) -> FieldResult<Option<Value>> {
		let input = match self.validate_empty_values(data, ctx)? {
			EmptyValue::Skip => return Ok(None),
			EmptyValue::Resolved(value) => return Ok(Some(value)),
			EmptyValue::Present(input) => input,
		};
		let value = self.to_internal_value(input, ctx)?;
		let attrs = match value {
			Value::Object(attrs) => attrs,
			other => return Ok(Some(other)),
		};
		self.run_validators(&Value::Object(attrs.clone()))
			.and_then(|()| self.schema.run_object_hooks(attrs))
			.map(|attrs| Some(Value::Object(attrs)))
			.map_err(as_serializer_error)
	}

	fn to_internal_value(&self, data: Input, ctx: &ValidationContext) -> FieldResult<Value> {
		if !data.is_mapping() {
			return Err(non_field_error(
				self.fail("invalid", &[("datatype", data.type_name().to_string())]),
			));
		}
		let child = ctx.child().map_err(non_field_error)?;
		self.schema
			.validate_fields(&data, &child)
			.map(Value::Object)
	}

	fn to_representation(&self, value: &Value) -> Result<Value, SerializerError> {
		if !value.is_object() {
			return Err(SerializerError::representation(format!(
				"expected an object for `{}`, got {}",
				self.schema.name(),
				value
			)));
		}
		self.schema.to_representation(value)
	}
}

/// A list of values validated by one child field
///
/// Item errors are reported positionally: valid items get an empty entry so
/// indexes line up with the input.
///
/// # Examples
///
/// ```
/// use strata_serializers::{Field, Input, IntegerField, ListSerializer, ValidationContext};
/// use serde_json::json;
///
/// let field = ListSerializer::new(IntegerField::new());
/// let err = field
///     .run_validation(Some(Input::from(json!(["1", "x"]))), &ValidationContext::default())
///     .unwrap_err();
/// assert_eq!(err.detail().to_value(), json!([{}, ["A valid integer is required."]]));
/// ```
#[derive(Debug, Clone)]
pub struct ListSerializer {
	child: Arc<dyn Field>,
	options: FieldOptions,
	pub allow_empty: bool,
	pub max_length: Option<usize>,
	pub min_length: Option<usize>,
}

impl ListSerializer {
	pub fn new(child: impl Field + 'static) -> Self {
		Self {
			child: Arc::new(child),
			options: FieldOptions::default(),
			allow_empty: true,
			max_length: None,
			min_length: None,
		}
	}

	pub fn child(&self) -> &dyn Field {
		self.child.as_ref()
	}

	pub fn allow_empty(mut self, allow_empty: bool) -> Self {
		self.allow_empty = allow_empty;
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

	fn check_length(&self, len: usize) -> FieldResult<()> {
		if !self.allow_empty && len == 0 {
			return Err(non_field_error(self.fail("empty", &[])));
		}
		if let Some(max) = self.max_length
			&& len > max
		{
			return Err(non_field_error(
				self.fail("max_length", &[("max_length", max.to_string())]),
			));
		}
		if let Some(min) = self.min_length
			&& len < min
		{
			return Err(non_field_error(
				self.fail("min_length", &[("min_length", min.to_string())]),
			));
		}
		Ok(())
	}
}

impl FieldBuilder for ListSerializer {
	fn options_mut(&mut self) -> &mut FieldOptions {
		&mut self.options
	}
}

impl Field for ListSerializer {
	fn options(&self) -> &FieldOptions {
		&self.options
	}

	fn default_error_messages(&self) -> &ErrorMessages {
		&LIST_MESSAGES
	}

	fn get_value(&self, field_name: &str, data: &Input, ctx: &ValidationContext) -> Option<Input> {
		match data {
			Input::Form(dict) => {
				let keys = html::list_keys(dict, field_name);
				(!keys.is_empty()).then_some(Input::Form(keys))
			}
			Input::Json(_) => fields::default_get_value(self, field_name, data, ctx),
		}
	}

	fn get_initial(&self) -> Value {
		self.options
			.initial
			.clone()
			.unwrap_or_else(|| Value::Array(Vec::new()))
	}

	fn to_internal_value(&self, data: Input, ctx: &ValidationContext) -> FieldResult<Value> {
		let items: Vec<Input> = match data {
			Input::Form(keys) => html::parse_html_list(&keys, "").unwrap_or_default(),
			Input::Json(Value::Array(items)) => items.into_iter().map(Input::Json).collect(),
			other => {
				return Err(non_field_error(self.fail(
					"not_a_list",
					&[("input_type", other.type_name().to_string())],
				)));
			}
		};
		self.check_length(items.len())?;

		let mut validated = Vec::with_capacity(items.len());
		let mut errors = Vec::with_capacity(items.len());
		let mut failed = false;
		for item in items {
			match self.child.run_validation(Some(item), ctx) {
				Ok(value) => {
					validated.push(value.unwrap_or(Value::Null));
					errors.push(ErrorDetail::empty());
				}
				Err(err) => {
					failed = true;
					errors.push(err.into_detail());
				}
			}
		}

		if failed {
			tracing::debug!(items = errors.len(), "list validation failed");
			return Err(ValidationError::from_detail(ErrorDetail::Items(errors)));
		}
		Ok(Value::Array(validated))
	}

	fn to_representation(&self, value: &Value) -> Result<Value, SerializerError> {
		let Value::Array(items) = value else {
			return Err(SerializerError::representation(format!(
				"expected a list, got {}",
				value
			)));
		};
		items
			.iter()
			.enumerate()
			.map(|(index, item)| match item {
				Value::Null => Ok(Value::Null),
				item => self
					.child
					.to_representation(item)
					.map_err(|e| e.in_field(&index.to_string())),
			})
			.collect::<Result<Vec<_>, _>>()
			.map(Value::Array)
	}
}
