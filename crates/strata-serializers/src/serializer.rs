//! Serializer definitions and bound serializers
//!
//! A [`SerializerSchema`] declares an ordered set of named fields together
//! with field-level and object-level validation hooks. A [`Serializer`] binds
//! a schema to input data or to an instance.
//!
//! ```
//! use strata_serializers::{IntegerField, NestedSerializer, Serializer, SerializerSchema};
//! use serde_json::json;
//!
//! let point = SerializerSchema::builder("Point")
//!     .field("x", IntegerField::new())
//!     .field("y", IntegerField::new())
//!     .build();
//! let shape = SerializerSchema::builder("Shape")
//!     .field("origin", NestedSerializer::new(point))
//!     .build();
//!
//! let mut serializer = Serializer::with_data(shape, json!({"origin": {"x": "1", "y": 2}}));
//! assert!(serializer.is_valid());
//! assert_eq!(serializer.validated_data().unwrap(), &json!({"origin": {"x": 1, "y": 2}}));
//! ```

use crate::context::ValidationContext;
use crate::errors::{ErrorDetail, ErrorMessage, ErrorMessages, SerializerError, ValidationError};
use crate::fields::{Field, FieldResult};
use crate::input::Input;
use crate::nested::NestedSerializer;
use crate::settings;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Hook run on a field's validated value
pub type FieldHook = Arc<dyn Fn(Value) -> Result<Value, ValidationError> + Send + Sync>;

/// Hook run on the validated attributes of a whole object
pub type ObjectHook =
	Arc<dyn Fn(Map<String, Value>) -> Result<Map<String, Value>, ValidationError> + Send + Sync>;

static MESSAGES: LazyLock<ErrorMessages> = LazyLock::new(|| {
	ErrorMessages::base().with(
		"invalid",
		"Invalid data. Expected a dictionary, but got {datatype}.",
	)
});

/// Declarative description of a serializer
pub struct SerializerSchema {
	name: String,
	fields: Vec<(String, Arc<dyn Field>)>,
	field_hooks: HashMap<String, FieldHook>,
	object_hooks: Vec<ObjectHook>,
	overrides: ErrorMessages,
	messages: ErrorMessages,
}

impl fmt::Debug for SerializerSchema {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SerializerSchema")
			.field("name", &self.name)
			.field("fields", &self.fields)
			.field("field_hooks", &self.field_hooks.keys().collect::<Vec<_>>())
			.field("object_hooks", &self.object_hooks.len())
			.field("messages", &self.messages)
			.finish()
	}
}

impl SerializerSchema {
	pub fn builder(name: impl Into<String>) -> SerializerSchemaBuilder {
		SerializerSchemaBuilder {
			name: name.into(),
			fields: Vec::new(),
			field_hooks: HashMap::new(),
			object_hooks: Vec::new(),
			overrides: ErrorMessages::new(),
		}
	}

	/// Start a new schema that inherits every field and hook of this one
	///
	/// Fields declared again on the builder replace the inherited ones in
	/// place.
	pub fn extend(self: &Arc<Self>, name: impl Into<String>) -> SerializerSchemaBuilder {
		SerializerSchemaBuilder {
			name: name.into(),
			fields: self.fields.clone(),
			field_hooks: self.field_hooks.clone(),
			object_hooks: self.object_hooks.clone(),
			overrides: self.overrides.clone(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn fields(&self) -> impl Iterator<Item = (&str, &dyn Field)> {
		self.fields
			.iter()
			.map(|(name, field)| (name.as_str(), field.as_ref()))
	}

	pub fn field(&self, name: &str) -> Option<&dyn Field> {
		self.fields
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, field)| field.as_ref())
	}

	/// Serializer-level messages with this schema's overrides applied
	pub fn error_messages(&self) -> &ErrorMessages {
		&self.messages
	}

	/// Validate every writable field of a mapping
	///
	/// Field hooks run for every field that produced a value, including an
	/// explicit null. Errors are collected per field.
	pub fn validate_fields(
		&self,
		data: &Input,
		ctx: &ValidationContext,
	) -> FieldResult<Map<String, Value>> {
		let mut validated = Map::new();
		let mut errors = BTreeMap::new();

		for (name, field) in &self.fields {
			let options = field.options();
			if options.read_only && options.default.is_none() {
				continue;
			}
			let primitive = field.get_value(name, data, ctx);
			tracing::trace!(
				serializer = %self.name,
				field = %name,
				present = primitive.is_some(),
				"validating field"
			);
			let outcome = field.run_validation(primitive, ctx).and_then(|value| {
				match (value, self.field_hooks.get(name)) {
					(Some(value), Some(hook)) => hook(value).map(Some),
					(value, _) => Ok(value),
				}
			});
			match outcome {
				Ok(Some(value)) => {
					validated.insert(options.source_key(name).to_string(), value);
				}
				Ok(None) => {}
				Err(err) => {
					errors.insert(name.clone(), err.into_detail());
				}
			}
		}

		if errors.is_empty() {
			Ok(validated)
		} else {
			tracing::debug!(serializer = %self.name, failed = errors.len(), "field validation failed");
			Err(ValidationError::from_detail(ErrorDetail::Fields(errors)))
		}
	}

	/// Run object-level hooks in declaration order
	pub fn run_object_hooks(&self, attrs: Map<String, Value>) -> FieldResult<Map<String, Value>> {
		self.object_hooks
			.iter()
			.try_fold(attrs, |attrs, hook| hook(attrs))
	}

	/// Output representation of an instance
	///
	/// Attributes missing from the instance fall back to the field default,
	/// then to null for nullable fields; otherwise the field is left out.
	pub fn to_representation(&self, instance: &Value) -> Result<Value, SerializerError> {
		let mut out = Map::new();
		for (name, field) in &self.fields {
			let options = field.options();
			if options.write_only {
				continue;
			}
			let represented = match field.get_attribute(name, instance) {
				Some(Value::Null) => Value::Null,
				Some(attribute) => field
					.to_representation(attribute)
					.map_err(|e| e.in_field(name))?,
				None => match &options.default {
					Some(default) => field
						.to_representation(default)
						.map_err(|e| e.in_field(name))?,
					None if options.allow_null => Value::Null,
					None => continue,
				},
			};
			out.insert(name.clone(), represented);
		}
		Ok(Value::Object(out))
	}

	/// Representation of an unbound serializer
	///
	/// Every writable field with its initial value, nested serializers
	/// expanded recursively.
	pub fn initial(&self) -> Value {
		Value::Object(
			self.fields
				.iter()
				.filter(|(_, field)| !field.options().read_only)
				.map(|(name, field)| (name.clone(), field.get_initial()))
				.collect(),
		)
	}

	/// Representation of input that failed validation: the raw values of the
	/// fields present in it
	pub fn initial_from(&self, data: &Input, ctx: &ValidationContext) -> Value {
		if !data.is_mapping() {
			return Value::Object(Map::new());
		}
		Value::Object(
			self.fields
				.iter()
				.filter(|(_, field)| !field.options().read_only)
				.filter_map(|(name, field)| {
					field
						.get_value(name, data, ctx)
						.map(|input| (name.clone(), input.into_value()))
				})
				.collect(),
		)
	}
}

/// Builder for [`SerializerSchema`]
pub struct SerializerSchemaBuilder {
	name: String,
	fields: Vec<(String, Arc<dyn Field>)>,
	field_hooks: HashMap<String, FieldHook>,
	object_hooks: Vec<ObjectHook>,
	overrides: ErrorMessages,
}

impl SerializerSchemaBuilder {
	/// Declare a field, replacing any field of the same name
	pub fn field(mut self, name: impl Into<String>, field: impl Field + 'static) -> Self {
		let name = name.into();
		let field: Arc<dyn Field> = Arc::new(field);
		match self.fields.iter_mut().find(|(n, _)| *n == name) {
			Some((_, existing)) => *existing = field,
			None => self.fields.push((name, field)),
		}
		self
	}

	/// Hook run on the validated value of `name`
	///
	/// The hook runs whenever the field is present in the input, including
	/// when its value is null.
	pub fn validate_field<F>(mut self, name: impl Into<String>, hook: F) -> Self
	where
		F: Fn(Value) -> Result<Value, ValidationError> + Send + Sync + 'static,
	{
		self.field_hooks.insert(name.into(), Arc::new(hook));
		self
	}

	/// Hook run on the validated attributes once every field is valid
	pub fn validate<F>(mut self, hook: F) -> Self
	where
		F: Fn(Map<String, Value>) -> Result<Map<String, Value>, ValidationError>
			+ Send
			+ Sync
			+ 'static,
	{
		self.object_hooks.push(Arc::new(hook));
		self
	}

	pub fn error_message(mut self, code: impl Into<String>, template: impl Into<String>) -> Self {
		self.overrides.set(code, template);
		self
	}

	pub fn build(self) -> Arc<SerializerSchema> {
		let messages = MESSAGES.merged(&self.overrides);
		Arc::new(SerializerSchema {
			name: self.name,
			fields: self.fields,
			field_hooks: self.field_hooks,
			object_hooks: self.object_hooks,
			overrides: self.overrides,
			messages,
		})
	}
}

/// Wrap errors that are not keyed by field under the non-field key
pub(crate) fn as_serializer_error(err: ValidationError) -> ValidationError {
	match err.into_detail() {
		fields @ ErrorDetail::Fields(_) => ValidationError::from_detail(fields),
		other => ValidationError::for_field(settings::get().non_field_errors_key.clone(), other),
	}
}

#[derive(Debug, Clone)]
struct Outcome {
	validated: Value,
	errors: ErrorDetail,
}

/// A schema bound to input data or an instance
#[derive(Debug, Clone)]
pub struct Serializer {
	schema: Arc<SerializerSchema>,
	initial_data: Option<Input>,
	instance: Option<Value>,
	partial: bool,
	outcome: Option<Outcome>,
}

impl Serializer {
	/// Unbound serializer, used to render the empty form of a schema
	///
	/// # Examples
	///
	/// ```
	/// use strata_serializers::{IntegerField, Serializer, SerializerSchema};
	/// use serde_json::json;
	///
	/// let schema = SerializerSchema::builder("Counter")
	///     .field("count", IntegerField::new())
	///     .build();
	/// assert_eq!(Serializer::new(schema).data().unwrap(), json!({"count": null}));
	/// ```
	pub fn new(schema: Arc<SerializerSchema>) -> Self {
		Self {
			schema,
			initial_data: None,
			instance: None,
			partial: false,
			outcome: None,
		}
	}

	pub fn with_data(schema: Arc<SerializerSchema>, data: impl Into<Input>) -> Self {
		Self {
			initial_data: Some(data.into()),
			..Self::new(schema)
		}
	}

	pub fn with_instance(schema: Arc<SerializerSchema>, instance: Value) -> Self {
		Self {
			instance: Some(instance),
			..Self::new(schema)
		}
	}

	/// Skip required fields missing from the input
	pub fn partial(mut self, partial: bool) -> Self {
		self.partial = partial;
		self
	}

	pub fn schema(&self) -> &Arc<SerializerSchema> {
		&self.schema
	}

	pub fn initial_data(&self) -> Option<&Input> {
		self.initial_data.as_ref()
	}

	pub fn instance(&self) -> Option<&Value> {
		self.instance.as_ref()
	}

	pub fn error_messages(&self) -> &ErrorMessages {
		self.schema.error_messages()
	}

	/// Validate the bound data
	///
	/// The outcome is computed once and cached.
	pub fn is_valid(&mut self) -> bool {
		if let Some(outcome) = &self.outcome {
			return outcome.errors.is_empty();
		}

		let span = tracing::debug_span!("is_valid", serializer = %self.schema.name());
		let _enter = span.enter();

		let outcome = match &self.initial_data {
			None => {
				tracing::warn!("is_valid() called on a serializer without input data");
				Outcome {
					validated: Value::Object(Map::new()),
					errors: no_data_error(),
				}
			}
			Some(data) => {
				let ctx = ValidationContext::new(self.partial);
				let root = NestedSerializer::new(self.schema.clone());
				match root.run_validation(Some(data.clone()), &ctx) {
					Ok(validated) => Outcome {
						validated: validated.unwrap_or_else(|| Value::Object(Map::new())),
						errors: ErrorDetail::empty(),
					},
					Err(err) => Outcome {
						validated: Value::Object(Map::new()),
						errors: root_errors(err.into_detail()),
					},
				}
			}
		};

		let valid = outcome.errors.is_empty();
		tracing::debug!(valid, "validation finished");
		self.outcome = Some(outcome);
		valid
	}

	/// Validated data, empty when validation failed
	pub fn validated_data(&self) -> Result<&Value, SerializerError> {
		self.outcome
			.as_ref()
			.map(|outcome| &outcome.validated)
			.ok_or(SerializerError::NotValidated {
				accessor: "validated_data",
			})
	}

	/// Errors keyed by field name, empty when validation succeeded
	pub fn errors(&self) -> Result<&ErrorDetail, SerializerError> {
		self.outcome
			.as_ref()
			.map(|outcome| &outcome.errors)
			.ok_or(SerializerError::NotValidated { accessor: "errors" })
	}

	/// Output representation
	///
	/// - an instance without validation errors renders the instance
	/// - valid input renders the validated data
	/// - otherwise the initial form: raw values of bound input, or every
	///   field's initial value for an unbound serializer
	pub fn data(&self) -> Result<Value, SerializerError> {
		if self.initial_data.is_some() && self.outcome.is_none() {
			return Err(SerializerError::NotValidated { accessor: "data" });
		}
		let valid = self
			.outcome
			.as_ref()
			.is_none_or(|outcome| outcome.errors.is_empty());

		if valid && let Some(instance) = &self.instance {
			return self.schema.to_representation(instance);
		}
		if valid && let Some(outcome) = &self.outcome {
			return self.schema.to_representation(&outcome.validated);
		}
		Ok(match &self.initial_data {
			Some(data) => self
				.schema
				.initial_from(data, &ValidationContext::new(self.partial)),
			None => self.schema.initial(),
		})
	}
}

fn no_data_error() -> ErrorDetail {
	let mut fields = BTreeMap::new();
	fields.insert(
		settings::get().non_field_errors_key.clone(),
		ErrorDetail::Messages(vec![ErrorMessage::new("No data provided", "null")]),
	);
	ErrorDetail::Fields(fields)
}

fn root_errors(detail: ErrorDetail) -> ErrorDetail {
	match detail {
		ErrorDetail::Messages(messages)
			if messages.len() == 1 && messages[0].code() == "null" =>
		{
			no_data_error()
		}
		fields @ ErrorDetail::Fields(_) => fields,
		other => as_serializer_error(ValidationError::from_detail(other)).into_detail(),
	}
}
