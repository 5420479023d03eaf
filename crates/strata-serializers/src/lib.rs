//! Declarative serializers for Strata
//!
//! A serializer is described once as a [`SerializerSchema`] and then bound to
//! incoming data (JSON or form-encoded) or to an existing instance through a
//! [`Serializer`]. Schemas nest: a schema can be used as a field of another
//! schema with [`NestedSerializer`], and as a list of objects with
//! [`NestedSerializer::many`].
//!
//! ## Quick Start
//!
//! ```
//! use strata_serializers::prelude::*;
//! use serde_json::json;
//!
//! let nested = SerializerSchema::builder("Nested")
//!     .field("one", IntegerField::new().max_value(10))
//!     .field("two", IntegerField::new().max_value(10))
//!     .build();
//! let schema = SerializerSchema::builder("Test")
//!     .field("nested", NestedSerializer::new(nested))
//!     .build();
//!
//! let mut serializer = Serializer::with_data(schema, json!({"nested": {"one": "1", "two": "2"}}));
//! assert!(serializer.is_valid());
//! assert_eq!(
//!     serializer.validated_data().unwrap(),
//!     &json!({"nested": {"one": 1, "two": 2}})
//! );
//! ```

pub mod context;
pub mod errors;
pub mod fields;
pub mod html;
pub mod input;
pub mod nested;
pub mod serializer;
pub mod settings;
pub mod validators;

pub use context::ValidationContext;
pub use errors::{ErrorDetail, ErrorMessage, ErrorMessages, SerializerError, ValidationError};
pub use fields::{
	BooleanField, CharField, EmptyValue, Field, FieldBuilder, FieldOptions, FieldResult,
	FloatField, IntegerField,
};
pub use input::Input;
pub use nested::{ListSerializer, NestedSerializer};
pub use serializer::{FieldHook, ObjectHook, Serializer, SerializerSchema, SerializerSchemaBuilder};
pub use settings::{Settings, SettingsError};
pub use validators::{
	MaxLengthValidator, MaxValueValidator, MinLengthValidator, MinValueValidator, Validator,
};

/// Commonly used types
pub mod prelude {
	pub use crate::errors::{ErrorDetail, ValidationError};
	pub use crate::fields::{BooleanField, CharField, Field, FieldBuilder, FloatField, IntegerField};
	pub use crate::input::Input;
	pub use crate::nested::{ListSerializer, NestedSerializer};
	pub use crate::serializer::{Serializer, SerializerSchema};
	pub use strata_http::QueryDict;
}
