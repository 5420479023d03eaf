//! # Strata
//!
//! Declarative, nestable serializers with field-level validation.
//!
//! Strata validates untrusted input (JSON bodies or form-encoded data)
//! against a declared schema, coerces it into typed values, and renders
//! instances back into their output representation. Schemas nest, so an
//! object can hold other objects or lists of objects.
//!
//! ## Feature Flags
//!
//! - `full` (default) - everything below
//! - `http` - form-encoded request data ([`QueryDict`])
//! - `serializers` - schemas, fields and validation (implies `http`)
//!
//! ## Quick Example
//!
//! ```
//! use strata::prelude::*;
//! use serde_json::json;
//!
//! let nested = SerializerSchema::builder("Nested")
//!     .field("one", IntegerField::new().max_value(10))
//!     .field("two", IntegerField::new().max_value(10))
//!     .build();
//! let schema = SerializerSchema::builder("Outer")
//!     .field("nested", NestedSerializer::new(nested).required(false))
//!     .build();
//!
//! let mut serializer = Serializer::with_data(schema.clone(), QueryDict::parse("nested[one]=1&nested[two]=2").unwrap());
//! assert!(serializer.is_valid());
//! assert_eq!(serializer.data().unwrap(), json!({"nested": {"one": 1, "two": 2}}));
//!
//! // Unbound serializers render every field with its initial value
//! assert_eq!(Serializer::new(schema).data().unwrap(), json!({"nested": {"one": null, "two": null}}));
//! ```

#[cfg(feature = "http")]
pub mod http {
	pub use strata_http::*;
}

#[cfg(feature = "serializers")]
pub mod serializers {
	pub use strata_serializers::*;
}

// Re-export form data
#[cfg(feature = "http")]
pub use strata_http::{QueryDict, QueryDictError};

// Re-export serializers
#[cfg(feature = "serializers")]
pub use strata_serializers::{
	BooleanField, CharField, ErrorDetail, ErrorMessage, ErrorMessages, Field, FieldBuilder,
	FloatField, Input, IntegerField, ListSerializer, NestedSerializer, Serializer, SerializerError,
	SerializerSchema, ValidationContext, ValidationError,
};

/// Prelude module for convenient imports
pub mod prelude {
	#[cfg(feature = "http")]
	pub use crate::{QueryDict, QueryDictError};

	#[cfg(feature = "serializers")]
	pub use strata_serializers::prelude::*;
}
