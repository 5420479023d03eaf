//! Smoke tests for the top-level re-exports

use rstest::rstest;
use serde_json::json;
use strata::prelude::*;

#[rstest]
fn test_prelude_covers_a_nested_round_trip() {
	let item = SerializerSchema::builder("Item")
		.field("name", CharField::new())
		.field("done", BooleanField::new())
		.build();
	let schema = SerializerSchema::builder("Todo")
		.field("items", NestedSerializer::new(item).many().min_length(1))
		.field("ratio", FloatField::new().required(false))
		.build();

	let mut serializer = Serializer::with_data(
		schema,
		json!({"items": [{"name": " milk ", "done": "yes"}], "ratio": "0.5"}),
	);

	assert!(serializer.is_valid());
	assert_eq!(
		serializer.data().unwrap(),
		json!({"items": [{"name": "milk", "done": true}], "ratio": 0.5})
	);
}

#[rstest]
fn test_modules_are_reachable() {
	let dict = strata::http::QueryDict::parse("a=1").unwrap();
	assert_eq!(dict.get("a"), Some("1"));
	assert_eq!(
		strata::serializers::settings::get().non_field_errors_key,
		"non_field_errors"
	);
}
