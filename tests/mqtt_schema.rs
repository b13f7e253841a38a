// Schema validation tests for MQTT wire format
//
// Most tests construct JSON values directly (independent of Rust structs)
// and validate them against the JSON Schema files in schemas/mqtt/. The
// serializer tests at the end check the payloads the publisher really sends.

use contact_id_bridge::Telemetry;
use contact_id_bridge::effects::mqtt::telemetry_json;
use serde_json::json;

fn load_schema(name: &str) -> serde_json::Value {
    let path = format!("{}/schemas/mqtt/{name}", env!("CARGO_MANIFEST_DIR"));
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read schema {path}: {e}"));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("Failed to parse schema {path}: {e}"))
}

fn build_validator(schema_name: &str) -> jsonschema::Validator {
    let schema = load_schema(schema_name);
    jsonschema::options()
        .with_retriever(LocalRetriever)
        .build(&schema)
        .unwrap_or_else(|e| panic!("Failed to compile schema {schema_name}: {e}"))
}

fn validate(schema_name: &str, instance: &serde_json::Value) {
    let validator = build_validator(schema_name);
    let errors: Vec<_> = validator.iter_errors(instance).collect();
    if !errors.is_empty() {
        let msgs: Vec<String> = errors.iter().map(|e| format!("  - {e}")).collect();
        panic!(
            "Schema validation failed for {schema_name}:\n{}\nInstance: {}",
            msgs.join("\n"),
            serde_json::to_string_pretty(instance).unwrap()
        );
    }
}

fn validate_fails(schema_name: &str, instance: &serde_json::Value) {
    let validator = build_validator(schema_name);
    assert!(
        !validator.is_valid(instance),
        "Expected schema validation to fail for {schema_name}, but it passed.\nInstance: {}",
        serde_json::to_string_pretty(instance).unwrap()
    );
}

// Retriever that loads $ref schemas (timestamp.schema.json) from schemas/mqtt/
struct LocalRetriever;

impl jsonschema::Retrieve for LocalRetriever {
    fn retrieve(
        &self,
        uri: &jsonschema::Uri<String>,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        let filename = uri_str.strip_prefix("json-schema:///").unwrap_or(uri_str);
        let path = format!("{}/schemas/mqtt/{filename}", env!("CARGO_MANIFEST_DIR"));
        if std::path::Path::new(&path).exists() {
            let text = std::fs::read_to_string(&path)?;
            return Ok(serde_json::from_str(&text)?);
        }
        Err(format!("Cannot retrieve schema: {uri_str}").into())
    }
}

// =========================================================================
// Status
// =========================================================================

#[test]
fn status_armed_valid() {
    validate(
        "status.schema.json",
        &json!({ "now": 1738900000000_u64, "status": 10 }),
    );
}

#[test]
fn status_disarmed_valid() {
    validate("status.schema.json", &json!({ "now": 0, "status": 50 }));
}

#[test]
fn status_alarm_valid() {
    validate(
        "status.schema.json",
        &json!({ "now": 1738900000000_u64, "status": 99 }),
    );
}

#[test]
fn status_unknown_value_rejected() {
    validate_fails("status.schema.json", &json!({ "now": 0, "status": 42 }));
}

#[test]
fn status_as_string_rejected() {
    validate_fails("status.schema.json", &json!({ "now": 0, "status": "10" }));
}

#[test]
fn status_missing_now_rejected() {
    validate_fails("status.schema.json", &json!({ "status": 10 }));
}

#[test]
fn status_negative_now_rejected() {
    validate_fails("status.schema.json", &json!({ "now": -1, "status": 10 }));
}

#[test]
fn status_extra_field_rejected() {
    validate_fails(
        "status.schema.json",
        &json!({ "now": 0, "status": 10, "zone": 3 }),
    );
}

// =========================================================================
// Ping
// =========================================================================

#[test]
fn ping_valid() {
    validate("ping.schema.json", &json!({ "now": 1738900000000_u64, "ping": 1 }));
}

#[test]
fn ping_other_value_rejected() {
    validate_fails("ping.schema.json", &json!({ "now": 0, "ping": 0 }));
}

#[test]
fn ping_missing_ping_rejected() {
    validate_fails("ping.schema.json", &json!({ "now": 0 }));
}

#[test]
fn status_payload_is_not_a_ping() {
    validate_fails("ping.schema.json", &json!({ "now": 0, "status": 10 }));
}

// =========================================================================
// Serializer output
// =========================================================================

fn serialized(value: Telemetry) -> serde_json::Value {
    let text = telemetry_json(value, 1738900000000).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn serialized_status_values_valid() {
    for status in [10, 50, 99] {
        validate("status.schema.json", &serialized(Telemetry::Status(status)));
    }
}

#[test]
fn serialized_ping_valid() {
    validate("ping.schema.json", &serialized(Telemetry::Ping(1)));
}
