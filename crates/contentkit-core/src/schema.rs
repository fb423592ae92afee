//! JSON Schema for the configuration file.

use schemars::Schema;
use schemars::generate::SchemaSettings;
use serde_json::json;

use crate::error::{CoreError, Result};
use crate::{APP_NAME, AppConfig};

/// Generate the draft-07 JSON schema for [`AppConfig`].
///
/// # Errors
///
/// Returns [`CoreError::Serialization`] if the schema cannot be rendered.
pub fn generate_schema(repo_url: &str) -> Result<String> {
    // draft-07 has the widest TOML editor support
    let generator = SchemaSettings::draft07().into_generator();
    let mut schema: Schema = generator.into_root_schema_for::<AppConfig>();

    schema.insert(
        "$id".to_string(),
        json!(format!("{repo_url}/schemas/config.schema.json")),
    );
    schema.insert("title".to_string(), json!(format!("{APP_NAME} configuration")));
    schema.insert(
        "description".to_string(),
        json!(format!("Configuration schema for {APP_NAME}")),
    );

    if let Some(props) = schema
        .get_mut("properties")
        .and_then(serde_json::Value::as_object_mut)
    {
        props.insert(
            "$schema".to_string(),
            json!({
                "type": "string",
                "description": "JSON Schema reference for editor support"
            }),
        );
    }

    serde_json::to_string_pretty(&schema).map_err(|e| CoreError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_names_every_section() {
        let schema = generate_schema("https://github.com/byteowlz/contentkit").expect("schema");
        assert!(schema.contains("contentkit configuration"));
        assert!(schema.contains("\"$schema\""));
        assert!(schema.contains("\"names\""));
        assert!(schema.contains("\"hash\""));
        assert!(schema.contains("sha512"));
    }
}
