use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::JoltConfig;

/// JSON schema for `jolt.toml`, for editor integration and CI validation.
#[must_use]
pub fn json_schema() -> RootSchema {
    schema_for!(JoltConfig)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_lists_every_section() {
        let value = serde_json::to_value(json_schema()).expect("serialize schema");
        let properties = value["properties"].as_object().expect("root properties");
        assert!(properties.contains_key("logging"));
        assert!(properties.contains_key("refactor"));

        let definitions = value["definitions"].as_object().expect("definitions");
        let change_signature = &definitions["ChangeSignatureConfig"]["properties"];
        for key in [
            "compile_check",
            "update_doc_references",
            "add_imports",
            "ripple_constructors",
        ] {
            assert!(change_signature.get(key).is_some(), "missing {key}");
        }
    }
}
