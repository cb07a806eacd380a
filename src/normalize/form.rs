//! Single-record form submissions

use crate::error::{Error, Result};
use crate::types::Record;
use indexmap::IndexMap;
use serde_json::Value;

/// Build a validated record from a submitted JSON object
///
/// Scalars are stringified (`true`, `8092`), `null` becomes an empty string.
/// Field order of the submission is kept. Fails with
/// [`Error::MissingFields`] before anything touches the filesystem.
pub fn record_from_form(form: IndexMap<String, Value>) -> Result<Record> {
    let record = Record::from_pairs(form.into_iter().map(|(k, v)| (k, value_text(v))));

    let missing = record.missing_required();
    if !missing.is_empty() {
        return Err(Error::MissingFields(missing));
    }

    Ok(record)
}

fn value_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested @ (Value::Array(_) | Value::Object(_)) => nested.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: Value) -> IndexMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_complete_form() {
        let record = record_from_form(form(json!({
            "repoUrl": "https://github.com/acme/widget",
            "branch": "main",
            "appName": "widget",
            "imageRepo": "nexus/widget",
            "base_image": "temurin:17",
            "jar_file": "app.jar",
            "skipLocalBuild": true,
            "expose_port": 8092,
            "namespace": null
        })))
        .unwrap();

        assert_eq!(record.app_name(), "widget");
        assert_eq!(record.get("skipLocalBuild"), Some("true"));
        assert_eq!(record.get("expose_port"), Some("8092"));
        assert_eq!(record.get("namespace"), Some(""));
        let keys: Vec<_> = record.fields().keys().map(String::as_str).collect();
        assert_eq!(keys[0], "repoUrl");
        assert_eq!(keys[8], "namespace");
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let err = record_from_form(form(json!({
            "repoUrl": "https://github.com/acme/widget",
            "appName": "",
            "imageRepo": "nexus/widget"
        })))
        .unwrap_err();

        match err {
            Error::MissingFields(fields) => {
                assert_eq!(fields, vec!["branch", "appName", "base_image", "jar_file"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
