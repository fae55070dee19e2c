//! Coerces the model's free-form final answer into a [`GeneratedSite`].

use serde_json::{ Map, Value as JsonValue };

use crate::error::GenerationError;
use crate::models::GeneratedSite;

pub const REQUIRED_KEYS: [&str; 3] = ["html", "css", "js"];

const FENCE: &str = "```";

/// Removes a leading markdown code fence (with an optional, case-insensitive
/// `json` tag) and a trailing fence. Text that does not start with a fence
/// is only trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(mut body) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };
    if body.get(..4).map_or(false, |tag| tag.eq_ignore_ascii_case("json")) {
        body = &body[4..];
    }
    if let Some(stripped) = body.strip_suffix(FENCE) {
        body = stripped;
    }
    body.trim()
}

pub fn normalize_response(raw: &str) -> Result<GeneratedSite, GenerationError> {
    let cleaned = strip_code_fence(raw);
    let parsed: JsonValue = serde_json
        ::from_str(cleaned)
        .map_err(|e| GenerationError::malformed(raw, e.to_string()))?;

    let JsonValue::Object(mut fields) = parsed else {
        return Err(GenerationError::malformed(raw, "top-level JSON value is not an object"));
    };

    let [html, css, js] = REQUIRED_KEYS.map(|key| take_field(&mut fields, key));

    Ok(GeneratedSite { html, css, js, extra: fields })
}

fn take_field(fields: &mut Map<String, JsonValue>, key: &str) -> String {
    match fields.remove(key) {
        None => String::new(),
        Some(value) if is_falsy(&value) => String::new(),
        Some(JsonValue::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

fn is_falsy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Bool(b) => !b,
        JsonValue::Number(n) => n.as_f64().map_or(false, |f| f == 0.0),
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn strips_tagged_fence() {
        let raw = "```json\n{\"html\":\"<p>x</p>\",\"css\":\"\",\"js\":\"\"}\n```";
        let site = normalize_response(raw).unwrap();
        assert_eq!(site, GeneratedSite::new("<p>x</p>", "", ""));
    }

    #[test]
    fn strips_bare_fence() {
        let raw = "```\n{\"html\":\"<h1>a</h1>\",\"css\":\"h1{}\",\"js\":\"1;\"}\n```";
        let site = normalize_response(raw).unwrap();
        assert_eq!(site, GeneratedSite::new("<h1>a</h1>", "h1{}", "1;"));
    }

    #[test]
    fn fence_tag_is_case_insensitive_and_closing_fence_optional() {
        assert_eq!(strip_code_fence("  ```JSON {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```Json\n{}\n```\n"), "{}");
        assert_eq!(strip_code_fence("{\"html\":\"```\"}"), "{\"html\":\"```\"}");
    }

    #[test]
    fn malformed_input_carries_original_text() {
        match normalize_response("not json") {
            Err(GenerationError::MalformedResponse { raw, .. }) => assert_eq!(raw, "not json"),
            other => panic!("expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn malformed_raw_is_untrimmed_original() {
        let raw = "\n```json\n{\"html\": \n```\n";
        match normalize_response(raw) {
            Err(GenerationError::MalformedResponse { raw: carried, .. }) => assert_eq!(carried, raw),
            other => panic!("expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn non_object_json_is_malformed() {
        assert!(matches!(
            normalize_response("[\"html\"]"),
            Err(GenerationError::MalformedResponse { .. })
        ));
        assert!(matches!(normalize_response("42"), Err(GenerationError::MalformedResponse { .. })));
    }

    #[test]
    fn missing_and_falsy_fields_default_to_empty() {
        let site = normalize_response(r#"{"html": null, "css": false, "title": "t"}"#).unwrap();
        assert_eq!(site.html, "");
        assert_eq!(site.css, "");
        assert_eq!(site.js, "");
        assert_eq!(site.extra.get("title"), Some(&json!("t")));

        let zero = normalize_response(r#"{"html": 0, "css": 0.0, "js": ""}"#).unwrap();
        assert_eq!(zero, GeneratedSite::new("", "", ""));
    }

    #[test]
    fn required_keys_are_lifted_out_of_extra() {
        let site = normalize_response(r#"{"html": "<p></p>", "css": "p{}", "js": "", "lang": "en"}"#).unwrap();
        for key in REQUIRED_KEYS {
            assert!(!site.extra.contains_key(key), "{} left in extra", key);
        }
        assert_eq!(site.extra.len(), 1);
    }

    #[test]
    fn truthy_non_strings_become_json_text() {
        let site = normalize_response(r#"{"html": "<p></p>", "css": 5, "js": ["a"]}"#).unwrap();
        assert_eq!(site.css, "5");
        assert_eq!(site.js, "[\"a\"]");
    }

    #[test]
    fn normalizing_twice_is_stable() {
        let first = normalize_response(
            "```json\n{\"html\":\"<main></main>\",\"js\":null,\"meta\":{\"v\":1}}\n```"
        ).unwrap();
        let serialized = serde_json::to_string(&first).unwrap();
        let second = normalize_response(&serialized).unwrap();
        assert_eq!(first, second);
        for key in REQUIRED_KEYS {
            assert!(serde_json::to_value(&second).unwrap()[key].is_string());
        }
    }
}
