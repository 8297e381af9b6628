//! Wire payloads for the project endpoint

use dsr_rules::Rule;
use serde::Serialize;
use serde_json::Value;

/// Body of the "replace the whole list" request
///
/// Serializes as `{"dynamicSampling": {"rules": [...]}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRulesRequest<'a> {
    /// `dynamicSampling` section
    pub dynamic_sampling: RulesPayload<'a>,
}

/// Inner `dynamicSampling` object
#[derive(Debug, Clone, Serialize)]
pub struct RulesPayload<'a> {
    /// Complete rule list, in order
    pub rules: &'a [Rule],
}

impl<'a> SaveRulesRequest<'a> {
    /// Request replacing the list with `rules`
    #[inline]
    #[must_use]
    pub fn new(rules: &'a [Rule]) -> Self {
        Self {
            dynamic_sampling: RulesPayload { rules },
        }
    }
}

/// Extract a user-facing message from an error response body
///
/// Looks at `detail` first, then the first message nested anywhere under
/// `dynamicSampling`. Returns `None` for bodies that are not JSON or carry
/// neither.
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    if let Some(detail) = value.get("detail").and_then(Value::as_str) {
        return Some(detail.to_string());
    }

    value.get("dynamicSampling").and_then(first_message)
}

fn first_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_message),
        Value::Object(map) => map.values().find_map(first_message),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsr_rules::SampleRate;
    use serde_json::json;

    #[test]
    fn request_shape() {
        let rules = vec![Rule::uniform(1, SampleRate::ALL)];
        let body = serde_json::to_value(SaveRulesRequest::new(&rules)).unwrap();
        assert_eq!(body["dynamicSampling"]["rules"][0]["id"], json!(1));
        assert_eq!(body["dynamicSampling"]["rules"][0]["type"], json!("uniform"));
    }

    #[test]
    fn detail_message() {
        assert_eq!(
            error_message(r#"{"detail": "You do not have permission"}"#).as_deref(),
            Some("You do not have permission")
        );
    }

    #[test]
    fn nested_rules_message() {
        let body = r#"{"dynamicSampling": {"rules": {"0": {"sampleRate": ["Ensure this value is less than or equal to 1."]}}}}"#;
        assert_eq!(
            error_message(body).as_deref(),
            Some("Ensure this value is less than or equal to 1.")
        );
    }

    #[test]
    fn unusable_bodies() {
        assert_eq!(error_message("<html>502</html>"), None);
        assert_eq!(error_message(r#"{"other": "x"}"#), None);
    }
}
