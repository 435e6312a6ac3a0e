use serde::{Deserialize, Serialize};

use crate::valuation::provider::{Usage, ValuationError};

/// Placeholder substituted when the model omits its analysis.
pub const NO_ANALYSIS_PLACEHOLDER: &str = "No analysis provided by AI.";

/// Provider response envelope. Only the first choice is consulted; the
/// provider puts its deterministic answer there.
#[derive(Debug, Deserialize)]
struct ChatCompletionEnvelope {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

/// Model output as written on the wire. Both fields are optional here;
/// default-filling happens when converting to [`ValuationResult`].
#[derive(Debug, Deserialize)]
struct RawEstimate {
    #[serde(rename = "Valuation")]
    valuation: Option<f64>,
    #[serde(rename = "Analysis")]
    analysis: Option<String>,
}

/// Validated valuation. `analysis` is always present; a `None` valuation
/// means the model declined to estimate, not zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationResult {
    #[serde(rename = "Valuation")]
    pub valuation: Option<f64>,
    #[serde(rename = "Analysis")]
    pub analysis: String,
}

/// Removes markdown code-fence decoration around a JSON payload.
///
/// Brace-bounding is the primary strategy: models sometimes leave stray
/// prose outside the fence, and slicing from the first `{` to the last
/// `}` survives that. Textual fence removal is the fallback when no brace
/// pair exists. Idempotent on already-clean input.
pub fn strip_code_fences(content: &str) -> String {
    let trimmed = content.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    if let (Some(first), Some(last)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if first < last {
            return trimmed[first..=last].to_string();
        }
    }
    trimmed.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parses candidate JSON into a validated result, filling defaults.
pub fn parse_estimate(candidate: &str) -> Result<ValuationResult, ValuationError> {
    let raw: RawEstimate = serde_json::from_str(candidate)
        .map_err(|err| ValuationError::UnparsableOutput {
            detail: err.to_string(),
        })?;
    Ok(ValuationResult {
        valuation: raw.valuation,
        analysis: raw
            .analysis
            .unwrap_or_else(|| NO_ANALYSIS_PLACEHOLDER.to_string()),
    })
}

/// Runs the full extraction pipeline over a raw provider response body.
///
/// Envelope check, first-choice content selection, fence stripping, and
/// the final parse each short-circuit to a classified error.
pub fn extract_response(body: &str) -> Result<(ValuationResult, Option<Usage>), ValuationError> {
    let envelope: ChatCompletionEnvelope =
        serde_json::from_str(body).map_err(|_| ValuationError::EmptyResponse)?;
    let first = envelope
        .choices
        .first()
        .ok_or(ValuationError::EmptyResponse)?;
    let content = first.message.content.as_deref().unwrap_or("");

    let candidate = strip_code_fences(content);
    let result = parse_estimate(candidate.trim())?;

    let usage = envelope.usage.map(|usage| Usage {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
    });
    Ok((result, usage))
}

#[cfg(test)]
mod tests {
    use super::{
        NO_ANALYSIS_PLACEHOLDER, extract_response, parse_estimate, strip_code_fences,
    };
    use crate::valuation::provider::ValuationError;

    fn envelope_with_content(content: &str) -> String {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[test]
    fn fenced_json_is_extracted() {
        let body =
            envelope_with_content("```json\n{\"Valuation\": 5000000, \"Analysis\": \"x\"}\n```");
        let (result, _) = extract_response(&body).expect("fenced payload should extract");
        assert_eq!(result.valuation, Some(5_000_000.0));
        assert_eq!(result.analysis, "x");
    }

    #[test]
    fn bare_json_passes_through_unchanged() {
        let body = envelope_with_content("{\"Valuation\": 1200000, \"Analysis\": \"ok\"}");
        let (result, _) = extract_response(&body).expect("bare payload should extract");
        assert_eq!(result.valuation, Some(1_200_000.0));
        assert_eq!(result.analysis, "ok");
    }

    #[test]
    fn missing_analysis_gets_placeholder() {
        let body = envelope_with_content("{\"Valuation\": 900000}");
        let (result, _) = extract_response(&body).expect("payload should extract");
        assert_eq!(result.valuation, Some(900_000.0));
        assert_eq!(result.analysis, NO_ANALYSIS_PLACEHOLDER);
    }

    #[test]
    fn missing_valuation_is_passed_through_as_none() {
        let body = envelope_with_content("{\"Analysis\": \"insufficient data\"}");
        let (result, _) = extract_response(&body).expect("payload should extract");
        assert_eq!(result.valuation, None);
        assert_eq!(result.analysis, "insufficient data");
    }

    #[test]
    fn zero_choices_is_empty_response() {
        let body = "{\"choices\": []}";
        assert!(matches!(
            extract_response(body),
            Err(ValuationError::EmptyResponse)
        ));
    }

    #[test]
    fn malformed_envelope_is_empty_response() {
        assert!(matches!(
            extract_response("not even json"),
            Err(ValuationError::EmptyResponse)
        ));
    }

    #[test]
    fn prose_without_braces_is_unparsable() {
        let body = envelope_with_content("I cannot value this startup, sorry.");
        assert!(matches!(
            extract_response(&body),
            Err(ValuationError::UnparsableOutput { .. })
        ));
    }

    #[test]
    fn absent_content_defaults_to_empty_and_fails_parse() {
        let body = "{\"choices\": [{\"message\": {\"role\": \"assistant\"}}]}";
        assert!(matches!(
            extract_response(body),
            Err(ValuationError::UnparsableOutput { .. })
        ));
    }

    #[test]
    fn fence_stripping_is_idempotent_on_clean_input() {
        let clean = "{\"Valuation\": 1, \"Analysis\": \"a\"}";
        assert_eq!(strip_code_fences(clean), clean);
        assert_eq!(strip_code_fences(&strip_code_fences(clean)), clean);
    }

    #[test]
    fn fence_with_language_tag_and_stray_prose_is_brace_bounded() {
        let content = "```json\nHere you go:\n{\"Valuation\": 7, \"Analysis\": \"b\"}\ntrailing\n```";
        assert_eq!(
            strip_code_fences(content),
            "{\"Valuation\": 7, \"Analysis\": \"b\"}"
        );
    }

    #[test]
    fn fence_without_braces_falls_back_to_textual_stripping() {
        assert_eq!(strip_code_fences("```json\nnull\n```"), "null");
    }

    #[test]
    fn extra_fields_in_model_output_are_ignored() {
        let result = parse_estimate(
            "{\"Valuation\": 10, \"Analysis\": \"c\", \"Confidence\": \"high\"}",
        )
        .expect("lenient parse should succeed");
        assert_eq!(result.valuation, Some(10.0));
    }

    #[test]
    fn formatted_number_fails_instead_of_being_sanitized() {
        assert!(matches!(
            parse_estimate("{\"Valuation\": \"5,000,000\", \"Analysis\": \"d\"}"),
            Err(ValuationError::UnparsableOutput { .. })
        ));
    }

    #[test]
    fn usage_is_passed_through_when_present() {
        let body = serde_json::json!({
            "choices": [{"message": {"content": "{\"Valuation\": 1}"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        })
        .to_string();
        let (_, usage) = extract_response(&body).expect("payload should extract");
        let usage = usage.expect("usage should be present");
        assert_eq!(usage.total_tokens, Some(15));
    }
}
