use std::fmt;

use crate::valuation::provider::ChatMessage;
use crate::valuation::request::ValuationRequest;

/// Fixed instruction enforcing raw-JSON output from the model.
pub const SYSTEM_PROMPT: &str = "You are a financial AI assistant. STRICTLY return ONLY a JSON \
     object that matches the requested schema. DO NOT include any explanatory text or markdown \
     outside the JSON.";

/// Renders an optional field for interpolation; unknown values become blank.
fn opt<T: fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Builds the request-specific user instruction.
///
/// Pure formatting: the same request always yields a byte-identical
/// string. The output schema is restated at the end because models drift
/// from the system instruction on longer prompts.
pub fn build_user_prompt(request: &ValuationRequest) -> String {
    format!(
        "Evaluate this startup and return JSON with numeric valuation and analysis.\n\
         Company: {}\n\
         Industry: {}\n\
         Stage: {}\n\
         Founding Year: {}\n\
         Monthly Revenue: {}\n\
         Growth Rate: {}\n\
         Expenses: {}\n\
         Funding: {}\n\
         Burn Rate: {}\n\
         Months to Breakeven: {}\n\
         Customers: {}\n\
         Team Size: {}\n\
         Market Size: {}\n\
         IP: {}\n\
         Competitor Valuation: {}\n\
         CAC: {}\n\
         LTV: {}\n\
         \n\
         Return ONLY a raw JSON object with no surrounding text or markdown.\n\
         The 'Valuation' MUST be a clean integer number (e.g., 5000000) with NO commas, \
         NO currency symbols, and NO extra text.\n\
         {{ \"Valuation\": <clean number>, \"Analysis\": \"<short summary of method>\" }}",
        request.company_name,
        opt(&request.industry),
        opt(&request.stage),
        opt(&request.founding_year),
        opt(&request.monthly_revenue),
        opt(&request.revenue_growth_rate),
        opt(&request.monthly_expenses),
        opt(&request.funding_raised),
        opt(&request.burn_rate),
        opt(&request.months_to_breakeven),
        opt(&request.customers_count),
        opt(&request.team_size),
        opt(&request.market_size),
        opt(&request.intellectual_property),
        opt(&request.competitor_valuation),
        opt(&request.customer_acquisition_cost),
        opt(&request.lifetime_value),
    )
}

/// Builds the system/user message pair sent to the provider.
pub fn build_messages(request: &ValuationRequest) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_user_prompt(request)),
    ]
}

#[cfg(test)]
mod tests {
    use super::{SYSTEM_PROMPT, build_messages, build_user_prompt};
    use crate::valuation::request::ValuationRequest;

    fn sample_request() -> ValuationRequest {
        ValuationRequest {
            company_name: "Acme Robotics".to_string(),
            industry: Some("Robotics".to_string()),
            stage: Some("Seed".to_string()),
            founding_year: Some(2021),
            monthly_revenue: Some(42_000.0),
            customers_count: Some(120),
            ..ValuationRequest::default()
        }
    }

    #[test]
    fn prompt_is_deterministic() {
        let request = sample_request();
        assert_eq!(build_user_prompt(&request), build_user_prompt(&request));
    }

    #[test]
    fn absent_fields_render_blank() {
        let prompt = build_user_prompt(&sample_request());
        assert!(prompt.contains("Company: Acme Robotics"));
        assert!(prompt.contains("Customers: 120"));
        assert!(prompt.contains("Burn Rate: \n"));
        assert!(prompt.contains("LTV: \n"));
    }

    #[test]
    fn prompt_restates_output_schema() {
        let prompt = build_user_prompt(&sample_request());
        assert!(prompt.ends_with("{ \"Valuation\": <clean number>, \"Analysis\": \"<short summary of method>\" }"));
    }

    #[test]
    fn messages_pair_system_then_user() {
        let messages = build_messages(&sample_request());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, "user");
        assert!(messages[1].content.contains("Acme Robotics"));
    }
}
