use serde::{Deserialize, Serialize};

use crate::valuation::provider::ValuationError;

/// Startup profile submitted for valuation.
///
/// Every numeric field is optional: absence means "unknown", never zero.
/// Only `company_name` is required; the rest of the profile is whatever
/// the caller happens to know about the business.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValuationRequest {
    pub company_name: String,
    pub industry: Option<String>,
    pub stage: Option<String>,
    pub founding_year: Option<i32>,
    pub monthly_revenue: Option<f64>,
    pub revenue_growth_rate: Option<f64>,
    pub monthly_expenses: Option<f64>,
    pub funding_raised: Option<f64>,
    pub burn_rate: Option<f64>,
    pub months_to_breakeven: Option<f64>,
    pub customers_count: Option<u32>,
    pub team_size: Option<u32>,
    pub market_size: Option<String>,
    pub intellectual_property: Option<String>,
    pub competitor_valuation: Option<f64>,
    pub customer_acquisition_cost: Option<f64>,
    pub lifetime_value: Option<f64>,
}

impl ValuationRequest {
    /// Checks the precondition for submitting the profile to the provider.
    pub fn validate(&self) -> Result<(), ValuationError> {
        if self.company_name.is_empty() {
            return Err(ValuationError::MissingCompanyName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ValuationRequest;
    use crate::valuation::provider::ValuationError;

    #[test]
    fn empty_company_name_fails_validation() {
        let request = ValuationRequest::default();
        assert!(matches!(
            request.validate(),
            Err(ValuationError::MissingCompanyName)
        ));
    }

    #[test]
    fn named_company_passes_validation() {
        let request = ValuationRequest {
            company_name: "Acme Robotics".to_string(),
            ..ValuationRequest::default()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn unknown_fields_are_ignored_on_deserialize() {
        let request: ValuationRequest = serde_json::from_str(
            r#"{"companyName": "Acme", "foundingYear": 2021, "somethingElse": true}"#,
        )
        .expect("profile should deserialize");
        assert_eq!(request.company_name, "Acme");
        assert_eq!(request.founding_year, Some(2021));
        assert!(request.monthly_revenue.is_none());
    }
}
