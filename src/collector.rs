//! Preference collection
//!
//! Turns raw form input into validated [`TravelPreferences`]. Validation
//! failures stay here and never reach the session state machine.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{CompanionType, Currency, TravelPreferences};
use crate::{Result, TripAiError};

/// Raw values as entered in the trip form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferenceForm {
    pub start_date: String,
    pub end_date: String,
    pub travelers: u32,
    pub budget_per_person: u64,
    pub currency: String,
    pub companion: String,
    pub preferred_destination: String,
    pub special_requests: String,
    pub travel_styles: Vec<String>,
}

impl Default for PreferenceForm {
    fn default() -> Self {
        Self {
            start_date: String::new(),
            end_date: String::new(),
            travelers: 1,
            budget_per_person: 1_000_000,
            currency: Currency::Krw.code().to_string(),
            companion: "Solo".to_string(),
            preferred_destination: String::new(),
            special_requests: String::new(),
            travel_styles: Vec::new(),
        }
    }
}

impl PreferenceForm {
    /// Validate the form and build the preferences record
    pub fn collect(&self) -> Result<TravelPreferences> {
        let start_date = parse_date(&self.start_date, "start date")?;
        let end_date = parse_date(&self.end_date, "end date")?;

        if end_date < start_date {
            return Err(TripAiError::validation(format!(
                "end date {end_date} is before start date {start_date}"
            )));
        }

        if self.travelers == 0 {
            return Err(TripAiError::validation("at least one traveler is required"));
        }

        let currency: Currency = self.currency.parse()?;
        let companion: CompanionType = self.companion.parse()?;

        let preferred_destination = Some(self.preferred_destination.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let travel_styles: BTreeSet<String> = self
            .travel_styles
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        debug!(
            "Collected preferences: {} to {}, {} traveler(s), {} {}",
            start_date, end_date, self.travelers, self.budget_per_person, currency
        );

        Ok(TravelPreferences {
            start_date,
            end_date,
            travelers: self.travelers,
            budget_per_person: self.budget_per_person,
            currency,
            companion,
            preferred_destination,
            special_requests: self.special_requests.trim().to_string(),
            travel_styles,
        })
    }
}

fn parse_date(input: &str, field: &str) -> Result<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return Err(TripAiError::validation(format!("{field} is required")));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        TripAiError::validation(format!("{field} '{input}' must be in YYYY-MM-DD format"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn form() -> PreferenceForm {
        PreferenceForm {
            start_date: "2024-06-01".to_string(),
            end_date: "2024-06-03".to_string(),
            travelers: 2,
            companion: "커플".to_string(),
            ..PreferenceForm::default()
        }
    }

    #[test]
    fn test_defaults_match_form() {
        let form = PreferenceForm::default();
        assert_eq!(form.travelers, 1);
        assert_eq!(form.budget_per_person, 1_000_000);
        assert_eq!(form.currency, "KRW");
    }

    #[test]
    fn test_collect_valid_form() {
        let prefs = form().collect().unwrap();
        assert_eq!(prefs.travelers, 2);
        assert_eq!(prefs.companion, CompanionType::Couple);
        assert_eq!(prefs.currency, Currency::Krw);
        assert!(prefs.preferred_destination.is_none());
        assert_eq!(prefs.duration().days, 3);
    }

    #[rstest]
    #[case("", "2024-06-03", "start date is required")]
    #[case("2024-06-01", "", "end date is required")]
    #[case("06/01/2024", "2024-06-03", "YYYY-MM-DD")]
    #[case("2024-06-05", "2024-06-03", "before start date")]
    fn test_date_validation(#[case] start: &str, #[case] end: &str, #[case] expected: &str) {
        let form = PreferenceForm {
            start_date: start.to_string(),
            end_date: end.to_string(),
            ..form()
        };
        let err = form.collect().unwrap_err();
        assert!(matches!(err, TripAiError::Validation { .. }));
        assert!(err.to_string().contains(expected), "got: {err}");
    }

    #[test]
    fn test_zero_travelers_rejected() {
        let form = PreferenceForm {
            travelers: 0,
            ..form()
        };
        assert!(form.collect().is_err());
    }

    #[test]
    fn test_unknown_currency_rejected() {
        let form = PreferenceForm {
            currency: "BTC".to_string(),
            ..form()
        };
        assert!(matches!(
            form.collect().unwrap_err(),
            TripAiError::Validation { .. }
        ));
    }

    #[test]
    fn test_free_text_is_normalized() {
        let form = PreferenceForm {
            preferred_destination: "  일본 오사카 ".to_string(),
            travel_styles: vec![
                "food".to_string(),
                " ".to_string(),
                "food".to_string(),
                "relaxed".to_string(),
            ],
            ..form()
        };
        let prefs = form.collect().unwrap();
        assert_eq!(prefs.preferred_destination.as_deref(), Some("일본 오사카"));
        assert_eq!(prefs.travel_styles.len(), 2);
    }

    #[test]
    fn test_form_deserializes_with_defaults() {
        let form: PreferenceForm = serde_json::from_value(serde_json::json!({
            "startDate": "2024-06-01",
            "endDate": "2024-06-03"
        }))
        .unwrap();
        assert_eq!(form.travelers, 1);
        assert!(form.collect().is_ok());
    }
}
