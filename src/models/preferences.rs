//! Travel preferences model and derived trip figures

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::TripAiError;

/// Who the user is travelling with. Serialized with its Korean label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CompanionType {
    Solo,
    Couple,
    Family,
    Friends,
    Parents,
    Other,
}

impl CompanionType {
    pub const ALL: [CompanionType; 6] = [
        CompanionType::Solo,
        CompanionType::Couple,
        CompanionType::Family,
        CompanionType::Friends,
        CompanionType::Parents,
        CompanionType::Other,
    ];

    /// Korean label shown in the form and sent to the planner
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CompanionType::Solo => "혼자",
            CompanionType::Couple => "연인/부부",
            CompanionType::Family => "가족",
            CompanionType::Friends => "친구",
            CompanionType::Parents => "부모님 (효도여행)",
            CompanionType::Other => "기타",
        }
    }
}

impl FromStr for CompanionType {
    type Err = TripAiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        let companion = match normalized.to_ascii_lowercase().as_str() {
            "solo" | "alone" | "혼자" => CompanionType::Solo,
            "couple" | "partner" | "커플" | "연인" | "부부" | "연인/부부" => {
                CompanionType::Couple
            }
            "family" | "가족" => CompanionType::Family,
            "friends" | "friend" | "친구" => CompanionType::Friends,
            "parents" | "부모님" | "부모님 (효도여행)" | "효도여행" => CompanionType::Parents,
            "other" | "기타" => CompanionType::Other,
            _ => {
                return Err(TripAiError::validation(format!(
                    "unknown companion type '{normalized}'"
                )));
            }
        };
        Ok(companion)
    }
}

impl TryFrom<String> for CompanionType {
    type Error = TripAiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CompanionType> for String {
    fn from(companion: CompanionType) -> Self {
        companion.label().to_string()
    }
}

impl fmt::Display for CompanionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Currency the budget is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Krw,
    Usd,
    Eur,
    Jpy,
}

impl Currency {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Currency::Krw => "KRW",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Jpy => "JPY",
        }
    }
}

impl FromStr for Currency {
    type Err = TripAiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "KRW" => Ok(Currency::Krw),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "JPY" => Ok(Currency::Jpy),
            other => Err(TripAiError::validation(format!(
                "unsupported currency '{other}' (expected KRW, USD, EUR or JPY)"
            ))),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Validated trip constraints. Built by the preference collector and
/// never mutated after submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelPreferences {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub travelers: u32,
    pub budget_per_person: u64,
    pub currency: Currency,
    pub companion: CompanionType,
    /// `None` lets the planner pick the destination
    #[serde(default)]
    pub preferred_destination: Option<String>,
    #[serde(default)]
    pub special_requests: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub travel_styles: BTreeSet<String>,
}

impl TravelPreferences {
    /// Nights and days covered by the trip
    #[must_use]
    pub fn duration(&self) -> TripDuration {
        let nights = (self.end_date - self.start_date).num_days().max(0);
        let nights = u32::try_from(nights).unwrap_or(u32::MAX - 1);
        TripDuration {
            nights,
            days: nights + 1,
        }
    }

    /// Date range string sent to the planner, e.g. `2024-06-01 to 2024-06-03`
    #[must_use]
    pub fn date_range_label(&self) -> String {
        format!("{} to {}", self.start_date, self.end_date)
    }

    /// Budget string sent to the planner, e.g. `1000000 KRW`
    #[must_use]
    pub fn budget_label(&self) -> String {
        format!("{} {}", self.budget_per_person, self.currency)
    }
}

/// Length of a trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TripDuration {
    pub nights: u32,
    pub days: u32,
}

impl fmt::Display for TripDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nights = if self.nights == 1 { "night" } else { "nights" };
        let days = if self.days == 1 { "day" } else { "days" };
        write!(f, "{} {nights} / {} {days}", self.nights, self.days)
    }
}
