//! Result presenter
//!
//! Turns a session into a `View`: the serializable screen model returned by
//! the session API and printed by the CLI.

use std::fmt;

use chrono::Utc;
use serde::Serialize;

use crate::models::{TravelPreferences, TripRecommendation};
use crate::session::{AppStep, Notice, Pending, Session};

const LOADING_MESSAGES: &[&str] = &[
    "Looking closely at destination details...",
    "Finding restaurants only the locals know...",
    "Working out the best routes between stops...",
    "Checking the weather...",
    "Putting together a schedule just for you...",
    "Searching for hidden gems...",
];

const TRAVEL_TIPS: &[&str] = &[
    "Flights booked about six weeks ahead tend to be the cheapest on average.",
    "Local markets are the quickest way into a country's everyday culture.",
    "Travel insurance is not optional. Be ready for the unexpected.",
    "Download offline maps before you leave so you can navigate without data.",
    "Learning 'hello' and 'thank you' in the local language goes a long way.",
];

/// Seconds each loading message stays on screen
const MESSAGE_PERIOD_SECS: i64 = 3;

/// Trip constraints shown above results and details
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub date_range: String,
    pub duration: String,
    pub travelers: u32,
    pub companion: String,
    pub budget: String,
}

impl From<&TravelPreferences> for TripSummary {
    fn from(prefs: &TravelPreferences) -> Self {
        Self {
            date_range: format!("{} ~ {}", prefs.start_date, prefs.end_date),
            duration: prefs.duration().to_string(),
            travelers: prefs.travelers,
            companion: prefs.companion.label().to_string(),
            budget: format!(
                "{} {} per person",
                group_thousands(prefs.budget_per_person),
                prefs.currency
            ),
        }
    }
}

/// One entry of the results list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripCard {
    pub id: String,
    pub destination: String,
    pub country: String,
    pub short_description: String,
    pub reason: String,
    pub estimated_cost: String,
    pub image_url: Option<String>,
    pub itinerary_cached: bool,
}

impl From<&TripRecommendation> for TripCard {
    fn from(trip: &TripRecommendation) -> Self {
        Self {
            id: trip.id.to_string(),
            destination: trip.destination.clone(),
            country: trip.country.clone(),
            short_description: trip.short_description.clone(),
            reason: trip.reason_for_recommendation.clone(),
            estimated_cost: trip.estimated_total_cost.clone(),
            image_url: trip.image_url.clone(),
            itinerary_cached: trip.is_enriched(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "UPPERCASE")]
pub enum View {
    Landing,
    Input {
        notice: Option<Notice>,
    },
    Loading {
        message: String,
        tip: String,
    },
    Results {
        summary: Option<TripSummary>,
        cards: Vec<TripCard>,
        notice: Option<Notice>,
    },
    Detail {
        summary: Option<TripSummary>,
        trip: Box<TripRecommendation>,
    },
}

impl View {
    #[must_use]
    pub fn step(&self) -> AppStep {
        match self {
            View::Landing => AppStep::Landing,
            View::Input { .. } => AppStep::Input,
            View::Loading { .. } => AppStep::Loading,
            View::Results { .. } => AppStep::Results,
            View::Detail { .. } => AppStep::Detail,
        }
    }
}

/// Render the session, rotating loading texts with the wall clock
#[must_use]
pub fn render(session: &Session) -> View {
    let tick = Utc::now().timestamp() / MESSAGE_PERIOD_SECS;
    render_at(session, usize::try_from(tick).unwrap_or_default())
}

/// Render the session for a given loading tick. Messages advance every
/// tick, tips every second tick.
#[must_use]
pub fn render_at(session: &Session, tick: usize) -> View {
    let summary = session.preferences().map(TripSummary::from);

    match session.step() {
        AppStep::Landing => View::Landing,
        AppStep::Input => View::Input {
            notice: session.notice().cloned(),
        },
        AppStep::Loading => View::Loading {
            message: loading_message(session, tick),
            tip: TRAVEL_TIPS[(tick / 2) % TRAVEL_TIPS.len()].to_string(),
        },
        AppStep::Results => View::Results {
            summary,
            cards: session.recommendations().iter().map(TripCard::from).collect(),
            notice: session.notice().cloned(),
        },
        AppStep::Detail => match session.selected_trip() {
            Some(trip) => View::Detail {
                summary,
                trip: Box::new(trip.clone()),
            },
            // unreachable while the session upholds its invariants
            None => View::Results {
                summary,
                cards: session.recommendations().iter().map(TripCard::from).collect(),
                notice: session.notice().cloned(),
            },
        },
    }
}

fn loading_message(session: &Session, tick: usize) -> String {
    if let Some(Pending::Itinerary { trip_id, .. }) = session.pending() {
        let destination = session
            .recommendations()
            .iter()
            .find(|t| &t.id == trip_id)
            .map_or("your destination", |t| t.destination.as_str());
        return format!("Building a day-by-day itinerary for {destination}...");
    }
    LOADING_MESSAGES[tick % LOADING_MESSAGES.len()].to_string()
}

fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

impl fmt::Display for TripSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) | {} traveler{} ({}) | {}",
            self.date_range,
            self.duration,
            self.travelers,
            if self.travelers == 1 { "" } else { "s" },
            self.companion,
            self.budget
        )
    }
}

fn write_notice(f: &mut fmt::Formatter<'_>, notice: Option<&Notice>) -> fmt::Result {
    if let Some(notice) = notice {
        writeln!(f, "! {}", notice.message)?;
        writeln!(f, "  {}", notice.detail)?;
    }
    Ok(())
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Landing => {
                writeln!(f, "TripAI")?;
                writeln!(f, "Tell us how you like to travel and get three tailored trips.")
            }
            View::Input { notice } => {
                write_notice(f, notice.as_ref())?;
                writeln!(f, "Enter your travel preferences to get recommendations.")
            }
            View::Loading { message, tip } => {
                writeln!(f, "{message}")?;
                writeln!(f, "Tip: {tip}")
            }
            View::Results {
                summary,
                cards,
                notice,
            } => {
                write_notice(f, notice.as_ref())?;
                if let Some(summary) = summary {
                    writeln!(f, "{summary}")?;
                }
                if cards.is_empty() {
                    return writeln!(f, "No destinations matched these preferences.");
                }
                for (i, card) in cards.iter().enumerate() {
                    writeln!(f)?;
                    writeln!(f, "{}. {}, {}", i + 1, card.destination, card.country)?;
                    writeln!(f, "   {}", card.short_description)?;
                    writeln!(f, "   Why: {}", card.reason)?;
                    writeln!(f, "   Estimated cost: {}", card.estimated_cost)?;
                    if let Some(url) = &card.image_url {
                        writeln!(f, "   Image: {url}")?;
                    }
                }
                Ok(())
            }
            View::Detail { summary, trip } => {
                writeln!(f, "{}, {}", trip.destination, trip.country)?;
                if let Some(summary) = summary {
                    writeln!(f, "{summary}")?;
                }
                writeln!(f, "{}", trip.short_description)?;
                writeln!(f, "Estimated cost: {}", trip.estimated_total_cost)?;
                if !trip.flight_suggestion.is_empty() {
                    writeln!(f, "Flight: {}", trip.flight_suggestion)?;
                }
                if !trip.hotel_suggestion.is_empty() {
                    writeln!(f, "Hotel: {}", trip.hotel_suggestion)?;
                }
                for day in &trip.itinerary {
                    writeln!(f)?;
                    writeln!(f, "Day {}: {}", day.day, day.theme)?;
                    for activity in &day.activities {
                        writeln!(f, "  [{}] {}", activity.time, activity.activity)?;
                        if !activity.description.is_empty() {
                            writeln!(f, "      {}", activity.description)?;
                        }
                    }
                }
                if !trip.attractions.is_empty() {
                    writeln!(f)?;
                    writeln!(f, "Must-see attractions")?;
                    for attraction in &trip.attractions {
                        match &attraction.description {
                            Some(description) => {
                                writeln!(f, "  - {}: {}", attraction.name, description)?;
                            }
                            None => writeln!(f, "  - {}", attraction.name)?,
                        }
                    }
                }
                Ok(())
            }
        }
    }
}
