//! Application state machine
//!
//! `Session` holds the current screen, the submitted preferences, the
//! recommendation list and the selected trip. Its transition methods are the
//! only way to change it. Boundary calls are not made here: transitions that
//! need one hand back a query for the controller to run, and the outcome comes
//! back through the matching completion method.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::TransitionError;
use crate::models::{Enrichment, TravelPreferences, TripId, TripRecommendation};

/// Screen the session is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppStep {
    #[default]
    Landing,
    Input,
    Loading,
    Results,
    Detail,
}

impl fmt::Display for AppStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppStep::Landing => "LANDING",
            AppStep::Input => "INPUT",
            AppStep::Loading => "LOADING",
            AppStep::Results => "RESULTS",
            AppStep::Detail => "DETAIL",
        };
        f.write_str(name)
    }
}

/// What a `LOADING` session is waiting for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    Destinations { ticket: u64 },
    Itinerary { ticket: u64, trip_id: TripId },
}

impl Pending {
    #[must_use]
    pub fn ticket(&self) -> u64 {
        match self {
            Pending::Destinations { ticket } | Pending::Itinerary { ticket, .. } => *ticket,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    DestinationsFailed,
    ItineraryFailed,
}

/// User-visible notification raised by a failed boundary call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    /// Explanation of the underlying failure
    pub detail: String,
}

/// Destination query issued by `submit`
#[derive(Debug, Clone)]
pub struct DestinationQuery {
    pub ticket: u64,
    pub preferences: TravelPreferences,
}

/// Itinerary query issued by `select` for a trip without itinerary
#[derive(Debug, Clone)]
pub struct ItineraryQuery {
    pub ticket: u64,
    pub trip_id: TripId,
    pub destination: String,
    pub preferences: TravelPreferences,
}

/// Outcome of selecting a trip
#[derive(Debug, Clone)]
pub enum Selection {
    /// Itinerary already cached; the session is on `DETAIL`
    Cached,
    /// Itinerary must be fetched; the session is on `LOADING`
    Fetch(ItineraryQuery),
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    step: AppStep,
    preferences: Option<TravelPreferences>,
    recommendations: Vec<TripRecommendation>,
    selected: Option<TripId>,
    pending: Option<Pending>,
    notice: Option<Notice>,
    next_ticket: u64,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn step(&self) -> AppStep {
        self.step
    }

    #[must_use]
    pub fn preferences(&self) -> Option<&TravelPreferences> {
        self.preferences.as_ref()
    }

    #[must_use]
    pub fn recommendations(&self) -> &[TripRecommendation] {
        &self.recommendations
    }

    /// The selected trip, if any
    #[must_use]
    pub fn selected_trip(&self) -> Option<&TripRecommendation> {
        let id = self.selected.as_ref()?;
        self.recommendations.iter().find(|t| &t.id == id)
    }

    #[must_use]
    pub fn pending(&self) -> Option<&Pending> {
        self.pending.as_ref()
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// `LANDING --start--> INPUT`
    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.require_step(AppStep::Landing, "start")?;
        self.enter(AppStep::Input);
        self.notice = None;
        Ok(())
    }

    /// `INPUT --submit--> LOADING`, storing the preferences
    pub fn submit(
        &mut self,
        preferences: TravelPreferences,
    ) -> Result<DestinationQuery, TransitionError> {
        self.require_step(AppStep::Input, "submit")?;

        let ticket = self.issue_ticket();
        self.recommendations.clear();
        self.selected = None;
        self.notice = None;
        self.preferences = Some(preferences.clone());
        self.pending = Some(Pending::Destinations { ticket });
        self.enter(AppStep::Loading);

        Ok(DestinationQuery {
            ticket,
            preferences,
        })
    }

    /// `LOADING --success--> RESULTS`
    pub fn destinations_loaded(
        &mut self,
        ticket: u64,
        trips: Vec<TripRecommendation>,
    ) -> Result<(), TransitionError> {
        self.claim(ticket, |p| matches!(p, Pending::Destinations { .. }))?;
        self.recommendations = trips;
        self.enter(AppStep::Results);
        Ok(())
    }

    /// `LOADING --failure--> INPUT`; the submitted preferences are discarded
    pub fn destinations_failed(
        &mut self,
        ticket: u64,
        notice: Notice,
    ) -> Result<(), TransitionError> {
        self.claim(ticket, |p| matches!(p, Pending::Destinations { .. }))?;
        self.preferences = None;
        self.recommendations.clear();
        self.selected = None;
        self.notice = Some(notice);
        self.enter(AppStep::Input);
        Ok(())
    }

    /// `RESULTS --select--> DETAIL` when the itinerary is cached, otherwise
    /// `RESULTS --select--> LOADING`
    pub fn select(&mut self, trip_id: &TripId) -> Result<Selection, TransitionError> {
        self.require_step(AppStep::Results, "select a trip")?;

        let trip = self
            .recommendations
            .iter()
            .find(|t| &t.id == trip_id)
            .ok_or_else(|| TransitionError::UnknownTrip(trip_id.to_string()))?;

        if trip.is_enriched() {
            self.notice = None;
            self.selected = Some(trip_id.clone());
            self.enter(AppStep::Detail);
            return Ok(Selection::Cached);
        }

        let destination = trip.destination.clone();
        // preferences are always present on RESULTS
        let preferences = self.preferences.clone().ok_or_else(|| {
            TransitionError::InvalidTransition {
                intent: "select a trip",
                step: "RESULTS without preferences".to_string(),
            }
        })?;

        self.notice = None;
        self.selected = Some(trip_id.clone());
        let ticket = self.issue_ticket();
        self.pending = Some(Pending::Itinerary {
            ticket,
            trip_id: trip_id.clone(),
        });
        self.enter(AppStep::Loading);

        Ok(Selection::Fetch(ItineraryQuery {
            ticket,
            trip_id: trip_id.clone(),
            destination,
            preferences,
        }))
    }

    /// `LOADING --itinerary--> DETAIL`, caching the enriched trip in place
    pub fn itinerary_loaded(
        &mut self,
        ticket: u64,
        enrichment: Enrichment,
    ) -> Result<(), TransitionError> {
        let Pending::Itinerary { trip_id, .. } =
            self.claim(ticket, |p| matches!(p, Pending::Itinerary { .. }))?
        else {
            return Err(TransitionError::StaleCompletion { ticket });
        };

        let Some(slot) = self.recommendations.iter_mut().find(|t| t.id == trip_id) else {
            self.selected = None;
            self.enter(AppStep::Results);
            return Err(TransitionError::UnknownTrip(trip_id.to_string()));
        };

        *slot = slot.enriched(enrichment);
        self.selected = Some(trip_id);
        self.enter(AppStep::Detail);
        Ok(())
    }

    /// `LOADING --itinerary failure--> RESULTS`, keeping the list intact
    pub fn itinerary_failed(&mut self, ticket: u64, notice: Notice) -> Result<(), TransitionError> {
        self.claim(ticket, |p| matches!(p, Pending::Itinerary { .. }))?;
        self.selected = None;
        self.notice = Some(notice);
        self.enter(AppStep::Results);
        Ok(())
    }

    /// `DETAIL --back--> RESULTS`
    pub fn back(&mut self) -> Result<(), TransitionError> {
        self.require_step(AppStep::Detail, "go back")?;
        self.selected = None;
        self.notice = None;
        self.enter(AppStep::Results);
        Ok(())
    }

    /// `any --startOver--> INPUT`
    pub fn start_over(&mut self) {
        self.clear();
        self.enter(AppStep::Input);
    }

    /// `any --goToLanding--> LANDING`
    pub fn go_to_landing(&mut self) {
        self.clear();
        self.enter(AppStep::Landing);
    }

    fn clear(&mut self) {
        self.preferences = None;
        self.recommendations.clear();
        self.selected = None;
        self.pending = None;
        self.notice = None;
    }

    fn require_step(&self, step: AppStep, intent: &'static str) -> Result<(), TransitionError> {
        if self.step == step {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition {
                intent,
                step: self.step.to_string(),
            })
        }
    }

    fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// Take the pending query if `ticket` is the one being waited for
    fn claim(
        &mut self,
        ticket: u64,
        kind: impl Fn(&Pending) -> bool,
    ) -> Result<Pending, TransitionError> {
        let waiting = self.step == AppStep::Loading
            && self
                .pending
                .as_ref()
                .is_some_and(|p| p.ticket() == ticket && kind(p));

        if !waiting {
            return Err(TransitionError::StaleCompletion { ticket });
        }
        self.pending
            .take()
            .ok_or(TransitionError::StaleCompletion { ticket })
    }

    fn enter(&mut self, step: AppStep) {
        debug!("Session transition {} -> {}", self.step, step);
        self.step = step;
    }
}
