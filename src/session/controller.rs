//! Session controller
//!
//! Owns the session and the recommendation client. Intents are applied to
//! the session under a lock; boundary calls run without holding it and
//! their outcome is fed back through the ticketed completion transitions.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::state::{
    AppStep, DestinationQuery, ItineraryQuery, Notice, NoticeKind, Selection, Session,
};
use crate::models::{TravelPreferences, TripId};
use crate::planner::RecommendationClient;
use crate::presenter::{self, View};
use crate::{Result, TripAiError};

enum Fetch {
    Destinations(DestinationQuery),
    Itinerary(ItineraryQuery),
}

pub struct Controller {
    session: Mutex<Session>,
    client: Arc<dyn RecommendationClient>,
}

impl Controller {
    #[must_use]
    pub fn new(client: Arc<dyn RecommendationClient>) -> Self {
        Self {
            session: Mutex::new(Session::new()),
            client,
        }
    }

    /// Copy of the current session
    pub async fn snapshot(&self) -> Session {
        self.session.lock().await.clone()
    }

    /// Current view of the session
    pub async fn view(&self) -> View {
        presenter::render(&*self.session.lock().await)
    }

    pub async fn start(&self) -> Result<AppStep> {
        let mut session = self.session.lock().await;
        session.start()?;
        Ok(session.step())
    }

    /// Submit preferences and wait for the destination query to settle
    pub async fn submit(&self, preferences: TravelPreferences) -> Result<AppStep> {
        let fetch = self.begin_submit(preferences).await?;
        Ok(self.run(fetch).await)
    }

    /// Select a trip, waiting for its itinerary when it is not cached yet
    pub async fn select(&self, trip_id: &TripId) -> Result<AppStep> {
        match self.begin_select(trip_id).await? {
            Some(fetch) => Ok(self.run(fetch).await),
            None => Ok(AppStep::Detail),
        }
    }

    /// Submit preferences and let the destination query settle in the
    /// background. Returns the `LOADING` view.
    pub async fn dispatch_submit(self: &Arc<Self>, preferences: TravelPreferences) -> Result<View> {
        let (query, view) = {
            let mut session = self.session.lock().await;
            let query = session.submit(preferences)?;
            (query, presenter::render(&session))
        };
        self.spawn(Fetch::Destinations(query));
        Ok(view)
    }

    /// Select a trip, fetching a missing itinerary in the background.
    /// Returns the `DETAIL` view for a cached trip, `LOADING` otherwise.
    pub async fn dispatch_select(self: &Arc<Self>, trip_id: &TripId) -> Result<View> {
        let (selection, view) = {
            let mut session = self.session.lock().await;
            let selection = session.select(trip_id)?;
            (selection, presenter::render(&session))
        };
        if let Selection::Fetch(query) = selection {
            self.spawn(Fetch::Itinerary(query));
        }
        Ok(view)
    }

    pub async fn back(&self) -> Result<AppStep> {
        let mut session = self.session.lock().await;
        session.back()?;
        Ok(session.step())
    }

    pub async fn start_over(&self) -> AppStep {
        let mut session = self.session.lock().await;
        session.start_over();
        session.step()
    }

    pub async fn go_to_landing(&self) -> AppStep {
        let mut session = self.session.lock().await;
        session.go_to_landing();
        session.step()
    }

    async fn begin_submit(&self, preferences: TravelPreferences) -> Result<Fetch> {
        let query = self.session.lock().await.submit(preferences)?;
        Ok(Fetch::Destinations(query))
    }

    async fn begin_select(&self, trip_id: &TripId) -> Result<Option<Fetch>> {
        match self.session.lock().await.select(trip_id)? {
            Selection::Cached => {
                debug!("Itinerary for {} already cached", trip_id);
                Ok(None)
            }
            Selection::Fetch(query) => Ok(Some(Fetch::Itinerary(query))),
        }
    }

    fn spawn(self: &Arc<Self>, fetch: Fetch) {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            controller.run(fetch).await;
        });
    }

    /// Run a boundary call and apply its outcome
    async fn run(&self, fetch: Fetch) -> AppStep {
        let start_time = Instant::now();

        match fetch {
            Fetch::Destinations(query) => {
                let outcome = self.client.fetch_destinations(&query.preferences).await;
                let mut session = self.session.lock().await;
                let applied = match outcome {
                    Ok(trips) => {
                        info!(
                            "{} destinations ready in {:.3}s",
                            trips.len(),
                            start_time.elapsed().as_secs_f64()
                        );
                        session.destinations_loaded(query.ticket, trips)
                    }
                    Err(e) => {
                        log_failure("Destination query", &e);
                        session.destinations_failed(query.ticket, destinations_notice(&e))
                    }
                };
                if let Err(e) = applied {
                    debug!("Discarding completion: {}", e);
                }
                session.step()
            }
            Fetch::Itinerary(query) => {
                let outcome = self
                    .client
                    .fetch_itinerary(&query.destination, &query.preferences)
                    .await;
                let mut session = self.session.lock().await;
                let applied = match outcome {
                    Ok(enrichment) => {
                        info!(
                            "Itinerary for '{}' ready in {:.3}s",
                            query.destination,
                            start_time.elapsed().as_secs_f64()
                        );
                        session.itinerary_loaded(query.ticket, enrichment)
                    }
                    Err(e) => {
                        log_failure(&format!("Itinerary query for '{}'", query.destination), &e);
                        let notice = itinerary_notice(&query.destination, &e);
                        session.itinerary_failed(query.ticket, notice)
                    }
                };
                if let Err(e) = applied {
                    debug!("Discarding completion: {}", e);
                }
                session.step()
            }
        }
    }
}

/// Planner failures log as warnings, local failures as errors
fn log_failure(what: &str, err: &TripAiError) {
    if err.is_boundary() {
        warn!("{} failed: {}", what, err);
    } else {
        error!("{} failed: {}", what, err);
    }
}

fn destinations_notice(err: &TripAiError) -> Notice {
    Notice {
        kind: NoticeKind::DestinationsFailed,
        message: "We couldn't generate your travel plan. Please try again.".to_string(),
        detail: err.user_message(),
    }
}

fn itinerary_notice(destination: &str, err: &TripAiError) -> Notice {
    Notice {
        kind: NoticeKind::ItineraryFailed,
        message: format!("We couldn't load the itinerary for {destination}. Please try again."),
        detail: err.user_message(),
    }
}
