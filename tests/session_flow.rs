//! End-to-end session flows against an in-process planner

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;

use tripai::models::{Attraction, ItineraryActivity, ItineraryDay};
use tripai::planner::schema::DestinationEnvelope;
use tripai::session::{NoticeKind, Session};
use tripai::{
    AppStep, Controller, Enrichment, PreferenceForm, RecommendationClient, Result,
    TravelPreferences, TripAiError, TripRecommendation, View,
};

#[derive(Default)]
struct MockPlanner {
    fail_destinations: bool,
    fail_itinerary: bool,
    /// When set, destination queries wait for a permit before answering
    gate: Option<Arc<Notify>>,
    destination_calls: AtomicUsize,
    itinerary_calls: AtomicUsize,
    answered: AtomicUsize,
}

#[async_trait]
impl RecommendationClient for MockPlanner {
    async fn fetch_destinations(
        &self,
        prefs: &TravelPreferences,
    ) -> Result<Vec<TripRecommendation>> {
        self.destination_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.answered.fetch_add(1, Ordering::SeqCst);

        if self.fail_destinations {
            return Err(TripAiError::network("connection refused"));
        }

        assert_eq!(prefs.travelers, 2);
        let recommendations: Vec<_> = ["Osaka", "Fukuoka", "Sapporo"]
            .iter()
            .map(|name| {
                json!({
                    "destination": name,
                    "country": "Japan",
                    "shortDescription": format!("{name} in early summer"),
                    "reasonForRecommendation": "Short flight for a couple",
                    "estimatedTotalCost": "1,800,000 KRW"
                })
            })
            .collect();
        let envelope: DestinationEnvelope =
            serde_json::from_value(json!({ "recommendations": recommendations })).unwrap();
        envelope.into_recommendations()
    }

    async fn fetch_itinerary(
        &self,
        destination: &str,
        _prefs: &TravelPreferences,
    ) -> Result<Enrichment> {
        self.itinerary_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_itinerary {
            return Err(TripAiError::schema("planner returned an empty itinerary"));
        }
        Ok(Enrichment {
            itinerary: vec![ItineraryDay {
                day: 1,
                theme: format!("Arrival in {destination}"),
                activities: vec![ItineraryActivity {
                    time: "15:00".to_string(),
                    activity: "Hotel check-in".to_string(),
                    description: String::new(),
                }],
            }],
            attractions: vec![Attraction {
                name: format!("{destination} Tower"),
                description: None,
            }],
        })
    }
}

fn couple_trip() -> TravelPreferences {
    PreferenceForm {
        start_date: "2024-06-01".to_string(),
        end_date: "2024-06-03".to_string(),
        travelers: 2,
        budget_per_person: 1_000_000,
        currency: "KRW".to_string(),
        companion: "커플".to_string(),
        ..PreferenceForm::default()
    }
    .collect()
    .unwrap()
}

async fn at_results(planner: Arc<MockPlanner>) -> Controller {
    let controller = Controller::new(planner);
    controller.start().await.unwrap();
    assert_eq!(controller.submit(couple_trip()).await.unwrap(), AppStep::Results);
    controller
}

async fn wait_until_settled(controller: &Controller) -> Session {
    for _ in 0..100 {
        let session = controller.snapshot().await;
        if session.step() != AppStep::Loading {
            return session;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session stayed in LOADING");
}

#[tokio::test]
async fn test_couple_trip_yields_three_plain_recommendations() {
    let planner = Arc::new(MockPlanner::default());
    let controller = at_results(planner.clone()).await;

    let session = controller.snapshot().await;
    assert_eq!(session.recommendations().len(), 3);
    assert!(session.recommendations().iter().all(|t| t.itinerary.is_empty()));
    assert_eq!(session.preferences(), Some(&couple_trip()));
    assert_eq!(planner.destination_calls.load(Ordering::SeqCst), 1);

    let View::Results { summary, cards, .. } = controller.view().await else {
        panic!("expected results view");
    };
    assert_eq!(summary.unwrap().duration, "2 nights / 3 days");
    assert_eq!(cards.len(), 3);
}

#[tokio::test]
async fn test_destination_failure_returns_to_input_with_notice() {
    let planner = Arc::new(MockPlanner {
        fail_destinations: true,
        ..MockPlanner::default()
    });
    let controller = Controller::new(planner);
    controller.start().await.unwrap();

    let step = controller.submit(couple_trip()).await.unwrap();

    assert_eq!(step, AppStep::Input);
    let session = controller.snapshot().await;
    assert!(session.recommendations().is_empty());
    assert!(session.preferences().is_none());
    let notice = session.notice().expect("a notice is shown");
    assert_eq!(notice.kind, NoticeKind::DestinationsFailed);
    assert!(notice.detail.contains("Unable to reach the travel planner"));
}

#[tokio::test]
async fn test_select_fetches_itinerary_once() {
    let planner = Arc::new(MockPlanner::default());
    let controller = at_results(planner.clone()).await;
    let before = controller.snapshot().await.recommendations().to_vec();

    let step = controller.select(&before[1].id).await.unwrap();

    assert_eq!(step, AppStep::Detail);
    assert_eq!(planner.itinerary_calls.load(Ordering::SeqCst), 1);

    let session = controller.snapshot().await;
    let after = session.recommendations();
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2]);
    assert_eq!(after[1].id, before[1].id);
    assert_eq!(after[1].itinerary[0].theme, "Arrival in Fukuoka");
    assert_eq!(session.selected_trip().map(|t| &t.id), Some(&before[1].id));
}

#[tokio::test]
async fn test_reselecting_cached_trip_skips_planner() {
    let planner = Arc::new(MockPlanner::default());
    let controller = at_results(planner.clone()).await;
    let id = controller.snapshot().await.recommendations()[0].id.clone();

    controller.select(&id).await.unwrap();
    assert_eq!(controller.back().await.unwrap(), AppStep::Results);
    assert_eq!(controller.select(&id).await.unwrap(), AppStep::Detail);

    assert_eq!(planner.itinerary_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_itinerary_failure_keeps_results() {
    let planner = Arc::new(MockPlanner {
        fail_itinerary: true,
        ..MockPlanner::default()
    });
    let controller = at_results(planner).await;
    let before = controller.snapshot().await.recommendations().to_vec();

    let step = controller.select(&before[2].id).await.unwrap();

    assert_eq!(step, AppStep::Results);
    let session = controller.snapshot().await;
    assert_eq!(session.recommendations(), before.as_slice());
    assert!(session.selected_trip().is_none());
    assert_eq!(
        session.notice().map(|n| n.kind),
        Some(NoticeKind::ItineraryFailed)
    );
}

#[tokio::test]
async fn test_dispatch_submit_stays_loading_until_planner_answers() {
    let gate = Arc::new(Notify::new());
    let planner = Arc::new(MockPlanner {
        gate: Some(gate.clone()),
        ..MockPlanner::default()
    });
    let controller = Arc::new(Controller::new(planner));
    controller.start().await.unwrap();

    let view = controller.dispatch_submit(couple_trip()).await.unwrap();
    assert_eq!(view.step(), AppStep::Loading);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(controller.snapshot().await.step(), AppStep::Loading);

    gate.notify_one();
    let session = wait_until_settled(&controller).await;
    assert_eq!(session.step(), AppStep::Results);
    assert_eq!(session.recommendations().len(), 3);
}

#[tokio::test]
async fn test_answer_after_going_to_landing_is_discarded() {
    let gate = Arc::new(Notify::new());
    let planner = Arc::new(MockPlanner {
        gate: Some(gate.clone()),
        ..MockPlanner::default()
    });
    let controller = Arc::new(Controller::new(planner.clone()));
    controller.start().await.unwrap();
    controller.dispatch_submit(couple_trip()).await.unwrap();

    assert_eq!(controller.go_to_landing().await, AppStep::Landing);
    gate.notify_one();

    for _ in 0..100 {
        if planner.answered.load(Ordering::SeqCst) == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;

    let session = controller.snapshot().await;
    assert_eq!(session.step(), AppStep::Landing);
    assert!(session.recommendations().is_empty());
}

#[tokio::test]
async fn test_start_over_clears_results() {
    let controller = at_results(Arc::new(MockPlanner::default())).await;

    assert_eq!(controller.start_over().await, AppStep::Input);

    let session = controller.snapshot().await;
    assert!(session.recommendations().is_empty());
    assert!(session.preferences().is_none());
    assert!(matches!(controller.view().await, View::Input { notice: None }));
}
