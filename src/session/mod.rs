//! Trip planning session: the screen state machine and the controller that
//! drives it against a recommendation client

mod controller;
mod state;

pub use controller::Controller;
pub use state::{
    AppStep, DestinationQuery, ItineraryQuery, Notice, NoticeKind, Pending, Selection, Session,
};
