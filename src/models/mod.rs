pub mod actor;
pub mod event;

pub use actor::Actor;
pub use event::{CreateEventRequest, Event, EventStatus};
