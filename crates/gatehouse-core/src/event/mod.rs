//! Gate event domain module.
//!
//! - `model`: Recorded gate event backed by the `events` table
//! - `repository`: Read-only repository trait

mod model;
mod repository;

pub use model::GateEvent;
pub use repository::EventRepository;
