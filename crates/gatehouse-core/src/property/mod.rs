//! Property domain module.
//!
//! - `model`: Property model backed by the `properties` table
//! - `repository`: Read-only repository trait

mod model;
mod repository;

pub use model::Property;
pub use repository::PropertyRepository;
