//! Resident account domain module.
//!
//! - `model`: Profile and role models backed by the `profiles` table
//! - `repository`: Repository trait for profile persistence

mod model;
mod repository;

pub use model::{NewProfile, Profile, Role};
pub use repository::ProfileRepository;
