//! Infrastructure layer for the Gatehouse access console.
//!
//! Adapters for the ports defined in `gatehouse-core`: the REST client for
//! the hosted auth/data service, an in-memory backend for tests and demo
//! mode, and configuration loading.

pub mod config_service;
pub mod memory;
pub mod paths;
pub mod rest;

pub use crate::config_service::ConfigService;
pub use crate::memory::MemoryBackend;
pub use crate::rest::RestBackend;
