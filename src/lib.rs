// ============================================================================
// Commerce Analytics - dual-mode data and analytics layer
// ============================================================================
//
// Products, orders and time-windowed sales analytics, answered either by a
// remote aggregation API or by a local JSON-backed store. The controller
// picks one path per call and falls back to local when the remote fails.
//
// ============================================================================

pub mod analytics;
pub mod api;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod controller;
pub mod domain;
pub mod metrics;
pub mod query;
pub mod remote;
pub mod store;
pub mod telemetry;
