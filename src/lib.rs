//! Gym visit-count aggregator library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod visits;

pub use config::schema::AggregatorConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use visits::{VisitAggregator, VisitRecord};
