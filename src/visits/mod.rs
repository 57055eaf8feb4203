//! Visit aggregation subsystem.
//!
//! # Data Flow
//! ```text
//! LocationSet (config)
//!     → fetcher.rs (one GET per location, all concurrent, failures → 0)
//!     → schema.rs (whole batch must be {location, count: integer})
//!     → store.rs (single batch insert into the visits table)
//!     → aggregator.rs (sort ascending by count, return)
//!
//! Triggered by:
//!     → HTTP handler (http::handlers)
//!     → scheduler.rs (optional timer)
//! ```
//!
//! # Design Decisions
//! - A fetch failure is a value (`FetchOutcome::Failed`), never an error
//! - A fetched body with the wrong shape fails the whole batch
//! - No retries at any layer

pub mod aggregator;
pub mod fetcher;
pub mod locations;
pub mod scheduler;
pub mod schema;
pub mod store;
pub mod types;

pub use aggregator::{StartupError, VisitAggregator};
pub use locations::LocationSet;
pub use types::{AggregateError, SchemaError, StoreError, VisitRecord};
