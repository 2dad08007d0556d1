//! Library layer for issuance reports: aggregation, report dispatch, and the
//! fetch session that joins payments with the vehicle registries.
//!
//! Wraps the `issuance_api` client with a stale-response guard, input
//! validation, and the pure group-by functions behind every summary report.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod report;
pub mod session;
pub mod validation;
pub mod vehicles;

pub use issuance_api;
pub use issuance_api::types;
pub use issuance_api::{DateRange, PaymentQuery};

pub use aggregate::{Bucket, BucketSummary, Dimension, Grouping};
pub use config::ApiConfig;
pub use error::IssuanceError;
pub use report::{run_report, Report, ReportOutput};
pub use session::{load_from_files, FetchOutcome, ReportData, ReportSession};
pub use vehicles::VehicleIndex;
