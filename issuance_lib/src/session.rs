//! Report data loading: concurrent fetches with a stale-response guard, and
//! an offline path reading the same payloads from local JSON files.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use issuance_api::types::{decode_list, PaymentRecord};
use issuance_api::{Client, DateRange, PaymentQuery};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::aggregate::effective_date;
use crate::error::IssuanceError;
use crate::report::{run_report, Report};
use crate::vehicles::VehicleIndex;

/// Payments for a date range together with the merged vehicle registries.
#[derive(Debug)]
pub struct ReportData {
    pub range: DateRange,
    pub payments: Vec<PaymentRecord>,
    pub vehicles: VehicleIndex,
}

impl ReportData {
    pub fn new(range: DateRange, payments: Vec<PaymentRecord>, vehicles: VehicleIndex) -> Self {
        Self {
            range,
            payments,
            vehicles,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    pub fn run(&self, report_id: &str) -> Report<'_> {
        run_report(report_id, &self.payments, &self.vehicles)
    }
}

/// Result of a fetch that completed without error.
#[derive(Debug)]
pub enum FetchOutcome {
    Fresh(ReportData),
    /// A newer fetch was issued while this one was in flight; its data was dropped.
    Stale { generation: u64 },
}

impl FetchOutcome {
    pub fn into_fresh(self) -> Option<ReportData> {
        match self {
            FetchOutcome::Fresh(data) => Some(data),
            FetchOutcome::Stale { .. } => None,
        }
    }
}

/// Fetches report data through the API client.
///
/// Every call to [`ReportSession::fetch`] takes a new generation number.
/// Results are only handed back if no newer call was issued in the meantime.
pub struct ReportSession {
    client: Client,
    generation: AtomicU64,
}

impl ReportSession {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            generation: AtomicU64::new(0),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Generation of the most recently issued fetch, 0 before the first one.
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Loads payments for `range` and both vehicle registries concurrently.
    pub async fn fetch(&self, range: DateRange) -> Result<FetchOutcome, IssuanceError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = PaymentQuery::default().with_range(range);

        let joined = tokio::try_join!(
            self.client.get_payments(&query),
            self.client.get_syrian_vehicles(),
            self.client.get_foreign_vehicles(),
        );

        // A superseded fetch is stale whether it succeeded or failed.
        let latest = self.current_generation();
        if latest != generation {
            warn!(
                "Discarding stale {} for {} (generation {}, latest {})",
                if joined.is_ok() { "response" } else { "error" },
                range,
                generation,
                latest
            );
            return Ok(FetchOutcome::Stale { generation });
        }
        let (payments, syrian, foreign) = joined?;

        info!(
            "Loaded {} payments, {} syrian and {} foreign vehicles for {}",
            payments.len(),
            syrian.len(),
            foreign.len(),
            range
        );
        let vehicles = VehicleIndex::from_registries(syrian, foreign);
        Ok(FetchOutcome::Fresh(ReportData::new(range, payments, vehicles)))
    }
}

/// Reads report data from local JSON files in any supported envelope shape.
///
/// The backend filters payments by date; here payments whose effective date
/// falls outside `range` are dropped. Undated payments are kept.
pub fn load_from_files(
    range: DateRange,
    payments: &Path,
    syrian_vehicles: &Path,
    foreign_vehicles: &Path,
) -> Result<ReportData, IssuanceError> {
    let payments: Vec<PaymentRecord> = read_list(payments)?
        .into_iter()
        .filter(|p| match effective_date(p) {
            Some(date) => date >= range.from && date <= range.to,
            None => true,
        })
        .collect();
    let vehicles =
        VehicleIndex::from_registries(read_list(syrian_vehicles)?, read_list(foreign_vehicles)?);
    Ok(ReportData::new(range, payments, vehicles))
}

fn read_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, IssuanceError> {
    let raw = std::fs::read_to_string(path).map_err(|source| IssuanceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let body: Value = serde_json::from_str(&raw)?;
    Ok(decode_list(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
    }

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "issuance_session_{}_{}.json",
            std::process::id(),
            name
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_from_files_filters_by_range() {
        let payments = temp_file(
            "payments",
            r#"{"data": [
                {"id": "in", "createdAt": "2024-03-10T08:00:00Z", "amount": 1},
                {"id": "out", "createdAt": "2024-04-10T08:00:00Z", "amount": 2},
                {"id": "undated", "amount": 3}
            ]}"#,
        );
        let syrian = temp_file("syrian", r#"{"vehicles": [{"_id": "v1", "brand": "Kia"}]}"#);
        let foreign = temp_file("foreign", r#"[{"id": "v2"}]"#);

        let data = load_from_files(range(), &payments, &syrian, &foreign).unwrap();
        let ids: Vec<&str> = data
            .payments
            .iter()
            .filter_map(|p| p.id.as_deref())
            .collect();
        assert_eq!(ids, ["in", "undated"]);
        assert_eq!(data.vehicles.len(), 2);
        assert!(!data.is_empty());

        for path in [payments, syrian, foreign] {
            let _ = std::fs::remove_file(path);
        }
    }

    #[test]
    fn test_load_from_files_missing_file() {
        let missing = std::env::temp_dir().join("issuance_session_does_not_exist.json");
        let err = load_from_files(range(), &missing, &missing, &missing).unwrap_err();
        assert!(matches!(err, IssuanceError::Io { .. }));
        assert_eq!(err.user_message(), crate::error::LOAD_FAILED_MESSAGE);
    }

    #[test]
    fn test_load_from_files_invalid_json() {
        let broken = temp_file("broken", "{not json");
        let err = load_from_files(range(), &broken, &broken, &broken).unwrap_err();
        assert!(matches!(err, IssuanceError::Serialization(_)));
        let _ = std::fs::remove_file(broken);
    }

    #[test]
    fn test_fetch_outcome_into_fresh() {
        let stale = FetchOutcome::Stale { generation: 3 };
        assert!(stale.into_fresh().is_none());
        let fresh = FetchOutcome::Fresh(ReportData::new(range(), Vec::new(), VehicleIndex::new()));
        assert!(fresh.into_fresh().unwrap().is_empty());
    }
}
