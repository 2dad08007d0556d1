//! Payment aggregation helpers for the summary reports.
//!
//! Every group-by function partitions a slice of payments along one
//! [`Dimension`] and returns a [`Grouping`] of borrowed records. Totals and
//! ordering are applied afterwards by [`summarize`]. None of these functions
//! perform I/O or fail: missing or malformed fields land in the dimension's
//! fallback bucket.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use issuance_api::types::{Party, PaymentRecord, Reference, VehicleRecord};
use serde::Serialize;

use crate::vehicles::VehicleIndex;

/// Fallback bucket key for fixed-key dimensions.
pub const UNKNOWN: &str = "unknown";
/// Placeholder for a missing name ("unspecified").
pub const UNSPECIFIED: &str = "غير محدد";

pub const CATEGORY_KEYS: [&str; 4] = ["01", "02", "03", "04"];
pub const CLASSIFICATION_KEYS: [&str; 4] = ["0", "1", "2", "3"];
pub const PERIOD_KEYS: [&str; 3] = ["3", "6", "12"];
pub const SYRIAN: &str = "syrian";
pub const FOREIGN: &str = "foreign";

const DEFAULT_PERIOD_MONTHS: &str = "12";

/// The attribute a report partitions payments by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    Month,
    Category,
    Nationality,
    Classification,
    Manufacturer,
    Company,
    Period,
    Employee,
}

/// How a dimension's buckets are ordered for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BucketOrder {
    /// Ascending by month.
    Chronological,
    /// Descending by record count; ties keep first-seen order.
    CountDescending,
    /// Fixed declaration order, empty buckets included.
    Declared,
}

impl Dimension {
    pub const ALL: [Dimension; 8] = [
        Dimension::Month,
        Dimension::Category,
        Dimension::Nationality,
        Dimension::Classification,
        Dimension::Manufacturer,
        Dimension::Company,
        Dimension::Period,
        Dimension::Employee,
    ];

    pub fn report_id(&self) -> &'static str {
        match self {
            Dimension::Month => "by-month",
            Dimension::Category => "by-category",
            Dimension::Nationality => "by-nationality",
            Dimension::Classification => "by-classification",
            Dimension::Manufacturer => "by-manufacturer",
            Dimension::Company => "by-company",
            Dimension::Period => "by-period",
            Dimension::Employee => "by-employee",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Dimension::Month => "Payments by month",
            Dimension::Category => "Payments by vehicle category",
            Dimension::Nationality => "Payments by vehicle nationality",
            Dimension::Classification => "Payments by vehicle classification",
            Dimension::Manufacturer => "Payments by manufacturer",
            Dimension::Company => "Payments by insurance company",
            Dimension::Period => "Payments by insurance period",
            Dimension::Employee => "Payments by issuing employee",
        }
    }

    /// Header of the label column in tables and CSV exports.
    pub fn column_title(&self) -> &'static str {
        match self {
            Dimension::Month => "Month",
            Dimension::Category => "Category",
            Dimension::Nationality => "Nationality",
            Dimension::Classification => "Classification",
            Dimension::Manufacturer => "Manufacturer",
            Dimension::Company => "Insurance Company",
            Dimension::Period => "Period",
            Dimension::Employee => "Employee",
        }
    }

    pub fn order(&self) -> BucketOrder {
        match self {
            Dimension::Month => BucketOrder::Chronological,
            Dimension::Manufacturer | Dimension::Company | Dimension::Employee => {
                BucketOrder::CountDescending
            }
            Dimension::Category
            | Dimension::Nationality
            | Dimension::Classification
            | Dimension::Period => BucketOrder::Declared,
        }
    }

    /// Partitions `records` along this dimension.
    pub fn group<'a>(&self, records: &'a [PaymentRecord], vehicles: &VehicleIndex) -> Grouping<'a> {
        match self {
            Dimension::Month => by_month(records, vehicles),
            Dimension::Category => by_category(records, vehicles),
            Dimension::Nationality => by_nationality(records, vehicles),
            Dimension::Classification => by_classification(records, vehicles),
            Dimension::Manufacturer => by_manufacturer(records, vehicles),
            Dimension::Company => by_company(records, vehicles),
            Dimension::Period => by_period(records, vehicles),
            Dimension::Employee => by_employee(records, vehicles),
        }
    }

    /// Party a company or employee report groups by, `None` for other dimensions.
    pub fn party<'r>(&self, record: &'r PaymentRecord) -> Option<&'r Reference<Party>> {
        match self {
            Dimension::Company => record.insurance_company.as_ref(),
            Dimension::Employee => record.processed_by.as_ref(),
            _ => None,
        }
    }

    /// Display label for a bucket of this dimension.
    ///
    /// Company and employee labels come from the bucket's records, not the key.
    pub fn label_for(&self, bucket: &Bucket<'_>) -> String {
        let key = bucket.key.as_str();
        match self {
            Dimension::Month => month_label(key),
            Dimension::Category | Dimension::Classification | Dimension::Period
                if key == UNKNOWN =>
            {
                UNSPECIFIED.to_string()
            }
            Dimension::Category => format!("Category {}", key),
            Dimension::Classification => format!("Class {}", key),
            Dimension::Period => format!("{} months", key),
            Dimension::Nationality => match key {
                SYRIAN => "Syrian".to_string(),
                _ => "Foreign".to_string(),
            },
            Dimension::Manufacturer => key.to_string(),
            Dimension::Company | Dimension::Employee => match bucket.records.first() {
                Some(record) => party_parts(self.party(record)).1.to_string(),
                None => key.to_string(),
            },
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.report_id())
    }
}

impl FromStr for Dimension {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Dimension::ALL
            .into_iter()
            .find(|d| d.report_id().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// A named group of payments.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket<'a> {
    pub key: String,
    pub records: Vec<&'a PaymentRecord>,
}

impl<'a> Bucket<'a> {
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Sum of effective amounts.
    pub fn total(&self) -> f64 {
        self.records.iter().map(|r| effective_amount(r)).sum()
    }
}

/// Buckets keyed by string, kept in creation order.
///
/// Pre-declared keys come first (see [`Grouping::with_keys`]); keys first
/// seen while grouping are appended after them.
#[derive(Debug, Default, Clone)]
pub struct Grouping<'a> {
    buckets: Vec<Bucket<'a>>,
    index: HashMap<String, usize>,
}

impl<'a> Grouping<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with empty buckets for `keys`, in that order.
    pub fn with_keys(keys: &[&str]) -> Self {
        let mut grouping = Self::new();
        for key in keys {
            grouping.bucket_mut(key);
        }
        grouping
    }

    fn bucket_mut(&mut self, key: &str) -> &mut Bucket<'a> {
        let idx = match self.index.get(key) {
            Some(idx) => *idx,
            None => {
                self.buckets.push(Bucket {
                    key: key.to_string(),
                    records: Vec::new(),
                });
                self.index.insert(key.to_string(), self.buckets.len() - 1);
                self.buckets.len() - 1
            }
        };
        &mut self.buckets[idx]
    }

    pub fn push(&mut self, key: &str, record: &'a PaymentRecord) {
        self.bucket_mut(key).records.push(record);
    }

    pub fn get(&self, key: &str) -> Option<&Bucket<'a>> {
        self.index.get(key).map(|idx| &self.buckets[*idx])
    }

    pub fn buckets(&self) -> &[Bucket<'a>] {
        &self.buckets
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|b| b.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of records across all buckets.
    pub fn record_count(&self) -> usize {
        self.buckets.iter().map(Bucket::count).sum()
    }

    pub fn into_buckets(self) -> Vec<Bucket<'a>> {
        self.buckets
    }
}

/// One rendered row of a summary report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub key: String,
    pub label: String,
    pub count: usize,
    pub total: f64,
}

/// Reduces a grouping to per-bucket count and total, ordered for display.
pub fn summarize(dimension: Dimension, grouping: &Grouping<'_>) -> Vec<BucketSummary> {
    let mut rows: Vec<BucketSummary> = grouping
        .buckets()
        .iter()
        .map(|bucket| BucketSummary {
            key: bucket.key.clone(),
            label: dimension.label_for(bucket),
            count: bucket.count(),
            total: bucket.total(),
        })
        .collect();
    if matches!(dimension, Dimension::Company | Dimension::Employee) {
        disambiguate_party_labels(dimension, grouping, &mut rows);
    }
    match dimension.order() {
        BucketOrder::Chronological => rows.sort_by(|a, b| a.key.cmp(&b.key)),
        BucketOrder::CountDescending => rows.sort_by(|a, b| b.count.cmp(&a.count)),
        BucketOrder::Declared => {}
    }
    rows
}

/// Appends the id to party names shared by more than one bucket.
fn disambiguate_party_labels(
    dimension: Dimension,
    grouping: &Grouping<'_>,
    rows: &mut [BucketSummary],
) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for row in rows.iter() {
        *seen.entry(row.label.as_str()).or_default() += 1;
    }
    let shared: HashSet<String> = seen
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(label, _)| label.to_string())
        .collect();
    if shared.is_empty() {
        return;
    }
    // rows are still in bucket order here
    for (row, bucket) in rows.iter_mut().zip(grouping.buckets()) {
        if !shared.contains(&row.label) {
            continue;
        }
        if let Some(record) = bucket.records.first() {
            let (id, _) = party_parts(dimension.party(record));
            row.label = format!("{} ({})", row.label, id);
        }
    }
}

// -- Record accessors --

/// `amount`, else `breakdown.total`, else zero. Negative values pass through.
pub fn effective_amount(record: &PaymentRecord) -> f64 {
    record
        .amount
        .or_else(|| record.breakdown.as_ref().and_then(|b| b.total))
        .unwrap_or(0.0)
}

/// First parseable of `createdAt`, `paymentDate`, `issuedAt`.
pub fn effective_date(record: &PaymentRecord) -> Option<NaiveDate> {
    record
        .timestamps()
        .into_iter()
        .flatten()
        .find_map(parse_timestamp)
}

/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]`, and `YYYY-MM-DD`.
/// Zoned timestamps are converted to UTC before taking the date.
pub fn parse_timestamp(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// `YYYY-MM`, which sorts chronologically.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// `YYYY-MM` → `MM/YYYY`.
pub fn month_label(key: &str) -> String {
    match key.split_once('-') {
        Some((year, month)) => format!("{}/{}", month, year),
        None => key.to_string(),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// `(id, name)` of a party reference, with `unknown` / placeholder defaults.
fn party_parts(reference: Option<&Reference<Party>>) -> (&str, &str) {
    let Some(reference) = reference else {
        return (UNKNOWN, UNSPECIFIED);
    };
    (
        non_blank(reference.id()).unwrap_or(UNKNOWN),
        non_blank(reference.embedded().and_then(Party::name)).unwrap_or(UNSPECIFIED),
    )
}

fn composite_key(reference: Option<&Reference<Party>>) -> String {
    let (id, name) = party_parts(reference);
    format!("{}|{}", id, name)
}

fn fixed_or_unknown(value: String, keys: &[&str]) -> String {
    if keys.contains(&value.as_str()) {
        value
    } else {
        UNKNOWN.to_string()
    }
}

// -- Key functions --

pub fn category_key(record: &PaymentRecord, vehicle: Option<&VehicleRecord>) -> String {
    let raw = non_blank(vehicle.and_then(|v| v.category.as_deref())).or_else(|| {
        non_blank(
            record
                .pricing_input
                .as_ref()
                .and_then(|p| p.category.as_deref()),
        )
    });
    match raw {
        Some(raw) => fixed_or_unknown(format!("{:0>2}", raw), &CATEGORY_KEYS),
        None => UNKNOWN.to_string(),
    }
}

pub fn nationality_key(vehicle: Option<&VehicleRecord>) -> &'static str {
    match non_blank(vehicle.and_then(|v| v.vehicle_type.as_deref())) {
        Some(t) if t.eq_ignore_ascii_case(SYRIAN) => SYRIAN,
        _ => FOREIGN,
    }
}

pub fn classification_key(record: &PaymentRecord, vehicle: Option<&VehicleRecord>) -> String {
    let raw = non_blank(vehicle.and_then(|v| v.classification.as_deref())).or_else(|| {
        non_blank(
            record
                .pricing_input
                .as_ref()
                .and_then(|p| p.classification.as_deref()),
        )
    });
    match raw {
        Some(raw) => fixed_or_unknown(raw.to_string(), &CLASSIFICATION_KEYS),
        None => UNKNOWN.to_string(),
    }
}

pub fn manufacturer_key(vehicle: Option<&VehicleRecord>) -> String {
    non_blank(vehicle.and_then(|v| v.brand.as_deref()))
        .unwrap_or(UNSPECIFIED)
        .to_string()
}

pub fn company_key(record: &PaymentRecord) -> String {
    composite_key(record.insurance_company.as_ref())
}

pub fn employee_key(record: &PaymentRecord) -> String {
    composite_key(record.processed_by.as_ref())
}

pub fn period_key(record: &PaymentRecord) -> String {
    let pricing = record.pricing_input.as_ref();
    let raw = non_blank(pricing.and_then(|p| p.months.as_deref()))
        .or_else(|| non_blank(pricing.and_then(|p| p.period.as_deref())))
        .unwrap_or(DEFAULT_PERIOD_MONTHS);
    fixed_or_unknown(raw.to_string(), &PERIOD_KEYS)
}

// -- Group-by functions --

/// Records without any parseable date are dropped.
pub fn by_month<'a>(records: &'a [PaymentRecord], _vehicles: &VehicleIndex) -> Grouping<'a> {
    let mut grouping = Grouping::new();
    for record in records {
        if let Some(date) = effective_date(record) {
            grouping.push(&month_key(date), record);
        }
    }
    grouping
}

pub fn by_category<'a>(records: &'a [PaymentRecord], vehicles: &VehicleIndex) -> Grouping<'a> {
    let mut grouping = Grouping::with_keys(&[
        CATEGORY_KEYS[0],
        CATEGORY_KEYS[1],
        CATEGORY_KEYS[2],
        CATEGORY_KEYS[3],
        UNKNOWN,
    ]);
    for record in records {
        grouping.push(&category_key(record, vehicles.resolve(record)), record);
    }
    grouping
}

/// Binary partition: a payment whose vehicle cannot be resolved counts as foreign.
pub fn by_nationality<'a>(records: &'a [PaymentRecord], vehicles: &VehicleIndex) -> Grouping<'a> {
    let mut grouping = Grouping::with_keys(&[SYRIAN, FOREIGN]);
    for record in records {
        grouping.push(nationality_key(vehicles.resolve(record)), record);
    }
    grouping
}

pub fn by_classification<'a>(
    records: &'a [PaymentRecord],
    vehicles: &VehicleIndex,
) -> Grouping<'a> {
    let mut grouping = Grouping::with_keys(&[
        CLASSIFICATION_KEYS[0],
        CLASSIFICATION_KEYS[1],
        CLASSIFICATION_KEYS[2],
        CLASSIFICATION_KEYS[3],
        UNKNOWN,
    ]);
    for record in records {
        grouping.push(&classification_key(record, vehicles.resolve(record)), record);
    }
    grouping
}

pub fn by_manufacturer<'a>(records: &'a [PaymentRecord], vehicles: &VehicleIndex) -> Grouping<'a> {
    let mut grouping = Grouping::new();
    for record in records {
        grouping.push(&manufacturer_key(vehicles.resolve(record)), record);
    }
    grouping
}

/// Keyed `"<id>|<name>"` so companies sharing a display name stay apart.
pub fn by_company<'a>(records: &'a [PaymentRecord], _vehicles: &VehicleIndex) -> Grouping<'a> {
    let mut grouping = Grouping::new();
    for record in records {
        grouping.push(&company_key(record), record);
    }
    grouping
}

pub fn by_period<'a>(records: &'a [PaymentRecord], _vehicles: &VehicleIndex) -> Grouping<'a> {
    let mut grouping =
        Grouping::with_keys(&[PERIOD_KEYS[0], PERIOD_KEYS[1], PERIOD_KEYS[2], UNKNOWN]);
    for record in records {
        grouping.push(&period_key(record), record);
    }
    grouping
}

pub fn by_employee<'a>(records: &'a [PaymentRecord], _vehicles: &VehicleIndex) -> Grouping<'a> {
    let mut grouping = Grouping::new();
    for record in records {
        grouping.push(&employee_key(record), record);
    }
    grouping
}
