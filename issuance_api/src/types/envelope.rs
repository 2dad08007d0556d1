//! Response envelope decoding.
//!
//! Endpoints wrap their lists differently: a bare array, or an object with
//! the list under `data`, `items`, `vehicles` or `users`. [`Envelope`] names
//! those shapes once so the rest of the code only ever sees `Vec<T>`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum Envelope {
    Bare(Vec<Value>),
    Data { data: Vec<Value> },
    Items { items: Vec<Value> },
    Vehicles { vehicles: Vec<Value> },
    Users { users: Vec<Value> },
}

impl Envelope {
    /// Short name of the matched shape, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Bare(_) => "array",
            Envelope::Data { .. } => "data",
            Envelope::Items { .. } => "items",
            Envelope::Vehicles { .. } => "vehicles",
            Envelope::Users { .. } => "users",
        }
    }

    pub fn into_items(self) -> Vec<Value> {
        match self {
            Envelope::Bare(items)
            | Envelope::Data { data: items }
            | Envelope::Items { items }
            | Envelope::Vehicles { vehicles: items }
            | Envelope::Users { users: items } => items,
        }
    }
}

/// Unwraps a response body into a list of `T`.
///
/// An unrecognised envelope yields an empty list. Elements that do not decode
/// as `T` are skipped; both cases are logged at `warn`.
pub fn decode_list<T: DeserializeOwned>(body: Value) -> Vec<T> {
    let envelope = match serde_json::from_value::<Envelope>(body) {
        Ok(envelope) => envelope,
        Err(_) => {
            tracing::warn!("Unrecognised response envelope, treating as empty list");
            return Vec::new();
        }
    };
    let kind = envelope.kind();
    let items = envelope.into_items();
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if decoded.len() < total {
        tracing::warn!(
            "Skipped {} of {} undecodable items in '{}' envelope",
            total - decoded.len(),
            total,
            kind
        );
    }
    tracing::debug!("Decoded {} items from '{}' envelope", decoded.len(), kind);
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentRecord, VehicleRecord};
    use serde_json::json;

    #[test]
    fn bare_array() {
        let list: Vec<PaymentRecord> = decode_list(json!([{"id": "a"}, {"id": "b"}]));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn wrapped_shapes() {
        for body in [
            json!({"data": [{"id": "a"}]}),
            json!({"items": [{"id": "a"}]}),
            json!({"vehicles": [{"id": "a"}]}),
            json!({"users": [{"id": "a"}]}),
        ] {
            let list: Vec<VehicleRecord> = decode_list(body);
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].id.as_deref(), Some("a"));
        }
    }

    #[test]
    fn data_wins_over_items() {
        let list: Vec<PaymentRecord> =
            decode_list(json!({"data": [{"id": "a"}], "items": [{"id": "b"}, {"id": "c"}]}));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn unknown_shapes_are_empty() {
        for body in [
            json!({"results": [{"id": "a"}]}),
            json!({"data": null}),
            json!("nope"),
            json!(null),
            json!(42),
        ] {
            let list: Vec<PaymentRecord> = decode_list(body);
            assert!(list.is_empty());
        }
    }

    #[test]
    fn non_object_items_are_skipped() {
        let list: Vec<PaymentRecord> = decode_list(json!([{"id": "a"}, 7, null, {"id": "b"}]));
        assert_eq!(list.len(), 2);
    }
}
