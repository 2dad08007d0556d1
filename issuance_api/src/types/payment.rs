use serde::{Deserialize, Serialize};

use super::{loose, Identified, Reference, VehicleRecord};

/// An insurance payment / contract event as returned by `GET /api/payments`.
///
/// Every field is optional: the endpoint returns whatever the issuing screen
/// stored, and older documents lack fields added later.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(
        default,
        deserialize_with = "loose::opt_string",
        skip_serializing_if = "Option::is_none",
    )]
    pub id: Option<String>,

    #[serde(
        rename = "_id",
        default,
        deserialize_with = "loose::opt_string",
        skip_serializing_if = "Option::is_none",
    )]
    pub object_id: Option<String>,

    #[serde(default, deserialize_with = "loose::opt_string")]
    pub created_at: Option<String>,

    #[serde(default, deserialize_with = "loose::opt_string")]
    pub payment_date: Option<String>,

    #[serde(default, deserialize_with = "loose::opt_string")]
    pub issued_at: Option<String>,

    #[serde(default, deserialize_with = "loose::opt_f64")]
    pub amount: Option<f64>,

    #[serde(default, deserialize_with = "loose::opt_object")]
    pub breakdown: Option<Breakdown>,

    #[serde(default, deserialize_with = "loose::opt_reference")]
    pub vehicle_id: Option<Reference<VehicleRecord>>,

    #[serde(default, deserialize_with = "loose::opt_reference")]
    pub insurance_company: Option<Reference<Party>>,

    #[serde(default, deserialize_with = "loose::opt_reference")]
    pub processed_by: Option<Reference<Party>>,

    #[serde(default, deserialize_with = "loose::opt_object")]
    pub pricing_input: Option<PricingInput>,

    #[serde(default, deserialize_with = "loose::opt_string")]
    pub policy_number: Option<String>,
}

impl PaymentRecord {
    pub fn new(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::default()
        }
    }

    /// Timestamps in precedence order: `createdAt`, `paymentDate`, `issuedAt`.
    pub fn timestamps(&self) -> [Option<&str>; 3] {
        [
            self.created_at.as_deref(),
            self.payment_date.as_deref(),
            self.issued_at.as_deref(),
        ]
    }
}

impl Identified for PaymentRecord {
    fn id(&self) -> Option<&str> {
        self.id.as_deref().or(self.object_id.as_deref())
    }
}

/// Premium breakdown; only the total is consumed by reports.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Breakdown {
    #[serde(default, deserialize_with = "loose::opt_f64")]
    pub total: Option<f64>,
}

/// Inputs the pricing screen stored alongside the contract.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PricingInput {
    #[serde(default, deserialize_with = "loose::opt_string")]
    pub category: Option<String>,

    #[serde(default, deserialize_with = "loose::opt_string")]
    pub classification: Option<String>,

    #[serde(default, deserialize_with = "loose::opt_string")]
    pub months: Option<String>,

    #[serde(default, deserialize_with = "loose::opt_string")]
    pub period: Option<String>,
}

/// An insurance company or an issuing employee.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    #[serde(
        default,
        deserialize_with = "loose::opt_string",
        skip_serializing_if = "Option::is_none",
    )]
    pub id: Option<String>,

    #[serde(
        rename = "_id",
        default,
        deserialize_with = "loose::opt_string",
        skip_serializing_if = "Option::is_none",
    )]
    pub object_id: Option<String>,

    #[serde(
        default,
        deserialize_with = "loose::opt_string",
        skip_serializing_if = "Option::is_none",
    )]
    pub name: Option<String>,

    #[serde(
        default,
        deserialize_with = "loose::opt_string",
        skip_serializing_if = "Option::is_none",
    )]
    pub full_name: Option<String>,
}

impl Party {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Display name: `name`, else `fullName`. Blank values count as missing.
    pub fn name(&self) -> Option<&str> {
        [self.name.as_deref(), self.full_name.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
    }
}

impl Identified for Party {
    fn id(&self) -> Option<&str> {
        self.id.as_deref().or(self.object_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loosely_typed_payment_decodes() {
        let record: PaymentRecord = serde_json::from_value(json!({
            "_id": "p1",
            "createdAt": "2024-03-05T10:00:00.000Z",
            "amount": "1500",
            "vehicleId": {"_id": "v1", "brand": "Kia", "vehicleType": "syrian"},
            "insuranceCompany": "co-9",
            "processedBy": {"_id": "u1", "fullName": "Sami"},
            "pricingInput": {"category": 1, "months": 12.0}
        }))
        .unwrap();

        assert_eq!(record.id(), Some("p1"));
        assert_eq!(record.amount, Some(1500.0));
        assert_eq!(
            record.vehicle_id.as_ref().and_then(|r| r.id()),
            Some("v1")
        );
        assert_eq!(
            record.insurance_company,
            Some(Reference::Id("co-9".to_string()))
        );
        let employee = record.processed_by.as_ref().and_then(|r| r.embedded()).unwrap();
        assert_eq!(employee.name(), Some("Sami"));
        let pricing = record.pricing_input.unwrap();
        assert_eq!(pricing.category.as_deref(), Some("1"));
        assert_eq!(pricing.months.as_deref(), Some("12"));
    }

    #[test]
    fn malformed_fields_degrade_to_none() {
        let record: PaymentRecord = serde_json::from_value(json!({
            "id": "p2",
            "amount": "n/a",
            "breakdown": [1, 2],
            "vehicleId": false,
            "insuranceCompany": null,
            "pricingInput": "oops"
        }))
        .unwrap();

        assert_eq!(record.amount, None);
        assert_eq!(record.breakdown, None);
        assert_eq!(record.vehicle_id, None);
        assert_eq!(record.insurance_company, None);
        assert_eq!(record.pricing_input, None);
    }

    #[test]
    fn timestamps_keep_precedence_order() {
        let record = PaymentRecord {
            payment_date: Some("2024-02-01".to_string()),
            issued_at: Some("2024-01-01".to_string()),
            ..PaymentRecord::new("p3")
        };
        assert_eq!(
            record.timestamps(),
            [None, Some("2024-02-01"), Some("2024-01-01")]
        );
    }

    #[test]
    fn party_name_skips_blank_values() {
        let party: Party =
            serde_json::from_value(json!({"id": "u", "name": " ", "fullName": "Rami"})).unwrap();
        assert_eq!(party.name(), Some("Rami"));
    }
}
