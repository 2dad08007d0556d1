use serde::{Deserialize, Serialize};

use super::{loose, Identified};

/// Vehicle master record from the domestic or foreign vehicle registry.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
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

    /// `"syrian"` or `"foreign"`.
    #[serde(default, deserialize_with = "loose::opt_string")]
    pub vehicle_type: Option<String>,

    #[serde(default, deserialize_with = "loose::opt_string")]
    pub category: Option<String>,

    #[serde(default, deserialize_with = "loose::opt_string")]
    pub classification: Option<String>,

    /// Manufacturer.
    #[serde(default, deserialize_with = "loose::opt_string")]
    pub brand: Option<String>,

    #[serde(default, deserialize_with = "loose::opt_string")]
    pub plate_number: Option<String>,
}

impl VehicleRecord {
    pub fn new(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::default()
        }
    }
}

impl Identified for VehicleRecord {
    fn id(&self) -> Option<&str> {
        self.id.as_deref().or(self.object_id.as_deref())
    }
}
