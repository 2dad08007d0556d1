//! Id-keyed lookup over the domestic and foreign vehicle registries.

use std::collections::HashMap;

use issuance_api::types::{Identified, PaymentRecord, VehicleRecord};

/// Vehicle registry merged into one id-keyed lookup.
///
/// Lists are merged in the order given; when an id appears more than once
/// the later record replaces the earlier one and the id is recorded in
/// [`VehicleIndex::collisions`].
#[derive(Debug, Default, Clone)]
pub struct VehicleIndex {
    by_id: HashMap<String, VehicleRecord>,
    collisions: Vec<String>,
    skipped: usize,
}

impl VehicleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index from the domestic list followed by the foreign list.
    pub fn from_registries(syrian: Vec<VehicleRecord>, foreign: Vec<VehicleRecord>) -> Self {
        let mut index = Self::new();
        index.extend(syrian);
        index.extend(foreign);
        index.log_integrity();
        index
    }

    /// Adds vehicles, later ids overwriting earlier ones. Vehicles without an id are skipped.
    pub fn extend<I>(&mut self, vehicles: I)
    where
        I: IntoIterator<Item = VehicleRecord>,
    {
        for vehicle in vehicles {
            let Some(id) = vehicle.id().map(str::trim).filter(|id| !id.is_empty()) else {
                self.skipped += 1;
                continue;
            };
            let id = id.to_string();
            if self.by_id.insert(id.clone(), vehicle).is_some() {
                self.collisions.push(id);
            }
        }
    }

    fn log_integrity(&self) {
        for id in &self.collisions {
            tracing::warn!(
                "Vehicle id '{}' appears in more than one registry; keeping the later record",
                id
            );
        }
        if self.skipped > 0 {
            tracing::warn!("Skipped {} vehicles without an id", self.skipped);
        }
    }

    pub fn get(&self, id: &str) -> Option<&VehicleRecord> {
        self.by_id.get(id.trim())
    }

    /// Resolves the vehicle for a payment: registry lookup by the referenced
    /// id first, then the embedded (populated) vehicle, if any.
    pub fn resolve<'a>(&'a self, payment: &'a PaymentRecord) -> Option<&'a VehicleRecord> {
        let reference = payment.vehicle_id.as_ref()?;
        reference
            .id()
            .and_then(|id| self.get(id))
            .or_else(|| reference.embedded())
    }

    /// Ids that were present in more than one merged list, in merge order.
    pub fn collisions(&self) -> &[String] {
        &self.collisions
    }

    /// Number of vehicles dropped for lacking an id.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
