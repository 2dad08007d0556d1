use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::loose::number_to_string;

/// Documents that carry their own identifier.
pub trait Identified {
    fn id(&self) -> Option<&str>;
}

/// A foreign key that the backend returns either as a bare id or, when the
/// request asked for `populate=true`, as the embedded document.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Reference<T> {
    Id(String),
    Embedded(T),
}

impl<T> Reference<T> {
    /// The embedded document, if the reference was populated.
    pub fn embedded(&self) -> Option<&T> {
        match self {
            Reference::Id(_) => None,
            Reference::Embedded(doc) => Some(doc),
        }
    }
}

impl<T: Identified> Reference<T> {
    /// Resolves the referenced id regardless of the wire shape.
    pub fn id(&self) -> Option<&str> {
        match self {
            Reference::Id(id) => Some(id.as_str()),
            Reference::Embedded(doc) => doc.id(),
        }
    }
}

impl<T: DeserializeOwned> Reference<T> {
    /// Strings and numbers become `Id`, objects become `Embedded`.
    /// Blank ids and anything else yield `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(Reference::Id(s)),
            Value::Number(n) => Some(Reference::Id(number_to_string(&n))),
            Value::Object(_) => serde_json::from_value(value).ok().map(Reference::Embedded),
            _ => None,
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Reference<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Reference::from_value(value)
            .ok_or_else(|| D::Error::custom("expected an id or an embedded document"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Party;
    use serde_json::json;

    #[test]
    fn bare_id_resolves() {
        let r: Reference<Party> = serde_json::from_value(json!("co-1")).unwrap();
        assert_eq!(r.id(), Some("co-1"));
        assert!(r.embedded().is_none());
    }

    #[test]
    fn numeric_id_resolves() {
        let r: Reference<Party> = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(r, Reference::Id("42".to_string()));
    }

    #[test]
    fn embedded_document_resolves() {
        let r: Reference<Party> =
            serde_json::from_value(json!({"_id": "co-2", "name": "Acme"})).unwrap();
        assert_eq!(r.id(), Some("co-2"));
        assert_eq!(r.embedded().and_then(|p| p.name()), Some("Acme"));
    }

    #[test]
    fn unsupported_shapes_are_rejected() {
        assert!(serde_json::from_value::<Reference<Party>>(json!(true)).is_err());
        assert!(serde_json::from_value::<Reference<Party>>(json!("  ")).is_err());
        assert!(Reference::<Party>::from_value(json!([1, 2])).is_none());
    }
}
