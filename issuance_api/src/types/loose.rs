//! Lenient field deserializers.
//!
//! The backend is inconsistent about field types (`"12"` vs `12`, `null` vs
//! missing, an id string vs a populated document). These helpers go through
//! `serde_json::Value` so a single odd field degrades to `None` instead of
//! failing the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

use super::Reference;

/// Renders a number without a trailing `.0` when it is integral.
pub(crate) fn number_to_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_to_string(n)),
        _ => None,
    }
}

pub(crate) fn value_to_f64(value: &Value) -> Option<f64> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}

pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_string))
}

pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_f64))
}

pub fn opt_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Object(_) => serde_json::from_value(v).ok(),
        _ => None,
    }))
}

pub fn opt_reference<'de, D, T>(deserializer: D) -> Result<Option<Reference<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(Reference::from_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integral_floats_drop_fraction() {
        assert_eq!(value_to_string(&json!(12.0)), Some("12".to_string()));
        assert_eq!(value_to_string(&json!(2.5)), Some("2.5".to_string()));
        assert_eq!(value_to_string(&json!(3)), Some("3".to_string()));
    }

    #[test]
    fn non_scalars_are_not_strings() {
        assert_eq!(value_to_string(&json!(true)), None);
        assert_eq!(value_to_string(&json!(null)), None);
        assert_eq!(value_to_string(&json!({"a": 1})), None);
    }

    #[test]
    fn numeric_strings_parse_as_amounts() {
        assert_eq!(value_to_f64(&json!("150.5")), Some(150.5));
        assert_eq!(value_to_f64(&json!(" 20 ")), Some(20.0));
        assert_eq!(value_to_f64(&json!("abc")), None);
        assert_eq!(value_to_f64(&json!(-40)), Some(-40.0));
    }
}
