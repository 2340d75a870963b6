use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A clinical field as delivered by the upstream API.
///
/// The provider mixes numbers and strings for the same field, and sometimes
/// sends booleans, objects or arrays. Anything that is neither a number nor a
/// string is kept verbatim in `Other` and scores as invalid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Other(Value),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

/// Patient identifier in whatever JSON type the provider used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatientId {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    Other(Value),
}

impl PatientId {
    /// Canonical string form used in alert buckets, or the reason the
    /// identifier is unusable.
    pub fn canonical(&self) -> Result<String, &'static str> {
        match self {
            Self::Text(s) if s.trim().is_empty() => Err("empty identifier"),
            Self::Text(s) => Ok(s.clone()),
            Self::Number(n) => number_to_id(n),
            Self::Flag(true) => Ok("true".to_owned()),
            Self::Flag(false) => Err("boolean false identifier"),
            Self::Other(_) => Err("unsupported identifier type"),
        }
    }
}

fn number_to_id(n: &serde_json::Number) -> Result<String, &'static str> {
    if let Some(u) = n.as_u64() {
        return Ok(u.to_string());
    }
    if n.as_i64().is_some() {
        return Err("negative identifier");
    }
    let f = n.as_f64().ok_or("non-finite identifier")?;
    if !f.is_finite() {
        return Err("non-finite identifier");
    }
    if f < 0.0 {
        return Err("negative identifier");
    }
    // Integral floats print without a fractional part, as a JSON client shows them.
    if f.fract() == 0.0 && f < 1e21 {
        Ok(format!("{:.0}", f.abs()))
    } else {
        Ok(f.to_string())
    }
}

/// One patient row from a listing page.
///
/// Known clinical fields are typed; everything else the provider sends is
/// carried through untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(default)]
    pub patient_id: Option<PatientId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<FieldValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
