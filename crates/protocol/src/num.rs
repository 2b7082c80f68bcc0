//! A serde-flexible integer for fields the API returns inconsistently.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// An `i64` that deserializes from a JSON number, a numeric string, an empty
/// string, or null (the latter two as 0). Several endpoint fields switch
/// between these representations across server versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaybeI64(pub i64);

impl MaybeI64 {
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for MaybeI64 {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

impl From<MaybeI64> for i64 {
    fn from(v: MaybeI64) -> Self {
        v.0
    }
}

impl std::fmt::Display for MaybeI64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for MaybeI64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for MaybeI64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        match raw {
            serde_json::Value::Null => Ok(Self(0)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .map(Self)
                .ok_or_else(|| de::Error::custom("number out of i64 range")),
            serde_json::Value::String(s) => {
                if s.is_empty() {
                    return Ok(Self(0));
                }
                s.parse::<f64>()
                    .map(|f| Self(f as i64))
                    .map_err(|_| de::Error::custom(format!("not a numeric string: {s:?}")))
            },
            other => Err(de::Error::custom(format!(
                "expected number or string, got {other}"
            ))),
        }
    }
}
