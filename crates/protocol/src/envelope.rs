//! Response envelope shapes and their uniform failure interpretation.
//!
//! Each of the four envelope shapes exposes [`failure`](UapiResponse::failure)
//! returning `Some(reason)` on a declared failure and `None` on success. The
//! interpretation never special-cases any particular error text; a caller
//! that wants to tolerate [`ERROR_UNKNOWN`](crate::ERROR_UNKNOWN) for a
//! specific idempotent check does so explicitly at its own call site.

use {
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

use crate::ERROR_UNKNOWN;

/// The `event` object carried by API1 and API2 envelopes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub result: i64,
    #[serde(default)]
    pub reason: String,
}

impl Event {
    /// Success iff the event result equals 1; otherwise the reason, or the
    /// generic unknown error when the reason is empty.
    fn failure(&self) -> Option<String> {
        if self.result == 1 {
            return None;
        }
        if self.reason.is_empty() {
            return Some(ERROR_UNKNOWN.to_string());
        }
        Some(self.reason.clone())
    }
}

// ── UAPI ─────────────────────────────────────────────────────────────────────

/// The outer UAPI envelope: status code, error and message lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UapiResponse {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub data: Value,
}

impl UapiResponse {
    /// Success iff `status == 1`, regardless of the error list. On failure:
    /// the explicit error string if present, else the error list joined with
    /// newlines, else the generic unknown error.
    #[must_use]
    pub fn failure(&self) -> Option<String> {
        if self.status == 1 {
            return None;
        }
        if !self.error.is_empty() {
            return Some(self.error.clone());
        }
        if self.errors.is_empty() {
            return Some(ERROR_UNKNOWN.to_string());
        }
        Some(self.errors.join("\n"))
    }

    /// All informational messages joined with newlines.
    #[must_use]
    pub fn message(&self) -> String {
        self.messages.join("\n")
    }
}

// ── API2 ─────────────────────────────────────────────────────────────────────

/// The outer API2 envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Api2Response {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub event: Event,
}

impl Api2Response {
    /// Success iff the event result equals 1; the explicit error string
    /// takes precedence over the event reason.
    #[must_use]
    pub fn failure(&self) -> Option<String> {
        if self.event.result == 1 {
            return None;
        }
        if !self.error.is_empty() {
            return Some(self.error.clone());
        }
        self.event.failure()
    }
}

// ── API1 ─────────────────────────────────────────────────────────────────────

/// The API1 envelope. The `data.result` payload is a bare string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Api1Response {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub event: Event,
    #[serde(default)]
    pub data: Api1Data,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Api1Data {
    #[serde(default)]
    pub result: String,
}

impl Api1Response {
    /// The explicit error string wins regardless of the event result; then
    /// the API2 event rule applies.
    #[must_use]
    pub fn failure(&self) -> Option<String> {
        if !self.error.is_empty() {
            return Some(self.error.clone());
        }
        self.event.failure()
    }
}

// ── WHM ──────────────────────────────────────────────────────────────────────

/// The administrative (WHM) envelope shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WhmResponse {
    #[serde(default)]
    pub metadata: WhmMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WhmMetadata {
    #[serde(default)]
    pub reason: String,
    #[serde(default, rename = "result")]
    pub result_raw: Value,
}

impl WhmResponse {
    /// The result code, accepted as a JSON number or a numeric string.
    /// Anything else normalizes to -1 (failure). WHM intermittently returns
    /// the code as a string.
    #[must_use]
    pub fn result(&self) -> i64 {
        match &self.metadata.result_raw {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(-1),
            Value::String(s) => s.parse::<i64>().unwrap_or(-1),
            _ => -1,
        }
    }

    /// Success iff the normalized result code equals 1; otherwise the reason,
    /// or the generic unknown error when the reason is empty.
    #[must_use]
    pub fn failure(&self) -> Option<String> {
        if self.result() == 1 {
            return None;
        }
        if self.metadata.reason.is_empty() {
            return Some(ERROR_UNKNOWN.to_string());
        }
        Some(self.metadata.reason.clone())
    }
}

// ── Inner result wrappers ────────────────────────────────────────────────────

/// A UAPI response as wrapped by the LiveAPI socket and the WHM proxy: an
/// error string plus the actual UAPI envelope as an opaque payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UapiResult {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub result: Value,
}

impl UapiResult {
    /// Unwrap the inner payload; an error declared by this wrapper takes
    /// precedence over the payload.
    pub fn into_inner(self) -> Result<Value, String> {
        if self.error.is_empty() {
            Ok(self.result)
        } else {
            Err(self.error)
        }
    }
}

/// An API2 response wrapper; the payload lives under `cpanelresult`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Api2Result {
    #[serde(default)]
    pub error: String,
    #[serde(default, rename = "cpanelresult")]
    pub result: Value,
}

impl Api2Result {
    pub fn into_inner(self) -> Result<Value, String> {
        if self.error.is_empty() {
            Ok(self.result)
        } else {
            Err(self.error)
        }
    }
}
