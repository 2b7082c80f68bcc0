//! Wire-level definitions for the cPanel/WHM remote management API.
//!
//! Everything in this crate is pure: argument encoding per API generation,
//! the response envelope shapes and their error unification, and extraction
//! of the JSON payload embedded in a LiveAPI socket response. No I/O happens
//! here; the transports live in `hostpanel-client`.

use serde::{Deserialize, Serialize};

pub mod args;
pub mod envelope;
pub mod extract;
pub mod num;

pub use args::Args;
pub use envelope::{
    Api1Response, Api2Response, Api2Result, UapiResponse, UapiResult, WhmResponse,
};
pub use extract::extract_payload;
pub use num::MaybeI64;

// ── Constants ────────────────────────────────────────────────────────────────

const MEGABYTE: usize = 1024 * 1024;

/// Hard ceiling on any single decoded API response, identical across every
/// transport. Reaching it is always a failure, never a truncated success.
pub const RESPONSE_SIZE_LIMIT: usize = 5 * MEGABYTE + 1337;

/// The generic error text the server (and this crate) fall back to when an
/// envelope declares failure without giving a reason. Exported so call sites
/// that deliberately tolerate it can name it instead of matching a literal.
pub const ERROR_UNKNOWN: &str = "Unknown";

// ── API generations ──────────────────────────────────────────────────────────

/// One of the three successive call conventions of the per-account API.
///
/// Each generation has its own argument encoding and response envelope shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiVersion {
    /// API1, the oldest convention. Arguments are an ordered token list.
    Api1,
    /// API2. Arguments are a flat key/value map.
    Api2,
    /// UAPI, the current convention.
    Uapi,
}

impl ApiVersion {
    /// The version marker used on the wire (`cpanel_jsonapi_apiversion`,
    /// LiveAPI `apiversion` field).
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::Api1 => "1",
            Self::Api2 => "2",
            Self::Uapi => "uapi",
        }
    }
}

/// Error for an unrecognized API version marker.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown api version: {0}")]
pub struct UnknownVersion(pub String);

impl std::str::FromStr for ApiVersion {
    type Err = UnknownVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Self::Api1),
            "2" => Ok(Self::Api2),
            "uapi" | "3" => Ok(Self::Uapi),
            other => Err(UnknownVersion(other.to_string())),
        }
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.marker())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn version_markers_round_trip() {
        for v in [ApiVersion::Api1, ApiVersion::Api2, ApiVersion::Uapi] {
            assert_eq!(v.marker().parse::<ApiVersion>().unwrap(), v);
        }
    }

    #[test]
    fn uapi_accepts_the_whm_proxy_marker() {
        // The WHM impersonation proxy expresses UAPI as apiversion "3".
        assert_eq!("3".parse::<ApiVersion>().unwrap(), ApiVersion::Uapi);
    }

    #[test]
    fn unknown_marker_is_an_error() {
        let err = "4".parse::<ApiVersion>().unwrap_err();
        assert_eq!(err.to_string(), "unknown api version: 4");
    }

    #[test]
    fn size_limit_value() {
        assert_eq!(RESPONSE_SIZE_LIMIT, 5 * 1024 * 1024 + 1337);
    }
}
