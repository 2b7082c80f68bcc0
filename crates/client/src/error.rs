//! Client-side error taxonomy shared by every transport.
//!
//! Transport-class failures are `Transport`, `Io`, `Http` and `Closed`;
//! `SizeExceeded` and `MalformedResponse` classify the two framing failures;
//! `Api` carries an envelope's own declared failure. Every layer surfaces
//! the first failure immediately: no retry, no partial results. An envelope
//! error only ever replaces a missing transport result, never an error the
//! transport already produced.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Connection, handshake, or HTTP-status failure, with the raw status
    /// text or cause for diagnosis.
    #[error("transport error: {0}")]
    Transport(String),

    /// A response reached the hard size ceiling; never a truncated success.
    #[error("API response maximum size exceeded")]
    SizeExceeded,

    /// Framing or payload extraction failed; carries the raw accumulated
    /// buffer so a misbehaving peer can be diagnosed without packet capture.
    #[error("failed to decode LiveAPI response: {raw}")]
    MalformedResponse { raw: String },

    /// The response envelope itself declared a failure.
    #[error("{0}")]
    Api(String),

    /// The caller named an API generation this client does not speak.
    #[error(transparent)]
    UnsupportedVersion(#[from] hostpanel_protocol::UnknownVersion),

    /// The gateway was closed; calls after close fail immediately.
    #[error("gateway is closed")]
    Closed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
