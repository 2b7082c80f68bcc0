//! Shared plumbing for the HTTPS transports: client construction, query
//! encoding, and the byte-capped body read.

use {
    hostpanel_protocol::RESPONSE_SIZE_LIMIT,
    url::form_urlencoded,
};

use crate::error::{Error, Result};

/// Build the one client an HTTPS gateway instance keeps for its lifetime.
/// Connection reuse is capped at a single idle connection per host.
pub(crate) fn build_client(insecure: bool) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(insecure)
        .pool_max_idle_per_host(1)
        .build()?;
    Ok(client)
}

/// Render encoded argument pairs as a query/form string.
pub(crate) fn encode_query(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Fail on any HTTP status of 300 or above, surfacing the raw status text.
pub(crate) fn check_status(resp: &reqwest::Response) -> Result<()> {
    if resp.status().as_u16() >= 300 {
        return Err(Error::Transport(resp.status().to_string()));
    }
    Ok(())
}

/// Read the response body through the hard size ceiling. A body that reaches
/// the ceiling is a `SizeExceeded` failure, never a partial decode.
pub(crate) async fn read_capped(mut resp: reqwest::Response) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        if body.len() + chunk.len() >= RESPONSE_SIZE_LIMIT {
            return Err(Error::SizeExceeded);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
