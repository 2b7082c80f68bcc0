//! Platform-wide administrative (WHM) HTTPS transport.
//!
//! Single endpoint family `json-api/<function>`; responses always use the
//! administrative envelope shape regardless of which generation marker
//! selected the argument encoding. An access hash, when configured, wins
//! over HTTP Basic credentials; an optional TOTP secret adds a one-time
//! code header to every call. The impersonation proxy function is posted
//! form-encoded because its argument payload can outgrow a URL.

use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use {
    data_encoding::BASE32,
    hmac::{Hmac, Mac},
    once_cell::sync::OnceCell,
    serde::Deserialize,
    serde_json::Value,
    sha1::Sha1,
    tracing::{debug, trace},
};

use {
    crate::{
        error::{Error, Result},
        http::{build_client, check_status, encode_query, read_capped},
        observer::{Observer, RequestObserver, notify_request, notify_response},
    },
    hostpanel_protocol::{ApiVersion, Args, WhmResponse},
};

/// Default TLS port of the administrative API.
pub const WHM_PORT: u16 = 2087;

/// Header carrying the time-based one-time code.
const OTP_HEADER: &str = "X-CPANEL-OTP";

/// Functions whose argument payload can exceed practical URL length and are
/// therefore posted form-encoded. Today that is only the impersonation proxy.
const FORCE_POST: &[&str] = &["cpanel"];

/// TOTP parameters: 30-second step, 6 digits, HMAC-SHA1.
const OTP_STEP_SECS: i64 = 30;
const OTP_MODULUS: u32 = 1_000_000;

enum Credential {
    AccessHash(String),
    Password(String),
}

/// Administrative API gateway.
///
/// One lazily created HTTP client per instance, reused across calls. The
/// credential and optional one-time-code secret are immutable after
/// construction.
pub struct WhmGateway {
    base_url: String,
    username: String,
    credential: Credential,
    totp_key: Option<Vec<u8>>,
    insecure: bool,
    client: OnceCell<reqwest::Client>,
    observer: Observer,
}

impl WhmGateway {
    /// Authenticate with an access hash. CR/LF bytes are stripped once here;
    /// hash files ship with embedded newlines.
    pub fn with_access_hash(
        hostname: &str,
        username: impl Into<String>,
        access_hash: &str,
        insecure: bool,
    ) -> Self {
        let hash: String = access_hash.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
        Self::new(hostname, username, Credential::AccessHash(hash), insecure)
    }

    /// Authenticate with HTTP Basic credentials.
    pub fn with_password(
        hostname: &str,
        username: impl Into<String>,
        password: impl Into<String>,
        insecure: bool,
    ) -> Self {
        Self::new(
            hostname,
            username,
            Credential::Password(password.into()),
            insecure,
        )
    }

    fn new(
        hostname: &str,
        username: impl Into<String>,
        credential: Credential,
        insecure: bool,
    ) -> Self {
        Self {
            base_url: format!("https://{hostname}:{WHM_PORT}"),
            username: username.into(),
            credential,
            totp_key: None,
            insecure,
            client: OnceCell::new(),
            observer: None,
        }
    }

    /// Attach a TOTP secret in its portable base32 text form; it is decoded
    /// once here and a fresh code is derived per call.
    pub fn totp_secret(mut self, secret: &str) -> Result<Self> {
        let key = BASE32
            .decode(secret.trim().as_bytes())
            .map_err(|e| Error::Transport(format!("invalid TOTP secret: {e}")))?;
        self.totp_key = Some(key);
        Ok(self)
    }

    /// Override the base URL, for nonstandard ports or tests.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Install a request observer.
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    fn client(&self) -> Result<&reqwest::Client> {
        self.client.get_or_try_init(|| build_client(self.insecure))
    }

    /// Call one administrative function.
    ///
    /// The generation marker in `cpanel_jsonapi_apiversion` selects the
    /// argument encoding only; the response is always the administrative
    /// envelope, which the caller interprets via [`WhmResponse`].
    pub async fn call(&self, function: &str, args: Args) -> Result<Value> {
        // Only the legacy marker changes the encoding; everything else,
        // including no marker at all, encodes as a plain key/value map.
        let version = match args.get("cpanel_jsonapi_apiversion").and_then(Value::as_str) {
            Some("1") => ApiVersion::Api1,
            _ => ApiVersion::Api2,
        };
        self.call_with_pairs(function, args.encode(version)).await
    }

    /// Pair-level entry point for callers that mix encodings, such as the
    /// impersonation adapter proxying a legacy token list alongside plain
    /// key/value metadata.
    pub(crate) async fn call_with_pairs(
        &self,
        function: &str,
        mut pairs: Vec<(String, String)>,
    ) -> Result<Value> {
        pairs.retain(|(k, _)| k != "api.version");
        pairs.push(("api.version".into(), "1".into()));

        let post = FORCE_POST.contains(&function);
        let url = if post {
            format!("{}/json-api/{function}", self.base_url)
        } else {
            format!(
                "{}/json-api/{function}?{}",
                self.base_url,
                encode_query(&pairs)
            )
        };

        debug!(function = %function, method = if post { "POST" } else { "GET" }, url = %url, "whm api call");
        notify_request(&self.observer, "whm", &url);

        let mut req = if post {
            self.client()?.post(&url).form(&pairs)
        } else {
            self.client()?.get(&url)
        };

        req = match &self.credential {
            Credential::AccessHash(hash) => req.header(
                reqwest::header::AUTHORIZATION,
                format!("WHM {}:{}", self.username, hash),
            ),
            Credential::Password(password) => req.basic_auth(&self.username, Some(password)),
        };

        if let Some(key) = &self.totp_key {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|e| Error::Transport(format!("system clock: {e}")))?
                .as_secs() as i64;
            req = req.header(OTP_HEADER, totp(key, now)?);
        }

        let resp = req.send().await?;
        check_status(&resp)?;

        let body = read_capped(resp).await?;
        let body_str = String::from_utf8_lossy(&body);
        trace!(raw = %body_str, "whm api response");
        notify_response(&self.observer, "whm", &body_str);

        Ok(serde_json::from_slice(&body)?)
    }

    /// Connectivity check: ask the server for its version string.
    pub async fn version(&self) -> Result<String> {
        #[derive(Default, Deserialize)]
        struct VersionData {
            #[serde(default)]
            version: String,
        }
        #[derive(Deserialize)]
        struct VersionResponse {
            #[serde(flatten)]
            whm: WhmResponse,
            #[serde(default)]
            data: VersionData,
        }

        let body = self.call("version", Args::new()).await?;
        let resp: VersionResponse = serde_json::from_value(body)?;
        if let Some(reason) = resp.whm.failure() {
            return Err(Error::Api(reason));
        }
        Ok(resp.data.version)
    }
}

/// Derive the 6-digit, 30-second-stepped HMAC-SHA1 one-time code.
fn totp(key: &[u8], unix_secs: i64) -> Result<String> {
    let counter = (unix_secs / OTP_STEP_SECS).to_be_bytes();
    let mut mac = Hmac::<Sha1>::new_from_slice(key)
        .map_err(|_| Error::Transport("invalid TOTP key length".into()))?;
    mac.update(&counter);
    let digest = mac.finalize().into_bytes();

    let offset = (digest[digest.len() - 1] & 0xf) as usize;
    let code = (u32::from(digest[offset] & 0x7f) << 24
        | u32::from(digest[offset + 1]) << 16
        | u32::from(digest[offset + 2]) << 8
        | u32::from(digest[offset + 3]))
        % OTP_MODULUS;

    Ok(format!("{code:06}"))
}
