//! Authenticated per-account HTTPS transport.
//!
//! One GET per call against the panel port, HTTP Basic credentials. UAPI
//! calls hit `execute/<module>/<function>` directly; API1/API2 go through
//! `json-api/cpanel` with the four fixed proxy parameters. API2 bodies carry
//! an inner envelope that is unwrapped a second time before the payload is
//! handed back.

use std::sync::Arc;

use {
    async_trait::async_trait,
    once_cell::sync::OnceCell,
    serde_json::Value,
    tracing::{debug, trace},
};

use {
    crate::{
        error::{Error, Result},
        gateway::Gateway,
        http::{build_client, check_status, encode_query, read_capped},
        observer::{Observer, RequestObserver, notify_request, notify_response},
    },
    hostpanel_protocol::{Api2Result, ApiVersion, Args},
};

/// Default TLS port of the per-account panel.
pub const PANEL_PORT: u16 = 2083;

/// Per-account HTTPS gateway, authenticated with username and password.
///
/// The underlying client is created lazily on first use and reused for the
/// life of the instance. Sequential reuse is safe; concurrent calls on one
/// instance are prevented by the `&mut self` call surface.
pub struct HttpPanelGateway {
    base_url: String,
    username: String,
    password: String,
    insecure: bool,
    client: OnceCell<reqwest::Client>,
    observer: Observer,
}

impl HttpPanelGateway {
    pub fn new(
        hostname: &str,
        username: impl Into<String>,
        password: impl Into<String>,
        insecure: bool,
    ) -> Self {
        Self {
            base_url: format!("https://{hostname}:{PANEL_PORT}"),
            username: username.into(),
            password: password.into(),
            insecure,
            client: OnceCell::new(),
            observer: None,
        }
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

    fn build_url(&self, version: ApiVersion, module: &str, function: &str, args: &Args) -> String {
        let mut pairs = args.encode(version);
        match version {
            ApiVersion::Uapi => format!(
                "{}/execute/{module}/{function}?{}",
                self.base_url,
                encode_query(&pairs)
            ),
            ApiVersion::Api1 | ApiVersion::Api2 => {
                pairs.push(("cpanel_jsonapi_user".into(), self.username.clone()));
                pairs.push(("cpanel_jsonapi_apiversion".into(), version.marker().into()));
                pairs.push(("cpanel_jsonapi_module".into(), module.into()));
                pairs.push(("cpanel_jsonapi_func".into(), function.into()));
                format!("{}/json-api/cpanel?{}", self.base_url, encode_query(&pairs))
            },
        }
    }

    async fn call(
        &self,
        version: ApiVersion,
        module: &str,
        function: &str,
        args: &Args,
    ) -> Result<Value> {
        let url = self.build_url(version, module, function, args);
        debug!(version = %version, url = %url, "panel api call");
        notify_request(&self.observer, "panel", &url);

        let resp = self
            .client()?
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;
        check_status(&resp)?;

        let body = read_capped(resp).await?;
        let body_str = String::from_utf8_lossy(&body);
        trace!(raw = %body_str, "panel api response");
        notify_response(&self.observer, "panel", &body_str);

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl Gateway for HttpPanelGateway {
    async fn uapi(&mut self, module: &str, function: &str, args: Args) -> Result<Value> {
        self.call(ApiVersion::Uapi, module, function, &args).await
    }

    async fn api2(&mut self, module: &str, function: &str, args: Args) -> Result<Value> {
        let body = self.call(ApiVersion::Api2, module, function, &args).await?;
        let wrapped: Api2Result = serde_json::from_value(body)?;
        wrapped.into_inner().map_err(Error::Api)
    }

    async fn api1(&mut self, module: &str, function: &str, tokens: &[String]) -> Result<Value> {
        let args = Args::from_tokens(tokens);
        self.call(ApiVersion::Api1, module, function, &args).await
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
