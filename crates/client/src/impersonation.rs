//! Per-account calls proxied through the administrative API.
//!
//! Wraps a [`WhmGateway`] and re-expresses each per-account call shape as a
//! call to the `cpanel` proxy function, injecting the target username and
//! the target module/function/generation as additional arguments. The inner
//! envelope unwrap is the same rule the other transports use; envelope
//! interpretation is implemented once and shared, never per transport.

use {
    async_trait::async_trait,
    serde_json::Value,
};

use {
    crate::{
        error::{Error, Result},
        gateway::Gateway,
        whm::WhmGateway,
    },
    hostpanel_protocol::{Api2Result, ApiVersion, Args, UapiResult},
};

/// The administrative function that proxies per-account calls.
const PROXY_FUNCTION: &str = "cpanel";

/// Gateway invoking per-account API calls on behalf of another account.
pub struct ImpersonationGateway {
    whm: WhmGateway,
    user: String,
}

impl ImpersonationGateway {
    /// Impersonate `user` through an administrative gateway.
    pub fn new(whm: WhmGateway, user: impl Into<String>) -> Self {
        Self {
            whm,
            user: user.into(),
        }
    }
}

#[async_trait]
impl Gateway for ImpersonationGateway {
    async fn uapi(&mut self, module: &str, function: &str, mut args: Args) -> Result<Value> {
        args.set("user", self.user.clone());
        // The proxy expresses UAPI as apiversion 3.
        args.set("cpanel_jsonapi_apiversion", "3");
        args.set("cpanel_jsonapi_module", module);
        args.set("cpanel_jsonapi_func", function);

        let body = self.whm.call(PROXY_FUNCTION, args).await?;
        let wrapped: UapiResult = serde_json::from_value(body)?;
        wrapped.into_inner().map_err(Error::Api)
    }

    async fn api2(&mut self, module: &str, function: &str, mut args: Args) -> Result<Value> {
        args.set("user", self.user.clone());
        args.set("cpanel_jsonapi_apiversion", "2");
        args.set("cpanel_jsonapi_module", module);
        args.set("cpanel_jsonapi_func", function);

        let body = self.whm.call(PROXY_FUNCTION, args).await?;
        let wrapped: Api2Result = serde_json::from_value(body)?;
        wrapped.into_inner().map_err(Error::Api)
    }

    async fn api1(&mut self, module: &str, function: &str, tokens: &[String]) -> Result<Value> {
        // The caller's tokens go through the legacy split rule; the proxy
        // metadata stays plain key/value so its values survive encoding.
        let mut pairs = Args::from_tokens(tokens).encode(ApiVersion::Api1);
        pairs.push(("user".into(), self.user.clone()));
        pairs.push(("cpanel_jsonapi_apiversion".into(), "1".into()));
        pairs.push(("cpanel_jsonapi_module".into(), module.into()));
        pairs.push(("cpanel_jsonapi_func".into(), function.into()));

        self.whm.call_with_pairs(PROXY_FUNCTION, pairs).await
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
