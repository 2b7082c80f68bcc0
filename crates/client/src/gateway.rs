//! The capability contract every transport implements, plus a typed facade.

use {
    async_trait::async_trait,
    serde::de::DeserializeOwned,
    serde_json::Value,
};

use {
    crate::error::Result,
    hostpanel_protocol::{ApiVersion, Args},
};

/// One logical call surface over all transports.
///
/// Each method encodes its arguments for the named generation, performs the
/// transport exchange, interprets the response envelope and returns the
/// decoded payload. Methods take `&mut self`: a gateway carries at most one
/// call in flight, which the socket transport's wire protocol requires and
/// the HTTP transports simply inherit.
///
/// Gateways never second-guess an envelope's error text. A caller performing
/// an idempotent capability probe may choose to tolerate the generic
/// [`ERROR_UNKNOWN`](hostpanel_protocol::ERROR_UNKNOWN) reason for that one
/// call; that policy belongs at the call site:
///
/// ```ignore
/// match api.uapi("Features", "has_feature", args).await {
///     Err(Error::Api(reason)) if reason == hostpanel_protocol::ERROR_UNKNOWN => { /* absent */ },
///     other => other?,
/// };
/// ```
#[async_trait]
pub trait Gateway: Send {
    /// Call a UAPI (unified generation) function.
    async fn uapi(&mut self, module: &str, function: &str, args: Args) -> Result<Value>;

    /// Call an API2 (second generation) function.
    async fn api2(&mut self, module: &str, function: &str, args: Args) -> Result<Value>;

    /// Call an API1 (legacy generation) function with its token list.
    async fn api1(&mut self, module: &str, function: &str, tokens: &[String]) -> Result<Value>;

    /// Release the transport. Further calls fail immediately.
    async fn close(&mut self) -> Result<()>;
}

/// Typed facade over any [`Gateway`].
///
/// Adds generic decoding of call results and dynamic dispatch on an
/// [`ApiVersion`] for callers that carry the generation as data.
pub struct Api<G> {
    gateway: G,
}

impl<G: Gateway> Api<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// Dispatch on a generation carried as data. API1 treats the argument
    /// keys as its token list.
    pub async fn call(
        &mut self,
        version: ApiVersion,
        module: &str,
        function: &str,
        args: Args,
    ) -> Result<Value> {
        match version {
            ApiVersion::Uapi => self.gateway.uapi(module, function, args).await,
            ApiVersion::Api2 => self.gateway.api2(module, function, args).await,
            ApiVersion::Api1 => {
                let tokens: Vec<String> = args.keys().cloned().collect();
                self.gateway.api1(module, function, &tokens).await
            },
        }
    }

    pub async fn uapi<T: DeserializeOwned>(
        &mut self,
        module: &str,
        function: &str,
        args: Args,
    ) -> Result<T> {
        let value = self.gateway.uapi(module, function, args).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn api2<T: DeserializeOwned>(
        &mut self,
        module: &str,
        function: &str,
        args: Args,
    ) -> Result<T> {
        let value = self.gateway.api2(module, function, args).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn api1<T: DeserializeOwned>(
        &mut self,
        module: &str,
        function: &str,
        tokens: &[String],
    ) -> Result<T> {
        let value = self.gateway.api1(module, function, tokens).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn close(&mut self) -> Result<()> {
        self.gateway.close().await
    }
}
