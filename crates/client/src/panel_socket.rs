//! Persistent raw-socket ("LiveAPI") transport for the per-account API.
//!
//! The connection is opened once at construction, a fixed handshake enables
//! structured JSON output, and every call is one strictly alternating
//! request/response exchange. Requests are length-prefixed; responses are
//! accumulated line by line until the closing result tag. The wire protocol
//! has no request identifiers, so a second call must never start before the
//! first completes; the `&mut self` call surface enforces that.

use std::sync::Arc;

use {
    async_trait::async_trait,
    serde::Serialize,
    serde_json::Value,
    tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
        net::{
            TcpStream, ToSocketAddrs,
            tcp::{OwnedReadHalf, OwnedWriteHalf},
        },
    },
    tracing::{debug, trace},
};

use {
    crate::{
        error::{Error, Result},
        gateway::Gateway,
        observer::{Observer, RequestObserver, notify_request, notify_response},
    },
    hostpanel_protocol::{
        Api2Result, ApiVersion, Args, RESPONSE_SIZE_LIMIT, UapiResult,
        extract::RESULT_CLOSE, extract_payload,
    },
};

/// Handshake command switching the peer into structured JSON output mode.
const JSON_HANDSHAKE: &str = r#"<cpaneljson enable="1">"#;
const ACTION_OPEN: &str = "<cpanelaction>";
const ACTION_CLOSE: &str = "</cpanelaction>";

/// The UAPI/API2 request shape carried inside the action tags.
#[derive(Serialize)]
struct ActionRequest<'a> {
    module: &'a str,
    reqtype: &'a str,
    func: &'a str,
    apiversion: &'a str,
    args: &'a Args,
}

/// The flat API1 request shape; its arguments stay a literal token list.
#[derive(Serialize)]
struct Action1Request<'a> {
    module: &'a str,
    reqtype: &'a str,
    func: &'a str,
    apiversion: &'a str,
    args: &'a [String],
}

struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

/// Per-account gateway over the persistent LiveAPI socket.
///
/// `None` in `conn` means the gateway was closed; every call after that
/// fails immediately with [`Error::Closed`].
pub struct SocketPanelGateway {
    conn: Option<Connection>,
    observer: Observer,
}

impl std::fmt::Debug for SocketPanelGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketPanelGateway")
            .field("connected", &self.conn.is_some())
            .finish_non_exhaustive()
    }
}

impl SocketPanelGateway {
    /// Connect, perform the JSON-mode handshake, and become ready.
    /// Handshake failure aborts construction with a transport error.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        Self::connect_with(addr, None).await
    }

    /// Like [`connect`](Self::connect) with a request observer installed.
    pub async fn connect_observed(
        addr: impl ToSocketAddrs,
        observer: Arc<dyn RequestObserver>,
    ) -> Result<Self> {
        Self::connect_with(addr, Some(observer)).await
    }

    async fn connect_with(addr: impl ToSocketAddrs, observer: Observer) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| Error::Transport(format!("connect: {e}")))?;
        let (read_half, write_half) = stream.into_split();
        let mut gateway = Self {
            conn: Some(Connection {
                reader: BufReader::new(read_half),
                writer: write_half,
            }),
            observer,
        };

        gateway
            .exec(JSON_HANDSHAKE, false)
            .await
            .map_err(|e| Error::Transport(format!("enabling JSON mode: {e}")))?;

        Ok(gateway)
    }

    /// One framed request/response exchange. With `want_body` false the
    /// response is validated and discarded (handshake use).
    async fn exec(&mut self, payload: &str, want_body: bool) -> Result<Option<String>> {
        let conn = self.conn.as_mut().ok_or(Error::Closed)?;

        debug!(bytes = payload.len(), "liveapi request");
        notify_request(&self.observer, "liveapi", payload);

        // Length prefix counts the payload bytes only, not the separator.
        let frame = format!("{}\n{}", payload.len(), payload);
        conn.writer.write_all(frame.as_bytes()).await?;
        conn.writer.flush().await?;

        let mut buf = String::new();
        let mut line = String::new();
        loop {
            line.clear();
            let n = conn.reader.read_line(&mut line).await?;
            if n == 0 {
                break;
            }
            // The transport's own line delimiters are discarded and not
            // reinserted; a payload value with an embedded newline is lost.
            // Inherited fragility of the wire protocol, not a feature.
            buf.push_str(line.trim_end_matches(['\r', '\n']));

            if buf.ends_with(RESULT_CLOSE) {
                break;
            }
            if buf.len() >= RESPONSE_SIZE_LIMIT {
                return Err(Error::SizeExceeded);
            }
        }

        trace!(raw = %buf, "liveapi response");
        notify_response(&self.observer, "liveapi", &buf);

        match extract_payload(&buf) {
            Some(json) if want_body => Ok(Some(json.to_string())),
            Some(_) => Ok(None),
            None => Err(Error::MalformedResponse { raw: buf }),
        }
    }

    async fn action(&mut self, version: ApiVersion, module: &str, function: &str, args: &Args) -> Result<String> {
        let request = serde_json::to_string(&ActionRequest {
            module,
            reqtype: "exec",
            func: function,
            apiversion: version.marker(),
            args,
        })?;
        let payload = format!("{ACTION_OPEN}{request}{ACTION_CLOSE}");
        match self.exec(&payload, true).await? {
            Some(body) => Ok(body),
            // Unreachable with want_body = true; keep the failure loud.
            None => Err(Error::MalformedResponse { raw: String::new() }),
        }
    }
}

#[async_trait]
impl Gateway for SocketPanelGateway {
    async fn uapi(&mut self, module: &str, function: &str, args: Args) -> Result<Value> {
        let body = self.action(ApiVersion::Uapi, module, function, &args).await?;
        let wrapped: UapiResult = serde_json::from_str(&body)?;
        wrapped.into_inner().map_err(Error::Api)
    }

    async fn api2(&mut self, module: &str, function: &str, args: Args) -> Result<Value> {
        let body = self.action(ApiVersion::Api2, module, function, &args).await?;
        let wrapped: Api2Result = serde_json::from_str(&body)?;
        wrapped.into_inner().map_err(Error::Api)
    }

    async fn api1(&mut self, module: &str, function: &str, tokens: &[String]) -> Result<Value> {
        let request = serde_json::to_string(&Action1Request {
            module,
            reqtype: "exec",
            func: function,
            apiversion: ApiVersion::Api1.marker(),
            args: tokens,
        })?;
        let payload = format!("{ACTION_OPEN}{request}{ACTION_CLOSE}");
        match self.exec(&payload, true).await? {
            Some(body) => Ok(serde_json::from_str(&body)?),
            None => Err(Error::MalformedResponse { raw: String::new() }),
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut conn) = self.conn.take() {
            conn.writer.shutdown().await?;
        }
        Ok(())
    }
}
