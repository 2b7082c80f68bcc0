//! Transports for the cPanel/WHM remote management API.
//!
//! Three concrete gateways share one capability contract ([`Gateway`]): the
//! authenticated per-account HTTPS transport, the persistent raw-socket
//! LiveAPI transport, and per-account calls proxied through the
//! administrative (WHM) API by the impersonation adapter; the WHM gateway
//! itself exposes the administrative single-call surface. Argument encoding
//! and envelope interpretation live in [`hostpanel-protocol`] and are
//! invoked identically by every transport.
//!
//! Everything is one call at a time per gateway instance (`&mut self`); no
//! retry, no backoff, no timeout beyond what the network stack provides.
//! Any such policy belongs to the caller.
//!
//! [`hostpanel-protocol`]: hostpanel_protocol

pub mod error;
pub mod gateway;
mod http;
pub mod impersonation;
pub mod observer;
pub mod panel_http;
pub mod panel_socket;
pub mod whm;

pub use hostpanel_protocol as protocol;

pub use {
    error::{Error, Result},
    gateway::{Api, Gateway},
    impersonation::ImpersonationGateway,
    observer::RequestObserver,
    panel_http::{HttpPanelGateway, PANEL_PORT},
    panel_socket::SocketPanelGateway,
    whm::{WHM_PORT, WhmGateway},
};
