//! Book Service API Client

mod reqwest_transport;

pub use reqwest_transport::{ReqwestTransport, ReqwestTransportConfig};
