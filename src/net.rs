// src/net.rs
//
// One entry point for everything remote. The trait exists so the clients and
// the fetch worker can be exercised against canned bodies in tests.

use std::time::Duration;

use crate::config::consts::{REQUEST_TIMEOUT, USER_AGENT};

#[derive(Debug, Clone, thiserror::Error)]
pub enum NetError {
    #[error("HTTP {0}")]
    Status(u16),
    #[error("{0}")]
    Transport(String),
    #[error("bad payload: {0}")]
    Decode(String),
}

pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<String, NetError>;
}

/// Session-cookie HTTPS client. The game session is whatever cookies the
/// ambient jar holds; there is no credential handling here.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, NetError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, NetError> {
        let client = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| NetError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String, NetError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| NetError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NetError::Status(status.as_u16()));
        }
        resp.text().map_err(|e| NetError::Transport(e.to_string()))
    }
}
