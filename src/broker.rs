use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::{debug, trace};

use crate::logger::{MessageLogMode, MessageLogger};
use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://tccna.resideo.com/WebAPI/emea/api/v1";

/// Transport to the vendor API. Paths are relative to the API root.
///
/// Implementations own authentication, retries and timeouts. Failures are
/// reported as-is; zone entities never retry or recover them.
#[async_trait]
pub trait Broker: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value>;

    async fn put(&self, path: &str, body: &Value) -> Result<Value>;
}

pub struct HttpBrokerBuilder {
    access_token: String,
    base_url: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
}

impl HttpBrokerBuilder {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            user_agent: None,
            log_mode: None,
            log_path: None,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<HttpBroker> {
        let mut http = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        if let Some(agent) = self.user_agent {
            http = http.user_agent(agent);
        }

        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => Some(Mutex::new(MessageLogger::open(mode, &path)?)),
            _ => None,
        };

        Ok(HttpBroker {
            http: http.build()?,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            access_token: self.access_token,
            logger,
        })
    }
}

/// [`Broker`] over HTTPS with a caller-supplied bearer token.
pub struct HttpBroker {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    logger: Option<Mutex<MessageLogger>>,
}

impl HttpBroker {
    pub fn builder(access_token: impl Into<String>) -> HttpBrokerBuilder {
        HttpBrokerBuilder::new(access_token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn with_logger(&self, f: impl FnOnce(&mut MessageLogger)) {
        if let Some(logger) = &self.logger
            && let Ok(mut logger) = logger.lock()
        {
            f(&mut logger);
        }
    }

    async fn read_body(resp: reqwest::Response) -> Result<Value> {
        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| Error::Protocol(format!("response is not JSON: {e}")))
    }
}

#[async_trait]
impl Broker for HttpBroker {
    async fn get(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        self.with_logger(|l| l.request("GET", path, None));

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = Self::read_body(resp.error_for_status()?).await?;

        trace!(path, status, body = %body, "GET response");
        self.with_logger(|l| l.response(path, status, &body));
        Ok(body)
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.url(path);
        debug!(url = %url, "PUT");
        self.with_logger(|l| l.request("PUT", path, Some(body)));

        let resp = self
            .http
            .put(&url)
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let reply = Self::read_body(resp.error_for_status()?).await?;

        trace!(path, status, body = %reply, "PUT response");
        self.with_logger(|l| l.response(path, status, &reply));
        Ok(reply)
    }
}
