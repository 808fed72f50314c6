// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! The single path every call to the blog service takes.
//!
//! Requests always carry JSON content headers and, when a token is known,
//! a bearer `Authorization` header. Failing statuses become
//! `Error::Server`, missing responses `Error::Network`; successful bodies are
//! returned exactly as the service sent them.

mod auth;
mod blogs;
mod envelope;
#[cfg(test)]
pub(crate) mod mock;
mod social;
#[cfg(test)]
mod tests;
mod transport;

use std::sync::Arc;

use log::debug;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method, StatusCode,
};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    error::{Error, Result},
    model::Token,
};

use transport::Request;

pub(crate) use blogs::Listing;
pub(crate) use envelope::{
    AuthPayload, BlogListPayload, BlogPayload, CommentListPayload, CommentPayload, Empty,
    Envelope, LikePayload, ReplyPayload, SharePayload,
};
pub(crate) use transport::{Http, Transport};

const JSON: &str = "application/json";

/// Where the gateway looks up the bearer token of the current session.
pub(crate) trait TokenSource: Send + Sync {
    fn token(&self) -> Option<Token>;
}

/// Per-request settings for [`Gateway::send`].
#[derive(Debug, Default)]
pub(crate) struct Options {
    method: Method,
    body: Option<serde_json::Value>,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    bearer: Option<Token>,
}

impl Options {
    pub(crate) fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub(crate) fn get() -> Self {
        Self::new(Method::GET)
    }

    pub(crate) fn post() -> Self {
        Self::new(Method::POST)
    }

    pub(crate) fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub(crate) fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    #[must_use]
    pub(crate) fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub(crate) fn query<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    // LINT: No current endpoint needs extra headers, but callers outside the
    // session layer may.
    #[allow(dead_code)]
    #[must_use]
    pub(crate) fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        let _ = self.headers.insert(name, value);
        self
    }

    /// Uses this token instead of the session's.
    #[must_use]
    pub(crate) fn bearer(mut self, token: Token) -> Self {
        self.bearer = Some(token);
        self
    }
}

#[derive(Clone)]
pub(crate) struct Gateway {
    transport: Arc<dyn Transport>,
    base: Url,
    tokens: Arc<dyn TokenSource>,
}

impl Gateway {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        base: Url,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        Ok(Self {
            transport,
            base,
            tokens,
        })
    }

    pub(crate) fn token(&self) -> Option<Token> {
        self.tokens.token()
    }

    /// Returns the session token, or fails without touching the network.
    pub(crate) fn require_token(&self) -> Result<Token> {
        self.token().ok_or(Error::AuthRequired)
    }

    fn endpoint(&self, path: &[&str], query: &[(String, String)]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            let _ = segments.pop_if_empty().extend(path);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                let _ = pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Sends one request to `path` (as unescaped segments below the base URL)
    /// and decodes the JSON body of a successful response.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        path: &[&str],
        options: Options,
    ) -> Result<T> {
        let url = self.endpoint(path, &options.query)?;

        let mut headers = options.headers;
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        let _ = headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        if let Some(token) = options.bearer.or_else(|| self.token()) {
            let mut value = HeaderValue::try_from(format!("Bearer {}", token.expose()))
                .map_err(|_| Error::Validation("token is not a valid header value".to_owned()))?;
            value.set_sensitive(true);
            let _ = headers.insert(AUTHORIZATION, value);
        }

        let body = options.body.as_ref().map(serde_json::to_vec).transpose()?;

        debug!("{} {}", options.method, url);
        let resp = self
            .transport
            .execute(Request {
                method: options.method,
                url,
                headers,
                body,
            })
            .await?;
        debug!("Received HTTP {}", resp.status);

        if !resp.status.is_success() {
            return Err(server_error(resp.status, &resp.body));
        }
        Ok(serde_json::from_slice(&resp.body)?)
    }
}

fn server_error(status: StatusCode, body: &[u8]) -> Error {
    let failure: envelope::Failure = serde_json::from_slice(body).unwrap_or_default();
    let requires_verification = failure.needs_verification();
    let message = failure
        .message
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status")
            )
        });

    Error::Server {
        status: status.as_u16(),
        message,
        requires_verification,
    }
}
