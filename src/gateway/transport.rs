// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Method, StatusCode};
use url::Url;

use crate::{error::Result, metadata};

#[derive(Clone, Debug)]
pub(crate) struct Request {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Vec<u8>>,
}

#[derive(Clone, Debug)]
pub(crate) struct Response {
    pub(crate) status: StatusCode,
    pub(crate) body: Vec<u8>,
}

/// Moves one request to the blog service and back. Implementations report a
/// missing response as `Error::Network` and must not retry.
#[async_trait]
pub(crate) trait Transport: Send + Sync {
    async fn execute(&self, req: Request) -> Result<Response>;
}

pub(crate) struct Http {
    client: reqwest::Client,
}

impl Http {
    pub(crate) fn new() -> Result<Self> {
        // The cookie store plays the part of a browser's credentialed
        // cross-origin mode: any session cookie the service sets is replayed.
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(metadata::USER_AGENT.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for Http {
    async fn execute(&self, req: Request) -> Result<Response> {
        let mut builder = self
            .client
            .request(req.method, req.url)
            .headers(req.headers);
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?.to_vec();
        Ok(Response { status, body })
    }
}
