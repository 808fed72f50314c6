// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! A scripted stand-in for the blog service.

use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Mutex;
use url::Url;

use crate::{
    error::{Error, Result},
    model::Token,
};

use super::{
    transport::{Request, Response},
    Gateway, TokenSource, Transport,
};

pub(crate) const BASE: &str = "http://blog.test/api";

/// Replays queued replies in order and records every request it sees.
#[derive(Clone, Default)]
pub(crate) struct Mock {
    replies: Arc<Mutex<VecDeque<Result<Response>>>>,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl Mock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn reply(&self, status: u16, body: serde_json::Value) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.replies.lock().await.push_back(Ok(Response {
            status,
            body: body.to_string().into_bytes(),
        }));
    }

    pub(crate) async fn reply_raw(&self, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.replies.lock().await.push_back(Ok(Response {
            status,
            body: body.as_bytes().to_vec(),
        }));
    }

    pub(crate) async fn fail(&self, reason: &str) {
        self.replies
            .lock()
            .await
            .push_back(Err(Error::Network(reason.to_owned())));
    }

    pub(crate) async fn requests(&self) -> Vec<Request> {
        self.requests.lock().await.clone()
    }

    pub(crate) async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    pub(crate) async fn last_request(&self) -> Option<Request> {
        self.requests.lock().await.last().cloned()
    }
}

#[async_trait]
impl Transport for Mock {
    async fn execute(&self, req: Request) -> Result<Response> {
        self.requests.lock().await.push(req);
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(Error::Network("no scripted reply left".to_owned())))
    }
}

impl TokenSource for Option<Token> {
    fn token(&self) -> Option<Token> {
        self.clone()
    }
}

pub(crate) fn base() -> Result<Url> {
    Ok(Url::parse(BASE)?)
}

/// A gateway over `mock` that always presents `token`.
pub(crate) fn gateway(mock: &Mock, token: Option<Token>) -> Result<Gateway> {
    Gateway::new(Arc::new(mock.clone()), base()?, Arc::new(token))
}

impl Request {
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub(crate) fn json(&self) -> Result<serde_json::Value> {
        Ok(self
            .body
            .as_deref()
            .map(serde_json::from_slice)
            .transpose()?
            .unwrap_or(serde_json::Value::Null))
    }
}
