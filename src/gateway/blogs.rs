// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::num::NonZeroU32;

use crate::{error::Result, model::BlogDraft};

use super::{BlogListPayload, BlogPayload, Empty, Envelope, Gateway, Options};

const BLOGS: &str = "blogs";

/// Which page of the blog listing to fetch, and what to filter it by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Listing {
    pub(crate) page: NonZeroU32,
    pub(crate) limit: NonZeroU32,
    pub(crate) search: Option<String>,
}

impl Default for Listing {
    fn default() -> Self {
        Self {
            page: NonZeroU32::MIN,
            limit: NonZeroU32::new(10).unwrap_or(NonZeroU32::MIN),
            search: None,
        }
    }
}

impl Gateway {
    pub(crate) async fn list_blogs(&self, listing: &Listing) -> Result<Envelope<BlogListPayload>> {
        let mut options = Options::get()
            .query("page", listing.page)
            .query("limit", listing.limit);
        if let Some(search) = listing.search.as_deref().filter(|s| !s.is_empty()) {
            options = options.query("search", search);
        }
        self.send(&[BLOGS], options).await
    }

    /// The unpaginated listing endpoint.
    pub(crate) async fn list_blogs_simple(&self) -> Result<Envelope<BlogListPayload>> {
        self.send(&[BLOGS, "simple-blog"], Options::get()).await
    }

    pub(crate) async fn get_blog(&self, blog_id: &str) -> Result<Envelope<BlogPayload>> {
        self.send(&[BLOGS, blog_id], Options::get()).await
    }

    pub(crate) async fn user_blogs(&self, user_id: &str) -> Result<Envelope<BlogListPayload>> {
        self.send(&[BLOGS, "user", user_id], Options::get()).await
    }

    pub(crate) async fn create_blog(&self, draft: &BlogDraft) -> Result<Envelope<BlogPayload>> {
        let token = self.require_token()?;
        self.send(
            &[BLOGS, "create"],
            Options::post()
                .bearer(token)
                .json(serde_json::to_value(draft)?),
        )
        .await
    }

    pub(crate) async fn update_blog(
        &self,
        blog_id: &str,
        draft: &BlogDraft,
    ) -> Result<Envelope<BlogPayload>> {
        let token = self.require_token()?;
        self.send(
            &[BLOGS, blog_id],
            Options::put()
                .bearer(token)
                .json(serde_json::to_value(draft)?),
        )
        .await
    }

    pub(crate) async fn delete_blog(&self, blog_id: &str) -> Result<Envelope<Empty>> {
        let token = self.require_token()?;
        self.send(&[BLOGS, blog_id], Options::delete().bearer(token))
            .await
    }
}
