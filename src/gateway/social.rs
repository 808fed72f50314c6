// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use serde_json::json;

use crate::error::Result;

use super::{
    CommentListPayload, CommentPayload, Empty, Envelope, Gateway, LikePayload, Options,
    ReplyPayload, SharePayload,
};

impl Gateway {
    pub(crate) async fn blog_comments(&self, blog_id: &str) -> Result<Envelope<CommentListPayload>> {
        self.send(&["blogs", blog_id, "comments"], Options::get())
            .await
    }

    pub(crate) async fn add_comment(
        &self,
        blog_id: &str,
        text: &str,
    ) -> Result<Envelope<CommentPayload>> {
        let token = self.require_token()?;
        self.send(
            &["blogs", blog_id, "comments"],
            Options::post().bearer(token).json(json!({ "text": text })),
        )
        .await
    }

    /// Replies attach to top-level comments only.
    pub(crate) async fn reply_to_comment(
        &self,
        comment_id: &str,
        text: &str,
    ) -> Result<Envelope<ReplyPayload>> {
        let token = self.require_token()?;
        self.send(
            &["comments", comment_id, "replies"],
            Options::post().bearer(token).json(json!({ "text": text })),
        )
        .await
    }

    pub(crate) async fn delete_comment(&self, comment_id: &str) -> Result<Envelope<Empty>> {
        let token = self.require_token()?;
        self.send(&["comments", comment_id], Options::delete().bearer(token))
            .await
    }

    /// Likes the post, or removes the like if the user already gave one.
    pub(crate) async fn toggle_like(&self, blog_id: &str) -> Result<Envelope<LikePayload>> {
        let token = self.require_token()?;
        self.send(&["blogs", blog_id, "like"], Options::post().bearer(token))
            .await
    }

    pub(crate) async fn share_blog(
        &self,
        blog_id: &str,
        message: Option<&str>,
    ) -> Result<Envelope<SharePayload>> {
        let token = self.require_token()?;
        self.send(
            &["blogs", blog_id, "share"],
            Options::post()
                .bearer(token)
                .json(json!({ "message": message.unwrap_or_default() })),
        )
        .await
    }
}
