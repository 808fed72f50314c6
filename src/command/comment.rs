// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use crate::{
    error::{Error, Result},
    model::{Author, Comment},
};

use super::{Access, Context};

/// Discuss blog posts.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List the comments on a post, with their replies.
    List(BlogId),
    /// Comment on a post.
    Add(Add),
    /// Reply to a comment.
    Reply(Reply),
    /// Delete one of your comments.
    Delete(CommentId),
}

#[derive(Debug, Args)]
pub(crate) struct BlogId {
    blog_id: String,
}

#[derive(Debug, Args)]
pub(crate) struct CommentId {
    comment_id: String,
}

#[derive(Debug, Args)]
pub(crate) struct Add {
    blog_id: String,
    text: String,
}

#[derive(Debug, Args)]
pub(crate) struct Reply {
    comment_id: String,
    text: String,
}

#[derive(Debug, PartialEq, Eq, Tabled)]
struct Row {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Comment")]
    text: String,
}

fn author(user: Option<&Author>) -> String {
    user.map_or_else(String::new, |author| author.display_name().to_owned())
}

/// Flattens the thread so that replies follow their comment, indented.
fn rows(comments: &[Comment]) -> Vec<Row> {
    comments
        .iter()
        .flat_map(|comment| {
            let replies = comment.replies.iter().map(|reply| Row {
                id: format!("  {}", reply.id),
                author: author(reply.user.as_ref()),
                text: format!("↳ {}", reply.text),
            });
            std::iter::once(Row {
                id: comment.id.clone(),
                author: author(comment.user.as_ref()),
                text: comment.text.clone(),
            })
            .chain(replies)
        })
        .collect()
}

const MAX_COMMENT_CHARS: usize = 1000;

/// Comments and replies share the web form's limits.
fn require_text(text: &str) -> Result<&str> {
    let text = text.trim();
    if text.is_empty() {
        Err(Error::Validation("Comment text is required".to_owned()))
    } else if text.chars().count() > MAX_COMMENT_CHARS {
        Err(Error::Validation(format!(
            "Comments must be at most {MAX_COMMENT_CHARS} characters"
        )))
    } else {
        Ok(text)
    }
}

#[async_trait]
impl super::Command for Command {
    fn access(&self) -> Access {
        match self {
            Self::List(_) => Access::Public,
            Self::Add(_) | Self::Reply(_) | Self::Delete(_) => Access::Protected,
        }
    }

    async fn execute(self, cx: &Context) -> Result<()> {
        match self {
            Self::List(args) => {
                let envelope = cx
                    .checked(cx.gateway().blog_comments(&args.blog_id).await)
                    .await?;
                if envelope.payload.comments.is_empty() {
                    println!("No comments yet");
                } else {
                    println!(
                        "{}",
                        Table::new(rows(&envelope.payload.comments)).with(Style::rounded())
                    );
                }
                Ok(())
            }
            Self::Add(args) => {
                let text = require_text(&args.text)?;
                let envelope = cx
                    .checked(cx.gateway().add_comment(&args.blog_id, text).await)
                    .await?;
                if let Some(comment) = envelope.payload.comment {
                    println!("Commented as {}", comment.id);
                }
                Ok(())
            }
            Self::Reply(args) => {
                let text = require_text(&args.text)?;
                let envelope = cx
                    .checked(cx.gateway().reply_to_comment(&args.comment_id, text).await)
                    .await?;
                if let Some(reply) = envelope.payload.reply {
                    println!("Replied as {}", reply.id);
                }
                Ok(())
            }
            Self::Delete(args) => {
                let envelope = cx
                    .checked(cx.gateway().delete_comment(&args.comment_id).await)
                    .await?;
                println!(
                    "{}",
                    envelope.message.unwrap_or_else(|| "Comment deleted".to_owned())
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Reply as ModelReply, User};

    use super::*;

    #[test]
    fn replies_follow_their_comment() {
        let comments = vec![
            Comment {
                id: "c1".to_owned(),
                text: "First".to_owned(),
                user: Some(Author::Profile(User {
                    id: "u1".to_owned(),
                    name: Some("A".to_owned()),
                    ..User::default()
                })),
                created_at: None,
                replies: vec![ModelReply {
                    id: "r1".to_owned(),
                    text: "Agreed".to_owned(),
                    user: Some(Author::Reference("u2".to_owned())),
                    created_at: None,
                }],
            },
            Comment {
                id: "c2".to_owned(),
                text: "Second".to_owned(),
                user: None,
                created_at: None,
                replies: Vec::new(),
            },
        ];

        let rows = rows(&comments);

        assert_eq!(
            rows.iter()
                .map(|row| (row.id.as_str(), row.author.as_str(), row.text.as_str()))
                .collect::<Vec<_>>(),
            vec![
                ("c1", "A", "First"),
                ("  r1", "u2", "↳ Agreed"),
                ("c2", "", "Second"),
            ]
        );
    }

    #[test]
    fn blank_comments_are_refused() {
        assert!(matches!(require_text("   "), Err(Error::Validation(_))));
        assert!(matches!(require_text(" hi "), Ok("hi")));
    }

    #[test]
    fn long_comments_are_refused() {
        let longest = "é".repeat(MAX_COMMENT_CHARS);
        assert!(matches!(require_text(&longest), Ok(text) if text == longest));
        assert!(matches!(
            require_text(&format!("{longest}!")),
            Err(Error::Validation(_))
        ));
    }
}
