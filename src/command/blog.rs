// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::num::NonZeroU32;

use async_trait::async_trait;
use clap::{Args, Subcommand};
use log::error;
use tabled::{settings::Style, Table};

use crate::{
    error::{Error, Result},
    gateway::Listing,
    model::{Blog, BlogDraft, Pagination},
};

use super::{Access, Context};

/// Read and write blog posts.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List posts, newest first.
    List(List),
    /// List every post without pagination.
    All,
    /// Show a single post.
    Show(Id),
    /// List the posts of a particular author.
    ByUser(ByUser),
    /// List the posts of the logged-in user.
    Mine,
    /// Publish a new post.
    Create(Create),
    /// Edit a post. Fields that are not given keep their current value.
    Update(Update),
    /// Delete a post.
    Delete(Id),
}

#[derive(Debug, Args)]
pub(crate) struct List {
    #[arg(long, short, default_value = "1")]
    page: NonZeroU32,

    /// The number of posts per page.
    #[arg(long, short, default_value = "10")]
    limit: NonZeroU32,

    /// Only list posts matching this text.
    #[arg(long, short)]
    search: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct Id {
    id: String,
}

#[derive(Debug, Args)]
pub(crate) struct ByUser {
    user_id: String,
}

#[derive(Debug, Args)]
pub(crate) struct Create {
    #[arg(long, short)]
    title: String,

    #[arg(long, short)]
    description: String,

    /// URL of a cover image.
    #[arg(long, short)]
    image: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct Update {
    id: String,

    #[arg(long, short)]
    title: Option<String>,

    #[arg(long, short)]
    description: Option<String>,

    #[arg(long, short)]
    image: Option<String>,
}

fn print_blogs(blogs: &[Blog]) {
    if blogs.is_empty() {
        println!("No posts found");
    } else {
        println!("{}", Table::new(blogs).with(Style::rounded()));
    }
}

fn print_pagination(pagination: &Pagination) {
    println!(
        "Page {} of {} ({} posts)",
        pagination.current_page, pagination.total_pages, pagination.total_blogs
    );
}

fn print_blog(blog: &Blog, viewer: Option<&str>) {
    println!("{}", blog.title);
    if let Some(author) = &blog.user {
        let you = if viewer == Some(author.id()) { " (you)" } else { "" };
        println!("by {}{}", author.display_name(), you);
    }
    if let Some(created_at) = &blog.created_at {
        println!("{created_at}");
    }
    println!();
    println!("{}", blog.description);
    if let Some(image) = &blog.image {
        println!();
        println!("Image: {image}");
    }
    println!();
    let liked = match viewer {
        Some(user_id) if blog.is_liked_by(user_id) => " (including you)",
        Some(_) | None => "",
    };
    println!(
        "{} likes{}, {} comments, {} shares",
        blog.likes.len(),
        liked,
        blog.comments_count,
        blog.shares_count
    );
}

/// Builds the edited draft, keeping the fields of `current` that `args`
/// does not replace.
fn edited(current: Blog, args: Update) -> BlogDraft {
    BlogDraft {
        title: args.title.unwrap_or(current.title),
        description: args.description.unwrap_or(current.description),
        image: args.image.or(current.image),
        user: None,
    }
}

async fn fetch(cx: &Context, id: &str) -> Result<Blog> {
    cx.checked(cx.gateway().get_blog(id).await)
        .await?
        .payload
        .blog
        .ok_or_else(|| {
            error!("No post with ID {}", id);
            Error::Command
        })
}

#[async_trait]
impl super::Command for Command {
    fn access(&self) -> Access {
        match self {
            Self::Mine | Self::Create(_) | Self::Update(_) | Self::Delete(_) => Access::Protected,
            Self::List(_) | Self::All | Self::Show(_) | Self::ByUser(_) => Access::Public,
        }
    }

    async fn execute(self, cx: &Context) -> Result<()> {
        match self {
            Self::List(args) => {
                let listing = Listing {
                    page: args.page,
                    limit: args.limit,
                    search: args.search,
                };
                let envelope = cx.checked(cx.gateway().list_blogs(&listing).await).await?;
                print_blogs(&envelope.payload.blogs);
                if let Some(pagination) = &envelope.payload.pagination {
                    print_pagination(pagination);
                }
                Ok(())
            }
            Self::All => {
                let envelope = cx.checked(cx.gateway().list_blogs_simple().await).await?;
                print_blogs(&envelope.payload.blogs);
                Ok(())
            }
            Self::Show(args) => {
                let blog = fetch(cx, &args.id).await?;
                let viewer = cx.user().ok();
                print_blog(&blog, viewer.as_ref().map(|user| user.id.as_str()));
                Ok(())
            }
            Self::ByUser(args) => {
                let envelope = cx
                    .checked(cx.gateway().user_blogs(&args.user_id).await)
                    .await?;
                print_blogs(&envelope.payload.blogs);
                Ok(())
            }
            Self::Mine => {
                let user = cx.user()?;
                let envelope = cx.checked(cx.gateway().user_blogs(&user.id).await).await?;
                print_blogs(&envelope.payload.blogs);
                Ok(())
            }
            Self::Create(args) => {
                let user = cx.user()?;
                let draft = BlogDraft {
                    title: args.title,
                    description: args.description,
                    image: args.image,
                    user: Some(user.id),
                }
                .validated()?;
                let envelope = cx.checked(cx.gateway().create_blog(&draft).await).await?;
                match envelope.payload.blog {
                    Some(blog) => println!("Published {}", blog.id),
                    None => println!("{}", envelope.message.unwrap_or_default()),
                }
                Ok(())
            }
            Self::Update(args) => {
                let current = fetch(cx, &args.id).await?;
                let id = args.id.clone();
                let draft = edited(current, args).validated()?;
                let envelope = cx
                    .checked(cx.gateway().update_blog(&id, &draft).await)
                    .await?;
                println!(
                    "{}",
                    envelope.message.unwrap_or_else(|| format!("Updated {id}"))
                );
                Ok(())
            }
            Self::Delete(args) => {
                let envelope = cx
                    .checked(cx.gateway().delete_blog(&args.id).await)
                    .await?;
                println!(
                    "{}",
                    envelope
                        .message
                        .unwrap_or_else(|| format!("Deleted {}", args.id))
                );
                Ok(())
            }
        }
    }
}
