// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Args;
use log::error;
use tabled::{settings::Style, Table};

use crate::{
    error::{Error, Result},
    share::{self, Network},
};

use super::{Access, Context};

/// Like a post, or take back an earlier like.
#[derive(Debug, Args)]
pub(crate) struct Like {
    blog_id: String,
}

#[async_trait]
impl super::Command for Like {
    fn access(&self) -> Access {
        Access::Protected
    }

    async fn execute(self, cx: &Context) -> Result<()> {
        let envelope = cx
            .checked(cx.gateway().toggle_like(&self.blog_id).await)
            .await?;
        let payload = envelope.payload;
        println!(
            "{} ({} likes)",
            if payload.liked { "Liked" } else { "Like removed" },
            payload.likes_count
        );
        Ok(())
    }
}

/// Record a share of a post and print links for passing it on.
#[derive(Debug, Args)]
pub(crate) struct Share {
    blog_id: String,

    /// A note to attach to the share.
    #[arg(long, short)]
    message: Option<String>,

    /// Print only the link for this network.
    #[arg(long, short, value_enum)]
    network: Option<Network>,

    /// Print the links without recording a share.
    #[arg(long)]
    links_only: bool,
}

impl Share {
    async fn print_links(&self, cx: &Context) -> Result<()> {
        let blog = cx
            .checked(cx.gateway().get_blog(&self.blog_id).await)
            .await?
            .payload
            .blog
            .ok_or_else(|| {
                error!("No post with ID {}", self.blog_id);
                Error::Command
            })?;

        match self.network {
            Some(network) => {
                let page = share::page(&cx.site, &blog.id)?;
                println!("{}", network.intent(&page, &blog.title)?);
            }
            None => println!(
                "{}",
                Table::new(share::links(&cx.site, &blog)?).with(Style::rounded())
            ),
        }
        Ok(())
    }
}

#[async_trait]
impl super::Command for Share {
    fn access(&self) -> Access {
        if self.links_only {
            Access::Public
        } else {
            Access::Protected
        }
    }

    async fn execute(self, cx: &Context) -> Result<()> {
        if !self.links_only {
            let envelope = cx
                .checked(
                    cx.gateway()
                        .share_blog(&self.blog_id, self.message.as_deref())
                        .await,
                )
                .await?;
            println!("Shared ({} shares)", envelope.payload.shares_count);
        }
        self.print_links(cx).await
    }
}
