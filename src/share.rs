// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! Links for sharing a post outside the blog.

use clap::ValueEnum;
use tabled::Tabled;
use url::Url;

use crate::{error::Result, model::Blog};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Network {
    Facebook,
    Twitter,
    #[value(name = "linkedin")]
    LinkedIn,
    #[value(name = "whatsapp")]
    WhatsApp,
    Telegram,
}

impl Network {
    pub(crate) const ALL: [Self; 5] = [
        Self::Facebook,
        Self::Twitter,
        Self::LinkedIn,
        Self::WhatsApp,
        Self::Telegram,
    ];

    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::Facebook => "Facebook",
            Self::Twitter => "Twitter",
            Self::LinkedIn => "LinkedIn",
            Self::WhatsApp => "WhatsApp",
            Self::Telegram => "Telegram",
        }
    }

    /// The share-intent URL for `page` with `title` as the accompanying text.
    pub(crate) fn intent(self, page: &Url, title: &str) -> Result<Url> {
        let page = page.as_str();
        let (base, params): (&str, Vec<(&str, String)>) = match self {
            Self::Facebook => (
                "https://www.facebook.com/sharer/sharer.php",
                vec![("u", page.to_owned())],
            ),
            Self::Twitter => (
                "https://twitter.com/intent/tweet",
                vec![("url", page.to_owned()), ("text", title.to_owned())],
            ),
            Self::LinkedIn => (
                "https://www.linkedin.com/sharing/share-offsite/",
                vec![("url", page.to_owned())],
            ),
            Self::WhatsApp => ("https://wa.me/", vec![("text", format!("{title} {page}"))]),
            Self::Telegram => (
                "https://t.me/share/url",
                vec![("url", page.to_owned()), ("text", title.to_owned())],
            ),
        };
        Ok(Url::parse_with_params(base, params)?)
    }
}

#[derive(Debug, Tabled)]
pub(crate) struct Link {
    #[tabled(rename = "Network")]
    pub(crate) network: &'static str,
    #[tabled(rename = "URL")]
    pub(crate) url: Url,
}

/// The public address of `blog` below `site`.
pub(crate) fn page(site: &Url, blog_id: &str) -> Result<Url> {
    let mut url = site.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
        let _ = segments.pop_if_empty().extend(["blogs", blog_id]);
    }
    Ok(url)
}

pub(crate) fn links(site: &Url, blog: &Blog) -> Result<Vec<Link>> {
    let page = page(site, &blog.id)?;
    let mut links = vec![Link {
        network: "Direct",
        url: page.clone(),
    }];
    for network in Network::ALL {
        links.push(Link {
            network: network.name(),
            url: network.intent(&page, &blog.title)?,
        });
    }
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blog() -> Blog {
        Blog {
            id: "b1".to_owned(),
            title: "Rust & Tokio".to_owned(),
            ..Blog::default()
        }
    }

    #[test]
    fn page_sits_below_the_site_root() -> Result<()> {
        let site = Url::parse("https://quire.example/")?;
        assert_eq!(page(&site, "b1")?.as_str(), "https://quire.example/blogs/b1");

        let nested = Url::parse("https://example.com/app")?;
        assert_eq!(
            page(&nested, "b1")?.as_str(),
            "https://example.com/app/blogs/b1"
        );
        Ok(())
    }

    #[test]
    fn intents_encode_page_and_title() -> Result<()> {
        let site = Url::parse("http://localhost:3000")?;
        let links = links(&site, &blog())?;

        let urls = links
            .iter()
            .map(|link| (link.network, link.url.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            urls,
            vec![
                ("Direct", "http://localhost:3000/blogs/b1"),
                (
                    "Facebook",
                    "https://www.facebook.com/sharer/sharer.php?u=http%3A%2F%2Flocalhost%3A3000%2Fblogs%2Fb1"
                ),
                (
                    "Twitter",
                    "https://twitter.com/intent/tweet?url=http%3A%2F%2Flocalhost%3A3000%2Fblogs%2Fb1&text=Rust+%26+Tokio"
                ),
                (
                    "LinkedIn",
                    "https://www.linkedin.com/sharing/share-offsite/?url=http%3A%2F%2Flocalhost%3A3000%2Fblogs%2Fb1"
                ),
                (
                    "WhatsApp",
                    "https://wa.me/?text=Rust+%26+Tokio+http%3A%2F%2Flocalhost%3A3000%2Fblogs%2Fb1"
                ),
                (
                    "Telegram",
                    "https://t.me/share/url?url=http%3A%2F%2Flocalhost%3A3000%2Fblogs%2Fb1&text=Rust+%26+Tokio"
                ),
            ]
        );
        Ok(())
    }
}
