// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tabled::Tabled;

use crate::error::{Error, Result};

const MAX_TITLE_CHARS: usize = 200;
const MAX_DESCRIPTION_CHARS: usize = 500;

/// Opaque bearer credential issued by the blog service.
pub(crate) struct Token(SecretString);

impl Token {
    pub(crate) fn new<S: Into<String>>(value: S) -> Self {
        Self(SecretString::new(value.into()))
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for Token {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token([REDACTED])")
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", try_from = "UserRecord")]
pub(crate) struct User {
    pub(crate) id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) is_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) avatar: Option<String>,
}

/// A user as the service sends it. Auth responses carry `id`, stored
/// documents carry `_id`, and some responses carry both.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    document_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    is_verified: Option<bool>,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
}

impl TryFrom<UserRecord> for User {
    type Error = &'static str;

    fn try_from(record: UserRecord) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: record
                .id
                .or(record.document_id)
                .ok_or("user has neither `id` nor `_id`")?,
            name: record.name,
            email: record.email,
            is_verified: record.is_verified,
            bio: record.bio,
            avatar: record.avatar,
        })
    }
}

impl User {
    /// Overlays every field the server sent back onto the profile we hold.
    pub(crate) fn merge(self, update: Self) -> Self {
        Self {
            id: if update.id.is_empty() { self.id } else { update.id },
            name: update.name.or(self.name),
            email: update.email.or(self.email),
            is_verified: update.is_verified.or(self.is_verified),
            bio: update.bio.or(self.bio),
            avatar: update.avatar.or(self.avatar),
        }
    }

    pub(crate) fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) avatar: Option<String>,
}

impl ProfileUpdate {
    pub(crate) const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.bio.is_none() && self.avatar.is_none()
    }
}

/// Blog authors arrive either populated or as a bare reference.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub(crate) enum Author {
    Profile(User),
    Reference(String),
}

impl Author {
    pub(crate) fn id(&self) -> &str {
        match self {
            Self::Profile(user) => &user.id,
            Self::Reference(id) => id,
        }
    }

    pub(crate) fn display_name(&self) -> &str {
        match self {
            Self::Profile(user) => user.display_name(),
            Self::Reference(id) => id,
        }
    }
}

fn format_author(author: &Option<Author>) -> String {
    author
        .as_ref()
        .map_or_else(String::new, |a| a.display_name().to_owned())
}

fn format_optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Tabled)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Blog {
    #[serde(alias = "_id")]
    #[tabled(rename = "ID")]
    pub(crate) id: String,
    #[tabled(rename = "Title")]
    pub(crate) title: String,
    #[serde(default)]
    #[tabled(skip)]
    pub(crate) description: String,
    #[serde(default)]
    #[tabled(skip)]
    pub(crate) image: Option<String>,
    #[serde(default)]
    #[tabled(rename = "Author", display_with = "format_author")]
    pub(crate) user: Option<Author>,
    #[serde(default)]
    #[tabled(skip)]
    pub(crate) likes: Vec<String>,
    #[serde(default)]
    #[tabled(rename = "Comments")]
    pub(crate) comments_count: u64,
    #[serde(default)]
    #[tabled(rename = "Shares")]
    pub(crate) shares_count: u64,
    #[serde(default)]
    #[tabled(rename = "Created", display_with = "format_optional")]
    pub(crate) created_at: Option<String>,
}

impl Blog {
    pub(crate) fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }
}

/// Fields a user supplies when writing or editing a post.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BlogDraft {
    pub(crate) title: String,
    pub(crate) description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user: Option<String>,
}

impl BlogDraft {
    /// Trims all fields and checks the limits the service enforces.
    pub(crate) fn validated(self) -> Result<Self> {
        let draft = Self {
            title: self.title.trim().to_owned(),
            description: self.description.trim().to_owned(),
            image: self
                .image
                .map(|image| image.trim().to_owned())
                .filter(|image| !image.is_empty()),
            user: self.user,
        };

        if draft.title.is_empty() {
            return Err(Error::Validation("Title is required".to_owned()));
        }
        if draft.description.is_empty() {
            return Err(Error::Validation("Description is required".to_owned()));
        }
        if draft.title.chars().count() > MAX_TITLE_CHARS {
            return Err(Error::Validation(format!(
                "Title must be less than {MAX_TITLE_CHARS} characters"
            )));
        }
        if draft.description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(Error::Validation(format!(
                "Description must be less than {MAX_DESCRIPTION_CHARS} characters"
            )));
        }
        Ok(draft)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Pagination {
    #[serde(default)]
    pub(crate) current_page: u32,
    #[serde(default)]
    pub(crate) total_pages: u32,
    #[serde(default)]
    pub(crate) total_blogs: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Reply {
    #[serde(alias = "_id")]
    pub(crate) id: String,
    pub(crate) text: String,
    #[serde(default)]
    pub(crate) user: Option<Author>,
    #[serde(default)]
    pub(crate) created_at: Option<String>,
}

/// A top-level comment. Replies cannot be replied to.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Comment {
    #[serde(alias = "_id")]
    pub(crate) id: String,
    pub(crate) text: String,
    #[serde(default)]
    pub(crate) user: Option<Author>,
    #[serde(default)]
    pub(crate) created_at: Option<String>,
    #[serde(default)]
    pub(crate) replies: Vec<Reply>,
}
