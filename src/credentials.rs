// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use log::{debug, warn};

use crate::{
    error::Result,
    model::{Token, User},
    storage::{IsPersistent, Storage},
};

/// The on-disk (or in-keyring) counterpart of the session: one slot for the
/// bearer token and one for the user profile.
pub(crate) struct Credentials {
    token: Box<dyn Storage<Token>>,
    user: Box<dyn Storage<User>>,
}

impl Credentials {
    pub(crate) fn new(token: Box<dyn Storage<Token>>, user: Box<dyn Storage<User>>) -> Self {
        Self { token, user }
    }

    pub(crate) async fn token(&mut self) -> Result<Option<Token>> {
        self.token.get().await
    }

    pub(crate) async fn user(&mut self) -> Result<Option<User>> {
        self.user.get().await
    }

    /// Writes both slots. If the profile cannot be written the token slot
    /// gets its previous value back, so the record keeps the pair it held
    /// before the call.
    pub(crate) async fn store(&mut self, token: &Token, user: &User) -> Result<()> {
        let previous = self.token.get().await?;
        self.token.update(token).await?;
        if let Err(err) = self.user.update(user).await {
            let restored = match &previous {
                Some(previous) => self.token.update(previous).await,
                None => self.token.clear().await,
            };
            if let Err(rollback) = restored {
                warn!("Could not restore the previous token: {}", rollback);
            }
            return Err(err);
        }
        debug!("Stored credentials for user {}", user.id);
        Ok(())
    }

    /// Whether the record holds exactly `token` and `user`, or nothing at
    /// all when `token` is `None`. Unreadable slots never match.
    pub(crate) async fn holds(&mut self, token: Option<&Token>, user: Option<&User>) -> bool {
        match (self.token().await, token) {
            (Ok(None), None) => true,
            (Ok(Some(stored)), Some(token)) if &stored == token => {
                matches!(self.user().await, Ok(stored) if stored.as_ref() == user)
            }
            _ => false,
        }
    }

    pub(crate) async fn store_user(&mut self, user: &User) -> Result<()> {
        self.user.update(user).await
    }

    /// Empties both slots, attempting the second even if the first fails.
    pub(crate) async fn clear(&mut self) -> Result<()> {
        let token = self.token.clear().await;
        let user = self.user.clear().await;
        token.and(user)
    }
}

impl IsPersistent for Credentials {
    fn is_persistent(&self) -> bool {
        self.token.is_persistent() && self.user.is_persistent()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::{error::Error, storage::Memory};

    use super::*;

    struct Broken;

    impl IsPersistent for Broken {
        fn is_persistent(&self) -> bool {
            true
        }
    }

    #[async_trait]
    impl Storage<User> for Broken {
        async fn get(&mut self) -> Result<Option<User>> {
            Ok(None)
        }

        async fn update(&mut self, _: &User) -> Result<()> {
            Err(Error::Io(std::io::Error::other("disk full")))
        }

        async fn clear(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn user() -> User {
        User {
            id: "u1".to_owned(),
            ..User::default()
        }
    }

    #[tokio::test]
    async fn store_then_clear() -> Result<()> {
        let mut credentials = Credentials::new(Box::new(Memory::new()), Box::new(Memory::new()));

        credentials.store(&Token::new("T1"), &user()).await?;
        assert_eq!(credentials.token().await?, Some(Token::new("T1")));
        assert_eq!(credentials.user().await?, Some(user()));

        credentials.clear().await?;
        assert_eq!(credentials.token().await?, None);
        assert_eq!(credentials.user().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn failed_profile_write_keeps_an_empty_record_empty() -> Result<()> {
        let mut credentials = Credentials::new(Box::new(Memory::new()), Box::new(Broken));

        assert!(credentials.store(&Token::new("T1"), &user()).await.is_err());
        assert_eq!(credentials.token().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn failed_profile_write_restores_previous_token() -> Result<()> {
        let mut credentials =
            Credentials::new(Box::new(Memory::with(Token::new("T1"))), Box::new(Broken));

        assert!(credentials.store(&Token::new("T2"), &user()).await.is_err());
        assert_eq!(credentials.token().await?, Some(Token::new("T1")));
        Ok(())
    }

    #[tokio::test]
    async fn holds_compares_both_slots() -> Result<()> {
        let mut credentials = Credentials::new(Box::new(Memory::new()), Box::new(Memory::new()));
        assert!(credentials.holds(None, None).await);

        credentials.store(&Token::new("T1"), &user()).await?;

        assert!(credentials.holds(Some(&Token::new("T1")), Some(&user())).await);
        assert!(!credentials.holds(Some(&Token::new("T2")), Some(&user())).await);
        assert!(!credentials.holds(Some(&Token::new("T1")), None).await);
        assert!(!credentials.holds(None, None).await);
        Ok(())
    }

    #[test]
    fn memory_slots_are_not_persistent() {
        let credentials = Credentials::new(Box::new(Memory::new()), Box::new(Memory::new()));
        assert!(!credentials.is_persistent());
    }
}
