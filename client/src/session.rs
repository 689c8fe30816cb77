// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::storage::LocalStorage;

use anyhow::Result;
use tracing::info;

/// Local storage key holding the bearer token.
pub const TOKEN_KEY: &str = "access_token";

/// Session lifecycle: the bearer token, kept in memory and in local storage.
///
/// Both copies are only ever changed together through [`Session::login`] and
/// [`Session::logout`]. On login storage is written first, so a failed write
/// leaves the in-memory token untouched.
#[derive(Debug)]
pub struct Session {
    token: Option<String>,
    storage: LocalStorage,
}

impl Session {
    /// Starts an anonymous session without reading storage.
    pub fn anonymous(storage: LocalStorage) -> Self {
        Self {
            token: None,
            storage,
        }
    }

    /// Resumes the session persisted by a previous run, if any.
    pub async fn restore(storage: LocalStorage) -> Result<Self> {
        let token = storage
            .get_item(TOKEN_KEY)
            .await?
            .filter(|token| !token.trim().is_empty());

        if token.is_some() {
            info!("Restored a persisted session token.");
        }

        Ok(Self { token, storage })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Replaces the session token. An empty token logs out.
    pub async fn login(&mut self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return self.logout().await;
        }

        self.storage.set_item(TOKEN_KEY, token).await?;
        self.token = Some(token.to_string());
        info!("Session token updated.");
        Ok(())
    }

    /// Forgets the session token, both in memory and in storage.
    ///
    /// The in-memory token is dropped even when storage cannot be updated;
    /// the storage error is still returned.
    pub async fn logout(&mut self) -> Result<()> {
        let removed = self.storage.remove_item(TOKEN_KEY).await;
        if self.token.take().is_some() {
            info!("Session token cleared.");
        }
        removed.map(|_| ())
    }
}
