use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::{info, warn};

use crate::error::Result;
use crate::models::User;

/// Token and profile kept between runs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Which top-level screen the app opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Main,
}

impl Route {
    pub fn for_session(session: Option<&Session>) -> Self {
        match session {
            Some(session) if !session.token.trim().is_empty() => Route::Main,
            _ => Route::Login,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing or unreadable file means "logged out", never an error.
    pub fn load(&self) -> Option<Session> {
        if !self.path.exists() {
            return None;
        }
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read session file");
                return None;
            }
        };
        match serde_json::from_str::<Session>(&data) {
            Ok(session) if !session.token.trim().is_empty() => Some(session),
            Ok(_) => None,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring corrupt session file");
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        info!(user = %session.user.email, "session stored");
        Ok(())
    }

    /// Refresh the cached profile (e.g. after a coin balance refetch) keeping the token.
    pub fn update_user(&self, user: &User) -> Result<()> {
        if let Some(mut session) = self.load() {
            session.user = user.clone();
            fs::write(&self.path, serde_json::to_string_pretty(&session)?)?;
        }
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            info!("session cleared");
        }
        Ok(())
    }
}
