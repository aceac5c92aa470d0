//! Session capabilities injected into the API client and board session.
//!
//! The token lives behind [`TokenProvider`] instead of ambient global
//! storage, and destructive actions ask a [`Confirm`] capability first.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

/// Errors that can occur while persisting the session token.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to write the token file.
    #[error("failed to write token file {path}: {source}")]
    WriteToken {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to read the token file.
    #[error("failed to read token file {path}: {source}")]
    ReadToken {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Source of the bearer token attached to API requests.
pub trait TokenProvider: Send + Sync {
    /// Current token, if signed in.
    fn token(&self) -> Option<String>;

    /// Replaces the token after a successful login.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the token cannot be persisted.
    fn store(&self, token: &str) -> Result<(), SessionError>;

    /// Forgets the token (logout, or the backend rejected it).
    fn clear(&self);
}

/// Token held in memory only.
#[derive(Debug, Default)]
pub struct StaticToken {
    token: Mutex<Option<String>>,
}

impl StaticToken {
    /// Creates a provider holding `token`.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Mutex::new(token),
        }
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    fn store(&self, token: &str) -> Result<(), SessionError> {
        *self.token.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) {
        self.token.lock().take();
    }
}

/// Token persisted in a file so sessions survive restarts.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    cached: Mutex<Option<String>>,
}

impl FileTokenStore {
    /// Opens the store at `path`, reading an existing token if present.
    ///
    /// A missing file means "signed out", not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ReadToken`] if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let cached = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(source) => return Err(SessionError::ReadToken { path, source }),
        };
        Ok(Self {
            path,
            cached: Mutex::new(cached),
        })
    }

    /// Default token location: `~/.config/taskboard/token`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("taskboard").join("token"))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenProvider for FileTokenStore {
    fn token(&self) -> Option<String> {
        self.cached.lock().clone()
    }

    fn store(&self, token: &str) -> Result<(), SessionError> {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&self.path, token)
        };
        write().map_err(|source| SessionError::WriteToken {
            path: self.path.clone(),
            source,
        })?;
        *self.cached.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) {
        self.cached.lock().take();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "failed to remove token file"),
        }
    }
}

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    /// Returns `true` to proceed.
    fn confirm(&self, prompt: &str) -> bool;
}

/// An answer the UI already collected from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer(pub bool);

impl Confirm for Answer {
    fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!(prompt, answer = self.0, "confirmation");
        self.0
    }
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}
