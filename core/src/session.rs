//! The student's remembered nickname and the review-ownership rule built on it.
//!
//! # Design
//! There is no authentication: a review "belongs" to whoever's stored
//! nickname matches the review's author, ignoring case. The nickname lives
//! behind `NicknameStore`: memory in tests, a one-line file otherwise.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;

use crate::client::RequestOptions;
use crate::config::ClientConfig;
use crate::types::Review;

/// Header the backend reads to decide review ownership.
pub const NICKNAME_HEADER: &str = "x-student-nickname";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("nickname storage failed: {0}")]
    Io(#[from] io::Error),
    #[error("nickname storage lock poisoned")]
    Poisoned,
}

pub trait NicknameStore {
    fn load(&self) -> Result<Option<String>, SessionError>;
    fn save(&self, nickname: &str) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

#[derive(Debug, Default)]
pub struct MemoryNicknameStore {
    nickname: RwLock<Option<String>>,
}

impl MemoryNicknameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nickname(nickname: &str) -> Self {
        Self {
            nickname: RwLock::new(Some(nickname.to_string())),
        }
    }
}

impl NicknameStore for MemoryNicknameStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let guard = self.nickname.read().map_err(|_| SessionError::Poisoned)?;
        Ok(guard.clone())
    }

    fn save(&self, nickname: &str) -> Result<(), SessionError> {
        let mut guard = self.nickname.write().map_err(|_| SessionError::Poisoned)?;
        *guard = Some(nickname.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut guard = self.nickname.write().map_err(|_| SessionError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

/// Keeps the nickname as the single line of a file.
#[derive(Debug, Clone)]
pub struct FileNicknameStore {
    path: PathBuf,
}

impl FileNicknameStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NicknameStore for FileNicknameStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents.trim().to_string()).filter(|n| !n.is_empty())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, nickname: &str) -> Result<(), SessionError> {
        fs::write(&self.path, format!("{}\n", nickname.trim()))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Explicit session passed to the review service.
#[derive(Debug)]
pub struct StudentSession<S> {
    store: S,
}

impl<S: NicknameStore> StudentSession<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The remembered nickname; unreadable storage counts as none.
    pub fn nickname(&self) -> Option<String> {
        match self.store.load() {
            Ok(nickname) => nickname
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            Err(e) => {
                log::warn!("Could not read stored nickname: {e}");
                None
            }
        }
    }

    pub fn remember(&self, nickname: &str) -> Result<(), SessionError> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return self.store.clear();
        }
        self.store.save(nickname)
    }

    pub fn forget(&self) -> Result<(), SessionError> {
        self.store.clear()
    }

    /// Whether the current student may edit or delete `review`.
    pub fn can_modify(&self, review: &Review) -> bool {
        let author = review.student_nickname.trim();
        match self.nickname() {
            Some(current) if !author.is_empty() => author.to_lowercase() == current.to_lowercase(),
            _ => false,
        }
    }

    /// Request options carrying the ownership header, when a nickname is known.
    pub fn ownership_options(&self) -> RequestOptions {
        match self.nickname() {
            Some(nickname) => RequestOptions::new().header(NICKNAME_HEADER, nickname),
            None => RequestOptions::new(),
        }
    }
}

impl StudentSession<FileNicknameStore> {
    /// Session backed by the nickname file named in `config`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(FileNicknameStore::new(&config.nickname_file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_by(author: &str) -> Review {
        Review {
            id: 1,
            quiz_id: 2,
            quiz_title: None,
            student_nickname: author.to_string(),
            rating: 4,
            review_text: "Solid coverage of traits".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn ownership_ignores_case() {
        let session = StudentSession::new(MemoryNicknameStore::with_nickname("Ada"));
        assert!(session.can_modify(&review_by("ada")));
        assert!(session.can_modify(&review_by("ADA ")));
        assert!(!session.can_modify(&review_by("grace")));
    }

    #[test]
    fn no_nickname_means_no_ownership() {
        let session = StudentSession::new(MemoryNicknameStore::new());
        assert!(!session.can_modify(&review_by("ada")));
        assert!(session.ownership_options().headers.is_empty());
    }

    #[test]
    fn blank_author_is_never_owned() {
        let session = StudentSession::new(MemoryNicknameStore::with_nickname("ada"));
        assert!(!session.can_modify(&review_by("  ")));
    }

    #[test]
    fn ownership_header_uses_stored_nickname() {
        let session = StudentSession::new(MemoryNicknameStore::new());
        session.remember("  grace ").unwrap();
        assert_eq!(session.nickname().as_deref(), Some("grace"));
        assert_eq!(
            session.ownership_options().headers,
            vec![(NICKNAME_HEADER.to_string(), "grace".to_string())]
        );
    }

    #[test]
    fn remembering_blank_clears() {
        let session = StudentSession::new(MemoryNicknameStore::with_nickname("ada"));
        session.remember("   ").unwrap();
        assert!(session.nickname().is_none());
    }

    #[test]
    fn file_store_round_trip() {
        let path = std::env::temp_dir().join(format!("quiz-nickname-{}", uuid::Uuid::new_v4()));
        let store = FileNicknameStore::new(&path);
        assert_eq!(store.load().unwrap(), None);

        store.save("linus").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("linus"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn session_from_config_uses_nickname_file() {
        let path = std::env::temp_dir().join(format!("quiz-nickname-{}", uuid::Uuid::new_v4()));
        let config = ClientConfig {
            nickname_file: path.clone(),
            ..ClientConfig::default()
        };
        let session = StudentSession::from_config(&config);
        session.remember("Ada").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Ada\n");
        session.forget().unwrap();
        assert!(!path.exists());
    }
}
