use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

pub const HISTORY_LIMIT: usize = 10;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("History file I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("History file is not a JSON list of strings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Recently searched cities, most recent first.
///
/// Entries are unique ignoring case; re-adding a city moves it to the front
/// with the casing it was last searched with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHistory {
    entries: Vec<String>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted entries, applying the same rules as `add`.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut history = Self::new();
        let mut ordered: Vec<String> = entries.into_iter().map(|s| s.as_ref().to_string()).collect();
        // Persisted order is newest first; replay oldest first.
        ordered.reverse();
        for city in ordered {
            history.add(&city);
        }
        history
    }

    /// Returns false when the trimmed city is empty.
    pub fn add(&mut self, city: &str) -> bool {
        let city = city.trim();
        if city.is_empty() {
            return false;
        }

        let lowered = city.to_lowercase();
        self.entries.retain(|existing| existing.to_lowercase() != lowered);
        self.entries.insert(0, city.to_string());
        self.entries.truncate(HISTORY_LIMIT);
        true
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries containing `query`, ignoring case.
    pub fn matching<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a String> + 'a {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(move |entry| entry.to_lowercase().contains(&query))
    }
}

/// Persistence slot for the search history.
pub trait HistoryStore: Send + Sync {
    fn load(&self) -> Result<SearchHistory, HistoryError>;
    fn save(&self, history: &SearchHistory) -> Result<(), HistoryError>;
}

/// Stores the history as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Result<SearchHistory, HistoryError> {
        if !self.path.exists() {
            return Ok(SearchHistory::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if contents.trim().is_empty() {
            return Ok(SearchHistory::new());
        }

        let entries: Vec<String> = serde_json::from_str(&contents)?;
        Ok(SearchHistory::from_entries(entries))
    }

    fn save(&self, history: &SearchHistory) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let json = serde_json::to_string(history.entries())?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }
}

/// In-process store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<String>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<SearchHistory, HistoryError> {
        Ok(SearchHistory::from_entries(self.snapshot()))
    }

    fn save(&self, history: &SearchHistory) -> Result<(), HistoryError> {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        *entries = history.entries().to_vec();
        Ok(())
    }
}
