use std::sync::Arc;

use shared::{
    domain::ConferenceId,
    preferences::{PreferenceMutation, Theme, UserPreferences, ViewMode, PREFERENCES_KEY},
};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::local_store::LocalStore;

/// Holds the user's preferences and writes every change through to a
/// [`LocalStore`].
///
/// The in-memory snapshot is authoritative for the session: a failed write is
/// logged and remembered, never surfaced as an error to the caller.
pub struct PreferenceStore {
    store: Arc<dyn LocalStore>,
    key: String,
    current: watch::Sender<UserPreferences>,
    persist_error: Option<String>,
}

impl PreferenceStore {
    pub fn open(store: Arc<dyn LocalStore>) -> Self {
        Self::open_with_key(store, PREFERENCES_KEY)
    }

    pub fn open_with_key(store: Arc<dyn LocalStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let initial = match store.get_item(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<UserPreferences>(&raw) {
                Ok(preferences) => preferences,
                Err(error) => {
                    warn!(%key, %error, "stored preferences are malformed; using defaults");
                    UserPreferences::default()
                }
            },
            Ok(None) => {
                info!(%key, "no stored preferences; using defaults");
                UserPreferences::default()
            }
            Err(error) => {
                warn!(%key, %error, "failed to read stored preferences; using defaults");
                UserPreferences::default()
            }
        };

        let (current, _) = watch::channel(initial);
        Self {
            store,
            key,
            current,
            persist_error: None,
        }
    }

    pub fn snapshot(&self) -> UserPreferences {
        self.current.borrow().clone()
    }

    /// Receives every snapshot produced by later mutations.
    pub fn subscribe(&self) -> watch::Receiver<UserPreferences> {
        self.current.subscribe()
    }

    /// Message of the most recent failed write, cleared by the next success.
    pub fn persist_error(&self) -> Option<&str> {
        self.persist_error.as_deref()
    }

    pub fn apply(&mut self, mutation: PreferenceMutation) -> UserPreferences {
        let next = self.current.borrow().apply(&mutation);
        self.current.send_replace(next.clone());
        self.persist(&next);
        next
    }

    pub fn set_theme(&mut self, theme: Theme) -> UserPreferences {
        self.apply(PreferenceMutation::SetTheme(theme))
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) -> UserPreferences {
        self.apply(PreferenceMutation::SetViewMode(view_mode))
    }

    pub fn toggle_favorite(&mut self, id: impl Into<ConferenceId>) -> UserPreferences {
        self.apply(PreferenceMutation::ToggleFavorite(id.into()))
    }

    pub fn reset(&mut self) -> UserPreferences {
        self.apply(PreferenceMutation::Reset)
    }

    fn persist(&mut self, preferences: &UserPreferences) {
        let result = serde_json::to_string(preferences)
            .map_err(Into::into)
            .and_then(|raw| self.store.set_item(&self.key, &raw));

        match result {
            Ok(()) => self.persist_error = None,
            Err(error) => {
                warn!(
                    key = %self.key,
                    %error,
                    "failed to persist preferences; keeping in-memory value"
                );
                self.persist_error = Some(error.to_string());
            }
        }
    }
}
