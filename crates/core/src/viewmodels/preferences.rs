use futures::stream::BoxStream;

use crate::errors::CoreError;
use crate::storage::preferences_store::PreferencesStore;

/// App-wide theme switch.
pub struct PreferencesViewModel {
    preferences: PreferencesStore,
}

impl PreferencesViewModel {
    pub fn new(preferences: PreferencesStore) -> Self {
        Self { preferences }
    }

    pub fn is_dark_theme(&self) -> bool {
        self.preferences.user_preferences().is_dark_theme
    }

    pub fn dark_theme(&self) -> BoxStream<'static, bool> {
        self.preferences.dark_theme()
    }

    pub fn toggle_theme(&self) -> Result<bool, CoreError> {
        let next = !self.is_dark_theme();
        self.preferences.set_dark_theme(next)?;
        Ok(next)
    }

    pub fn set_dark_theme(&self, is_dark_theme: bool) -> Result<(), CoreError> {
        self.preferences.set_dark_theme(is_dark_theme)
    }
}
