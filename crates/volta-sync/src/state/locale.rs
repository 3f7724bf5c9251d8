//! # Locale State
//!
//! The process-wide display language. Every localized label and the
//! front end read it from here.

use tokio::sync::watch;
use tracing::info;
use volta_core::Language;

use super::Guarded;

#[derive(Debug)]
pub struct LocaleState {
    language: Guarded<Language>,
}

impl LocaleState {
    pub fn new(initial: Language) -> Self {
        LocaleState {
            language: Guarded::new(initial),
        }
    }

    pub fn get(&self) -> Language {
        self.language.read(|lang| *lang)
    }

    pub fn set(&self, lang: Language) {
        self.language.write(|current| *current = lang);
        info!(language = lang.code(), "Language set");
    }

    /// Switches between English and Bengali, returning the new language.
    pub fn toggle(&self) -> Language {
        let lang = self.language.write(|current| {
            *current = current.toggled();
            *current
        });
        info!(language = lang.code(), "Language toggled");
        lang
    }

    pub fn watch(&self) -> watch::Receiver<Language> {
        self.language.subscribe()
    }
}

impl Default for LocaleState {
    fn default() -> Self {
        Self::new(Language::default())
    }
}
