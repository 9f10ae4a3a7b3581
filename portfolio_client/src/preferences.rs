use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use portfolio_models::language::Language;
use tracing::warn;

/// Key under which the display language is stored.
pub const LANGUAGE_KEY: &str = "portfolio-language";

/// Persistent key-value storage for user preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore(BTreeMap<String, String>);

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.0.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.0.insert(key.into(), value.into());
        Ok(())
    }
}

/// Stores preferences as a flat JSON object in a single file.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> anyhow::Result<BTreeMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to read preferences at {}", self.path.display())
                })
            }
        };

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse preferences at {}", self.path.display()))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.read()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut preferences = self.read()?;
        preferences.insert(key.into(), value.into());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(&preferences)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write preferences at {}", self.path.display()))
    }
}

/// The display language, restored from and saved to a [`PreferenceStore`].
#[derive(Debug, Clone)]
pub struct LanguagePreference<S> {
    store: S,
    language: Language,
}

impl<S: PreferenceStore> LanguagePreference<S> {
    /// Restore the stored language, falling back to the default for missing,
    /// unknown or unreadable values.
    pub fn load(store: S) -> Self {
        let language = match store.get(LANGUAGE_KEY) {
            Ok(Some(value)) => value
                .parse::<Language>()
                .inspect_err(|err| warn!("Ignoring stored language: {err}"))
                .unwrap_or_default(),
            Ok(None) => Language::default(),
            Err(err) => {
                warn!("Failed to load language preference: {err:#}");
                Language::default()
            }
        };

        Self { store, language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Switch to `language` and persist the choice.
    ///
    /// The language is switched even if it could not be persisted.
    pub fn set(&mut self, language: Language) -> anyhow::Result<()> {
        self.language = language;
        self.store.set(LANGUAGE_KEY, language.code())
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("portfolio-preferences-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn load_default() {
        // Act
        let sut = LanguagePreference::load(MemoryPreferenceStore::default());

        // Assert
        assert_eq!(sut.language(), Language::En);
    }

    #[test]
    fn load_stored() {
        // Arrange
        let mut store = MemoryPreferenceStore::default();
        store.set(LANGUAGE_KEY, "tr").unwrap();

        // Act
        let sut = LanguagePreference::load(store);

        // Assert
        assert_eq!(sut.language(), Language::Tr);
    }

    #[test]
    fn load_ignores_unknown() {
        // Arrange
        let mut store = MemoryPreferenceStore::default();
        store.set(LANGUAGE_KEY, "de").unwrap();

        // Act
        let sut = LanguagePreference::load(store);

        // Assert
        assert_eq!(sut.language(), Language::En);
    }

    #[test]
    fn set_persists() {
        // Arrange
        let mut sut = LanguagePreference::load(MemoryPreferenceStore::default());

        // Act
        sut.set(Language::Bs).unwrap();

        // Assert
        assert_eq!(sut.language(), Language::Bs);
        let store = sut.into_store();
        assert_eq!(store.get(LANGUAGE_KEY).unwrap().as_deref(), Some("bs"));
        assert_eq!(LanguagePreference::load(store).language(), Language::Bs);
    }

    #[test]
    fn file_store() {
        // Arrange
        let path = temp_path("file_store.json");
        let _ = std::fs::remove_file(&path);
        let mut sut = FilePreferenceStore::new(&path);

        // Act
        let missing = sut.get(LANGUAGE_KEY).unwrap();
        sut.set(LANGUAGE_KEY, "tr").unwrap();
        sut.set("other", "value").unwrap();
        let reopened = FilePreferenceStore::new(&path);

        // Assert
        assert_eq!(missing, None);
        assert_eq!(reopened.get(LANGUAGE_KEY).unwrap().as_deref(), Some("tr"));
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("value"));

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn file_store_corrupt() {
        // Arrange
        let path = temp_path("file_store_corrupt.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        // Act
        let result = FilePreferenceStore::new(&path).get(LANGUAGE_KEY);
        let language = LanguagePreference::load(FilePreferenceStore::new(&path)).language();

        // Assert
        assert!(result.is_err());
        assert_eq!(language, Language::En);

        std::fs::remove_file(path).unwrap();
    }
}
