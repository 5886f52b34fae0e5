use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::Deserialize;
use serde_json::from_str;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

static DECK_DIR: Dir = include_dir!("src/decks");

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("deck `{0}` not found (expected a built-in deck name or a path to a json file)")]
    NotFound(String),
    #[error("deck file `{0}` is not valid utf-8")]
    InvalidUtf8(String),
    #[error("failed to read deck file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse deck json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("word `{0}` has an empty headword")]
    EmptyHeadword(String),
    #[error("word `{0}` has no definitions")]
    NoDefinitions(String),
    #[error("duplicate word id `{0}`")]
    DuplicateId(String),
    #[error("deck has no group named `{0}`")]
    GroupNotFound(String),
}

/// A single vocabulary entry as stored in a deck file.
///
/// `learned` is runtime state hydrated from the progress store; it is never
/// part of the deck json itself.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VocabularyItem {
    pub id: String,
    pub headword: String,
    pub definitions: Vec<String>,
    #[serde(default)]
    pub word_types: Vec<String>,
    #[serde(default)]
    pub pronunciation: Option<String>,
    pub group: String,
    #[serde(skip)]
    pub learned: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Deck {
    pub name: String,
    pub words: Vec<VocabularyItem>,
}

impl Deck {
    /// Load a deck by built-in name or filesystem path, whichever matches.
    pub fn load(spec: &str) -> Result<Self, DeckError> {
        if DECK_DIR.get_file(format!("{spec}.json")).is_some() {
            return Self::builtin(spec);
        }
        let path = Path::new(spec);
        if path.exists() {
            return Self::from_path(path);
        }
        Err(DeckError::NotFound(spec.to_string()))
    }

    pub fn builtin(name: &str) -> Result<Self, DeckError> {
        let file_name = format!("{name}.json");
        let file = DECK_DIR
            .get_file(&file_name)
            .ok_or_else(|| DeckError::NotFound(name.to_string()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| DeckError::InvalidUtf8(file_name))?;
        let deck: Deck = from_str(contents)?;
        deck.validate()?;
        Ok(deck)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DeckError> {
        let contents = std::fs::read_to_string(path)?;
        let deck: Deck = from_str(&contents)?;
        deck.validate()?;
        Ok(deck)
    }

    /// Names of the decks compiled into the binary, sorted.
    pub fn builtin_names() -> Vec<String> {
        DECK_DIR
            .files()
            .filter_map(|f| {
                let path = f.path();
                match path.extension().and_then(|e| e.to_str()) {
                    Some("json") => path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .map(|s| s.to_string()),
                    _ => None,
                }
            })
            .sorted()
            .collect()
    }

    /// Distinct group names in this deck, sorted.
    pub fn groups(&self) -> Vec<String> {
        self.words
            .iter()
            .map(|w| w.group.clone())
            .unique()
            .sorted()
            .collect()
    }

    /// The words to study: the whole deck, or a single group of it.
    pub fn scoped(&self, group: Option<&str>) -> Result<Vec<VocabularyItem>, DeckError> {
        match group {
            None => Ok(self.words.clone()),
            Some(g) => {
                let words: Vec<VocabularyItem> = self
                    .words
                    .iter()
                    .filter(|w| w.group == g)
                    .cloned()
                    .collect();
                if words.is_empty() {
                    return Err(DeckError::GroupNotFound(g.to_string()));
                }
                Ok(words)
            }
        }
    }

    fn validate(&self) -> Result<(), DeckError> {
        let mut seen = HashSet::new();
        for word in &self.words {
            if word.headword.trim().is_empty() {
                return Err(DeckError::EmptyHeadword(word.id.clone()));
            }
            if word.definitions.is_empty() {
                return Err(DeckError::NoDefinitions(word.id.clone()));
            }
            if !seen.insert(word.id.clone()) {
                return Err(DeckError::DuplicateId(word.id.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_builtin_everyday() {
        let deck = Deck::builtin("everyday").unwrap();

        assert_eq!(deck.name, "everyday");
        assert!(!deck.words.is_empty());
        assert!(deck.words.iter().all(|w| !w.learned));
    }

    #[test]
    fn test_builtin_academic() {
        let deck = Deck::builtin("academic").unwrap();

        assert_eq!(deck.name, "academic");
        assert!(!deck.words.is_empty());
    }

    #[test]
    fn test_builtin_names_contains_shipped_decks() {
        let names = Deck::builtin_names();
        assert!(names.contains(&"everyday".to_string()));
        assert!(names.contains(&"academic".to_string()));
    }

    #[test]
    fn test_load_unknown_deck() {
        let err = Deck::load("nonexistent").unwrap_err();
        assert_matches!(err, DeckError::NotFound(name) if name == "nonexistent");
    }

    #[test]
    fn test_load_from_path() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mini.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{
                "name": "mini",
                "words": [
                    {{ "id": "m-1", "headword": "apfel", "definitions": ["apple"], "group": "food" }}
                ]
            }}"#
        )
        .unwrap();

        let deck = Deck::load(path.to_str().unwrap()).unwrap();
        assert_eq!(deck.name, "mini");
        assert_eq!(deck.words.len(), 1);
        assert_eq!(deck.words[0].headword, "apfel");
        assert_eq!(deck.words[0].definitions, vec!["apple".to_string()]);
        assert!(deck.words[0].word_types.is_empty());
        assert_eq!(deck.words[0].pronunciation, None);
    }

    #[test]
    fn test_deserialization_ignores_learned_field() {
        let json_data = r#"
        {
            "name": "test",
            "words": [
                { "id": "t-1", "headword": "hund", "definitions": ["dog"], "group": "animals" }
            ]
        }
        "#;

        let deck: Deck = from_str(json_data).expect("failed to deserialize test deck");
        assert!(!deck.words[0].learned);
    }

    #[test]
    fn test_groups_are_sorted_and_unique() {
        let deck = Deck::builtin("everyday").unwrap();
        let groups = deck.groups();

        assert!(!groups.is_empty());
        let mut sorted = groups.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(groups, sorted);
    }

    #[test]
    fn test_scoped_filters_to_group() {
        let deck = Deck::builtin("everyday").unwrap();
        let group = deck.groups()[0].clone();
        let words = deck.scoped(Some(&group)).unwrap();

        assert!(!words.is_empty());
        assert!(words.iter().all(|w| w.group == group));
        assert!(words.len() < deck.words.len());
    }

    #[test]
    fn test_scoped_unknown_group() {
        let deck = Deck::builtin("everyday").unwrap();
        let err = deck.scoped(Some("no-such-group")).unwrap_err();
        assert_matches!(err, DeckError::GroupNotFound(g) if g == "no-such-group");
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let json_data = r#"
        {
            "name": "dup",
            "words": [
                { "id": "d-1", "headword": "eins", "definitions": ["one"], "group": "numbers" },
                { "id": "d-1", "headword": "zwei", "definitions": ["two"], "group": "numbers" }
            ]
        }
        "#;

        let deck: Deck = from_str(json_data).unwrap();
        assert_matches!(deck.validate(), Err(DeckError::DuplicateId(id)) if id == "d-1");
    }

    #[test]
    fn test_validate_rejects_empty_headword() {
        let json_data = r#"
        {
            "name": "bad",
            "words": [
                { "id": "b-1", "headword": "   ", "definitions": ["blank"], "group": "misc" }
            ]
        }
        "#;

        let deck: Deck = from_str(json_data).unwrap();
        assert_matches!(deck.validate(), Err(DeckError::EmptyHeadword(id)) if id == "b-1");
    }

    #[test]
    fn test_validate_rejects_missing_definitions() {
        let json_data = r#"
        {
            "name": "bad",
            "words": [
                { "id": "b-2", "headword": "leer", "definitions": [], "group": "misc" }
            ]
        }
        "#;

        let deck: Deck = from_str(json_data).unwrap();
        assert_matches!(deck.validate(), Err(DeckError::NoDefinitions(id)) if id == "b-2");
    }

    #[test]
    fn test_all_builtin_decks_validate() {
        for name in Deck::builtin_names() {
            let deck = Deck::builtin(&name).unwrap();
            assert!(deck.words.len() >= 4, "deck `{name}` is too small for quiz mode");
            assert!(!deck.groups().is_empty());
        }
    }
}
