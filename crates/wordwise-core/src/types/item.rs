//! Catalog item types.

use crate::error::{WordwiseError, WordwiseResult};
use serde::{Deserialize, Serialize};

/// A learnable unit (a word) identified by a stable key.
///
/// Items are owned by the catalog; the scheduler only reads them and keys
/// its memory states by [`Item::key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier.
    pub key: String,
    /// The word itself.
    pub word: String,
    /// Translation or definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
    /// Deck the word was imported from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck: Option<String>,
    /// Phonetic transcription.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    /// Example sentence using the word.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_sentence: Option<String>,
}

impl Item {
    /// Create a new item.
    pub fn new(key: impl Into<String>, word: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            word: word.into(),
            meaning: None,
            deck: None,
            phonetic: None,
            example_sentence: None,
        }
    }

    /// Set the meaning.
    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = Some(meaning.into());
        self
    }

    /// Set the deck.
    pub fn with_deck(mut self, deck: impl Into<String>) -> Self {
        self.deck = Some(deck.into());
        self
    }

    /// Set the phonetic transcription.
    pub fn with_phonetic(mut self, phonetic: impl Into<String>) -> Self {
        self.phonetic = Some(phonetic.into());
        self
    }

    /// Set the example sentence.
    pub fn with_example_sentence(mut self, sentence: impl Into<String>) -> Self {
        self.example_sentence = Some(sentence.into());
        self
    }

    /// Check that the key and word are present.
    pub fn validate(&self) -> WordwiseResult<()> {
        if self.key.trim().is_empty() {
            return Err(WordwiseError::missing_field("key"));
        }
        if self.word.trim().is_empty() {
            return Err(WordwiseError::missing_field("word"));
        }
        Ok(())
    }
}
