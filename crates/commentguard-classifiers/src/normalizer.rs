//! Comment text normalization
//!
//! Turns raw user input into [`NormalizedText`]: lowercase ASCII words with
//! URLs, emoji, digits, punctuation and stopwords removed, and each word
//! reduced to its lemma. The same transform runs at training time and at
//! inference time, so any change here invalidates trained artifacts.

use commentguard_core::{Error, NormalizedText, Result};
use regex::Regex;
use std::collections::HashSet;
use stop_words::{get, LANGUAGE};

use crate::lemmatizer::Lemmatizer;

/// `http...` or `www...` up to the next whitespace
const URL_PATTERN: &str = r"http\S+|www\S+";

/// Pictographs, presentation-form emoji, skin-tone modifiers, flags and the
/// joiners/selectors used to build emoji sequences
const EMOJI_PATTERN: &str = r"[\p{Extended_Pictographic}\p{Emoji_Presentation}\p{Emoji_Modifier}\x{1F1E6}-\x{1F1FF}\x{200D}\x{FE0E}\x{FE0F}\x{20E3}]";

/// Deterministic text cleaner shared by training and inference
#[derive(Debug, Clone)]
pub struct Normalizer {
    url_regex: Regex,
    emoji_regex: Regex,
    stopwords: HashSet<String>,
    lemmatizer: Lemmatizer,
}

impl Normalizer {
    /// Create a normalizer with the NLTK English stopword list
    pub fn new() -> Result<Self> {
        Ok(Self {
            url_regex: Regex::new(URL_PATTERN)
                .map_err(|e| Error::internal(format!("Failed to compile URL regex: {}", e)))?,
            emoji_regex: Regex::new(EMOJI_PATTERN)
                .map_err(|e| Error::internal(format!("Failed to compile emoji regex: {}", e)))?,
            stopwords: get(LANGUAGE::English).into_iter().collect(),
            lemmatizer: Lemmatizer::new(),
        })
    }

    /// Normalize one comment.
    ///
    /// Empty or all-noise input yields an empty [`NormalizedText`]; rejecting
    /// it is the caller's job.
    pub fn normalize(&self, raw: &str) -> Result<NormalizedText> {
        let text = raw.to_lowercase();
        let text = self.strip_urls(&text);
        let text = self.strip_emoji(&text);
        let text = keep_ascii_letters(&text);
        // Punctuation removal can splice URL fragments back together ("h.t.t.p.s")
        let text = self.strip_urls(&text);

        let tokens = text
            .split_whitespace()
            .filter(|token| !self.is_stopword(token))
            .map(|token| self.lemmatizer.lemmatize(token))
            .filter(|lemma| !self.is_stopword(lemma));

        NormalizedText::from_tokens(tokens)
    }

    /// Remove URL-like substrings
    pub fn strip_urls(&self, text: &str) -> String {
        self.url_regex.replace_all(text, "").into_owned()
    }

    /// Remove emoji glyphs without substitution
    pub fn strip_emoji(&self, text: &str) -> String {
        self.emoji_regex.replace_all(text, "").into_owned()
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }
}

/// Drop every character outside `[a-z]` and whitespace
fn keep_ascii_letters(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
        .collect()
}
