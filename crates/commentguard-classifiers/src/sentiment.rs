//! Sentiment polarity scoring
//!
//! Polarity is a number in [-1, 1]. Negative polarity raises the toxicity
//! score through the aggression boost; positive polarity never lowers it.

use aho_corasick::AhoCorasick;
use commentguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Default multiplier from negative polarity to score boost
pub const DEFAULT_BOOST_FACTOR: f64 = 0.25;

/// Trait for polarity scorers
pub trait PolarityScorer: Send + Sync + fmt::Debug {
    /// Polarity in [-1, 1]
    fn polarity(&self, text: &str) -> f64;

    fn name(&self) -> &str;
}

/// Boost added to the ML score for aggressive text
pub fn aggression_boost(polarity: f64, factor: f64) -> f64 {
    if polarity < 0.0 {
        polarity.abs() * factor
    } else {
        0.0
    }
}

/// Which polarity scorer the pipeline runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentStrategy {
    /// Valence lexicon with intensity rules
    #[default]
    Lexicon,
    /// Fixed insult and praise word lists
    Keyword,
    /// No sentiment stage; boost is always zero
    Disabled,
}

impl SentimentStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lexicon => "lexicon",
            Self::Keyword => "keyword",
            Self::Disabled => "disabled",
        }
    }

    /// Instantiate the scorer, or `None` when disabled
    pub fn build(self) -> Result<Option<Box<dyn PolarityScorer>>> {
        Ok(match self {
            Self::Lexicon => Some(Box::new(LexiconSentiment::new())),
            Self::Keyword => Some(Box::new(KeywordSentiment::new()?)),
            Self::Disabled => None,
        })
    }
}

impl fmt::Display for SentimentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lexicon" => Ok(Self::Lexicon),
            "keyword" => Ok(Self::Keyword),
            "disabled" | "none" | "off" => Ok(Self::Disabled),
            other => Err(Error::config(format!("unknown sentiment strategy '{other}'"))),
        }
    }
}

const BOOSTER_INCREMENT: f64 = 0.293;
const CAPS_INCREMENT: f64 = 0.733;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
const NEGATION_SCALAR: f64 = -0.74;
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Look-back window for boosters and negations
const CONTEXT_WINDOW: usize = 3;

/// Word valences on a -4..4 scale
const VALENCE: &[(&str, f64)] = &[
    ("abuse", -3.2),
    ("abusive", -3.2),
    ("afraid", -2.2),
    ("amazing", 2.8),
    ("angry", -2.3),
    ("annoying", -1.7),
    ("awesome", 3.1),
    ("awful", -2.0),
    ("bad", -2.5),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("bitch", -2.8),
    ("boring", -1.3),
    ("brilliant", 2.8),
    ("bully", -2.3),
    ("clown", -0.9),
    ("cool", 1.3),
    ("crap", -1.6),
    ("creep", -1.5),
    ("cringe", -1.6),
    ("cruel", -2.8),
    ("cute", 2.0),
    ("dead", -3.3),
    ("die", -2.9),
    ("disgusting", -2.4),
    ("dumb", -2.3),
    ("enjoy", 2.2),
    ("excellent", 2.7),
    ("fail", -2.5),
    ("failure", -2.3),
    ("fantastic", 2.6),
    ("fat", -1.0),
    ("fool", -1.9),
    ("freak", -1.9),
    ("friend", 2.2),
    ("fun", 2.3),
    ("funny", 1.9),
    ("garbage", -2.1),
    ("glad", 2.0),
    ("good", 1.9),
    ("gorgeous", 3.0),
    ("great", 3.1),
    ("happy", 2.7),
    ("hate", -2.7),
    ("hater", -1.8),
    ("helpful", 1.8),
    ("hilarious", 1.7),
    ("horrible", -2.5),
    ("hurt", -2.4),
    ("idiot", -2.3),
    ("ignorant", -1.1),
    ("incredible", 2.6),
    ("jerk", -2.3),
    ("joke", 1.2),
    ("kill", -3.7),
    ("kind", 2.4),
    ("lame", -1.8),
    ("laugh", 2.6),
    ("liar", -2.5),
    ("like", 1.5),
    ("lol", 1.8),
    ("loser", -2.4),
    ("love", 3.2),
    ("lovely", 2.8),
    ("moron", -2.2),
    ("nasty", -2.6),
    ("nice", 1.8),
    ("pathetic", -2.2),
    ("perfect", 2.7),
    ("pig", -1.4),
    ("proud", 2.1),
    ("respect", 2.1),
    ("retard", -2.4),
    ("ridiculous", -1.5),
    ("sad", -2.1),
    ("scum", -2.6),
    ("shame", -2.1),
    ("shit", -2.6),
    ("sick", -2.3),
    ("slut", -2.8),
    ("smart", 1.7),
    ("stupid", -2.4),
    ("suck", -1.5),
    ("sucks", -1.5),
    ("support", 1.7),
    ("sweet", 2.0),
    ("terrible", -2.1),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("threat", -2.4),
    ("trash", -1.5),
    ("ugly", -2.3),
    ("useless", -1.8),
    ("weird", -0.7),
    ("welcome", 2.0),
    ("win", 2.8),
    ("wonderful", 2.7),
    ("worst", -3.1),
    ("worthless", -1.9),
    ("wow", 2.8),
];

/// Intensity modifiers and their direction
const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", 1.0),
    ("completely", 1.0),
    ("extremely", 1.0),
    ("incredibly", 1.0),
    ("really", 1.0),
    ("so", 1.0),
    ("such", 1.0),
    ("super", 1.0),
    ("too", 1.0),
    ("totally", 1.0),
    ("very", 1.0),
    ("barely", -1.0),
    ("hardly", -1.0),
    ("kinda", -1.0),
    ("slightly", -1.0),
    ("somewhat", -1.0),
];

const NEGATIONS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "didnt", "doesnt", "dont", "hasnt", "havent",
    "isnt", "never", "no", "nobody", "none", "nope", "not", "nothing", "nowhere", "shouldnt",
    "wasnt", "werent", "without", "wont", "wouldnt",
];

/// Rule-based valence scorer in the style of VADER
///
/// Each known word contributes its valence, adjusted by preceding boosters
/// and negations, capitalization emphasis, and a contrastive "but". The sum
/// is amplified by exclamation marks and squashed into [-1, 1].
#[derive(Debug, Clone)]
pub struct LexiconSentiment {
    valence: HashMap<&'static str, f64>,
    boosters: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
}

impl LexiconSentiment {
    pub fn new() -> Self {
        Self {
            valence: VALENCE.iter().copied().collect(),
            boosters: BOOSTERS.iter().copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
        }
    }

    /// Per-word valences after contextual adjustment
    fn word_valences(&self, words: &[Word]) -> Vec<f64> {
        let shout_contrast = words.iter().any(|w| !w.is_caps);

        words
            .iter()
            .enumerate()
            .map(|(i, word)| {
                let Some(&base) = self.valence.get(word.key.as_str()) else {
                    return 0.0;
                };
                let sign = base.signum();
                let mut valence = base;

                if word.is_caps && shout_contrast {
                    valence += sign * CAPS_INCREMENT;
                }

                let start = i.saturating_sub(CONTEXT_WINDOW);
                for (distance, prior) in words[start..i].iter().rev().enumerate() {
                    if let Some(direction) = self.boosters.get(prior.key.as_str()) {
                        let decay = 1.0 - 0.05 * distance as f64;
                        valence += sign * direction * BOOSTER_INCREMENT * decay;
                    }
                }

                if words[start..i]
                    .iter()
                    .any(|prior| self.negations.contains(prior.key.as_str()))
                {
                    valence *= NEGATION_SCALAR;
                }

                valence
            })
            .collect()
    }
}

impl Default for LexiconSentiment {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for LexiconSentiment {
    fn polarity(&self, text: &str) -> f64 {
        let words: Vec<Word> = text.split_whitespace().filter_map(Word::parse).collect();
        if words.is_empty() {
            return 0.0;
        }

        let mut valences = self.word_valences(&words);

        if let Some(pivot) = words.iter().position(|w| w.key == "but") {
            for (i, valence) in valences.iter_mut().enumerate() {
                if i < pivot {
                    *valence *= 0.5;
                } else if i > pivot {
                    *valence *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        if sum == 0.0 {
            return 0.0;
        }

        let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
        sum += sum.signum() * exclamations as f64 * EXCLAMATION_INCREMENT;

        (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

/// A whitespace token with its lookup key
struct Word {
    key: String,
    is_caps: bool,
}

impl Word {
    fn parse(raw: &str) -> Option<Self> {
        let letters: String = raw.chars().filter(|c| c.is_alphabetic()).collect();
        if letters.is_empty() {
            return None;
        }
        let is_caps = letters.chars().count() > 1 && letters.chars().all(char::is_uppercase);
        Some(Self {
            key: letters.to_lowercase(),
            is_caps,
        })
    }
}

const INSULT_KEYWORDS: &[&str] = &["stupid", "idiot", "hate", "die", "loser", "ugly", "dumb"];
const PRAISE_KEYWORDS: &[&str] = &["love", "great", "nice", "awesome", "good"];

/// Substring keyword scorer: -1 on any insult, else 1 on any praise, else 0
#[derive(Debug, Clone)]
pub struct KeywordSentiment {
    insults: AhoCorasick,
    praise: AhoCorasick,
}

impl KeywordSentiment {
    pub fn new() -> Result<Self> {
        Self::with_keywords(INSULT_KEYWORDS, PRAISE_KEYWORDS)
    }

    pub fn with_keywords(insults: &[&str], praise: &[&str]) -> Result<Self> {
        let insults = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(insults)
            .map_err(|e| Error::config(format!("Failed to build insult matcher: {e}")))?;

        let praise = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(praise)
            .map_err(|e| Error::config(format!("Failed to build praise matcher: {e}")))?;

        Ok(Self { insults, praise })
    }
}

impl PolarityScorer for KeywordSentiment {
    fn polarity(&self, text: &str) -> f64 {
        if self.insults.is_match(text) {
            -1.0
        } else if self.praise.is_match(text) {
            1.0
        } else {
            0.0
        }
    }

    fn name(&self) -> &str {
        "keyword"
    }
}
