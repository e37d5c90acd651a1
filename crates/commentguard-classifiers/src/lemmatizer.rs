//! Noun lemmatizer in the style of WordNet's morphy.
//!
//! Irregular plurals come from an exception table; regular plurals are
//! reduced by suffix rules. Words the rules do not recognise pass through
//! unchanged. Every lemma is a fixed point: `lemmatize(lemmatize(w)) ==
//! lemmatize(w)`.

use std::collections::HashMap;

/// Irregular noun plurals
const EXCEPTIONS: &[(&str, &str)] = &[
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("teeth", "tooth"),
    ("feet", "foot"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("lice", "louse"),
    ("oxen", "ox"),
    ("wolves", "wolf"),
    ("knives", "knife"),
    ("wives", "wife"),
    ("lives", "life"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("selves", "self"),
    ("thieves", "thief"),
    ("loaves", "loaf"),
    ("shelves", "shelf"),
    ("calves", "calf"),
    ("elves", "elf"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("cacti", "cactus"),
    ("fungi", "fungus"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("analyses", "analysis"),
    ("crises", "crisis"),
    ("theses", "thesis"),
];

/// Words that end like plurals but are their own base form
const INVARIANT: &[&str] = &[
    "always", "news", "series", "species", "lens", "chaos", "bias", "atlas", "canvas", "this",
    "thus", "yes", "perhaps", "whereas", "sometimes", "besides", "towards", "afterwards",
];

/// Singulars ending in "ie", whose plurals must not take the y-rule
const IE_SINGULARS: &[&str] = &[
    "movie", "cookie", "zombie", "selfie", "hoodie", "rookie", "newbie", "goalie", "sweetie",
    "cutie", "hottie", "bestie", "freebie", "techie", "foodie", "groupie", "calorie", "auntie",
    "genie", "prairie", "brownie", "smoothie", "indie", "pie", "tie", "lie", "die",
];

/// Endings that mark a singular word ending in "s"
const SINGULAR_S_ENDINGS: &[&str] = &["ss", "us", "is", "ics"];

/// Suffix rules tried in order: (suffix, replacement)
const SUFFIX_RULES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("xes", "x"),
    ("ies", "y"),
    ("s", ""),
];

/// Shortest word the suffix rules will touch
const MIN_RULE_LEN: usize = 4;

/// Rule-based noun lemmatizer
#[derive(Debug, Clone)]
pub struct Lemmatizer {
    exceptions: HashMap<&'static str, &'static str>,
}

impl Lemmatizer {
    pub fn new() -> Self {
        Self {
            exceptions: EXCEPTIONS.iter().copied().collect(),
        }
    }

    /// Base form of a lowercase ASCII word
    pub fn lemmatize<'a>(&self, word: &'a str) -> std::borrow::Cow<'a, str> {
        use std::borrow::Cow;

        if let Some(lemma) = self.exceptions.get(word) {
            return Cow::Borrowed(*lemma);
        }

        if word.len() < MIN_RULE_LEN
            || !word.ends_with('s')
            || INVARIANT.contains(&word)
            || SINGULAR_S_ENDINGS.iter().any(|end| word.ends_with(end))
        {
            return Cow::Borrowed(word);
        }

        for (suffix, replacement) in SUFFIX_RULES {
            let Some(stem) = word.strip_suffix(suffix) else {
                continue;
            };

            if *suffix == "ies" && IE_SINGULARS.contains(&&word[..word.len() - 1]) {
                continue;
            }

            return Cow::Owned(format!("{stem}{replacement}"));
        }

        Cow::Borrowed(word)
    }
}

impl Default for Lemmatizer {
    fn default() -> Self {
        Self::new()
    }
}
