//! Labeled training data
//!
//! Two layouts are read: CSV with a header row (the shape of the public
//! cyberbullying tweet dumps) and JSON Lines. Several common column names
//! are accepted for both the text and the label. Any label other than an
//! explicit "not cyberbullying" value counts as cyberbullying.

use commentguard_core::{Error, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

const SAFE_LABELS: &[&str] = &["not_cyberbullying", "0", "false", "safe", "normal"];

/// One training example
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledComment {
    pub text: String,
    /// 1 for cyberbullying, 0 otherwise
    pub label: u8,
}

impl LabeledComment {
    pub fn new(text: impl Into<String>, label: u8) -> Self {
        Self {
            text: text.into(),
            label: u8::from(label != 0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(alias = "tweet_text", alias = "clean_text", alias = "comment")]
    text: String,

    #[serde(
        alias = "class",
        alias = "cyberbullying_type",
        alias = "is_cyberbullying",
        alias = "target"
    )]
    label: LabelValue,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LabelValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl LabelValue {
    fn is_cyberbullying(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Float(x) => *x != 0.0,
            Self::Text(s) => {
                let s = s.trim().to_ascii_lowercase();
                !SAFE_LABELS.contains(&s.as_str())
            }
        }
    }
}

impl RawRecord {
    /// `None` for records whose text is blank
    fn into_labeled(self) -> Option<LabeledComment> {
        if self.text.trim().is_empty() {
            return None;
        }
        Some(LabeledComment {
            label: u8::from(self.label.is_cyberbullying()),
            text: self.text,
        })
    }
}

/// Read a dataset, picking the layout from the file extension.
///
/// `.csv` files are parsed as CSV; everything else as JSON Lines.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<LabeledComment>> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        load_csv(path)
    } else {
        load_jsonl(path)
    }
}

/// Read a CSV dataset from disk
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<LabeledComment>> {
    let path = path.as_ref();
    let records = read_csv(open_dataset(path)?)?;
    info!(path = %path.display(), records = records.len(), format = "csv", "Loaded dataset");
    Ok(records)
}

/// Parse CSV records with a header row from any reader
///
/// Malformed rows are an error; blank texts are skipped with a warning.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<LabeledComment>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for result in reader.deserialize::<RawRecord>() {
        let raw = result.map_err(|e| {
            let line = e.position().map(|pos| pos.line()).unwrap_or_default();
            Error::config(format!("dataset line {line}: {e}"))
        })?;

        match raw.into_labeled() {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, "Skipped dataset records with empty text");
    }

    Ok(records)
}

/// Read a JSONL dataset from disk
pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Vec<LabeledComment>> {
    let path = path.as_ref();
    let records = read_jsonl(open_dataset(path)?)?;
    info!(path = %path.display(), records = records.len(), format = "jsonl", "Loaded dataset");
    Ok(records)
}

/// Parse JSONL records from any reader
///
/// Malformed lines are an error; blank texts are skipped with a warning.
pub fn read_jsonl<R: Read>(reader: R) -> Result<Vec<LabeledComment>> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let raw: RawRecord = serde_json::from_str(&line)
            .map_err(|e| Error::config(format!("dataset line {}: {e}", idx + 1)))?;

        match raw.into_labeled() {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, "Skipped dataset records with empty text");
    }

    Ok(records)
}

fn open_dataset(path: &Path) -> Result<File> {
    File::open(path)
        .map_err(|e| Error::config(format!("failed to open dataset {}: {e}", path.display())))
}
