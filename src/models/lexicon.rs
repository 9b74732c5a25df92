use crate::config::{GRID_SIZE, MIN_WORD_LENGTH};
use crate::models::word::Word;
use anyhow::{Context, Error};
use std::collections::BTreeSet;
use std::convert::TryFrom;
use std::fs;
use std::path::Path;

/// The two word tiers extracted from a dictionary file.
///
/// `placeable` holds the words the filler may put on the grid, that is, the
/// words with length between `MIN_WORD_LENGTH` and `GRID_SIZE`. `checkable`
/// holds every dictionary token over the alphabet regardless of length; the
/// solvability probe tests line segments against this larger set.
#[derive(Debug, Clone)]
pub struct Lexicon {
    placeable: BTreeSet<Word>,
    checkable: BTreeSet<Word>,
}

impl Lexicon {
    /// Load a newline-delimited dictionary: one token per line, whitespace
    /// stripped, lowercased with the Turkish casing rules. Tokens with any
    /// character outside the alphabet are dropped from both tiers.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read dictionary {}", path.display()))?;
        Ok(Self::from_lines(contents.lines()))
    }

    pub fn from_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Self {
        let mut placeable = BTreeSet::new();
        let mut checkable = BTreeSet::new();

        for line in lines {
            let token = normalize(line);
            let word = match Word::try_from(token.as_str()) {
                Ok(word) => word,
                Err(_) => continue,
            };

            if (MIN_WORD_LENGTH..=GRID_SIZE).contains(&word.len()) {
                placeable.insert(word.clone());
            }
            checkable.insert(word);
        }

        log::info!(
            "Loaded {} placeable words out of {} checkable tokens",
            placeable.len(),
            checkable.len()
        );
        Lexicon {
            placeable,
            checkable,
        }
    }

    pub fn placeable(&self) -> &BTreeSet<Word> {
        &self.placeable
    }

    pub fn checkable(&self) -> &BTreeSet<Word> {
        &self.checkable
    }

    pub fn is_placeable(&self, word: &Word) -> bool {
        self.placeable.contains(word)
    }

    pub fn is_checkable(&self, word: &Word) -> bool {
        self.checkable.contains(word)
    }
}

/// Drop all whitespace and lowercase what remains. Turkish pairs the dotted
/// and dotless i differently from Unicode's default mapping: `I` lowers to
/// `ı` and `İ` lowers to `i`.
fn normalize(raw: &str) -> String {
    let mut token = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_whitespace() {
            continue;
        }
        match c {
            'I' => token.push('ı'),
            'İ' => token.push('i'),
            _ => token.extend(c.to_lowercase()),
        }
    }
    token
}
