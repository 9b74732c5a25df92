use crate::models::letter::Letter;
use anyhow::{ensure, Error};
use itertools::Itertools;
use std::convert::TryFrom;
use std::fmt;

/// Represents a non-empty list of letters
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Word {
    letters: Vec<Letter>,
}

#[allow(clippy::len_without_is_empty)]
impl Word {
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    pub(crate) fn from_letters(letters: Vec<Letter>) -> Self {
        debug_assert!(!letters.is_empty());
        Word { letters }
    }
}

impl<'a> TryFrom<&'a str> for Word {
    type Error = Error;

    fn try_from(value: &'a str) -> Result<Self, Self::Error> {
        let letters: Vec<_> = value.chars().map(Letter::try_from).try_collect()?;
        ensure!(!letters.is_empty());
        Ok(Word { letters })
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.letters.iter().format(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let word = Word::try_from("çığlık").unwrap();
        assert_eq!(word.len(), 6);
        assert_eq!(word.to_string(), "çığlık");
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(Word::try_from("").is_err());
        assert!(Word::try_from("w1").is_err());
        assert!(Word::try_from("taxi").is_err());
    }
}
