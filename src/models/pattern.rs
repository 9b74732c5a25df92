use crate::config::GRID_SIZE;
use crate::models::letter::Letter;
use crate::models::word::Word;
use anyhow::{ensure, Error};
use itertools::Itertools;
use std::convert::TryFrom;
use std::fmt;
use std::fmt::Write;
use std::{iter, mem};

/// One cell of an intermediary: a fixed letter or a free slot, written `_`
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum Slot {
    Letter(Letter),
    Free,
}

/// A masked word template: a word with some positions opened up as free
/// slots. Except for the per-length wildcard, a real intermediary always
/// keeps at least one letter and frees at least one slot.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Intermediary {
    slots: Vec<Slot>,
}

/// One cell of a liner: a fixed letter, a free slot (`_`) or a blocked cell
/// (`@`)
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum LinerCell {
    Letter(Letter),
    Free,
    Blocked,
}

/// A full-line skeleton of exactly `GRID_SIZE` cells: one or more
/// intermediaries separated and padded by blocked cells
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Liner {
    cells: Vec<LinerCell>,
}

/// The observed state of one full row or column: assigned letters and
/// yet-unassigned cells, written `.`
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct LineState {
    cells: Vec<Option<Letter>>,
}

#[allow(clippy::len_without_is_empty)]
impl Intermediary {
    /// Mask a word: every position whose bit is set becomes a free slot
    pub fn from_word_mask(word: &Word, mask: u32) -> Self {
        let slots = word
            .letters()
            .iter()
            .enumerate()
            .map(|(j, &letter)| {
                if mask & (1 << j) != 0 {
                    Slot::Free
                } else {
                    Slot::Letter(letter)
                }
            })
            .collect();
        Intermediary { slots }
    }

    /// The all-free template of the given length
    pub fn wildcard(len: usize) -> Self {
        Intermediary {
            slots: vec![Slot::Free; len],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// A word matches when every slot is free or carries the same letter
    pub fn matches(&self, word: &Word) -> bool {
        self.len() == word.len()
            && self
                .slots
                .iter()
                .zip(word.letters())
                .all(|(&slot, &letter)| match slot {
                    Slot::Free => true,
                    Slot::Letter(fixed) => fixed == letter,
                })
    }
}

#[allow(clippy::len_without_is_empty)]
impl Liner {
    fn from_cells(cells: Vec<LinerCell>) -> Self {
        Liner { cells }
    }

    /// Join the intermediaries with single blocked cells and pad both ends
    pub fn compound(parts: &[&Intermediary], leading: usize, trailing: usize) -> Self {
        let mut cells = vec![LinerCell::Blocked; leading];
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                cells.push(LinerCell::Blocked);
            }
            cells.extend(part.slots().iter().map(|&slot| LinerCell::from(slot)));
        }
        cells.extend(iter::repeat(LinerCell::Blocked).take(trailing));
        Liner { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[LinerCell] {
        &self.cells
    }

    /// Split the liner back into its maximal runs between blocked cells
    pub fn intermediary_runs(&self) -> Vec<Intermediary> {
        let mut runs = Vec::new();
        let mut current = Vec::new();
        for &cell in &self.cells {
            match cell {
                LinerCell::Blocked => {
                    if !current.is_empty() {
                        runs.push(Intermediary {
                            slots: mem::take(&mut current),
                        });
                    }
                }
                LinerCell::Letter(letter) => current.push(Slot::Letter(letter)),
                LinerCell::Free => current.push(Slot::Free),
            }
        }
        if !current.is_empty() {
            runs.push(Intermediary { slots: current });
        }
        runs
    }
}

#[allow(clippy::len_without_is_empty)]
impl LineState {
    pub fn new(cells: Vec<Option<Letter>>) -> Self {
        debug_assert_eq!(cells.len(), GRID_SIZE);
        LineState { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Option<Letter>] {
        &self.cells
    }

    pub fn unassigned_positions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .positions(|cell| cell.is_none())
            .collect()
    }

    pub fn is_fully_assigned(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_some())
    }

    /// The state with one more letter assigned
    pub fn with_letter(&self, position: usize, letter: Letter) -> Self {
        let mut cells = self.cells.clone();
        cells[position] = Some(letter);
        LineState { cells }
    }

    /// The line as a word, when every cell is assigned
    pub fn as_word(&self) -> Option<Word> {
        let letters: Option<Vec<_>> = self.cells.iter().copied().collect();
        letters.map(Word::from_letters)
    }

    /// Complete the line into a liner, consuming one fill per unassigned cell
    pub fn complete(&self, fills: &[LinerCell]) -> Liner {
        debug_assert_eq!(fills.len(), self.unassigned_positions().len());
        let mut fills = fills.iter().copied();
        let cells = self
            .cells
            .iter()
            .map(|cell| match cell {
                Some(letter) => LinerCell::Letter(*letter),
                None => fills.next().unwrap_or(LinerCell::Free),
            })
            .collect();
        Liner::from_cells(cells)
    }

    /// Complete the line with the same fill in every unassigned cell
    pub fn complete_all(&self, fill: LinerCell) -> Liner {
        let cells = self
            .cells
            .iter()
            .map(|cell| match cell {
                Some(letter) => LinerCell::Letter(*letter),
                None => fill,
            })
            .collect();
        Liner::from_cells(cells)
    }

    /// The maximal runs of assigned letters between unassigned cells
    pub fn assigned_runs(&self) -> Vec<Word> {
        let mut runs = Vec::new();
        let mut current = Vec::new();
        for &cell in &self.cells {
            match cell {
                Some(letter) => current.push(letter),
                None => {
                    if !current.is_empty() {
                        runs.push(Word::from_letters(mem::take(&mut current)));
                    }
                }
            }
        }
        if !current.is_empty() {
            runs.push(Word::from_letters(current));
        }
        runs
    }
}

impl From<Slot> for LinerCell {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Letter(letter) => LinerCell::Letter(letter),
            Slot::Free => LinerCell::Free,
        }
    }
}

impl fmt::Display for Intermediary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &slot in &self.slots {
            match slot {
                Slot::Letter(letter) => f.write_char(letter.as_char())?,
                Slot::Free => f.write_char('_')?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Liner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &cell in &self.cells {
            match cell {
                LinerCell::Letter(letter) => f.write_char(letter.as_char())?,
                LinerCell::Free => f.write_char('_')?,
                LinerCell::Blocked => f.write_char('@')?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for LineState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &cell in &self.cells {
            match cell {
                Some(letter) => f.write_char(letter.as_char())?,
                None => f.write_char('.')?,
            }
        }
        Ok(())
    }
}

impl<'a> TryFrom<&'a str> for Intermediary {
    type Error = Error;

    fn try_from(value: &'a str) -> Result<Self, Self::Error> {
        let slots: Vec<_> = value
            .chars()
            .map(|c| match c {
                '_' => Ok(Slot::Free),
                _ => Letter::try_from(c).map(Slot::Letter),
            })
            .try_collect()?;
        ensure!(!slots.is_empty());
        Ok(Intermediary { slots })
    }
}

impl<'a> TryFrom<&'a str> for Liner {
    type Error = Error;

    fn try_from(value: &'a str) -> Result<Self, Self::Error> {
        let cells: Vec<_> = value
            .chars()
            .map(|c| match c {
                '_' => Ok(LinerCell::Free),
                '@' => Ok(LinerCell::Blocked),
                _ => Letter::try_from(c).map(LinerCell::Letter),
            })
            .try_collect()?;
        ensure!(!cells.is_empty());
        Ok(Liner { cells })
    }
}

impl<'a> TryFrom<&'a str> for LineState {
    type Error = Error;

    fn try_from(value: &'a str) -> Result<Self, Self::Error> {
        let cells: Vec<_> = value
            .chars()
            .map(|c| match c {
                '.' => Ok(None),
                _ => Letter::try_from(c).map(Some),
            })
            .try_collect()?;
        Ok(LineState { cells })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_derivation() {
        let word = Word::try_from("arena").unwrap();

        // Bits 0, 1, 3 and 4 set: only the middle letter survives
        let masked = Intermediary::from_word_mask(&word, 0b11011);
        assert_eq!(masked.to_string(), "__e__");
        assert!(masked.matches(&word));

        let kept = Intermediary::from_word_mask(&word, 0b00100);
        assert_eq!(kept.to_string(), "ar_na");
    }

    #[test]
    fn wildcard_and_matching() {
        assert_eq!(Intermediary::wildcard(4).to_string(), "____");

        let pattern = Intermediary::try_from("a___a").unwrap();
        assert!(pattern.matches(&Word::try_from("arena").unwrap()));
        assert!(pattern.matches(&Word::try_from("alpha").unwrap()));
        assert!(!pattern.matches(&Word::try_from("arens").unwrap()));
        assert!(!pattern.matches(&Word::try_from("aren").unwrap()));
    }

    #[test]
    fn liner_runs() {
        let liner = Liner::try_from("@ab__@cd_e@").unwrap();
        let runs: Vec<_> = liner
            .intermediary_runs()
            .iter()
            .map(Intermediary::to_string)
            .collect();
        assert_eq!(runs, ["ab__", "cd_e"]);
    }

    #[test]
    fn compound_builder() {
        let left = Intermediary::try_from("ab__").unwrap();
        let right = Intermediary::try_from("cd_e").unwrap();
        let liner = Liner::compound(&[&left, &right], 1, 1);
        assert_eq!(liner.to_string(), "@ab__@cd_e@");
    }

    #[test]
    fn line_state_completions() {
        let state = LineState::try_from("sa.o.").unwrap();
        assert_eq!(state.unassigned_positions(), [2, 4]);
        assert!(!state.is_fully_assigned());

        assert_eq!(state.complete_all(LinerCell::Free).to_string(), "sa_o_");
        assert_eq!(
            state
                .complete(&[LinerCell::Free, LinerCell::Blocked])
                .to_string(),
            "sa_o@"
        );

        let full = state.with_letter(2, Letter::T).with_letter(4, Letter::R);
        assert_eq!(full.as_word().unwrap().to_string(), "sator");
    }

    #[test]
    fn assigned_runs() {
        let state = LineState::try_from(".ab.c").unwrap();
        let runs: Vec<_> = state.assigned_runs().iter().map(Word::to_string).collect();
        assert_eq!(runs, ["ab", "c"]);

        assert!(LineState::try_from(".....").unwrap().assigned_runs().is_empty());
    }
}
