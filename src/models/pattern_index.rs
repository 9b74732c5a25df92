use crate::config::{GRID_SIZE, MIN_WORD_LENGTH};
use crate::models::lexicon::Lexicon;
use crate::models::pattern::{Intermediary, Liner, LinerCell, LineState};
use crate::models::word::Word;
use itertools::Itertools;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Partial lines are completed exhaustively only up to this many unassigned
/// cells; above it the quick witnesses are the only ones tried
const COMPLETABLE_SEARCH_LIMIT: usize = 3;

/// Same envelope for the wordful check, which walks word sets and is pricier
const WORDFUL_SEARCH_LIMIT: usize = 2;

/// The pattern structures precomputed from the dictionary: the real
/// intermediaries, the liners assembled from them, and the two adjacency
/// maps. Built once at startup and immutable afterwards; the search holds a
/// shared reference.
#[derive(Debug)]
pub struct PatternIndex {
    lexicon: Lexicon,
    intermediaries: HashSet<Intermediary>,
    intermediary_to_words: HashMap<Intermediary, BTreeSet<Word>>,
    liners: HashSet<Liner>,
    liner_to_intermediaries: HashMap<Liner, BTreeSet<Intermediary>>,
}

/// Counters reported by the `stats` command
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub placeable_words: usize,
    pub checkable_words: usize,
    pub full_length_words: usize,
    pub intermediaries: usize,
    pub connected_intermediaries: usize,
    pub liners: usize,
    pub avg_words_per_intermediary: f64,
    pub avg_intermediaries_per_liner: f64,
}

impl PatternIndex {
    pub fn build(lexicon: Lexicon) -> Self {
        let mut index = PatternIndex {
            lexicon,
            intermediaries: HashSet::new(),
            intermediary_to_words: HashMap::new(),
            liners: HashSet::new(),
            liner_to_intermediaries: HashMap::new(),
        };

        index.find_real_intermediaries();
        index.connect_words();
        index.generate_liners();

        log::info!(
            "Pattern index ready: {} intermediaries, {} liners",
            index.intermediaries.len(),
            index.liners.len()
        );
        index
    }

    /// Collect every non-trivial mask of every placeable word, plus the
    /// wildcard for each length that at least one placeable word has
    fn find_real_intermediaries(&mut self) {
        for word in self.lexicon.placeable() {
            self.intermediaries.extend(intermediaries_for_word(word));
        }

        for len in MIN_WORD_LENGTH..=GRID_SIZE {
            if self.lexicon.placeable().iter().any(|word| word.len() == len) {
                self.intermediaries.insert(Intermediary::wildcard(len));
            }
        }

        log::info!(
            "Found {} real intermediaries (including wildcards)",
            self.intermediaries.len()
        );
    }

    /// Connect each real intermediary to the words that match it
    fn connect_words(&mut self) {
        for word in self.lexicon.placeable() {
            for intermediary in intermediaries_for_word(word) {
                if self.intermediaries.contains(&intermediary) {
                    self.intermediary_to_words
                        .entry(intermediary)
                        .or_default()
                        .insert(word.clone());
                }
            }
        }

        // The length-L wildcard matches every placeable word of length L
        for len in MIN_WORD_LENGTH..=GRID_SIZE {
            let wildcard = Intermediary::wildcard(len);
            if self.intermediaries.contains(&wildcard) {
                let words = self
                    .lexicon
                    .placeable()
                    .iter()
                    .filter(|word| wildcard.matches(word))
                    .cloned();
                self.intermediary_to_words
                    .entry(wildcard.clone())
                    .or_default()
                    .extend(words);
            }
        }

        log::info!(
            "Connected {} intermediaries to their words",
            self.intermediary_to_words.len()
        );
    }

    /// Assemble every liner: single intermediaries slide through all padding
    /// splits, k-compounds join distinct intermediaries with blocked cells
    fn generate_liners(&mut self) {
        let max_compounds = max_compounds_in(GRID_SIZE, MIN_WORD_LENGTH);
        log::info!("Maximum compounds per liner: {}", max_compounds);

        let mut by_length: HashMap<usize, Vec<Intermediary>> = HashMap::new();
        for intermediary in &self.intermediaries {
            by_length
                .entry(intermediary.len())
                .or_default()
                .push(intermediary.clone());
        }

        let singles = self.intermediaries.iter().cloned().collect_vec();
        for intermediary in &singles {
            let padding = GRID_SIZE - intermediary.len();
            for start in 0..=padding {
                let liner = Liner::compound(&[intermediary], start, padding - start);
                self.push_liner(liner, &[intermediary]);
            }
        }

        for k in 2..=max_compounds {
            let max_len = max_len_for(k, GRID_SIZE, MIN_WORD_LENGTH);
            if max_len >= MIN_WORD_LENGTH {
                self.generate_compound_liners(k, max_len, &by_length);
            }
        }

        log::info!("Generated {} liners", self.liners.len());
    }

    fn generate_compound_liners(
        &mut self,
        k: usize,
        max_len: usize,
        by_length: &HashMap<usize, Vec<Intermediary>>,
    ) {
        let lengths = (MIN_WORD_LENGTH..=max_len)
            .filter(|len| by_length.contains_key(len))
            .collect_vec();

        for combo in lengths.iter().copied().combinations_with_replacement(k) {
            let content: usize = combo.iter().sum();
            if content + (k - 1) > GRID_SIZE {
                continue;
            }
            let separators = GRID_SIZE - content;

            let groups = combo
                .iter()
                .map(|len| by_length[len].iter().collect_vec())
                .collect_vec();
            for parts in groups.into_iter().multi_cartesian_product() {
                if parts.iter().unique().count() < k {
                    continue;
                }
                for liner in compound_arrangements(&parts, separators, GRID_SIZE) {
                    self.push_liner(liner, &parts);
                }
            }
        }
    }

    /// Store a liner and remember which intermediaries built it. Enumeration
    /// guarantees the length; a mismatch is dropped instead of stored.
    fn push_liner(&mut self, liner: Liner, parts: &[&Intermediary]) {
        if liner.len() != GRID_SIZE {
            return;
        }
        debug_assert!(liner.intermediary_runs().iter().eq(parts.iter().copied()));
        let entry = self.liner_to_intermediaries.entry(liner.clone()).or_default();
        for &part in parts {
            entry.insert(part.clone());
        }
        self.liners.insert(liner);
    }

    pub fn contains_liner(&self, liner: &Liner) -> bool {
        self.liners.contains(liner)
    }

    pub fn liners(&self) -> &HashSet<Liner> {
        &self.liners
    }

    pub fn intermediaries(&self) -> &HashSet<Intermediary> {
        &self.intermediaries
    }

    pub fn words_for(&self, intermediary: &Intermediary) -> Option<&BTreeSet<Word>> {
        self.intermediary_to_words.get(intermediary)
    }

    pub fn intermediaries_for(&self, liner: &Liner) -> Option<&BTreeSet<Intermediary>> {
        self.liner_to_intermediaries.get(liner)
    }

    pub fn placeable_words(&self) -> &BTreeSet<Word> {
        self.lexicon.placeable()
    }

    pub fn is_placeable_word(&self, word: &Word) -> bool {
        self.lexicon.is_placeable(word)
    }

    /// A liner is wordful when at least one of its intermediaries matches at
    /// least one word
    pub fn is_wordful_liner(&self, liner: &Liner) -> bool {
        if !self.liners.contains(liner) {
            return false;
        }
        self.intermediaries_for(liner)
            .map(|intermediaries| {
                intermediaries.iter().any(|intermediary| {
                    self.words_for(intermediary)
                        .map_or(false, |words| !words.is_empty())
                })
            })
            .unwrap_or(false)
    }

    /// True iff the line can still be completed into a stored liner by
    /// turning each unassigned cell into a free slot or a blocked cell. A
    /// fully assigned line passes iff it is a stored liner or a placeable
    /// word spanning the whole line; a fully unassigned line always passes.
    pub fn completable(&self, state: &LineState) -> bool {
        let unassigned = state.unassigned_positions();
        if unassigned.is_empty() {
            return self.full_line_ok(state);
        }
        if unassigned.len() == state.len() {
            return true;
        }

        // Quick witnesses before the exponential search
        if self.contains_liner(&state.complete_all(LinerCell::Free)) {
            return true;
        }
        if self.contains_liner(&state.complete_all(LinerCell::Blocked)) {
            return true;
        }
        if unassigned.len() > 1 {
            let alternating = (0..unassigned.len())
                .map(|i| {
                    if i % 2 == 0 {
                        LinerCell::Free
                    } else {
                        LinerCell::Blocked
                    }
                })
                .collect_vec();
            if self.contains_liner(&state.complete(&alternating)) {
                return true;
            }
        }

        if unassigned.len() <= COMPLETABLE_SEARCH_LIMIT {
            return any_completion(state, unassigned.len(), |liner| self.contains_liner(liner));
        }
        false
    }

    /// True iff the line can still be completed into a stored liner with at
    /// least one word behind it. Same envelope as `completable` with a
    /// tighter exhaustive bound.
    pub fn wordful(&self, state: &LineState) -> bool {
        let unassigned = state.unassigned_positions();
        if unassigned.is_empty() {
            if let Some(word) = state.as_word() {
                if self.lexicon.is_placeable(&word) {
                    return true;
                }
            }
            return self.is_wordful_liner(&state.complete(&[]));
        }
        if unassigned.len() == state.len() {
            return true;
        }

        if self.is_wordful_liner(&state.complete_all(LinerCell::Free)) {
            return true;
        }
        if self.is_wordful_liner(&state.complete_all(LinerCell::Blocked)) {
            return true;
        }

        if unassigned.len() <= WORDFUL_SEARCH_LIMIT {
            return any_completion(state, unassigned.len(), |liner| self.is_wordful_liner(liner));
        }
        false
    }

    /// The solvability probe: every maximal run of assigned letters must read
    /// as a checkable word of at least the minimum length
    pub fn solvable_line(&self, state: &LineState) -> bool {
        state
            .assigned_runs()
            .iter()
            .all(|run| run.len() >= MIN_WORD_LENGTH && self.lexicon.is_checkable(run))
    }

    fn full_line_ok(&self, state: &LineState) -> bool {
        if self.contains_liner(&state.complete(&[])) {
            return true;
        }
        state
            .as_word()
            .map_or(false, |word| self.lexicon.is_placeable(&word))
    }

    pub fn stats(&self) -> IndexStats {
        let word_links: usize = self
            .intermediary_to_words
            .values()
            .map(|words| words.len())
            .sum();
        let intermediary_links: usize = self
            .liner_to_intermediaries
            .values()
            .map(|intermediaries| intermediaries.len())
            .sum();

        IndexStats {
            placeable_words: self.lexicon.placeable().len(),
            checkable_words: self.lexicon.checkable().len(),
            full_length_words: self
                .lexicon
                .placeable()
                .iter()
                .filter(|word| word.len() == GRID_SIZE)
                .count(),
            intermediaries: self.intermediaries.len(),
            connected_intermediaries: self.intermediary_to_words.len(),
            liners: self.liners.len(),
            avg_words_per_intermediary: word_links as f64
                / self.intermediary_to_words.len().max(1) as f64,
            avg_intermediaries_per_liner: intermediary_links as f64
                / self.liner_to_intermediaries.len().max(1) as f64,
        }
    }
}

/// Every non-trivial mask of the word: bitvectors from 1 to 2^len - 2, so
/// the all-letter and all-free variants never appear
fn intermediaries_for_word(word: &Word) -> Vec<Intermediary> {
    let all_free = (1u32 << word.len()) - 1;
    (1..all_free)
        .map(|mask| Intermediary::from_word_mask(word, mask))
        .collect_vec()
}

/// Try every assignment of free/blocked over the unassigned cells
fn any_completion(
    state: &LineState,
    unassigned: usize,
    accepts: impl Fn(&Liner) -> bool,
) -> bool {
    for mask in 0u32..(1 << unassigned) {
        let fills = (0..unassigned)
            .map(|i| {
                if mask & (1 << i) != 0 {
                    LinerCell::Blocked
                } else {
                    LinerCell::Free
                }
            })
            .collect_vec();
        if accepts(&state.complete(&fills)) {
            return true;
        }
    }
    false
}

/// How many intermediaries fit in `width` cells with single separators
fn max_compounds_in(width: usize, min_len: usize) -> usize {
    (width + 1) / (min_len + 1)
}

/// Longest intermediary inside a `k`-compound of `width` cells, given that
/// every other intermediary takes at least `min_len` cells plus a separator
fn max_len_for(k: usize, width: usize, min_len: usize) -> usize {
    width.saturating_sub((k - 1) * (min_len + 1))
}

/// The arrangements of `parts` joined by single blocked cells with the
/// surplus placed at the front, at the back, or split between both ends
fn compound_arrangements(parts: &[&Intermediary], separators: usize, width: usize) -> Vec<Liner> {
    let min_separators = parts.len() - 1;
    if separators < min_separators {
        return Vec::new();
    }
    let extra = separators - min_separators;

    let mut liners = Vec::new();
    if extra == 0 {
        liners.push(Liner::compound(parts, 0, 0));
    } else {
        liners.push(Liner::compound(parts, extra, 0));
        liners.push(Liner::compound(parts, 0, extra));
        if extra >= 2 {
            liners.push(Liner::compound(parts, extra / 2, extra - extra / 2));
        }
    }
    liners.retain(|liner| liner.len() == width);
    liners
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pattern::Slot;
    use std::convert::TryFrom;

    fn index_of(words: &[&str]) -> PatternIndex {
        PatternIndex::build(Lexicon::from_lines(words.iter().copied()))
    }

    fn intermediary(text: &str) -> Intermediary {
        Intermediary::try_from(text).unwrap()
    }

    fn liner(text: &str) -> Liner {
        Liner::try_from(text).unwrap()
    }

    fn state(text: &str) -> LineState {
        LineState::try_from(text).unwrap()
    }

    #[test]
    fn intermediaries_of_a_single_word() {
        let index = index_of(&["arena"]);

        // 2^5 - 2 masks plus the five-letter wildcard
        assert_eq!(index.intermediaries().len(), 31);
        for text in ["a___a", "are__", "_r_n_", "_____"] {
            assert!(index.intermediaries().contains(&intermediary(text)));
        }
        assert!(!index.intermediaries().contains(&intermediary("arena")));
        assert!(!index.intermediaries().contains(&intermediary("____")));
    }

    #[test]
    fn no_trivial_intermediaries() {
        let index = index_of(&["arena", "kapı", "deniz"]);

        for stored in index.intermediaries() {
            let frees = stored
                .slots()
                .iter()
                .filter(|&&slot| slot == Slot::Free)
                .count();
            assert!(frees > 0, "all-letter pattern: {}", stored);
            if frees == stored.len() {
                let has_length = index
                    .placeable_words()
                    .iter()
                    .any(|word| word.len() == stored.len());
                assert!(has_length, "spurious wildcard: {}", stored);
            }
        }
    }

    #[test]
    fn words_match_their_intermediaries() {
        let index = index_of(&["arena", "alpha", "kapı"]);

        for (stored, words) in &index.intermediary_to_words {
            assert!(!words.is_empty());
            for word in words {
                assert!(stored.matches(word), "{} vs {}", stored, word);
            }
        }
    }

    #[test]
    fn wildcard_maps_to_every_word_of_its_length() {
        let index = index_of(&["arena", "alpha", "kapı"]);

        let five = index.words_for(&intermediary("_____")).unwrap();
        assert_eq!(five.len(), 2);
        let four = index.words_for(&intermediary("____")).unwrap();
        assert_eq!(four.len(), 1);

        // A shared mask collects both words
        let shared = index.words_for(&intermediary("a___a")).unwrap();
        assert_eq!(shared.len(), 2);
    }

    #[test]
    fn liners_have_grid_length_and_reconstruct() {
        let index = index_of(&["arena", "kapı"]);

        for stored in index.liners() {
            assert_eq!(stored.len(), GRID_SIZE);
            let runs = stored.intermediary_runs();
            assert!(!runs.is_empty());
            for run in &runs {
                assert!(index.intermediaries().contains(run), "{} in {}", run, stored);
            }
        }

        // A four-letter intermediary slides through both padding splits
        assert!(index.contains_liner(&liner("k___@")));
        assert!(index.contains_liner(&liner("@k___")));
        assert!(index.contains_liner(&liner("a___a")));
        assert!(!index.contains_liner(&liner("@@@@@")));
    }

    #[test]
    fn compound_helpers() {
        // The default configuration leaves no room for compounds
        assert_eq!(max_compounds_in(GRID_SIZE, MIN_WORD_LENGTH), 1);

        assert_eq!(max_compounds_in(11, 4), 2);
        assert_eq!(max_len_for(2, 11, 4), 6);
        assert_eq!(max_len_for(1, GRID_SIZE, MIN_WORD_LENGTH), GRID_SIZE);
    }

    #[test]
    fn compound_arrangement_shapes() {
        let left = intermediary("ab__");
        let right = intermediary("cd_e");
        let parts = [&left, &right];

        let tight: Vec<_> = compound_arrangements(&parts, 1, 9)
            .iter()
            .map(Liner::to_string)
            .collect();
        assert_eq!(tight, ["ab__@cd_e"]);

        let loose: Vec<_> = compound_arrangements(&parts, 3, 11)
            .iter()
            .map(Liner::to_string)
            .collect();
        assert_eq!(loose, ["@@ab__@cd_e", "ab__@cd_e@@", "@ab__@cd_e@"]);

        // Not enough separators for the join
        assert!(compound_arrangements(&parts, 0, 9).is_empty());
    }

    #[test]
    fn completable_lines() {
        let index = index_of(&["arena", "alpha"]);

        // Fully unassigned lines always extend
        assert!(index.completable(&state(".....")));

        // A letter the masks support extends, one they cannot does not
        assert!(index.completable(&state("a....")));
        assert!(index.completable(&state("..e..")));
        assert!(!index.completable(&state("r....")));

        // Fully assigned lines must be stored words
        assert!(index.completable(&state("arena")));
        assert!(!index.completable(&state("arene")));
    }

    #[test]
    fn wordful_lines() {
        let index = index_of(&["arena", "alpha"]);

        assert!(index.wordful(&state(".....")));
        assert!(index.wordful(&state("a....")));
        assert!(index.wordful(&state("arena")));
        assert!(!index.wordful(&state("r....")));
        assert!(!index.wordful(&state("arene")));
    }

    #[test]
    fn solvable_lines() {
        let index = index_of(&["arena", "alpha", "dört"]);

        assert!(index.solvable_line(&state(".....")));
        assert!(index.solvable_line(&state("arena")));
        assert!(index.solvable_line(&state("dört.")));
        assert!(index.solvable_line(&state(".dört")));

        // Short or unknown runs spoil the decomposition
        assert!(!index.solvable_line(&state("ar...")));
        assert!(!index.solvable_line(&state("arens")));
    }
}
