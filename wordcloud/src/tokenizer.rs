//! Word counting for the cloud.
//!
//! Tokens match `\w[\w']+`, lose a trailing `'s`, and are counted
//! case-insensitively. Each word is reported in its most common casing.
//! Stop words and pure numbers are dropped, and a plural folds into its
//! singular when both appear.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "can't", "cannot", "com", "could", "couldn't", "did", "didn't",
    "do", "does", "doesn't", "doing", "don't", "down", "during", "each", "else", "ever", "few",
    "for", "from", "further", "get", "had", "hadn't", "has", "hasn't", "have", "haven't",
    "having", "he", "he'd", "he'll", "he's", "hence", "her", "here", "here's", "hers", "herself",
    "him", "himself", "his", "how", "how's", "however", "http", "https", "i", "i'd", "i'll",
    "i'm", "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself", "just",
    "k", "let's", "like", "me", "more", "most", "mustn't", "my", "myself", "no", "nor", "not",
    "of", "off", "on", "once", "only", "or", "other", "otherwise", "ought", "our", "ours",
    "ourselves", "out", "over", "own", "r", "same", "shall", "shan't", "she", "she'd",
    "she'll", "she's", "should", "shouldn't", "since", "so", "some", "such", "than", "that",
    "that's", "the", "their", "theirs", "them", "themselves", "then", "there", "there's",
    "therefore", "these", "they", "they'd", "they'll", "they're", "they've", "this", "those",
    "through", "to", "too", "under", "until", "up", "very", "was", "wasn't", "we", "we'd",
    "we'll", "we're", "we've", "were", "weren't", "what", "what's", "when", "when's", "where",
    "where's", "which", "while", "who", "who's", "whom", "why", "why's", "with", "won't",
    "would", "wouldn't", "www", "you", "you'd", "you'll", "you're", "you've", "your", "yours",
    "yourself", "yourselves",
];

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w[\w']+").expect("word pattern is valid"))
}

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Default)]
struct Tally {
    total: usize,
    first_seen: usize,
    casings: HashMap<String, usize>,
}

impl Tally {
    fn preferred_casing(&self) -> String {
        self.casings
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(word, _)| word.clone())
            .unwrap_or_default()
    }
}

/// Count words in `text`, most frequent first (ties in order of first appearance).
pub fn count_words(text: &str) -> Vec<WordCount> {
    let mut tallies: HashMap<String, Tally> = HashMap::new();

    for (position, found) in word_pattern().find_iter(text).enumerate() {
        let mut word = found.as_str();
        if word.ends_with("'s") || word.ends_with("'S") {
            word = &word[..word.len() - 2];
        }
        if word.is_empty() || word.chars().all(|c| c.is_numeric()) {
            continue;
        }

        let folded = word.to_lowercase();
        if is_stopword(&folded) {
            continue;
        }

        let tally = tallies.entry(folded).or_insert_with(|| Tally {
            first_seen: position,
            ..Tally::default()
        });
        tally.total += 1;
        *tally.casings.entry(word.to_string()).or_insert(0) += 1;
    }

    fold_plurals(&mut tallies);

    let mut counts: Vec<(usize, WordCount)> = tallies
        .values()
        .map(|tally| {
            (
                tally.first_seen,
                WordCount {
                    word: tally.preferred_casing(),
                    count: tally.total,
                },
            )
        })
        .collect();
    counts.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(&b.0)));
    counts.into_iter().map(|(_, count)| count).collect()
}

fn fold_plurals(tallies: &mut HashMap<String, Tally>) {
    let plurals: Vec<String> = tallies
        .keys()
        .filter(|key| key.ends_with('s') && !key.ends_with("ss") && key.len() > 3)
        .filter(|key| tallies.contains_key(&key[..key.len() - 1]))
        .cloned()
        .collect();

    for plural in plurals {
        if let Some(plural_tally) = tallies.remove(&plural) {
            let singular = &plural[..plural.len() - 1];
            if let Some(tally) = tallies.get_mut(singular) {
                tally.total += plural_tally.total;
                tally.first_seen = tally.first_seen.min(plural_tally.first_seen);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_pairs(counts: &[WordCount]) -> Vec<(&str, usize)> {
        counts.iter().map(|c| (c.word.as_str(), c.count)).collect()
    }

    #[test]
    fn test_counts_and_order() {
        let counts = count_words("Rust rust rust Python python Python golang");
        assert_eq!(
            as_pairs(&counts),
            vec![("rust", 3), ("Python", 3), ("golang", 1)]
        );
    }

    #[test]
    fn test_stopwords_numbers_and_short_tokens_dropped() {
        let counts = count_words("I love the 2024 release of a x compiler");
        assert_eq!(
            as_pairs(&counts),
            vec![("love", 1), ("release", 1), ("compiler", 1)]
        );
    }

    #[test]
    fn test_possessive_and_plural_folding() {
        let counts = count_words("Ferris's crab, crabs everywhere; class classes");
        let pairs = as_pairs(&counts);
        assert!(pairs.contains(&("Ferris", 1)));
        assert!(pairs.contains(&("crab", 2)));
        assert!(pairs.contains(&("class", 1)));
        assert!(pairs.contains(&("classes", 1)));
    }

    #[test]
    fn test_link_noise_filtered() {
        let counts = count_words("[Post] Hi - world (https://reddit.com/r/x/1)");
        assert_eq!(
            as_pairs(&counts),
            vec![("Post", 1), ("Hi", 1), ("world", 1), ("reddit", 1)]
        );
    }

    #[test]
    fn test_empty_text() {
        assert!(count_words("").is_empty());
        assert!(count_words("the a an 42").is_empty());
    }
}
