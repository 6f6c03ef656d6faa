//! Trigram keys and an in-process trigram index
//!
//! Trigrams follow the `pg_trgm` convention (each word padded with two
//! leading spaces and one trailing space) so the in-memory index and the
//! Postgres GIN index shortlist the same candidates.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::normalize::normalize;

/// Padded character trigrams of an already-normalized key.
pub fn trigrams(key: &str) -> BTreeSet<String> {
    let mut grams = BTreeSet::new();
    for word in key.split_whitespace() {
        let padded: Vec<char> = "  ".chars().chain(word.chars()).chain(" ".chars()).collect();
        for window in padded.windows(3) {
            grams.insert(window.iter().collect());
        }
    }
    grams
}

struct IndexedKey<K> {
    id: K,
    grams: BTreeSet<String>,
}

/// Posting-list index from trigram to the names that contain it.
///
/// One id may be indexed under several names (canonical name plus aliases);
/// a lookup scores each id by its best-matching name.
pub struct TrigramIndex<K> {
    keys: Vec<IndexedKey<K>>,
    postings: HashMap<String, Vec<usize>>,
}

impl<K> Default for TrigramIndex<K> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            postings: HashMap::new(),
        }
    }
}

impl<K> fmt::Debug for TrigramIndex<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrigramIndex")
            .field("names", &self.keys.len())
            .field("trigrams", &self.postings.len())
            .finish()
    }
}

impl<K: Ord + Clone> Clone for TrigramIndex<K> {
    fn clone(&self) -> Self {
        Self {
            keys: self
                .keys
                .iter()
                .map(|k| IndexedKey {
                    id: k.id.clone(),
                    grams: k.grams.clone(),
                })
                .collect(),
            postings: self.postings.clone(),
        }
    }
}

impl<K: Ord + Clone> TrigramIndex<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `name` under `id`. The name is normalized first; empty names are ignored.
    pub fn insert(&mut self, id: K, name: &str) {
        let grams = trigrams(&normalize(name));
        if grams.is_empty() {
            return;
        }
        let slot = self.keys.len();
        for gram in &grams {
            self.postings.entry(gram.clone()).or_default().push(slot);
        }
        self.keys.push(IndexedKey { id, grams });
    }

    /// Number of indexed names (not ids).
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Ids whose best name has trigram similarity `>= floor` with `query`,
    /// best first, at most `limit`. Equal similarities order by id.
    pub fn candidates(&self, query: &str, floor: f64, limit: usize) -> Vec<(K, f64)> {
        let query_grams = trigrams(&normalize(query));
        if query_grams.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut shared: HashMap<usize, usize> = HashMap::new();
        for gram in &query_grams {
            if let Some(slots) = self.postings.get(gram) {
                for &slot in slots {
                    *shared.entry(slot).or_insert(0) += 1;
                }
            }
        }

        let mut best: BTreeMap<K, f64> = BTreeMap::new();
        for (slot, common) in shared {
            let Some(entry) = self.keys.get(slot) else {
                continue;
            };
            let union = query_grams.len() + entry.grams.len() - common;
            let score = common as f64 / union as f64;
            if score < floor {
                continue;
            }
            best.entry(entry.id.clone())
                .and_modify(|current| {
                    if score > *current {
                        *current = score;
                    }
                })
                .or_insert(score);
        }

        let mut ranked: Vec<(K, f64)> = best.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigrams_padding() {
        let grams = trigrams("ab");
        let expected: BTreeSet<String> =
            ["  a", " ab", "ab "].iter().map(|s| s.to_string()).collect();
        assert_eq!(grams, expected);
        assert!(trigrams("").is_empty());
    }

    #[test]
    fn test_exact_name_scores_one() {
        let mut index = TrigramIndex::new();
        index.insert(1u32, "Парацетамол");
        index.insert(2u32, "Тримол");

        let hits = index.candidates("парацетамол", 0.0, 10);
        assert_eq!(hits.first(), Some(&(1, 1.0)));
        assert!(hits.iter().skip(1).all(|(_, score)| *score > 0.0 && *score < 1.0));
    }

    #[test]
    fn test_misspelling_is_shortlisted() {
        let mut index = TrigramIndex::new();
        index.insert(1u32, "Парацетамол");
        index.insert(2u32, "ТайлолХот");
        index.insert(3u32, "Тримол");

        let hits = index.candidates("парацетомол", 0.3, 10);
        assert_eq!(hits.first().map(|h| h.0), Some(1));
        assert!(hits.iter().all(|(_, score)| *score >= 0.3));
    }

    #[test]
    fn test_alias_scores_under_owning_id() {
        let mut index = TrigramIndex::new();
        index.insert(7u32, "Ацетилсалициловая кислота");
        index.insert(7u32, "Аспирин");

        let hits = index.candidates("аспирин", 0.3, 10);
        assert_eq!(hits, vec![(7, 1.0)]);
    }

    #[test]
    fn test_limit_and_floor() {
        let mut index = TrigramIndex::new();
        for (id, name) in ["Тримол", "Тримолекс", "Тримоксазол"].iter().enumerate() {
            index.insert(id, name);
        }
        assert_eq!(index.candidates("тримол", 0.0, 2).len(), 2);
        assert!(index.candidates("несуществующее", 0.3, 10).is_empty());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_scattered_edits_fall_below_floor() {
        let mut index = TrigramIndex::new();
        index.insert(1u32, "Амоксициллинекс");
        // Jaccard 7/24; callers must not treat the shortlist as complete.
        let hits = index.candidates("амыксицыллиныкс", 0.0, 10);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].1 - 7.0 / 24.0).abs() < 1e-9);
        assert!(index.candidates("амыксицыллиныкс", 0.3, 10).is_empty());
    }
}
