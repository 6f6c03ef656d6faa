//! Fuzzy resolution of query tokens to catalog medicines.
//!
//! Candidates come from the snapshot's trigram shortlist; each is then scored
//! by normalized Levenshtein similarity against its canonical name and every
//! alias, and accepted only at or above the configured threshold.
//!
//! The shortlist alone can miss names with several scattered edits, so unless
//! it already produced an exact hit the resolver also scores every medicine
//! whose key length could still beat the best score seen (see
//! [`key_length_band`]).

use crate::error::SearchResult;
use config_engine::MatchingSettings;
use database_layer::models::{Medicine, MedicineId};
use database_layer::SnapshotTx;
use medicine_normalizer::normalize;
use serde::Serialize;
use std::cmp::Ordering;
use strsim::normalized_levenshtein;
use tracing::debug;

/// A medicine a token resolved to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMedicine {
    pub id: MedicineId,
    /// Canonical display name
    pub name: String,
    pub score: f64,
    /// The canonical name or alias that produced the score
    pub matched_via: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenMatch {
    pub raw: String,
    pub key: String,
    pub matched: Option<ResolvedMedicine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolution {
    pub matches: Vec<TokenMatch>,
    /// Distinct resolved medicines in first-seen query order
    pub resolved: Vec<ResolvedMedicine>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    pub fn resolved_ids(&self) -> Vec<MedicineId> {
        self.resolved.iter().map(|m| m.id).collect()
    }

    pub fn name_of(&self, id: MedicineId) -> Option<&str> {
        self.resolved
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.name.as_str())
    }

    /// Raw tokens that matched nothing
    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.matches
            .iter()
            .filter(|m| m.matched.is_none())
            .map(|m| m.raw.as_str())
    }

    fn push(&mut self, token: TokenMatch) {
        if let Some(found) = &token.matched {
            if !self.resolved.iter().any(|m| m.id == found.id) {
                self.resolved.push(found.clone());
            }
        }
        self.matches.push(token);
    }
}

#[derive(Debug, Clone)]
pub struct MedicineResolver {
    threshold: f64,
    candidate_floor: f64,
    candidate_limit: usize,
}

impl Default for MedicineResolver {
    fn default() -> Self {
        Self::new(&MatchingSettings::default())
    }
}

impl MedicineResolver {
    pub fn new(settings: &MatchingSettings) -> Self {
        Self {
            threshold: settings.threshold,
            candidate_floor: settings.candidate_floor,
            candidate_limit: settings.candidate_limit,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Resolve every token against one snapshot. Tokens that normalize to an
    /// empty key are skipped.
    pub async fn resolve(
        &self,
        snapshot: &mut dyn SnapshotTx,
        tokens: &[String],
    ) -> SearchResult<Resolution> {
        let mut resolution = Resolution::default();

        for raw in tokens {
            let key = normalize(raw);
            if key.is_empty() {
                continue;
            }

            let mut candidates = snapshot
                .medicine_candidates(&key, self.candidate_floor, self.candidate_limit)
                .await?;
            let mut matched = best_match(&key, &candidates, self.threshold);

            let widened = matched.as_ref().map_or(true, |m| m.score < 1.0);
            if widened {
                let bar = matched.as_ref().map_or(self.threshold, |m| m.score);
                let (min_chars, max_chars) = key_length_band(key.chars().count(), bar);
                for medicine in snapshot.medicines_by_key_length(min_chars, max_chars).await? {
                    if !candidates.iter().any(|c| c.id == medicine.id) {
                        candidates.push(medicine);
                    }
                }
                matched = best_match(&key, &candidates, self.threshold);
            }

            debug!(
                key = %key,
                candidates = candidates.len(),
                widened,
                matched = matched.as_ref().map(|m| m.name.as_str()),
                score = matched.as_ref().map(|m| m.score),
                "Resolved token"
            );

            resolution.push(TokenMatch {
                raw: raw.clone(),
                key,
                matched,
            });
        }

        Ok(resolution)
    }
}

/// Inclusive range of key lengths, in chars, that can score at least
/// `threshold` against a key of `key_chars` chars.
///
/// Edit distance is at least the length difference, so a name of `n` chars
/// scores at most `1 - |k - n| / max(k, n)`, which reaches `threshold` only
/// when `threshold * k <= n <= k / threshold`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn key_length_band(key_chars: usize, threshold: f64) -> (usize, usize) {
    if threshold.is_nan() || threshold <= 0.0 {
        return (0, usize::MAX);
    }
    let threshold = threshold.min(1.0);
    let k = key_chars as f64;
    // Float error may only widen the band.
    let min = (threshold * k - 1e-9).ceil().max(0.0) as usize;
    let max = (k / threshold + 1e-9).floor() as usize;
    (min, max)
}

/// Best similarity of `key` to any name of `medicine`, with the name that
/// produced it. Names are normalized before comparison.
pub fn score(key: &str, medicine: &Medicine) -> (f64, String) {
    let mut best = (0.0, medicine.name.clone());
    for name in medicine.names() {
        let similarity = normalized_levenshtein(key, &normalize(name));
        if similarity > best.0 {
            best = (similarity, name.to_string());
        }
    }
    best
}

/// Highest-scoring candidate at or above `threshold`.
///
/// Equal scores prefer the shorter canonical name, then the lexicographically
/// smaller one, then the smaller id, so the result does not depend on
/// candidate order.
pub fn best_match(key: &str, candidates: &[Medicine], threshold: f64) -> Option<ResolvedMedicine> {
    candidates
        .iter()
        .map(|medicine| {
            let (score, matched_via) = score(key, medicine);
            ResolvedMedicine {
                id: medicine.id,
                name: medicine.name.clone(),
                score,
                matched_via,
            }
        })
        .filter(|m| m.score >= threshold)
        .min_by(preference)
}

fn preference(a: &ResolvedMedicine, b: &ResolvedMedicine) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.name.chars().count().cmp(&b.name.chars().count()))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn medicine(n: u128, name: &str, aliases: &[&str]) -> Medicine {
        Medicine {
            id: MedicineId(Uuid::from_u128(n)),
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn catalog() -> Vec<Medicine> {
        vec![
            medicine(1, "Парацетамол", &["Paracetamol"]),
            medicine(2, "ТайлолХот", &[]),
            medicine(3, "Тримол", &[]),
        ]
    }

    #[test]
    fn test_exact_name_scores_one() {
        for threshold in [0.1, 0.5, 0.8, 0.99] {
            let found = best_match("тримол", &catalog(), threshold).unwrap();
            assert_eq!(found.name, "Тримол");
            assert_eq!(found.score, 1.0);
        }
    }

    #[test]
    fn test_misspelling_within_threshold() {
        let found = best_match("парацетомол", &catalog(), 0.8).unwrap();
        assert_eq!(found.name, "Парацетамол");
        assert!(found.score >= 0.9);
    }

    #[test]
    fn test_far_miss_unresolved() {
        assert!(best_match("несуществующее", &catalog(), 0.8).is_none());
    }

    #[test]
    fn test_alias_match_reports_alias() {
        let found = best_match("paracetamol", &catalog(), 0.8).unwrap();
        assert_eq!(found.name, "Парацетамол");
        assert_eq!(found.matched_via, "Paracetamol");
    }

    #[test]
    fn test_tie_prefers_shorter_then_lexicographic_name() {
        // All three score 2/3 against "тримол".
        let tied = vec![
            medicine(10, "Тримолабв", &[]),
            medicine(11, "Тримак", &[]),
            medicine(12, "Тримаз", &[]),
        ];
        let mut reversed = tied.clone();
        reversed.reverse();

        let a = best_match("тримол", &tied, 0.5).unwrap();
        let b = best_match("тримол", &reversed, 0.5).unwrap();
        assert_eq!(a.name, "Тримаз");
        assert_eq!(a, b);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let found = best_match("парацетомол", &catalog(), 0.8).unwrap();
        assert!(best_match("парацетомол", &catalog(), found.score).is_some());
        assert!(best_match("парацетомол", &catalog(), found.score + 1e-9).is_none());
    }

    #[test]
    fn test_key_length_band() {
        assert_eq!(key_length_band(15, 0.8), (12, 18));
        assert_eq!(key_length_band(12, 0.8), (10, 15));
        assert_eq!(key_length_band(6, 1.0), (6, 6));
        assert_eq!(key_length_band(6, 0.0), (0, usize::MAX));
    }

    #[test]
    fn test_key_length_band_covers_every_name_at_threshold() {
        for name in ["амоксициллинекс", "нурофенэкспрессфорте", "тримол"] {
            let n = name.chars().count();
            // A name reaching 0.8 against some key of length k must lie in the band of k.
            for k in 1..40 {
                let (min, max) = key_length_band(k, 0.8);
                let best_possible = 1.0 - (k.abs_diff(n) as f64) / (k.max(n) as f64);
                if best_possible >= 0.8 {
                    assert!((min..=max).contains(&n), "k={} n={}", k, n);
                }
            }
        }
    }

    #[test]
    fn test_resolution_deduplicates_in_first_seen_order() {
        let mut resolution = Resolution::default();
        for (raw, id) in [("тримол", Some(3)), ("хз", None), ("Тримол", Some(3)), ("тайлолхот", Some(2))] {
            resolution.push(TokenMatch {
                raw: raw.to_string(),
                key: normalize(raw),
                matched: id.map(|n| ResolvedMedicine {
                    id: MedicineId(Uuid::from_u128(n)),
                    name: raw.to_string(),
                    score: 1.0,
                    matched_via: raw.to_string(),
                }),
            });
        }

        assert_eq!(
            resolution.resolved_ids(),
            vec![MedicineId(Uuid::from_u128(3)), MedicineId(Uuid::from_u128(2))]
        );
        assert_eq!(resolution.unresolved().collect::<Vec<_>>(), vec!["хз"]);
        assert_eq!(resolution.matches.len(), 4);
    }
}
