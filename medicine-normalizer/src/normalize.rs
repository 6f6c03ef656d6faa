//! Name normalization for medicine matching
//!
//! Transcribed speech arrives with arbitrary casing, stray punctuation and
//! doubled spaces; canonical names carry brand capitalisation ("ТайлолХот").
//! Both sides go through [`normalize`] before they are compared.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonical matching key for one token.
///
/// - NFKC, then Unicode lowercase
/// - Cyrillic letters keep their identity (`й` stays distinct from `и`),
///   except `ё`, which folds to `е`; letters of other scripts lose their
///   diacritics (`é` → `e`)
/// - punctuation and symbols deleted, so `Тайлол-Хот` and `ТайлолХот` agree
/// - whitespace runs collapsed to one space, ends trimmed
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let composed: String = raw.nfkc().collect();
    let lowered = composed.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;

    for c in lowered.chars().flat_map(fold_char) {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if !c.is_alphanumeric() {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    out
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{052F}')
}

fn fold_char(c: char) -> Vec<char> {
    if is_combining_mark(c) {
        return Vec::new();
    }
    if c == 'ё' {
        return vec!['е'];
    }
    if is_cyrillic(c) {
        return vec![c];
    }
    // Compatibility decomposition can surface uppercase forms, hence the lowercase.
    std::iter::once(c)
        .nfkd()
        .filter(|d| !is_combining_mark(*d))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalize every token, dropping the ones that end up empty.
pub fn normalize_tokens<'a, I>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    tokens
        .into_iter()
        .map(normalize)
        .filter(|key| !key.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_casing_and_whitespace() {
        assert_eq!(normalize("  ПАРАЦЕТАМОЛ  "), "парацетамол");
        assert_eq!(normalize("Нурофен \t  Экспресс\n"), "нурофен экспресс");
        assert_eq!(normalize("ТайлолХот"), "тайлолхот");
    }

    #[test]
    fn test_punctuation_stripped() {
        assert_eq!(normalize("Тайлол-Хот."), "тайлолхот");
        assert_eq!(normalize("«Тримол»!"), "тримол");
        assert_eq!(normalize("Нурофен, 200 мг"), "нурофен 200 мг");
    }

    #[test]
    fn test_diacritics_folded() {
        assert_eq!(normalize("Ёлка"), "елка");
        assert_eq!(normalize("Paracétamol"), "paracetamol");
        assert_eq!(normalize("ＡＳＰＩＲＩＮ"), "aspirin");
    }

    #[test]
    fn test_empty_tokens_discarded() {
        let keys = normalize_tokens(["Парацетамол", "  ", "...", "—", "Тримол"]);
        assert_eq!(keys, vec!["парацетамол".to_string(), "тримол".to_string()]);
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(raw in "[a-zA-ZА-Яа-яЁё0-9 ,.;:!?()\\-\t]{0,48}") {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_normalize_idempotent_latin_diacritics(raw in "[a-zA-ZàáâãäåçèéêëìíîïñòóôõöùúûüÀÁÂÃÄÅÇÈÉÊËÑÖÜ ]{0,32}") {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_normalized_has_no_edge_or_double_spaces(raw in "[ a-zА-я,]{0,40}") {
            let key = normalize(&raw);
            prop_assert!(!key.starts_with(' '));
            prop_assert!(!key.ends_with(' '));
            prop_assert!(!key.contains("  "));
        }
    }
}
