/// Medicine names the speech model should prefer when a word is ambiguous.
///
/// Rendered as a comma-separated prompt, which is also the separator the query
/// parser splits transcripts on.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainVocabulary {
    terms: Vec<String>,
}

impl Default for DomainVocabulary {
    fn default() -> Self {
        Self::new(["Парацетамол", "ТайлолХот", "Тримол"])
    }
}

impl DomainVocabulary {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocabulary = Self { terms: Vec::new() };
        for term in terms {
            vocabulary.add(term);
        }
        vocabulary
    }

    /// Add a term unless it is blank or already present
    pub fn add(&mut self, term: impl Into<String>) {
        let term = term.into().trim().to_string();
        if !term.is_empty() && !self.terms.iter().any(|t| t.eq_ignore_ascii_case(&term)) {
            self.terms.push(term);
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn prompt(&self) -> String {
        self.terms.join(", ")
    }
}
