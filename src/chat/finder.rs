use std::collections::HashSet;

use crate::{FunctionDecl, FunctionIndexer};

/// Words that carry no signal about which function is wanted, including the
/// framing words of [`TemplateReflector`](super::TemplateReflector).
const STOPWORDS: &[&str] = &[
    "a", "about", "an", "and", "any", "are", "at", "be", "by", "can", "could", "do", "does", "find",
    "following", "for", "from", "get", "give", "help", "how", "i", "in", "is", "it", "let", "like",
    "me", "my", "of", "on", "or", "please", "right", "show", "tell", "that", "the", "there", "this",
    "to", "want", "way", "what", "when", "where", "which", "will", "with", "would", "you", "your",
];

const NAME_WEIGHT: u32 = 2;
const DESCRIPTION_WEIGHT: u32 = 1;

/// A ranked function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub decl: FunctionDecl,
    pub score: u32,
}

/// Ranks indexed functions against free text by keyword overlap.
///
/// Every distinct query term scores [`NAME_WEIGHT`] when it appears in the
/// function name and [`DESCRIPTION_WEIGHT`] when it appears only in the
/// description.
#[derive(Debug, Clone, Copy)]
pub struct FunctionFinder {
    max_results: usize,
}

impl Default for FunctionFinder {
    fn default() -> Self {
        Self::new(3)
    }
}

impl FunctionFinder {
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Best matches first, ties broken by name. Functions sharing no term
    /// with the query are never returned.
    pub fn find(&self, indexer: &FunctionIndexer, query: &str) -> Vec<Candidate> {
        let query_terms = terms(query);
        if query_terms.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<Candidate> = indexer
            .declarations()
            .filter_map(|decl| {
                let score = score(&query_terms, decl);
                (score > 0).then(|| Candidate {
                    decl: decl.clone(),
                    score,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.decl.name.cmp(&b.decl.name))
        });
        candidates.truncate(self.max_results);
        tracing::debug!(
            query,
            found = ?candidates.iter().map(|c| (&c.decl.name, c.score)).collect::<Vec<_>>(),
            "ranked functions"
        );
        candidates
    }
}

fn score(query: &HashSet<String>, decl: &FunctionDecl) -> u32 {
    let name = terms(&decl.name);
    let description = terms(&decl.description);
    query
        .iter()
        .map(|t| {
            if name.contains(t) {
                NAME_WEIGHT
            } else if description.contains(t) {
                DESCRIPTION_WEIGHT
            } else {
                0
            }
        })
        .sum()
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|w| !w.is_empty() && !STOPWORDS.contains(&w.as_str()))
        .map(|w| stem(&w))
        .collect()
}

/// Crude plural folding: `lodgings` -> `lodging`, `cities` -> `city`.
fn stem(word: &str) -> String {
    if let Some(base) = word.strip_suffix("ies").filter(|b| b.len() > 1) {
        return format!("{base}y");
    }
    match word.strip_suffix('s') {
        Some(base) if base.len() > 2 && !base.ends_with('s') && !base.ends_with('u') => {
            base.to_string()
        }
        _ => word.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decl(name: &str, description: &str) -> FunctionDecl {
        FunctionDecl::new(name, description, json!({}), name)
    }

    #[test]
    fn test_stem() {
        assert_eq!(stem("lodgings"), "lodging");
        assert_eq!(stem("cities"), "city");
        assert_eq!(stem("bus"), "bus");
        assert_eq!(stem("address"), "address");
        assert_eq!(stem("weather"), "weather");
    }

    #[test]
    fn test_terms_drop_stopwords() {
        let t = terms("What is the weather in Paris?");
        assert_eq!(t, HashSet::from(["weather".to_string(), "pari".to_string()]));
    }

    #[test]
    fn test_name_outweighs_description() {
        let q = terms("humidity");
        assert_eq!(score(&q, &decl("humidity", "Fetch the current humidity.")), NAME_WEIGHT);
        assert_eq!(
            score(&q, &decl("feels_like_temperature", "Uses temperature and humidity.")),
            DESCRIPTION_WEIGHT
        );
        assert_eq!(score(&q, &decl("uv_index", "Fetch the UV index.")), 0);
    }

    #[test]
    fn test_plural_query_matches_singular_name() {
        let q = terms("Show me lodgings");
        assert_eq!(score(&q, &decl("get_all_lodgings", "Lodging options.")), NAME_WEIGHT);
    }
}
