//! Token-overlap scoring shared by the retrieval tiers.

/// Closed stop-word list: articles, prepositions and question words that
/// carry no topic on their own.
pub const STOP_WORDS: &[&str] = &[
    "what", "is", "a", "an", "the", "in", "of", "for", "to", "and", "or", "are", "do", "does", "how", "much", "many",
    "good", "bad", "source", "sources",
];

/// Whitespace tokens, lower-cased, in first-seen order without duplicates.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for raw in text.split_whitespace() {
        let token = raw.to_lowercase();
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

/// Query tokens with stop-words removed. Empty means the query is too vague
/// to search.
pub fn keywords(query: &str) -> Vec<String> {
    tokenize(query)
        .into_iter()
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

/// Number of keywords that occur as a substring of the (lower-cased) candidate.
pub fn overlap_score(keywords: &[String], candidate: &str) -> u32 {
    let haystack = candidate.to_lowercase();
    keywords.iter().filter(|kw| haystack.contains(kw.as_str())).count() as u32
}

/// A candidate with its score and original insertion position.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub score: u32,
    pub position: usize,
    pub item: T,
}

/// Orders scored candidates highest first; equal scores keep insertion order.
/// Zero scores are dropped.
pub fn rank<T>(scored: impl IntoIterator<Item = (u32, T)>) -> Vec<Ranked<T>> {
    let mut ranked: Vec<Ranked<T>> = scored
        .into_iter()
        .enumerate()
        .filter(|(_, (score, _))| *score > 0)
        .map(|(position, (score, item))| Ranked { score, position, item })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Free-text search over `candidates`, returning at most `limit` hits.
pub fn search<'a, I>(query: &str, candidates: I, limit: usize) -> Vec<Ranked<&'a str>>
where
    I: IntoIterator<Item = &'a str>,
{
    let keywords = keywords(query);
    if keywords.is_empty() {
        return Vec::new();
    }
    let mut ranked = rank(candidates.into_iter().map(|c| (overlap_score(&keywords, c), c)));
    ranked.truncate(limit);
    ranked
}
