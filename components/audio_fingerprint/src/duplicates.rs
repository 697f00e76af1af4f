use crate::similarity::calculate_similarity;
use crate::types::DuplicateMatch;

/// Default minimum similarity for a corpus entry to count as a duplicate
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.9;

/// Source of previously stored fingerprints to compare against.
///
/// Implementations hand out a consistent snapshot; the finder never locks or
/// versions the underlying collection.
pub trait FingerprintCorpus {
    type TrackId;

    /// Every `(track id, stored hash)` pair currently known
    fn snapshot(&self) -> Vec<(Self::TrackId, String)>;
}

impl<T: Clone> FingerprintCorpus for Vec<(T, String)> {
    type TrackId = T;

    fn snapshot(&self) -> Vec<(T, String)> {
        self.clone()
    }
}

/// Rank corpus entries whose stored hash is at least `threshold` similar to
/// `query_hash`, most similar first.
///
/// Entries without a stored hash are skipped. A corrupt stored hash scores
/// 0.0 and falls out through the threshold like any other miss. Ties keep
/// corpus order.
pub fn find_duplicates<T, H, I>(query_hash: &str, corpus: I, threshold: f64) -> Vec<DuplicateMatch<T>>
where
    H: AsRef<str>,
    I: IntoIterator<Item = (T, H)>,
{
    let mut matches: Vec<DuplicateMatch<T>> = corpus
        .into_iter()
        .filter(|(_, stored)| !stored.as_ref().is_empty())
        .filter_map(|(track_id, stored)| {
            let similarity = calculate_similarity(query_hash, stored.as_ref());
            (similarity >= threshold).then_some(DuplicateMatch {
                track_id,
                similarity,
            })
        })
        .collect();

    // sort_by is stable
    matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    matches
}

/// Duplicate lookups against a fixed corpus accessor
pub struct DuplicateFinder<C> {
    corpus: C,
}

impl<C: FingerprintCorpus> DuplicateFinder<C> {
    pub fn new(corpus: C) -> Self {
        Self { corpus }
    }

    pub fn corpus(&self) -> &C {
        &self.corpus
    }

    /// Snapshot the corpus and rank it against `query_hash`
    pub fn find_duplicates(&self, query_hash: &str, threshold: f64) -> Vec<DuplicateMatch<C::TrackId>> {
        find_duplicates(query_hash, self.corpus.snapshot(), threshold)
    }

    pub fn find_duplicates_default(&self, query_hash: &str) -> Vec<DuplicateMatch<C::TrackId>> {
        self.find_duplicates(query_hash, DEFAULT_SIMILARITY_THRESHOLD)
    }
}
