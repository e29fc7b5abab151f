//! Nearest-neighbor lookup over the historical corpus
//!
//! Corpus rows are ranked by cosine similarity to the query (ties keep corpus
//! order) and the best three are returned after removing the query's own
//! record.
//!
//! Self-match removal: when the query's id is known, every corpus entry with
//! that id is dropped and nothing else. Only when the id is unknown is the
//! single best match dropped on the assumption that it is the query itself.
//! Dropping rank 1 unconditionally throws away a genuine neighbor whenever
//! the query is a new case that is not in the corpus.

use crate::corpus::{CaseDetails, Corpus};
use crate::features::FeatureVector;
use std::cmp::Ordering;
use tracing::debug;

/// Number of neighbors returned per query
pub const NEIGHBOR_COUNT: usize = 3;

/// One similar historical case
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor<'a> {
    pub id: &'a str,
    pub similarity: f64,
    pub details: Option<&'a CaseDetails>,
}

/// Read-only similarity index over a loaded corpus
#[derive(Debug, Clone, Copy)]
pub struct SimilarityIndex<'a> {
    corpus: &'a Corpus,
}

impl<'a> SimilarityIndex<'a> {
    pub fn new(corpus: &'a Corpus) -> Self {
        Self { corpus }
    }

    /// Up to [`NEIGHBOR_COUNT`] most similar cases, best first
    ///
    /// `self_id` is the query's own case id when known.
    pub fn nearest(&self, query: &FeatureVector, self_id: Option<&str>) -> Vec<Neighbor<'a>> {
        let similarities = self.corpus.similarities(query);
        let ids = self.corpus.ids();

        let mut order: Vec<usize> = (0..similarities.len()).collect();
        // Stable: equal similarities keep corpus order
        order.sort_by(|&a, &b| descending(similarities[a], similarities[b]));

        let skip = match self_id {
            Some(_) => 0,
            None => 1,
        };

        let neighbors: Vec<Neighbor<'a>> = order
            .into_iter()
            .filter(|&i| self_id.map_or(true, |own| ids[i] != own))
            .skip(skip)
            .take(NEIGHBOR_COUNT)
            .map(|i| Neighbor {
                id: ids[i].as_str(),
                similarity: similarities[i],
                details: self.corpus.details(&ids[i]),
            })
            .collect();

        debug!(
            self_id = self_id.unwrap_or("<unknown>"),
            found = neighbors.len(),
            "Similarity lookup complete"
        );
        neighbors
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
