//! Fuzzy vinyl-existence check against a master/release catalog.
//!
//! The matcher issues one search call, scores the hits locally, and then
//! walks the survivors in score order fetching variants one candidate at a
//! time, stopping at the first vinyl pressing that is not a promo.

use std::future::Future;

use crate_digger_core::{
    CatalogCandidate, CatalogQuery, MatchThresholds, ReleaseVariant, base_title, normalize, score,
};

use crate::error::{DiscogsError, MatchError};
use crate::types::MasterResult;

/// Number of master results requested per lookup.
pub const SEARCH_LIMIT: usize = 10;

/// Read-only access to a master/release catalog.
pub trait CatalogSource: Send + Sync {
    /// Free-text search over master releases, at most `limit` results.
    fn search_masters(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<MasterResult>, DiscogsError>> + Send;

    /// All known pressings of one master.
    fn master_variants(
        &self,
        master_id: u64,
    ) -> impl Future<Output = Result<Vec<ReleaseVariant>, DiscogsError>> + Send;
}

/// The candidate that was accepted and the variant that accepted it.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogMatch {
    pub candidate: CatalogCandidate,
    pub variant: ReleaseVariant,
    /// Album-title score that passed the refinement threshold.
    pub title_score: f64,
}

pub struct CatalogMatcher<S> {
    source: S,
    thresholds: MatchThresholds,
}

impl<S: CatalogSource> CatalogMatcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            thresholds: MatchThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: MatchThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn thresholds(&self) -> MatchThresholds {
        self.thresholds
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Whether a non-promotional vinyl pressing of `artist`/`album` exists.
    pub async fn exists(&self, artist: &str, album: &str) -> Result<bool, MatchError> {
        Ok(self.resolve(artist, album).await?.is_some())
    }

    /// Resolve `artist`/`album` to the first accepted catalog candidate.
    ///
    /// `Ok(None)` means nothing matched. Only transport failures are errors;
    /// a candidate whose data is unusable is skipped.
    pub async fn resolve(&self, artist: &str, album: &str) -> Result<Option<CatalogMatch>, MatchError> {
        self.resolve_query(&CatalogQuery::new(artist, album)).await
    }

    pub async fn resolve_query(&self, query: &CatalogQuery) -> Result<Option<CatalogMatch>, MatchError> {
        let results = match self.source.search_masters(&query.search_text(), SEARCH_LIMIT).await {
            Ok(results) => results,
            Err(e) if e.is_transport() => return Err(MatchError::CatalogUnavailable(e)),
            Err(e) => {
                log::warn!("Unusable catalog search response for {}: {}", query, e);
                return Ok(None);
            }
        };
        if results.is_empty() {
            log::debug!("No catalog results for {}", query);
            return Ok(None);
        }

        let candidates = rank_candidates(query, &results, self.thresholds.coarse);
        log::debug!(
            "{} of {} result(s) passed the coarse filter for {}",
            candidates.len(),
            results.len(),
            query
        );

        let wanted_title = normalize(&base_title(&query.album));
        for candidate in candidates {
            let title_score = score(&wanted_title, &normalize(&candidate.album_title()));
            if title_score < self.thresholds.title {
                log::debug!(
                    "Skipping {} ({:?}): title score {:.3} below {}",
                    candidate.external_id,
                    candidate.raw_title,
                    title_score,
                    self.thresholds.title
                );
                continue;
            }

            let variants = match self.source.master_variants(candidate.external_id).await {
                Ok(variants) => variants,
                Err(e) if e.is_transport() => return Err(MatchError::CatalogUnavailable(e)),
                Err(e) => {
                    log::warn!("Skipping master {}: {}", candidate.external_id, e);
                    continue;
                }
            };

            if let Some(variant) = variants.into_iter().find(ReleaseVariant::is_accepted) {
                log::debug!(
                    "Accepted master {} via {:?} ({})",
                    candidate.external_id,
                    variant.title,
                    variant.format_label
                );
                return Ok(Some(CatalogMatch {
                    candidate,
                    variant,
                    title_score,
                }));
            }
            log::debug!("Master {} has no accepted vinyl pressing", candidate.external_id);
        }

        Ok(None)
    }
}

/// Score search hits against the query and keep those at or above `coarse`,
/// highest first. Ties keep the catalog's order. Only the first
/// [`SEARCH_LIMIT`] hits are considered; hits without an id or title are
/// dropped.
pub fn rank_candidates(
    query: &CatalogQuery,
    results: &[MasterResult],
    coarse: f64,
) -> Vec<CatalogCandidate> {
    let wanted = normalize(&query.search_text());
    let mut candidates: Vec<CatalogCandidate> = results
        .iter()
        .take(SEARCH_LIMIT)
        .filter_map(|r| {
            let (Some(id), Some(title)) = (r.id, r.title.as_deref()) else {
                log::debug!("Dropping search result without id/title: {:?}", r);
                return None;
            };
            Some(CatalogCandidate {
                external_id: id,
                raw_title: title.to_string(),
                similarity_score: score(&wanted, &normalize(title)),
            })
        })
        .filter(|c| c.similarity_score >= coarse)
        .collect();

    // sort_by is stable
    candidates.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
    candidates
}

#[cfg(test)]
#[path = "tests/matcher_tests.rs"]
mod tests;
