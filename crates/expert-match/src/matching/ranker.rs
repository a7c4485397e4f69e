use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{BriefId, BriefRequirements, CandidateProfile, MatchingRun, RunId};
use super::repository::{MarketplaceStore, MatchStoreError, MatchingRunStore};
use super::scoring::{MatchCandidateResult, ScoringEngine};
use super::settings::MatchSettings;

/// Pools at or above this size are scored on a bounded worker fan-out.
const PARALLEL_POOL_THRESHOLD: usize = 32;

/// Worker bound for the scoring fan-out. Scores are pure functions of
/// immutable inputs, so the workers share nothing.
const SCORING_WORKERS: usize = 4;

static RUN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_run_id() -> RunId {
    let id = RUN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RunId(format!("run-{id:06}"))
}

/// Caller-supplied knobs for one ranking invocation.
///
/// `widen` signals that a prior run returned too few results and the caller
/// is re-running with a lowered `min_score`; the engine records the flag for
/// audit but never relaxes the threshold itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankOptions {
    pub min_score: f64,
    pub max_results: usize,
    pub widen: bool,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            min_score: 0.65,
            max_results: 5,
            widen: false,
        }
    }
}

/// Whether the run actually evaluated a pool or hit the missing-brief
/// marker. Downstream callers treat both empty cases identically; logs do
/// not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankDisposition {
    Ranked,
    BriefMissing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankMetadata {
    pub disposition: RankDisposition,
    pub pool_size: usize,
    pub min_score: f64,
    pub widened: bool,
    pub run_id: Option<RunId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankOutcome {
    pub candidates: Vec<MatchCandidateResult>,
    pub metadata: RankMetadata,
}

impl RankOutcome {
    fn brief_missing(options: RankOptions) -> Self {
        Self {
            candidates: Vec::new(),
            metadata: RankMetadata {
                disposition: RankDisposition::BriefMissing,
                pool_size: 0,
                min_score: options.min_score,
                widened: options.widen,
                run_id: None,
            },
        }
    }
}

/// Runs the scoring engine over the full candidate pool for a brief and
/// persists one audit record per invocation against an existing brief.
pub struct CandidateRanker<M, R> {
    marketplace: Arc<M>,
    runs: Arc<R>,
    engine: ScoringEngine,
}

impl<M, R> CandidateRanker<M, R>
where
    M: MarketplaceStore + 'static,
    R: MatchingRunStore + 'static,
{
    pub fn new(marketplace: Arc<M>, runs: Arc<R>, settings: MatchSettings) -> Self {
        Self {
            marketplace,
            runs,
            engine: ScoringEngine::new(settings),
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn rank(
        &self,
        brief_id: &BriefId,
        options: RankOptions,
        now: DateTime<Utc>,
    ) -> Result<RankOutcome, MatchStoreError> {
        let Some(brief) = self.marketplace.brief(brief_id)? else {
            // Deliberately not an error: callers treat this the same as a
            // zero-candidate run, but the log must make the case distinct.
            warn!(brief_id = %brief_id.0, "brief not found for matching run");
            return Ok(RankOutcome::brief_missing(options));
        };

        let requirements = BriefRequirements::parse(&brief);
        let pool = self.marketplace.candidates()?;
        let pool_size = pool.len();

        let mut qualified = self.score_pool(&requirements, &pool);
        qualified.retain(|result| result.score >= options.min_score);
        qualified.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.expert_id.cmp(&b.expert_id))
        });
        qualified.truncate(options.max_results);

        let run = self.runs.append(MatchingRun {
            id: next_run_id(),
            brief_id: brief.id.clone(),
            min_score: options.min_score,
            weights: self.engine.settings().weights,
            cert_boost: self.engine.settings().cert_boost,
            pool_size,
            result_count: qualified.len(),
            widened: options.widen,
            created_at: now,
        })?;

        info!(
            brief_id = %brief.id.0,
            run_id = %run.id.0,
            pool_size,
            result_count = qualified.len(),
            widened = options.widen,
            "matching run recorded"
        );

        Ok(RankOutcome {
            candidates: qualified,
            metadata: RankMetadata {
                disposition: RankDisposition::Ranked,
                pool_size,
                min_score: options.min_score,
                widened: options.widen,
                run_id: Some(run.id),
            },
        })
    }

    fn score_pool(
        &self,
        requirements: &BriefRequirements,
        pool: &[CandidateProfile],
    ) -> Vec<MatchCandidateResult> {
        if pool.len() < PARALLEL_POOL_THRESHOLD {
            return pool
                .iter()
                .map(|candidate| self.engine.result_for(requirements, candidate))
                .collect();
        }

        debug!(pool_size = pool.len(), workers = SCORING_WORKERS, "scoring pool concurrently");

        let chunk_size = pool.len().div_ceil(SCORING_WORKERS);
        std::thread::scope(|scope| {
            let handles: Vec<_> = pool
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|candidate| self.engine.result_for(requirements, candidate))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| handle.join().expect("scoring worker panicked"))
                .collect()
        })
    }
}
