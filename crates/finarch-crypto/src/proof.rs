use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::digest::Sha256Digest;
use crate::hasher::Sha256Hasher;

/// Default number of leading zero hex characters a proof digest must have.
pub const DEFAULT_DIFFICULTY: u8 = 4;

/// How many candidates a worker checks between cancellation polls.
const CANCEL_POLL_INTERVAL: u64 = 1024;

/// Proof-of-work difficulty: required run of leading `'0'` hex characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Difficulty(u8);

impl Difficulty {
    /// Clamp to the 64 hex characters of a SHA-256 digest.
    pub fn new(zeros: u8) -> Self {
        Self(zeros.min(64))
    }

    pub fn zeros(&self) -> u8 {
        self.0
    }

    /// Whether `digest` meets this difficulty.
    pub fn is_met_by(&self, digest: &Sha256Digest) -> bool {
        digest.leading_zero_nibbles() >= u32::from(self.0)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(DEFAULT_DIFFICULTY)
    }
}

/// Digest of a proof attempt: SHA-256 over the decimal text of `last_proof`
/// immediately followed by the decimal text of `proof`.
pub fn proof_digest(last_proof: u64, proof: u64) -> Sha256Digest {
    Sha256Hasher::hash(format!("{last_proof}{proof}").as_bytes())
}

/// Proof-of-work predicate.
///
/// True iff the hex digest of `"{last_proof}{proof}"` starts with
/// `difficulty` zero characters.
pub fn valid_proof(last_proof: u64, proof: u64, difficulty: Difficulty) -> bool {
    difficulty.is_met_by(&proof_digest(last_proof, proof))
}

/// Shared flag used to abort a running proof search.
///
/// Cloning yields a handle to the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Result of a proof search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProofOutcome {
    /// The lowest candidate satisfying the predicate.
    Found(u64),
    /// The search was cancelled before a result could be guaranteed lowest.
    Cancelled,
    /// Every candidate in `[0, u64::MAX)` was checked without success.
    Exhausted,
}

impl ProofOutcome {
    pub fn found(&self) -> Option<u64> {
        match self {
            Self::Found(p) => Some(*p),
            _ => None,
        }
    }
}

/// First-fit proof-of-work search.
///
/// Candidates are tried from zero upward; the result is always the lowest
/// satisfying candidate, whatever the worker count. With more than one worker
/// the candidate space is striped across scoped threads (worker `w` checks
/// `w, w + n, w + 2n, ...`).
#[derive(Clone, Debug)]
pub struct ProofSearch {
    difficulty: Difficulty,
    workers: usize,
}

impl ProofSearch {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            workers: 1,
        }
    }

    /// Use `workers` threads (zero is treated as one).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run the search until a proof is found or `cancel` is raised.
    pub fn run(&self, last_proof: u64, cancel: &CancellationFlag) -> ProofOutcome {
        let outcome = if self.workers == 1 {
            self.run_sequential(last_proof, cancel)
        } else {
            self.run_parallel(last_proof, cancel)
        };
        debug!(
            last_proof,
            workers = self.workers,
            difficulty = self.difficulty.zeros(),
            ?outcome,
            "proof search finished"
        );
        outcome
    }

    fn run_sequential(&self, last_proof: u64, cancel: &CancellationFlag) -> ProofOutcome {
        let mut candidate = 0u64;
        while candidate < u64::MAX {
            if candidate % CANCEL_POLL_INTERVAL == 0 && cancel.is_cancelled() {
                return ProofOutcome::Cancelled;
            }
            if valid_proof(last_proof, candidate, self.difficulty) {
                return ProofOutcome::Found(candidate);
            }
            candidate += 1;
        }
        ProofOutcome::Exhausted
    }

    fn run_parallel(&self, last_proof: u64, cancel: &CancellationFlag) -> ProofOutcome {
        // u64::MAX doubles as "nothing found yet"; it is outside the search space.
        let best = AtomicU64::new(u64::MAX);
        let aborted = AtomicBool::new(false);
        let stride = self.workers as u64;
        let difficulty = self.difficulty;

        std::thread::scope(|scope| {
            for worker in 0..stride {
                let best = &best;
                let aborted = &aborted;
                scope.spawn(move || {
                    let mut candidate = worker;
                    let mut checked = 0u64;
                    // A worker may stop once its next candidate can no longer beat the best.
                    while candidate < best.load(Ordering::Acquire) {
                        if checked % CANCEL_POLL_INTERVAL == 0 && cancel.is_cancelled() {
                            aborted.store(true, Ordering::Release);
                            return;
                        }
                        if valid_proof(last_proof, candidate, difficulty) {
                            best.fetch_min(candidate, Ordering::AcqRel);
                            return;
                        }
                        checked += 1;
                        candidate = match candidate.checked_add(stride) {
                            Some(next) => next,
                            None => return,
                        };
                    }
                });
            }
        });

        if aborted.load(Ordering::Acquire) {
            return ProofOutcome::Cancelled;
        }
        match best.load(Ordering::Acquire) {
            u64::MAX => ProofOutcome::Exhausted,
            proof => ProofOutcome::Found(proof),
        }
    }
}

impl Default for ProofSearch {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn easy() -> Difficulty {
        Difficulty::new(2)
    }

    #[test]
    fn known_proof_for_genesis_seed() {
        let proof = ProofSearch::default()
            .run(100, &CancellationFlag::new())
            .found()
            .unwrap();
        assert!(valid_proof(100, proof, Difficulty::default()));
        let hex = proof_digest(100, proof).to_hex();
        assert!(hex.starts_with("0000"));
    }

    #[test]
    fn search_returns_lowest_candidate() {
        let search = ProofSearch::new(easy());
        for last in [0u64, 7, 100, 12_345] {
            let proof = search.run(last, &CancellationFlag::new()).found().unwrap();
            assert!(valid_proof(last, proof, easy()));
            assert!((0..proof).all(|p| !valid_proof(last, p, easy())));
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let sequential = ProofSearch::new(easy());
        let parallel = ProofSearch::new(easy()).with_workers(4);
        for last in [1u64, 42, 100, 999] {
            let cancel = CancellationFlag::new();
            assert_eq!(sequential.run(last, &cancel), parallel.run(last, &cancel));
        }
    }

    #[test]
    fn pre_cancelled_search_reports_cancelled() {
        let cancel = CancellationFlag::new();
        cancel.cancel();
        assert_eq!(
            ProofSearch::default().run(100, &cancel),
            ProofOutcome::Cancelled
        );
        assert_eq!(
            ProofSearch::default().with_workers(3).run(100, &cancel),
            ProofOutcome::Cancelled
        );
    }

    #[test]
    fn cancellation_from_another_thread_stops_search() {
        // 64 zero nibbles is unreachable; only cancellation can end this search.
        let search = ProofSearch::new(Difficulty::new(64)).with_workers(2);
        let cancel = CancellationFlag::new();
        let handle = {
            let cancel = cancel.clone();
            std::thread::spawn(move || search.run(5, &cancel))
        };
        std::thread::sleep(std::time::Duration::from_millis(20));
        cancel.cancel();
        assert_eq!(handle.join().unwrap(), ProofOutcome::Cancelled);
    }

    #[test]
    fn zero_difficulty_accepts_first_candidate() {
        let proof = ProofSearch::new(Difficulty::new(0))
            .with_workers(4)
            .run(100, &CancellationFlag::new());
        assert_eq!(proof, ProofOutcome::Found(0));
    }

    #[test]
    fn difficulty_is_clamped() {
        assert_eq!(Difficulty::new(200).zeros(), 64);
    }

    #[test]
    fn zero_workers_means_one() {
        assert_eq!(ProofSearch::default().with_workers(0).workers(), 1);
    }

    #[test]
    fn cancellation_flag_clones_share_state() {
        let a = CancellationFlag::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
    }
}
