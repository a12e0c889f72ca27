//! Drives a complete audit: ballot verification, homomorphic tally,
//! decryption and comparison with the published result.
use crate::{
    decryption::{self, FactorSource, ResultMatrix},
    election::{Ballot, Election, ElectionResult},
    error::Error,
    proofs,
    tally::{self, EncryptedTally},
};
use log::{info, warn};
use rayon::prelude::*;

/// What to do when a ballot fails verification.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum FailurePolicy {
    /// Abort on the first invalid ballot.
    FailFast,
    /// Verify every ballot and report all invalid ones.
    CollectAll,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::FailFast
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct AuditConfig {
    pub policy: FailurePolicy,
    // verify ballots and tally on the rayon thread pool
    pub parallel: bool,
    pub factors: FactorSource,
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Stage {
    VerifyingBallots,
    Tallying,
    Decrypting,
    ComparingResults,
}

/// Receives progress notifications during an audit. May be called from
/// several threads at once when verification runs in parallel.
pub trait Progress: Sync {
    fn stage(&self, _stage: Stage) {}
    fn ballot_verified(&self, _index: usize, _valid: bool) {}
}

/// Ignores every notification.
pub struct NoProgress;

impl Progress for NoProgress {}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct BallotFailure {
    // position of the ballot in the input
    pub index: usize,
    pub error: Error,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AuditReport {
    pub ballots: usize,
    pub failures: Vec<BallotFailure>,
    pub tally: EncryptedTally,
    pub results: ResultMatrix,
}

impl AuditReport {
    /// True if every ballot verified.
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Auditor<'a> {
    election: &'a Election,
    fingerprint: &'a str,
    config: AuditConfig,
    progress: &'a dyn Progress,
}

impl<'a> Auditor<'a> {
    pub fn new(
        election: &'a Election,
        fingerprint: &'a str,
        config: AuditConfig,
        progress: &'a dyn Progress,
    ) -> Self {
        Auditor {
            election,
            fingerprint,
            config,
            progress,
        }
    }

    /// Verifies a single ballot: election binding, signature, blank proofs,
    /// overall proofs and individual proofs, in that order.
    pub fn verify_ballot(&self, ballot: &Ballot) -> Result<(), Error> {
        ballot.verify_binding(&self.election.uuid, self.fingerprint)?;
        proofs::verify_signature(ballot, self.election)?;
        proofs::verify_blank_proof(ballot, self.election)?;
        proofs::verify_overall_proof(ballot, self.election)?;
        proofs::verify_individual_proof(ballot, self.election)?;
        Ok(())
    }

    /// Verifies all ballots according to the failure policy.
    ///
    /// Under `FailFast` the first failure is returned as `Err` (in parallel
    /// mode, any one of the failures). Under `CollectAll` every failure is
    /// returned, ordered by ballot index.
    pub fn verify_ballots(&self, ballots: &[Ballot]) -> Result<Vec<BallotFailure>, Error> {
        match (self.config.policy, self.config.parallel) {
            (FailurePolicy::FailFast, false) => {
                for (index, ballot) in ballots.iter().enumerate() {
                    self.verify_indexed(index, ballot)?;
                }
                Ok(Vec::new())
            }
            (FailurePolicy::FailFast, true) => {
                ballots
                    .par_iter()
                    .enumerate()
                    .try_for_each(|(index, ballot)| self.verify_indexed(index, ballot))?;
                Ok(Vec::new())
            }
            (FailurePolicy::CollectAll, false) => Ok(ballots
                .iter()
                .enumerate()
                .filter_map(|(index, ballot)| self.collect_indexed(index, ballot))
                .collect()),
            (FailurePolicy::CollectAll, true) => Ok(ballots
                .par_iter()
                .enumerate()
                .filter_map(|(index, ballot)| self.collect_indexed(index, ballot))
                .collect()),
        }
    }

    /// Runs the whole audit. Every ballot enters the tally, including those
    /// that failed verification under `CollectAll`: the published tally is
    /// computed over all cast ballots.
    pub fn audit(
        &self,
        ballots: &[Ballot],
        result: &ElectionResult,
    ) -> Result<AuditReport, Error> {
        self.progress.stage(Stage::VerifyingBallots);
        info!("verifying {} ballots", ballots.len());
        let failures = self.verify_ballots(ballots)?;
        if !failures.is_empty() {
            warn!("{} of {} ballots are invalid", failures.len(), ballots.len());
        }

        self.progress.stage(Stage::Tallying);
        info!("computing the encrypted tally");
        let tally = if self.config.parallel {
            tally::tally_parallel(self.election, ballots)?
        } else {
            tally::tally(self.election, ballots)?
        };

        // bounds the discrete-log table built during decryption
        if result.num_tallied > ballots.len() {
            return Err(Error::MalformedResult {
                reason: format!(
                    "{} tallied ballots claimed, {} published",
                    result.num_tallied,
                    ballots.len()
                ),
            });
        }

        self.progress.stage(Stage::Decrypting);
        info!("decrypting the tally");
        let results =
            decryption::decrypt_with(self.election, result, &tally, self.config.factors)?;

        self.progress.stage(Stage::ComparingResults);
        decryption::verify_decrypted_results(&results, &result.result)?;
        info!("decrypted results match the published results");

        Ok(AuditReport {
            ballots: ballots.len(),
            failures,
            tally,
            results,
        })
    }

    fn verify_indexed(&self, index: usize, ballot: &Ballot) -> Result<(), Error> {
        let outcome = self.verify_ballot(ballot);
        self.progress.ballot_verified(index, outcome.is_ok());
        outcome
    }

    fn collect_indexed(&self, index: usize, ballot: &Ballot) -> Option<BallotFailure> {
        match self.verify_indexed(index, ballot) {
            Ok(()) => None,
            Err(error) => {
                warn!("ballot #{} is invalid: {}", index, error);
                Some(BallotFailure { index, error })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AuditConfig, Auditor, FailurePolicy, NoProgress, Progress, Stage};
    use crate::{
        decryption::FactorSource,
        error::{Error, ProofKind},
        fixtures::Fixture,
    };
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    #[derive(Default)]
    struct Recorder {
        verified: AtomicUsize,
        invalid: AtomicUsize,
        stages: Mutex<Vec<Stage>>,
    }

    impl Progress for Recorder {
        fn stage(&self, stage: Stage) {
            self.stages.lock().unwrap().push(stage);
        }

        fn ballot_verified(&self, _index: usize, valid: bool) {
            self.verified.fetch_add(1, Ordering::SeqCst);
            if !valid {
                self.invalid.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn collect_all(parallel: bool) -> AuditConfig {
        AuditConfig {
            policy: FailurePolicy::CollectAll,
            parallel,
            factors: FactorSource::FirstTrustee,
        }
    }

    #[test]
    fn it_should_default_to_fail_fast_sequential_first_trustee() {
        let config = AuditConfig::default();
        assert_eq!(config.policy, FailurePolicy::FailFast);
        assert!(!config.parallel);
        assert_eq!(config.factors, FactorSource::FirstTrustee);
    }

    #[test]
    fn it_should_verify_every_fixture_ballot() {
        let fixture = Fixture::standard();
        let auditor = Auditor::new(
            &fixture.election,
            &fixture.fingerprint,
            AuditConfig::default(),
            &NoProgress,
        );
        for ballot in fixture.ballots.iter() {
            assert_eq!(auditor.verify_ballot(ballot), Ok(()));
        }
    }

    #[test]
    fn it_should_check_the_binding_before_the_signature() {
        let fixture = Fixture::standard();
        let auditor = Auditor::new(
            &fixture.election,
            &fixture.fingerprint,
            AuditConfig::default(),
            &NoProgress,
        );
        let mut ballot = fixture.ballots[0].clone();
        ballot.election_uuid = "another-uuid".to_string();
        ballot.signature.response += 1u32;

        let result = auditor.verify_ballot(&ballot);
        assert!(matches!(result, Err(Error::ElectionMismatch { .. })));
    }

    #[test]
    fn it_should_check_the_blank_proof_before_the_individual_proofs() {
        let fixture = Fixture::standard();
        let auditor = Auditor::new(
            &fixture.election,
            &fixture.fingerprint,
            AuditConfig::default(),
            &NoProgress,
        );
        let mut ballot = fixture.ballots[0].clone();
        ballot.answers[0].individual_proofs[0][0].response += 1u32;
        if let Some(proof) = ballot.answers[0].blank_proof.as_mut() {
            proof[1].response += 1u32;
        }

        let result = auditor.verify_ballot(&ballot);
        assert!(matches!(
            result,
            Err(Error::ProofInvalid {
                kind: ProofKind::Blank,
                ..
            })
        ));
    }

    #[test]
    fn it_should_stop_at_the_first_failure() {
        let fixture = Fixture::standard();
        let recorder = Recorder::default();
        let auditor = Auditor::new(
            &fixture.election,
            &fixture.fingerprint,
            AuditConfig::default(),
            &recorder,
        );
        let mut ballots = fixture.ballots.clone();
        ballots[1].signature.challenge += 1u32;
        ballots[3].signature.challenge += 1u32;

        let result = auditor.verify_ballots(&ballots);
        assert_eq!(
            result,
            Err(Error::SignatureInvalid {
                ballot: ballots[1].id()
            })
        );
        assert_eq!(recorder.verified.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn it_should_collect_all_failures() {
        let fixture = Fixture::standard();
        let mut ballots = fixture.ballots.clone();
        ballots[1].signature.challenge += 1u32;
        ballots[3].answers[2].overall_proof[0].challenge += 1u32;

        for parallel in [false, true].iter() {
            let recorder = Recorder::default();
            let auditor = Auditor::new(
                &fixture.election,
                &fixture.fingerprint,
                collect_all(*parallel),
                &recorder,
            );
            let failures = auditor.verify_ballots(&ballots).unwrap();

            let indices: Vec<usize> = failures.iter().map(|f| f.index).collect();
            assert_eq!(indices, vec![1, 3]);
            assert!(matches!(failures[0].error, Error::SignatureInvalid { .. }));
            assert!(matches!(
                failures[1].error,
                Error::ProofInvalid {
                    kind: ProofKind::Overall,
                    answer: 2,
                    ..
                }
            ));
            assert_eq!(recorder.verified.load(Ordering::SeqCst), 5);
            assert_eq!(recorder.invalid.load(Ordering::SeqCst), 2);
        }
    }

    #[test]
    fn it_should_fail_fast_in_parallel() {
        let fixture = Fixture::standard();
        let config = AuditConfig {
            parallel: true,
            ..AuditConfig::default()
        };
        let auditor = Auditor::new(&fixture.election, &fixture.fingerprint, config, &NoProgress);
        let mut ballots = fixture.ballots.clone();
        ballots[4].signature.challenge += 1u32;

        let result = auditor.verify_ballots(&ballots);
        assert!(matches!(result, Err(Error::SignatureInvalid { .. })));
        assert_eq!(auditor.verify_ballots(&fixture.ballots), Ok(Vec::new()));
    }

    #[test]
    fn it_should_audit_the_fixture_election() {
        let fixture = Fixture::standard();
        let recorder = Recorder::default();
        let auditor = Auditor::new(
            &fixture.election,
            &fixture.fingerprint,
            AuditConfig::default(),
            &recorder,
        );

        let report = auditor.audit(&fixture.ballots, &fixture.result).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.ballots, 5);
        assert_eq!(report.results, fixture.expected);
        assert_eq!(report.tally.ciphers, fixture.result.encrypted_tally);
        assert_eq!(
            *recorder.stages.lock().unwrap(),
            vec![
                Stage::VerifyingBallots,
                Stage::Tallying,
                Stage::Decrypting,
                Stage::ComparingResults
            ]
        );
    }

    #[test]
    fn it_should_audit_in_parallel_with_combined_trustees() {
        let fixture = Fixture::new(Fixture::standard_questions(), &Fixture::standard_votes(), 3);
        let config = AuditConfig {
            policy: FailurePolicy::CollectAll,
            parallel: true,
            factors: FactorSource::AllTrustees,
        };
        let auditor = Auditor::new(&fixture.election, &fixture.fingerprint, config, &NoProgress);

        let report = auditor.audit(&fixture.ballots, &fixture.result).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.results, fixture.expected);
    }

    #[test]
    fn it_should_report_invalid_ballots_and_still_decrypt() {
        let fixture = Fixture::standard();
        let auditor = Auditor::new(
            &fixture.election,
            &fixture.fingerprint,
            collect_all(false),
            &NoProgress,
        );
        let mut ballots = fixture.ballots.clone();
        ballots[2].signature.response += 1u32;

        let report = auditor.audit(&ballots, &fixture.result).unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 2);
        assert_eq!(report.results, fixture.expected);
    }

    #[test]
    fn it_should_refuse_more_tallied_ballots_than_published() {
        let fixture = Fixture::standard();
        let recorder = Recorder::default();
        let auditor = Auditor::new(
            &fixture.election,
            &fixture.fingerprint,
            AuditConfig::default(),
            &recorder,
        );
        let mut result = fixture.result.clone();
        result.num_tallied = 1_000_000_000_000;

        let outcome = auditor.audit(&fixture.ballots, &result);
        assert_eq!(
            outcome,
            Err(Error::MalformedResult {
                reason: "1000000000000 tallied ballots claimed, 5 published".to_string(),
            })
        );
        assert!(!recorder.stages.lock().unwrap().contains(&Stage::Decrypting));
    }

    #[test]
    fn it_should_detect_a_count_above_the_tallied_ballots() {
        let fixture = Fixture::standard();
        let auditor = Auditor::new(
            &fixture.election,
            &fixture.fingerprint,
            AuditConfig::default(),
            &NoProgress,
        );
        let mut result = fixture.result.clone();
        result.num_tallied = 1;

        let outcome = auditor.audit(&fixture.ballots, &result);
        assert!(matches!(
            outcome,
            Err(Error::DecryptionFactorInvalid { .. })
        ));
    }

    #[test]
    fn it_should_detect_a_modified_published_result() {
        let fixture = Fixture::standard();
        let auditor = Auditor::new(
            &fixture.election,
            &fixture.fingerprint,
            AuditConfig::default(),
            &NoProgress,
        );
        let mut result = fixture.result.clone();
        result.result[1][0] += 1;

        let outcome = auditor.audit(&fixture.ballots, &result);
        assert_eq!(
            outcome,
            Err(Error::ResultMismatch {
                computed: fixture.expected.clone(),
                published: result.result.clone(),
            })
        );
    }

    #[test]
    fn it_should_detect_a_missing_ballot() {
        let fixture = Fixture::standard();
        let auditor = Auditor::new(
            &fixture.election,
            &fixture.fingerprint,
            AuditConfig::default(),
            &NoProgress,
        );

        let outcome = auditor.audit(&fixture.ballots[1..], &fixture.result);
        assert!(matches!(outcome, Err(Error::TallyMismatch { .. })));
    }
}
