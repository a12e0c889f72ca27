use core::fmt;
use thiserror::Error;

/// The three zero-knowledge proof families carried by a ballot.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum ProofKind {
    Individual,
    Blank,
    Overall,
}

impl fmt::Display for ProofKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProofKind::Individual => "individual",
            ProofKind::Blank => "blank",
            ProofKind::Overall => "overall",
        };
        f.write_str(name)
    }
}

/// Every way an audit can fail.
///
/// All variants are deterministic verdicts over static input: retrying never
/// changes the outcome. Ballots are identified by the public key embedded in
/// their signature, questions/answers/slots by their zero-based index.
#[derive(Error, Clone, Eq, PartialEq, Debug)]
pub enum Error {
    #[error("ballot {ballot} was cast for another election: {field} is {found}, expected {expected}")]
    ElectionMismatch {
        ballot: String,
        field: &'static str,
        found: String,
        expected: String,
    },

    #[error("field {field} is not a decimal integer: {value:?}")]
    MalformedNumber { field: String, value: String },

    #[error("malformed election: {reason}")]
    MalformedElection { reason: String },

    #[error("malformed ballot {ballot} (answer {answer:?}): {reason}")]
    MalformedBallot {
        ballot: String,
        answer: Option<usize>,
        reason: String,
    },

    #[error("malformed result: {reason}")]
    MalformedResult { reason: String },

    #[error("{value} has no inverse modulo the group prime")]
    NotInvertible { value: String },

    #[error("signature of ballot {ballot} is invalid")]
    SignatureInvalid { ballot: String },

    #[error("{kind} proof of ballot {ballot} is invalid (answer {answer}, choice {choice:?})")]
    ProofInvalid {
        kind: ProofKind,
        ballot: String,
        answer: usize,
        choice: Option<usize>,
    },

    #[error("recomputed encrypted tally differs from the published one (question {question}, slot {slot})")]
    TallyMismatch { question: usize, slot: usize },

    #[error("decryption factor does not decrypt to a count within the tallied range (question {question}, slot {slot})")]
    DecryptionFactorInvalid { question: usize, slot: usize },

    #[error("decrypted results do not match the published results\n    decrypted: {computed:?}\n    published: {published:?}")]
    ResultMismatch {
        computed: Vec<Vec<u64>>,
        published: Vec<Vec<u64>>,
    },
}
