use crate::{
    error::Error,
    types::{Cipher, GroupParameters},
};
use num_bigint::BigUint;
use num_traits::{One, Zero};

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Question {
    pub question: String,
    pub answers: Vec<String>,
    pub blank: bool,
    pub min: usize,
    pub max: usize,
}

impl Question {
    /// Number of cipher slots an answer to this question carries:
    /// the blank slot (if any) first, then one slot per answer.
    pub fn slots(&self) -> usize {
        self.answers.len() + if self.blank { 1 } else { 0 }
    }

    /// Number of (challenge, response) pairs in the overall proof.
    pub fn overall_proof_len(&self) -> usize {
        self.max - self.min + 1 + if self.blank { 1 } else { 0 }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Election {
    pub params: GroupParameters,
    pub questions: Vec<Question>,
    pub uuid: String,
    pub name: String,
    pub description: String,
    pub administrator: String,
    pub credential_authority: String,
}

impl Election {
    /// Checks the group parameters and question bounds.
    pub fn validate(&self) -> Result<(), Error> {
        let malformed = |reason: String| Err(Error::MalformedElection { reason });
        let params = &self.params;

        if params.p <= BigUint::one() {
            return malformed(format!("modulus p = {} is too small", params.p));
        }
        if params.q.is_zero() {
            return malformed("subgroup order q is zero".to_string());
        }
        if !params.is_element(&params.g) {
            return malformed(format!("generator g = {} is not in Z*_p", params.g));
        }
        if !params.is_element(&params.y) {
            return malformed(format!("public key y = {} is not in Z*_p", params.y));
        }
        for (index, question) in self.questions.iter().enumerate() {
            if question.min > question.max {
                return malformed(format!(
                    "question {}: min {} is greater than max {}",
                    index, question.min, question.max
                ));
            }
            if question.max > question.answers.len() {
                return malformed(format!(
                    "question {}: max {} exceeds its {} answers",
                    index,
                    question.max,
                    question.answers.len()
                ));
            }
            if question.slots() == 0 {
                return malformed(format!("question {} has no answers", index));
            }
        }
        Ok(())
    }
}

/// A Fiat-Shamir (challenge, response) pair.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Proof {
    pub challenge: BigUint,
    pub response: BigUint,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Answer {
    pub choices: Vec<Cipher>,
    // one 2-branch proof (m = 0, m = 1) per choice
    pub individual_proofs: Vec<Vec<Proof>>,
    pub overall_proof: Vec<Proof>,
    // exactly two entries on blank-enabled questions, None otherwise
    pub blank_proof: Option<Vec<Proof>>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Signature {
    pub public_key: BigUint,
    pub challenge: BigUint,
    pub response: BigUint,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Ballot {
    pub answers: Vec<Answer>,
    pub election_uuid: String,
    pub election_hash: String,
    pub signature: Signature,
}

impl Ballot {
    /// The ballot is identified by the public key it was signed with.
    pub fn id(&self) -> String {
        self.signature.public_key.to_string()
    }

    /// Checks that the ballot was cast against this exact election.
    pub fn verify_binding(&self, uuid: &str, fingerprint: &str) -> Result<(), Error> {
        if self.election_uuid != uuid {
            return Err(Error::ElectionMismatch {
                ballot: self.id(),
                field: "election_uuid",
                found: self.election_uuid.clone(),
                expected: uuid.to_string(),
            });
        }
        if self.election_hash != fingerprint {
            return Err(Error::ElectionMismatch {
                ballot: self.id(),
                field: "election_hash",
                found: self.election_hash.clone(),
                expected: fingerprint.to_string(),
            });
        }
        Ok(())
    }

    /// Checks that the ballot has the shape the election prescribes, so that
    /// the verifiers can index choices and proofs without bounds failures.
    ///
    /// - one answer per question
    /// - one cipher per slot, each component in Z*_p
    /// - one 2-branch individual proof per cipher
    /// - max - min + 1 overall proof entries (+1 for the blank slot)
    /// - a 2-entry blank proof iff the question is blank-enabled
    pub fn check_shape(&self, election: &Election) -> Result<(), Error> {
        let malformed = |answer: Option<usize>, reason: String| {
            Err(Error::MalformedBallot {
                ballot: self.id(),
                answer,
                reason,
            })
        };
        let params = &election.params;

        if !params.is_element(&self.signature.public_key) {
            return malformed(None, "signature public key is not in Z*_p".to_string());
        }
        if self.answers.len() != election.questions.len() {
            return malformed(
                None,
                format!(
                    "{} answers for {} questions",
                    self.answers.len(),
                    election.questions.len()
                ),
            );
        }

        for (index, (answer, question)) in
            self.answers.iter().zip(election.questions.iter()).enumerate()
        {
            let at = Some(index);
            if answer.choices.len() != question.slots() {
                return malformed(
                    at,
                    format!(
                        "{} choices, expected {}",
                        answer.choices.len(),
                        question.slots()
                    ),
                );
            }
            let out_of_group = answer
                .choices
                .iter()
                .position(|c| !params.is_element(&c.alpha) || !params.is_element(&c.beta));
            if let Some(choice) = out_of_group {
                return malformed(at, format!("choice {} is not a group element pair", choice));
            }
            if answer.individual_proofs.len() != answer.choices.len()
                || answer.individual_proofs.iter().any(|proof| proof.len() != 2)
            {
                return malformed(
                    at,
                    "expected one 2-branch individual proof per choice".to_string(),
                );
            }
            if answer.overall_proof.len() != question.overall_proof_len() {
                return malformed(
                    at,
                    format!(
                        "{} overall proof entries, expected {}",
                        answer.overall_proof.len(),
                        question.overall_proof_len()
                    ),
                );
            }
            match (&answer.blank_proof, question.blank) {
                (Some(proof), true) if proof.len() == 2 => {}
                (None, false) => {}
                (Some(_), true) => {
                    return malformed(at, "blank proof must have 2 entries".to_string())
                }
                (None, true) => return malformed(at, "missing blank proof".to_string()),
                (Some(_), false) => {
                    return malformed(
                        at,
                        "blank proof on a question without blank choice".to_string(),
                    )
                }
            }
        }
        Ok(())
    }

    /// Every cipher of the ballot, answer by answer, slot by slot.
    pub fn ciphers(&self) -> impl Iterator<Item = &Cipher> {
        self.answers.iter().flat_map(|answer| answer.choices.iter())
    }
}

/// One trustee's contribution to the decryption of the tally.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PartialDecryption {
    // per question, per slot: alpha^x_i
    pub decryption_factors: Vec<Vec<BigUint>>,
    // carried along but not verified
    pub decryption_proofs: Vec<Vec<Proof>>,
}

/// The authority's published outcome: result.json
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ElectionResult {
    // upper bound of any slot count, bounds the discrete-log table
    pub num_tallied: usize,
    pub encrypted_tally: Vec<Vec<Cipher>>,
    pub partial_decryptions: Vec<PartialDecryption>,
    pub result: Vec<Vec<u64>>,
}
