//! JSON shapes of the published election artifacts.
//!
//! Every number that is a group element, exponent, challenge or response is a
//! decimal string on the wire. The records are converted into the types of
//! [`crate::election`] exactly once, and a malformed string fails the
//! conversion with [`Error::MalformedNumber`] naming its JSON path.
use crate::{
    election::{
        Answer, Ballot, Election, ElectionResult, PartialDecryption, Proof, Question, Signature,
    },
    error::Error,
    helper::Helper,
    types::{Cipher, GroupParameters},
};
use core::convert::TryFrom;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct GroupRecord {
    pub g: String,
    pub p: String,
    pub q: String,
}

#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct PublicKeyRecord {
    pub group: GroupRecord,
    pub y: String,
}

#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct QuestionRecord {
    pub answers: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub blank: bool,
    pub min: usize,
    pub max: usize,
    pub question: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct ElectionRecord {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub name: String,
    pub public_key: PublicKeyRecord,
    pub questions: Vec<QuestionRecord>,
    pub uuid: String,
    #[serde(default)]
    pub administrator: String,
    #[serde(default)]
    pub credential_authority: String,
}

#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct CipherRecord {
    pub alpha: String,
    pub beta: String,
}

#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct ProofRecord {
    pub challenge: String,
    pub response: String,
}

#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct AnswerRecord {
    pub choices: Vec<CipherRecord>,
    pub individual_proofs: Vec<Vec<ProofRecord>>,
    pub overall_proof: Vec<ProofRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blank_proof: Option<Vec<ProofRecord>>,
}

#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct SignatureRecord {
    pub public_key: String,
    pub challenge: String,
    pub response: String,
}

#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct BallotRecord {
    pub answers: Vec<AnswerRecord>,
    pub election_hash: String,
    pub election_uuid: String,
    pub signature: SignatureRecord,
}

#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct PartialDecryptionRecord {
    pub decryption_factors: Vec<Vec<String>>,
    pub decryption_proofs: Vec<Vec<ProofRecord>>,
}

#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct ResultRecord {
    pub num_tallied: usize,
    pub encrypted_tally: Vec<Vec<CipherRecord>>,
    pub partial_decryptions: Vec<PartialDecryptionRecord>,
    pub result: Vec<Vec<u64>>,
}

fn cipher(record: &CipherRecord, path: &str) -> Result<Cipher, Error> {
    Ok(Cipher {
        alpha: Helper::parse_int(&format!("{}.alpha", path), &record.alpha)?,
        beta: Helper::parse_int(&format!("{}.beta", path), &record.beta)?,
    })
}

fn proof(record: &ProofRecord, path: &str) -> Result<Proof, Error> {
    Ok(Proof {
        challenge: Helper::parse_int(&format!("{}.challenge", path), &record.challenge)?,
        response: Helper::parse_int(&format!("{}.response", path), &record.response)?,
    })
}

fn proofs(records: &[ProofRecord], path: &str) -> Result<Vec<Proof>, Error> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| proof(record, &format!("{}[{}]", path, i)))
        .collect()
}

impl TryFrom<&ElectionRecord> for Election {
    type Error = Error;

    /// Parses the group parameters and checks them with [`Election::validate`].
    fn try_from(record: &ElectionRecord) -> Result<Self, Self::Error> {
        let group = &record.public_key.group;
        let params = GroupParameters {
            p: Helper::parse_int("public_key.group.p", &group.p)?,
            q: Helper::parse_int("public_key.group.q", &group.q)?,
            g: Helper::parse_int("public_key.group.g", &group.g)?,
            y: Helper::parse_int("public_key.y", &record.public_key.y)?,
        };
        let questions = record
            .questions
            .iter()
            .map(|q| Question {
                question: q.question.clone(),
                answers: q.answers.clone(),
                blank: q.blank,
                min: q.min,
                max: q.max,
            })
            .collect();

        let election = Election {
            params,
            questions,
            uuid: record.uuid.clone(),
            name: record.name.clone(),
            description: record.description.clone(),
            administrator: record.administrator.clone(),
            credential_authority: record.credential_authority.clone(),
        };
        election.validate()?;
        Ok(election)
    }
}

impl BallotRecord {
    /// Converts the record, prefixing every field path with `path`
    /// (e.g. "ballots[3]") so failures point into the ballots file.
    pub fn parse(&self, path: &str) -> Result<Ballot, Error> {
        let signature = Signature {
            public_key: Helper::parse_int(
                &format!("{}.signature.public_key", path),
                &self.signature.public_key,
            )?,
            challenge: Helper::parse_int(
                &format!("{}.signature.challenge", path),
                &self.signature.challenge,
            )?,
            response: Helper::parse_int(
                &format!("{}.signature.response", path),
                &self.signature.response,
            )?,
        };

        let mut answers = Vec::with_capacity(self.answers.len());
        for (i, answer) in self.answers.iter().enumerate() {
            let path = format!("{}.answers[{}]", path, i);
            let choices = answer
                .choices
                .iter()
                .enumerate()
                .map(|(j, c)| cipher(c, &format!("{}.choices[{}]", path, j)))
                .collect::<Result<Vec<Cipher>, Error>>()?;
            let individual_proofs = answer
                .individual_proofs
                .iter()
                .enumerate()
                .map(|(j, p)| proofs(p, &format!("{}.individual_proofs[{}]", path, j)))
                .collect::<Result<Vec<Vec<Proof>>, Error>>()?;
            let overall_proof = proofs(&answer.overall_proof, &format!("{}.overall_proof", path))?;
            let blank_proof = match &answer.blank_proof {
                Some(p) => Some(proofs(p, &format!("{}.blank_proof", path))?),
                None => None,
            };
            answers.push(Answer {
                choices,
                individual_proofs,
                overall_proof,
                blank_proof,
            });
        }

        Ok(Ballot {
            answers,
            election_uuid: self.election_uuid.clone(),
            election_hash: self.election_hash.clone(),
            signature,
        })
    }
}

impl TryFrom<&BallotRecord> for Ballot {
    type Error = Error;

    fn try_from(record: &BallotRecord) -> Result<Self, Self::Error> {
        record.parse("ballot")
    }
}

impl TryFrom<&ResultRecord> for ElectionResult {
    type Error = Error;

    fn try_from(record: &ResultRecord) -> Result<Self, Self::Error> {
        let encrypted_tally = record
            .encrypted_tally
            .iter()
            .enumerate()
            .map(|(i, question)| {
                question
                    .iter()
                    .enumerate()
                    .map(|(j, c)| cipher(c, &format!("encrypted_tally[{}][{}]", i, j)))
                    .collect::<Result<Vec<Cipher>, Error>>()
            })
            .collect::<Result<Vec<Vec<Cipher>>, Error>>()?;

        let mut partial_decryptions = Vec::with_capacity(record.partial_decryptions.len());
        for (t, partial) in record.partial_decryptions.iter().enumerate() {
            let path = format!("partial_decryptions[{}]", t);
            let mut decryption_factors = Vec::with_capacity(partial.decryption_factors.len());
            for (i, question) in partial.decryption_factors.iter().enumerate() {
                let factors = question
                    .iter()
                    .enumerate()
                    .map(|(j, f)| {
                        Helper::parse_int(&format!("{}.decryption_factors[{}][{}]", path, i, j), f)
                    })
                    .collect::<Result<Vec<_>, Error>>()?;
                decryption_factors.push(factors);
            }
            let decryption_proofs = partial
                .decryption_proofs
                .iter()
                .enumerate()
                .map(|(i, p)| proofs(p, &format!("{}.decryption_proofs[{}]", path, i)))
                .collect::<Result<Vec<Vec<Proof>>, Error>>()?;
            partial_decryptions.push(PartialDecryption {
                decryption_factors,
                decryption_proofs,
            });
        }

        Ok(ElectionResult {
            num_tallied: record.num_tallied,
            encrypted_tally,
            partial_decryptions,
            result: record.result.clone(),
        })
    }
}

impl From<&Cipher> for CipherRecord {
    fn from(cipher: &Cipher) -> Self {
        CipherRecord {
            alpha: cipher.alpha.to_string(),
            beta: cipher.beta.to_string(),
        }
    }
}

impl From<&Proof> for ProofRecord {
    fn from(proof: &Proof) -> Self {
        ProofRecord {
            challenge: proof.challenge.to_string(),
            response: proof.response.to_string(),
        }
    }
}

fn proof_records(proofs: &[Proof]) -> Vec<ProofRecord> {
    proofs.iter().map(ProofRecord::from).collect()
}

impl From<&Election> for ElectionRecord {
    fn from(election: &Election) -> Self {
        let params = &election.params;
        ElectionRecord {
            description: election.description.clone(),
            name: election.name.clone(),
            public_key: PublicKeyRecord {
                group: GroupRecord {
                    g: params.g.to_string(),
                    p: params.p.to_string(),
                    q: params.q.to_string(),
                },
                y: params.y.to_string(),
            },
            questions: election
                .questions
                .iter()
                .map(|q| QuestionRecord {
                    answers: q.answers.clone(),
                    blank: q.blank,
                    min: q.min,
                    max: q.max,
                    question: q.question.clone(),
                })
                .collect(),
            uuid: election.uuid.clone(),
            administrator: election.administrator.clone(),
            credential_authority: election.credential_authority.clone(),
        }
    }
}

impl From<&Ballot> for BallotRecord {
    fn from(ballot: &Ballot) -> Self {
        BallotRecord {
            answers: ballot
                .answers
                .iter()
                .map(|answer| AnswerRecord {
                    choices: answer.choices.iter().map(CipherRecord::from).collect(),
                    individual_proofs: answer
                        .individual_proofs
                        .iter()
                        .map(|p| proof_records(p))
                        .collect(),
                    overall_proof: proof_records(&answer.overall_proof),
                    blank_proof: answer.blank_proof.as_ref().map(|p| proof_records(p)),
                })
                .collect(),
            election_hash: ballot.election_hash.clone(),
            election_uuid: ballot.election_uuid.clone(),
            signature: SignatureRecord {
                public_key: ballot.signature.public_key.to_string(),
                challenge: ballot.signature.challenge.to_string(),
                response: ballot.signature.response.to_string(),
            },
        }
    }
}

impl From<&ElectionResult> for ResultRecord {
    fn from(result: &ElectionResult) -> Self {
        ResultRecord {
            num_tallied: result.num_tallied,
            encrypted_tally: result
                .encrypted_tally
                .iter()
                .map(|question| question.iter().map(CipherRecord::from).collect())
                .collect(),
            partial_decryptions: result
                .partial_decryptions
                .iter()
                .map(|partial| PartialDecryptionRecord {
                    decryption_factors: partial
                        .decryption_factors
                        .iter()
                        .map(|question| question.iter().map(|f| f.to_string()).collect())
                        .collect(),
                    decryption_proofs: partial
                        .decryption_proofs
                        .iter()
                        .map(|p| proof_records(p))
                        .collect(),
                })
                .collect(),
            result: result.result.clone(),
        }
    }
}
