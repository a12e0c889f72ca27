//! Fabricates a complete, honest election for tests and benchmarks: the
//! election, voter ballots with valid signatures and proofs, and the
//! authority's published result.
use crate::{
    election::{
        Answer, Ballot, Election, ElectionResult, PartialDecryption, Proof, Question, Signature,
    },
    encryption::{DiscreteLogTable, ElGamal},
    helper::Helper,
    proofs::{commit_inverse, commit_multiplicative, remove_message},
    random::Random,
    records::ElectionRecord,
    types::{Cipher, GroupParameters, ModuloOperations},
};
use num_bigint::BigUint;
use num_traits::Zero;

// safe prime p = 2q + 1, g = 2^2 generates the subgroup of order q
const P: &str = "170141183460469231731687303716131020419";
const Q: &str = "85070591730234615865843651858065510209";
const G: u32 = 4;

pub struct Fixture {
    pub election: Election,
    pub election_json: String,
    pub fingerprint: String,
    // x = sum of the trustee keys mod q
    pub secret_key: BigUint,
    pub trustee_keys: Vec<BigUint>,
    pub ballots: Vec<Ballot>,
    pub result: ElectionResult,
    pub expected: Vec<Vec<u64>>,
}

impl Fixture {
    /// Four questions, the first one with a blank choice, five voters of
    /// which the third votes blank, a single trustee.
    pub fn standard() -> Self {
        Self::new(Self::standard_questions(), &Self::standard_votes(), 1)
    }

    pub fn standard_questions() -> Vec<Question> {
        let question = |text: &str, answers: &[&str], blank: bool, min: usize, max: usize| {
            Question {
                question: text.to_string(),
                answers: answers.iter().map(|a| a.to_string()).collect(),
                blank,
                min,
                max,
            }
        };
        vec![
            question("Chair of the board?", &["Alice", "Bob", "Carol"], true, 1, 1),
            question("Approve the budget?", &["Yes", "No"], false, 1, 1),
            question("Working groups?", &["Finance", "Events", "Outreach"], false, 0, 2),
            question("Meeting days?", &["Tuesday", "Thursday"], false, 1, 2),
        ]
    }

    /// Per voter, per question, per slot: 0 or 1. The blank slot comes first.
    pub fn standard_votes() -> Vec<Vec<Vec<u64>>> {
        vec![
            vec![vec![0, 1, 0, 0], vec![1, 0], vec![1, 1, 0], vec![1, 1]],
            vec![vec![0, 0, 1, 0], vec![0, 1], vec![0, 0, 0], vec![0, 1]],
            vec![vec![1, 0, 0, 0], vec![1, 0], vec![0, 1, 1], vec![1, 0]],
            vec![vec![0, 1, 0, 0], vec![1, 0], vec![1, 0, 0], vec![1, 1]],
            vec![vec![0, 0, 0, 1], vec![0, 1], vec![0, 0, 1], vec![0, 1]],
        ]
    }

    /// Sets up an election whose key is shared by `trustees` trustees, casts
    /// one ballot per vote and publishes the decrypted result.
    pub fn new(questions: Vec<Question>, votes: &[Vec<Vec<u64>>], trustees: usize) -> Self {
        assert!(trustees > 0, "at least one trustee is required!");
        let p = BigUint::parse_bytes(P.as_bytes(), 10).expect("valid modulus");
        let q = BigUint::parse_bytes(Q.as_bytes(), 10).expect("valid order");
        let g = BigUint::from(G);

        let trustee_keys: Vec<BigUint> =
            (0..trustees).map(|_| Random::get_random_exponent(&q)).collect();
        let secret_key = trustee_keys
            .iter()
            .fold(BigUint::zero(), |acc, key| acc.modadd(key, &q));
        let y = g.modpow(&secret_key, &p);

        let election = Election {
            params: GroupParameters { p, q, g, y },
            questions,
            uuid: "8fJz4mKqW2nTbx".to_string(),
            name: "Board 2024".to_string(),
            description: "Annual board election".to_string(),
            administrator: "Board secretary".to_string(),
            credential_authority: "Registry".to_string(),
        };
        let election_json =
            serde_json::to_string(&ElectionRecord::from(&election)).expect("serializable");
        let fingerprint = Helper::fingerprint(election_json.as_bytes());

        let expected: Vec<Vec<u64>> = election
            .questions
            .iter()
            .enumerate()
            .map(|(i, question)| {
                (0..question.slots())
                    .map(|j| votes.iter().map(|vote| vote[i][j]).sum())
                    .collect()
            })
            .collect();

        let mut fixture = Fixture {
            election,
            election_json,
            fingerprint,
            secret_key,
            trustee_keys,
            ballots: Vec::new(),
            result: ElectionResult {
                num_tallied: 0,
                encrypted_tally: Vec::new(),
                partial_decryptions: Vec::new(),
                result: Vec::new(),
            },
            expected,
        };
        let ballots: Vec<Ballot> = votes.iter().map(|vote| fixture.cast(vote)).collect();
        let result = fixture.publish(&ballots);
        fixture.ballots = ballots;
        fixture.result = result;
        fixture
    }

    /// Decrypts with the full election key: beta / alpha^x = g^m
    pub fn decrypt(&self, cipher: &Cipher) -> BigUint {
        let p = &self.election.params.p;
        let shared = cipher.alpha.modpow(&self.secret_key, p);
        cipher.beta.moddiv(&shared, p).expect("alpha is invertible")
    }

    /// Casts a ballot with a fresh credential.
    pub fn cast(&self, vote: &[Vec<u64>]) -> Ballot {
        let params = &self.election.params;
        let (p, q, g) = (&params.p, &params.q, &params.g);
        assert_eq!(vote.len(), self.election.questions.len());

        let credential = Random::get_random_exponent(q);
        let public_key = g.modpow(&credential, p);

        // running "g,y,a0,b0,aS,bS..." statement of the blank proofs
        let mut statement = format!("{},{},", g, params.y);
        let mut answers = Vec::with_capacity(vote.len());

        for (question, slots) in self.election.questions.iter().zip(vote.iter()) {
            assert_eq!(slots.len(), question.slots());
            let nonces: Vec<BigUint> = slots
                .iter()
                .map(|_| Random::get_random_less_than(q))
                .collect();
            let choices: Vec<Cipher> = slots
                .iter()
                .zip(nonces.iter())
                .map(|(m, r)| ElGamal::encrypt_encode(&BigUint::from(*m), r, params))
                .collect();
            let individual_proofs = choices
                .iter()
                .zip(slots.iter())
                .zip(nonces.iter())
                .map(|((cipher, m), nonce)| {
                    prove_individual(params, &public_key, cipher, *m as usize, nonce)
                })
                .collect();

            let offset = if question.blank { 1 } else { 0 };
            let sum_cipher = ElGamal::sum(&choices[offset..], p);
            let sum_nonce = nonces[offset..]
                .iter()
                .fold(BigUint::zero(), |acc, r| acc.modadd(r, q));
            let sum = slots[offset..].iter().sum::<u64>() as usize;

            let (overall_proof, blank_proof) = if question.blank {
                let zero = &choices[0];
                let is_blank = slots[0] == 1;
                statement.push_str(&format!(
                    "{},{},{},{}",
                    zero.alpha, zero.beta, sum_cipher.alpha, sum_cipher.beta
                ));

                // either slot 0 or the sum of the other slots encrypts 0
                let witness = if is_blank {
                    (1, &sum_nonce)
                } else {
                    (0, &nonces[0])
                };
                let blank_proof = prove_disjunction(
                    params,
                    &[zero.clone(), sum_cipher.clone()],
                    witness,
                    Polarity::Multiplicative,
                    |commitments| {
                        Helper::hash_blank_proof_inputs(&public_key, &statement, commitments, q)
                    },
                );

                // either slot 0 encrypts 1 or the sum lies in [min, max]
                let mut statements = vec![Cipher {
                    alpha: zero.alpha.clone(),
                    beta: remove_message(params, &zero.beta, 1).expect("invertible"),
                }];
                statements.extend(shifted(params, &sum_cipher, question.min, question.max));
                let witness = if is_blank {
                    (0, &nonces[0])
                } else {
                    (sum - question.min + 1, &sum_nonce)
                };
                let overall_statement = format!(
                    "{},{},{},{},{},{}",
                    g, params.y, zero.alpha, zero.beta, sum_cipher.alpha, sum_cipher.beta
                );
                let overall_proof = prove_disjunction(
                    params,
                    &statements,
                    witness,
                    Polarity::Multiplicative,
                    |commitments| {
                        Helper::hash_blank_overall_proof_inputs(
                            &public_key,
                            &overall_statement,
                            commitments,
                            q,
                        )
                    },
                );
                (overall_proof, Some(blank_proof))
            } else {
                let statements = shifted(params, &sum_cipher, question.min, question.max);
                let overall_proof = prove_disjunction(
                    params,
                    &statements,
                    (sum - question.min, &sum_nonce),
                    Polarity::Inverse,
                    |commitments| {
                        Helper::hash_interval_proof_inputs(&public_key, &sum_cipher, commitments, q)
                    },
                );
                (overall_proof, None)
            };

            answers.push(Answer {
                choices,
                individual_proofs,
                overall_proof,
                blank_proof,
            });
        }

        // A = g^w, response = w - credential * challenge
        let nonce = Random::get_random_less_than(q);
        let commitment = g.modpow(&nonce, p);
        let ciphers = answers.iter().flat_map(|answer| answer.choices.iter());
        let challenge = Helper::hash_signature_inputs(&public_key, &commitment, ciphers, q);
        let response = nonce.modsub(&credential.modmul(&challenge, q), q);

        Ballot {
            answers,
            election_uuid: self.election.uuid.clone(),
            election_hash: self.fingerprint.clone(),
            signature: Signature {
                public_key,
                challenge,
                response,
            },
        }
    }

    /// The authority's result.json for `ballots`: homomorphic tally, one
    /// decryption factor alpha^x_i per trustee and the decrypted counts.
    pub fn publish(&self, ballots: &[Ballot]) -> ElectionResult {
        let params = &self.election.params;
        let p = &params.p;

        let encrypted_tally: Vec<Vec<Cipher>> = self
            .election
            .questions
            .iter()
            .enumerate()
            .map(|(i, question)| {
                (0..question.slots())
                    .map(|j| ElGamal::sum(ballots.iter().map(|b| &b.answers[i].choices[j]), p))
                    .collect()
            })
            .collect();

        let partial_decryptions = self
            .trustee_keys
            .iter()
            .map(|key| PartialDecryption {
                decryption_factors: encrypted_tally
                    .iter()
                    .map(|row| row.iter().map(|c| c.alpha.modpow(key, p)).collect())
                    .collect(),
                // not verified by the auditor
                decryption_proofs: encrypted_tally
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|_| Proof {
                                challenge: BigUint::zero(),
                                response: BigUint::zero(),
                            })
                            .collect()
                    })
                    .collect(),
            })
            .collect();

        let table = DiscreteLogTable::new(&params.g, p, ballots.len() as u64);
        let result = encrypted_tally
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cipher| {
                        table
                            .lookup(&self.decrypt(cipher))
                            .expect("count within the number of ballots")
                    })
                    .collect()
            })
            .collect();

        ElectionResult {
            num_tallied: ballots.len(),
            encrypted_tally,
            partial_decryptions,
            result,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Polarity {
    // A = g^r / alpha^c, response = w + s * c
    Inverse,
    // A = g^r * alpha^c, response = w - s * c
    Multiplicative,
}

/// (alpha, beta / g^k) for k in [min, max]
fn shifted(params: &GroupParameters, cipher: &Cipher, min: usize, max: usize) -> Vec<Cipher> {
    (min..=max)
        .map(|k| Cipher {
            alpha: cipher.alpha.clone(),
            beta: remove_message(params, &cipher.beta, k).expect("invertible"),
        })
        .collect()
}

fn prove_individual(
    params: &GroupParameters,
    public_key: &BigUint,
    cipher: &Cipher,
    m: usize,
    nonce: &BigUint,
) -> Vec<Proof> {
    let statements = shifted(params, cipher, 0, 1);
    prove_disjunction(
        params,
        &statements,
        (m, nonce),
        Polarity::Inverse,
        |commitments| Helper::hash_interval_proof_inputs(public_key, cipher, commitments, &params.q),
    )
}

/// Proves that one of `statements` is (g^s, y^s) for the secret s of the
/// `witness` branch. All other branches are simulated.
fn prove_disjunction<H>(
    params: &GroupParameters,
    statements: &[Cipher],
    witness: (usize, &BigUint),
    polarity: Polarity,
    hash: H,
) -> Vec<Proof>
where
    H: FnOnce(&[BigUint]) -> BigUint,
{
    let (p, q) = (&params.p, &params.q);
    let (index, secret) = witness;
    assert!(index < statements.len(), "witness outside of the statements!");

    let nonce = Random::get_random_less_than(q);
    let mut proofs = Vec::with_capacity(statements.len());
    let mut commitments = Vec::with_capacity(2 * statements.len());

    for (branch, statement) in statements.iter().enumerate() {
        let proof = Proof {
            challenge: Random::get_random_less_than(q),
            response: Random::get_random_less_than(q),
        };
        let (a, b) = if branch == index {
            (params.g.modpow(&nonce, p), params.y.modpow(&nonce, p))
        } else {
            match polarity {
                Polarity::Inverse => {
                    commit_inverse(params, &statement.alpha, &statement.beta, &proof)
                        .expect("invertible")
                }
                Polarity::Multiplicative => {
                    commit_multiplicative(params, &statement.alpha, &statement.beta, &proof)
                }
            }
        };
        commitments.push(a);
        commitments.push(b);
        proofs.push(proof);
    }

    let simulated = proofs
        .iter()
        .enumerate()
        .filter(|(branch, _)| *branch != index)
        .fold(BigUint::zero(), |acc, (_, proof)| {
            acc.modadd(&proof.challenge, q)
        });
    let challenge = hash(&commitments).modsub(&simulated, q);
    let blinded = secret.modmul(&challenge, q);
    let response = match polarity {
        Polarity::Inverse => nonce.modadd(&blinded, q),
        Polarity::Multiplicative => nonce.modsub(&blinded, q),
    };
    proofs[index] = Proof {
        challenge,
        response,
    };
    proofs
}

#[cfg(test)]
mod tests {
    use super::Fixture;
    use crate::encryption::DiscreteLogTable;

    #[test]
    fn it_should_publish_the_expected_counts() {
        let fixture = Fixture::standard();
        assert_eq!(fixture.ballots.len(), 5);
        assert_eq!(fixture.result.result, fixture.expected);
        assert_eq!(
            fixture.expected,
            vec![vec![1, 2, 1, 1], vec![3, 2], vec![2, 2, 2], vec![3, 4]]
        );
    }

    #[test]
    fn it_should_encrypt_each_vote() {
        let fixture = Fixture::standard();
        let params = &fixture.election.params;
        let table = DiscreteLogTable::new(&params.g, &params.p, 1);
        let votes = Fixture::standard_votes();

        for (ballot, vote) in fixture.ballots.iter().zip(votes.iter()) {
            for (answer, slots) in ballot.answers.iter().zip(vote.iter()) {
                for (cipher, m) in answer.choices.iter().zip(slots.iter()) {
                    assert_eq!(table.lookup(&fixture.decrypt(cipher)), Some(*m));
                }
            }
        }
    }

    #[test]
    fn it_should_share_the_key_among_trustees() {
        let fixture = Fixture::new(Fixture::standard_questions(), &Fixture::standard_votes(), 3);
        assert_eq!(fixture.trustee_keys.len(), 3);
        assert_eq!(fixture.result.partial_decryptions.len(), 3);
        assert_eq!(fixture.result.result, fixture.expected);
    }
}
