use super::{commit_inverse, commit_multiplicative, remove_message, sum_of_challenges};
use crate::{
    election::{Answer, Ballot, Election, Proof, Question},
    encryption::ElGamal,
    error::{Error, ProofKind},
    helper::Helper,
    types::{Cipher, GroupParameters},
};
use log::debug;
use num_bigint::BigUint;

/// Verifies that the number of selected (non-blank) choices of every answer
/// lies in [min, max].
///
/// Questions without a blank choice carry an interval proof over the sum
/// (alpha_S, beta_S) of all slots, one branch per k ∈ [min, max]:
/// - A_k = g^r / alpha_S^c, B_k = y^r / (beta_S / g^k)^c
/// - hashed as "prove|<pk>|<alpha_S>,<beta_S>|<A_min>,<B_min>,..."
///
/// Blank-enabled questions sum slots 1..n only and prepend a branch proving
/// that the blank slot encrypts 1:
/// - A_0 = g^r_0 * alpha_0^c_0, B_0 = y^r_0 * (beta_0 / g)^c_0
/// - A_k = g^r * alpha_S^c, B_k = y^r * (beta_S / g^k)^c
/// - hashed as "bproof1|<pk>|<g>,<y>,<alpha_0>,<beta_0>,<alpha_S>,<beta_S>|<A_0>,<B_0>,<A_min>,..."
pub fn verify(ballot: &Ballot, election: &Election) -> Result<(), Error> {
    ballot.check_shape(election)?;
    let params = &election.params;
    let public_key = &ballot.signature.public_key;

    for (i, (answer, question)) in ballot
        .answers
        .iter()
        .zip(election.questions.iter())
        .enumerate()
    {
        let hash = if question.blank {
            hash_blank_enabled(params, public_key, answer, question)?
        } else {
            hash_interval(params, public_key, answer, question)?
        };

        if hash != sum_of_challenges(&answer.overall_proof, &params.q) {
            return Err(Error::ProofInvalid {
                kind: ProofKind::Overall,
                ballot: ballot.id(),
                answer: i,
                choice: None,
            });
        }
    }
    debug!("overall proofs of ballot {} are valid", ballot.id());
    Ok(())
}

fn hash_interval(
    params: &GroupParameters,
    public_key: &BigUint,
    answer: &Answer,
    question: &Question,
) -> Result<BigUint, Error> {
    let sum = ElGamal::sum(&answer.choices, &params.p);
    let commitments = commit_range(params, &sum, question, &answer.overall_proof, true)?;
    Ok(Helper::hash_interval_proof_inputs(
        public_key,
        &sum,
        &commitments,
        &params.q,
    ))
}

fn hash_blank_enabled(
    params: &GroupParameters,
    public_key: &BigUint,
    answer: &Answer,
    question: &Question,
) -> Result<BigUint, Error> {
    let zero = &answer.choices[0];
    let sum = ElGamal::sum(&answer.choices[1..], &params.p);

    let blank_beta = remove_message(params, &zero.beta, 1)?;
    let (a0, b0) =
        commit_multiplicative(params, &zero.alpha, &blank_beta, &answer.overall_proof[0]);
    let mut commitments = vec![a0, b0];
    commitments.extend(commit_range(
        params,
        &sum,
        question,
        &answer.overall_proof[1..],
        false,
    )?);

    let statement = format!(
        "{},{},{},{},{},{}",
        params.g, params.y, zero.alpha, zero.beta, sum.alpha, sum.beta
    );
    Ok(Helper::hash_blank_overall_proof_inputs(
        public_key,
        &statement,
        &commitments,
        &params.q,
    ))
}

/// Commitments of the branches k = min..=max over `sum`, with the
/// (challenge, response) of branch k at `proofs[k - min]`.
fn commit_range(
    params: &GroupParameters,
    sum: &Cipher,
    question: &Question,
    proofs: &[Proof],
    inverse: bool,
) -> Result<Vec<BigUint>, Error> {
    let mut commitments = Vec::with_capacity(2 * proofs.len());
    for (k, proof) in (question.min..=question.max).zip(proofs.iter()) {
        let beta = remove_message(params, &sum.beta, k)?;
        let (a, b) = if inverse {
            commit_inverse(params, &sum.alpha, &beta, proof)?
        } else {
            commit_multiplicative(params, &sum.alpha, &beta, proof)
        };
        commitments.push(a);
        commitments.push(b);
    }
    Ok(commitments)
}
