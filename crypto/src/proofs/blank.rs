use super::{commit_multiplicative, sum_of_challenges};
use crate::{
    election::{Ballot, Election},
    encryption::ElGamal,
    error::{Error, ProofKind},
    helper::Helper,
};
use log::debug;

/// Verifies the blank proofs: for every answer to a blank-enabled question,
/// either the blank slot or the sum of the other slots encrypts 0.
///
/// - A_0 = g^r_0 * alpha_0^c_0, B_0 = y^r_0 * beta_0^c_0
/// - A_1 = g^r_1 * alpha_S^c_1, B_1 = y^r_1 * beta_S^c_1
///
/// where (alpha_S, beta_S) is the product of slots 1..n. The statement
/// "<g>,<y>,<alpha_0>,<beta_0>,<alpha_S>,<beta_S>" is not reset between
/// answers: each blank answer appends its four values to the one before.
///
/// Answers without a blank proof are skipped.
pub fn verify(ballot: &Ballot, election: &Election) -> Result<(), Error> {
    ballot.check_shape(election)?;
    let params = &election.params;
    let public_key = &ballot.signature.public_key;

    let mut statement = format!("{},{},", params.g, params.y);

    for (i, answer) in ballot.answers.iter().enumerate() {
        let proof = match &answer.blank_proof {
            Some(proof) => proof,
            None => continue,
        };
        let zero = &answer.choices[0];
        let sum = ElGamal::sum(&answer.choices[1..], &params.p);
        statement.push_str(&format!(
            "{},{},{},{}",
            zero.alpha, zero.beta, sum.alpha, sum.beta
        ));

        let (a0, b0) = commit_multiplicative(params, &zero.alpha, &zero.beta, &proof[0]);
        let (a1, b1) = commit_multiplicative(params, &sum.alpha, &sum.beta, &proof[1]);

        let hash =
            Helper::hash_blank_proof_inputs(public_key, &statement, &[a0, b0, a1, b1], &params.q);
        if hash != sum_of_challenges(proof, &params.q) {
            return Err(Error::ProofInvalid {
                kind: ProofKind::Blank,
                ballot: ballot.id(),
                answer: i,
                choice: None,
            });
        }
    }
    debug!("blank proofs of ballot {} are valid", ballot.id());
    Ok(())
}
