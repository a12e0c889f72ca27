use super::{commit_inverse, remove_message, sum_of_challenges};
use crate::{
    election::{Ballot, Election},
    error::{Error, ProofKind},
    helper::Helper,
};
use log::debug;

/// Verifies that every cipher of every answer encrypts either 0 or 1.
///
/// For each branch m ∈ {0, 1}:
/// - A_m = g^r_m / alpha^c_m
/// - B_m = y^r_m / (beta / g^m)^c_m
///
/// and c_0 + c_1 == SHA256("prove|<pk>|<alpha>,<beta>|<A0>,<B0>,<A1>,<B1>") mod q.
pub fn verify(ballot: &Ballot, election: &Election) -> Result<(), Error> {
    ballot.check_shape(election)?;
    let params = &election.params;
    let public_key = &ballot.signature.public_key;

    for (i, answer) in ballot.answers.iter().enumerate() {
        for (j, (cipher, proof)) in answer
            .choices
            .iter()
            .zip(answer.individual_proofs.iter())
            .enumerate()
        {
            let mut commitments = Vec::with_capacity(2 * proof.len());
            for (m, branch) in proof.iter().enumerate() {
                let beta = remove_message(params, &cipher.beta, m)?;
                let (a, b) = commit_inverse(params, &cipher.alpha, &beta, branch)?;
                commitments.push(a);
                commitments.push(b);
            }

            let hash =
                Helper::hash_interval_proof_inputs(public_key, cipher, &commitments, &params.q);
            if hash != sum_of_challenges(proof, &params.q) {
                return Err(Error::ProofInvalid {
                    kind: ProofKind::Individual,
                    ballot: ballot.id(),
                    answer: i,
                    choice: Some(j),
                });
            }
        }
    }
    debug!("individual proofs of ballot {} are valid", ballot.id());
    Ok(())
}
