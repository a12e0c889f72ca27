//! Verification of the signature and the zero-knowledge proofs carried by a ballot.
//!
//! All proofs are disjunctive Chaum-Pedersen proofs made non-interactive with
//! Fiat-Shamir: every branch contributes a commitment pair (A, B) recomputed
//! from its (challenge, response), and the hash of the canonical statement
//! string must equal the sum of the branch challenges mod q.
//!
//! Two polarities are in use and must not be unified:
//! - interval proofs ("prove|..."): A = g^r / alpha^c, B = y^r / beta^c
//! - blank proofs ("bproof0|...", "bproof1|..."): A = g^r * alpha^c, B = y^r * beta^c
pub mod blank;
pub mod individual;
pub mod overall;
pub mod signature;

pub use blank::verify as verify_blank_proof;
pub use individual::verify as verify_individual_proof;
pub use overall::verify as verify_overall_proof;
pub use signature::verify as verify_signature;

use crate::{
    election::Proof,
    error::Error,
    types::{GroupParameters, ModuloOperations},
};
use num_bigint::BigUint;
use num_traits::Zero;

/// A = g^r * alpha^c, B = y^r * beta^c (mod p)
pub(crate) fn commit_multiplicative(
    params: &GroupParameters,
    alpha: &BigUint,
    beta: &BigUint,
    proof: &Proof,
) -> (BigUint, BigUint) {
    let p = &params.p;
    let (c, r) = (&proof.challenge, &proof.response);
    let a = params.g.modpow(r, p).modmul(&alpha.modpow(c, p), p);
    let b = params.y.modpow(r, p).modmul(&beta.modpow(c, p), p);
    (a, b)
}

/// A = g^r / alpha^c, B = y^r / beta^c (mod p)
pub(crate) fn commit_inverse(
    params: &GroupParameters,
    alpha: &BigUint,
    beta: &BigUint,
    proof: &Proof,
) -> Result<(BigUint, BigUint), Error> {
    let p = &params.p;
    let (c, r) = (&proof.challenge, &proof.response);
    let a = params.g.modpow(r, p).moddiv(&alpha.modpow(c, p), p)?;
    let b = params.y.modpow(r, p).moddiv(&beta.modpow(c, p), p)?;
    Ok((a, b))
}

/// beta / g^m (mod p): strips the encoded message m from beta.
pub(crate) fn remove_message(
    params: &GroupParameters,
    beta: &BigUint,
    m: usize,
) -> Result<BigUint, Error> {
    let p = &params.p;
    let g_pow_m = params.g.modpow(&BigUint::from(m), p);
    beta.moddiv(&g_pow_m, p)
}

/// (c_0 + c_1 + ... + c_k) mod q
fn sum_of_challenges<'a, I>(proofs: I, q: &BigUint) -> BigUint
where
    I: IntoIterator<Item = &'a Proof>,
{
    proofs
        .into_iter()
        .fold(BigUint::zero(), |acc, proof| acc.modadd(&proof.challenge, q))
}
