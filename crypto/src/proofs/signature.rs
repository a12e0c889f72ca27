use crate::{
    election::{Ballot, Election},
    error::Error,
    helper::Helper,
    types::ModuloOperations,
};
use log::debug;

/// Verifies the Schnorr signature of the voter credential over every cipher
/// of the ballot.
///
/// - A = g^response * public_key^challenge mod p
/// - challenge == SHA256("sig|<public_key>|<A>|<alpha1>,<beta1>,...") mod q
pub fn verify(ballot: &Ballot, election: &Election) -> Result<(), Error> {
    ballot.check_shape(election)?;
    let params = &election.params;
    let (p, q, g) = (&params.p, &params.q, &params.g);
    let signature = &ballot.signature;

    let commitment = g
        .modpow(&signature.response, p)
        .modmul(&signature.public_key.modpow(&signature.challenge, p), p);
    let challenge =
        Helper::hash_signature_inputs(&signature.public_key, &commitment, ballot.ciphers(), q);

    if challenge != signature.challenge {
        return Err(Error::SignatureInvalid { ballot: ballot.id() });
    }
    debug!("signature of ballot {} is valid", ballot.id());
    Ok(())
}
