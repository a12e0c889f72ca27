use crate::{
    election::{Election, ElectionResult},
    encryption::DiscreteLogTable,
    error::Error,
    tally::EncryptedTally,
    types::ModuloOperations,
};
use log::{debug, info};
use num_bigint::BigUint;
use num_traits::One;

/// Per question, per slot: the number of votes.
pub type ResultMatrix = Vec<Vec<u64>>;

/// Which partial decryptions make up the decryption factor of a slot.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum FactorSource {
    /// The factor published by the first trustee alone. Correct for
    /// single-trustee elections.
    FirstTrustee,
    /// The product of the factors of all trustees.
    AllTrustees,
}

impl Default for FactorSource {
    fn default() -> Self {
        FactorSource::FirstTrustee
    }
}

/// Decrypts the published tally with the factor of the first trustee.
pub fn decrypt(
    election: &Election,
    result: &ElectionResult,
    tally: &EncryptedTally,
) -> Result<ResultMatrix, Error> {
    decrypt_with(election, result, tally, FactorSource::default())
}

/// Decrypts the published tally slot by slot, after checking that it equals
/// the recomputed one.
///
/// - g^m = beta / factor mod p
/// - m is recovered by lookup among g^0..g^num_tallied
pub fn decrypt_with(
    election: &Election,
    result: &ElectionResult,
    tally: &EncryptedTally,
    source: FactorSource,
) -> Result<ResultMatrix, Error> {
    check_shape(election, result, tally)?;
    let params = &election.params;
    let p = &params.p;

    let table = DiscreteLogTable::new(&params.g, p, result.num_tallied as u64);
    debug!("built discrete log table up to g^{}", result.num_tallied);

    let mut decrypted = Vec::with_capacity(tally.ciphers.len());
    for (question, (computed_row, published_row)) in tally
        .ciphers
        .iter()
        .zip(result.encrypted_tally.iter())
        .enumerate()
    {
        let mut counts = Vec::with_capacity(published_row.len());
        for (slot, (computed, published)) in
            computed_row.iter().zip(published_row.iter()).enumerate()
        {
            if computed != published {
                return Err(Error::TallyMismatch { question, slot });
            }

            let factor = decryption_factor(result, question, slot, source, p);
            let message = published.beta.moddiv(&factor, p)?;
            let count = table
                .lookup(&message)
                .ok_or(Error::DecryptionFactorInvalid { question, slot })?;
            counts.push(count);
        }
        decrypted.push(counts);
    }
    info!("decrypted the tally of {} ballots", result.num_tallied);
    Ok(decrypted)
}

/// Checks the decrypted counts against the published ones, dimensions first.
pub fn verify_decrypted_results(
    computed: &[Vec<u64>],
    published: &[Vec<u64>],
) -> Result<(), Error> {
    if computed != published {
        return Err(Error::ResultMismatch {
            computed: computed.to_vec(),
            published: published.to_vec(),
        });
    }
    Ok(())
}

fn decryption_factor(
    result: &ElectionResult,
    question: usize,
    slot: usize,
    source: FactorSource,
    p: &BigUint,
) -> BigUint {
    let mut factors = result
        .partial_decryptions
        .iter()
        .map(|partial| &partial.decryption_factors[question][slot]);
    match source {
        FactorSource::FirstTrustee => factors.next().cloned().unwrap_or_else(BigUint::one),
        FactorSource::AllTrustees => {
            factors.fold(BigUint::one(), |acc, factor| acc.modmul(factor, p))
        }
    }
}

/// Checks that the published tally, the recomputed tally and every trustee's
/// decryption factors have the dimensions of the election.
fn check_shape(
    election: &Election,
    result: &ElectionResult,
    tally: &EncryptedTally,
) -> Result<(), Error> {
    let malformed = |reason: String| Err(Error::MalformedResult { reason });
    let slots: Vec<usize> = election.questions.iter().map(|q| q.slots()).collect();

    if result.partial_decryptions.is_empty() {
        return malformed("no partial decryptions".to_string());
    }
    if dimensions(&tally.ciphers) != slots {
        return malformed("recomputed tally does not match the questions".to_string());
    }
    if dimensions(&result.encrypted_tally) != slots {
        return malformed("encrypted tally does not match the questions".to_string());
    }
    for (trustee, partial) in result.partial_decryptions.iter().enumerate() {
        if dimensions(&partial.decryption_factors) != slots {
            return malformed(format!(
                "decryption factors of trustee {} do not match the questions",
                trustee
            ));
        }
    }
    Ok(())
}

fn dimensions<T>(rows: &[Vec<T>]) -> Vec<usize> {
    rows.iter().map(Vec::len).collect()
}
