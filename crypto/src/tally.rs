use crate::{
    election::{Ballot, Election},
    encryption::ElGamal,
    error::Error,
    types::Cipher,
};
use num_bigint::BigUint;
use rayon::prelude::*;

/// The homomorphic sum of ballots: per question, per slot, one cipher.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct EncryptedTally {
    pub ciphers: Vec<Vec<Cipher>>,
}

impl EncryptedTally {
    /// The tally of no ballots: (1, 1) in every slot.
    pub fn identity(election: &Election) -> Self {
        let ciphers = election
            .questions
            .iter()
            .map(|question| vec![Cipher::identity(); question.slots()])
            .collect();
        EncryptedTally { ciphers }
    }

    /// Adds the choices of `ballot` slot by slot.
    pub fn absorb(&mut self, ballot: &Ballot, p: &BigUint) -> Result<(), Error> {
        self.check_shape(ballot)?;
        for (row, answer) in self.ciphers.iter_mut().zip(ballot.answers.iter()) {
            for (slot, choice) in row.iter_mut().zip(answer.choices.iter()) {
                *slot = ElGamal::add(slot, choice, p);
            }
        }
        Ok(())
    }

    /// Adds two partial tallies of the same election.
    pub fn combine(mut self, other: &EncryptedTally, p: &BigUint) -> Self {
        for (row, other_row) in self.ciphers.iter_mut().zip(other.ciphers.iter()) {
            for (slot, other_slot) in row.iter_mut().zip(other_row.iter()) {
                *slot = ElGamal::add(slot, other_slot, p);
            }
        }
        self
    }

    fn check_shape(&self, ballot: &Ballot) -> Result<(), Error> {
        let malformed = |answer: Option<usize>, reason: String| {
            Err(Error::MalformedBallot {
                ballot: ballot.id(),
                answer,
                reason,
            })
        };
        if ballot.answers.len() != self.ciphers.len() {
            return malformed(
                None,
                format!(
                    "{} answers for {} questions",
                    ballot.answers.len(),
                    self.ciphers.len()
                ),
            );
        }
        for (index, (row, answer)) in self.ciphers.iter().zip(ballot.answers.iter()).enumerate() {
            if row.len() != answer.choices.len() {
                return malformed(
                    Some(index),
                    format!("{} choices, expected {}", answer.choices.len(), row.len()),
                );
            }
        }
        Ok(())
    }
}

/// Homomorphically sums `ballots` slot by slot.
///
/// The result does not depend on the order of the ballots. No ballot yields
/// the identity tally.
pub fn tally(election: &Election, ballots: &[Ballot]) -> Result<EncryptedTally, Error> {
    let p = &election.params.p;
    let mut tally = EncryptedTally::identity(election);
    for ballot in ballots.iter() {
        tally.absorb(ballot, p)?;
    }
    Ok(tally)
}

/// Same as [`tally`], summing chunks of ballots on the rayon thread pool.
pub fn tally_parallel(election: &Election, ballots: &[Ballot]) -> Result<EncryptedTally, Error> {
    let p = &election.params.p;
    ballots
        .par_iter()
        .try_fold(
            || EncryptedTally::identity(election),
            |mut tally, ballot| -> Result<EncryptedTally, Error> {
                tally.absorb(ballot, p)?;
                Ok(tally)
            },
        )
        .try_reduce(
            || EncryptedTally::identity(election),
            |tally, other| Ok(tally.combine(&other, p)),
        )
}
