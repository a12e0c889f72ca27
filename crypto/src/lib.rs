//! This library audits elections run with exponential ElGamal and
//! zero-knowledge proofs (Belenios): ballot signatures and proofs, the
//! homomorphic tally and its decryption by the trustees.

pub mod audit;
pub mod decryption;
pub mod election;
pub mod error;
pub mod records;
pub mod tally;

#[allow(clippy::many_single_char_names)]
pub mod encryption;

#[allow(clippy::many_single_char_names)]
pub mod helper;

#[allow(clippy::many_single_char_names)]
pub mod proofs;

#[allow(clippy::many_single_char_names)]
pub mod types;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

#[cfg(any(test, feature = "fixtures"))]
pub mod random;
