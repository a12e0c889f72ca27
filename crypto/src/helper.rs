use crate::{error::Error, types::Cipher};
use num_bigint::BigUint;
use sha2::{Digest, Sha256};

pub struct Helper;

impl Helper {
    /// Parses a decimal-string-encoded integer.
    ///
    /// Only ASCII digits are accepted: no sign, no whitespace, no separators.
    /// `field` names the offending value in the returned `Error::MalformedNumber`.
    pub fn parse_int(field: &str, value: &str) -> Result<BigUint, Error> {
        let malformed = || Error::MalformedNumber {
            field: field.to_string(),
            value: value.to_string(),
        };
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        BigUint::parse_bytes(value.as_bytes(), 10).ok_or_else(malformed)
    }

    /// SHA256(input) interpreted as a big-endian integer, reduced mod q.
    pub fn hash_to_challenge(input: &str, q: &BigUint) -> BigUint {
        let hash = Sha256::digest(input.as_bytes());
        BigUint::from_bytes_be(&hash) % q
    }

    /// Joins the decimal representations of `values` with ",".
    pub fn join<'a, I>(values: I) -> String
    where
        I: IntoIterator<Item = &'a BigUint>,
    {
        values
            .into_iter()
            .map(|value| value.to_string())
            .collect::<Vec<String>>()
            .join(",")
    }

    /// Joins ciphers as "alpha1,beta1,...,alphaN,betaN".
    pub fn join_ciphers<'a, I>(ciphers: I) -> String
    where
        I: IntoIterator<Item = &'a Cipher>,
    {
        Self::join(
            ciphers
                .into_iter()
                .flat_map(|cipher| vec![&cipher.alpha, &cipher.beta]),
        )
    }

    /// "sig|<public_key>|<A>|<alpha1>,<beta1>,...,<alphaN>,<betaN>"
    pub fn hash_signature_inputs<'a, I>(
        public_key: &BigUint,
        commitment: &BigUint,
        ciphers: I,
        q: &BigUint,
    ) -> BigUint
    where
        I: IntoIterator<Item = &'a Cipher>,
    {
        let input = format!(
            "sig|{}|{}|{}",
            public_key,
            commitment,
            Self::join_ciphers(ciphers)
        );
        Self::hash_to_challenge(&input, q)
    }

    /// "prove|<public_key>|<alpha>,<beta>|<A0>,<B0>,...,<Ak>,<Bk>"
    ///
    /// Shared by the individual (0..1) proofs and the overall proof of
    /// questions without a blank choice.
    pub fn hash_interval_proof_inputs(
        public_key: &BigUint,
        cipher: &Cipher,
        commitments: &[BigUint],
        q: &BigUint,
    ) -> BigUint {
        let input = format!(
            "prove|{}|{},{}|{}",
            public_key,
            cipher.alpha,
            cipher.beta,
            Self::join(commitments)
        );
        Self::hash_to_challenge(&input, q)
    }

    /// "bproof0|<public_key>|<statement>|<A0>,<B0>,<A1>,<B1>"
    pub fn hash_blank_proof_inputs(
        public_key: &BigUint,
        statement: &str,
        commitments: &[BigUint],
        q: &BigUint,
    ) -> BigUint {
        let input = format!(
            "bproof0|{}|{}|{}",
            public_key,
            statement,
            Self::join(commitments)
        );
        Self::hash_to_challenge(&input, q)
    }

    /// "bproof1|<public_key>|<statement>|<A0>,<B0>,<Amin>,<Bmin>,...,<Amax>,<Bmax>"
    pub fn hash_blank_overall_proof_inputs(
        public_key: &BigUint,
        statement: &str,
        commitments: &[BigUint],
        q: &BigUint,
    ) -> BigUint {
        let input = format!(
            "bproof1|{}|{}|{}",
            public_key,
            statement,
            Self::join(commitments)
        );
        Self::hash_to_challenge(&input, q)
    }

    /// The election fingerprint: BASE64(SHA256(election json)), standard
    /// alphabet without padding, over the JSON with surrounding whitespace trimmed.
    pub fn fingerprint(election_json: &[u8]) -> String {
        let hash = Sha256::digest(trim_ascii_whitespace(election_json));
        base64::encode_config(hash, base64::STANDARD_NO_PAD)
    }
}

fn trim_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |position| position + 1);
    &bytes[start..end]
}
