use crate::types::{Cipher, ModuloOperations};
use num_bigint::BigUint;
use num_traits::One;
use std::collections::HashMap;

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct ElGamal;

impl ElGamal {
    /// Returns an ElGamal Encryption of a message
    /// - (alpha, beta) = (g^r, y^r * g^m)
    ///
    /// Only used to fabricate test ballots, the auditor never encrypts.
    #[cfg(any(test, feature = "fixtures"))]
    pub fn encrypt_encode(
        m: &BigUint,
        r: &BigUint,
        params: &crate::types::GroupParameters,
    ) -> Cipher {
        let g = &params.g;
        let p = &params.p;

        // alpha = g^r
        let alpha = g.modpow(r, p);

        // beta = y^r * g^m
        let y_pow_r = params.y.modpow(r, p);
        let beta = y_pow_r.modmul(&g.modpow(m, p), p);

        Cipher { alpha, beta }
    }

    /// Homomorphically adds two ElGamal encryptions.
    /// Returns an ElGamal encryption.
    ///
    /// ## Arguments
    ///
    /// * `this`   - a Cipher { alpha, beta } (ElGamal encryption)
    /// * `other`  - a Cipher { alpha, beta } (ElGamal encryption)
    /// * `p` - The group modulus p (BigUint)
    pub fn add(this: &Cipher, other: &Cipher, p: &BigUint) -> Cipher {
        Cipher {
            alpha: this.alpha.modmul(&other.alpha, p),
            beta: this.beta.modmul(&other.beta, p),
        }
    }

    /// Homomorphically adds a list of ElGamal encryptions.
    /// An empty list yields the identity (1, 1).
    pub fn sum<'a, I>(ciphers: I, p: &BigUint) -> Cipher
    where
        I: IntoIterator<Item = &'a Cipher>,
    {
        ciphers
            .into_iter()
            .fold(Cipher::identity(), |acc, cipher| Self::add(&acc, cipher, p))
    }
}

/// Bounded discrete logarithm: maps g^k mod p back to k for k ∈ [0, bound].
#[derive(Clone, Debug)]
pub struct DiscreteLogTable {
    table: HashMap<BigUint, u64>,
}

impl DiscreteLogTable {
    pub fn new(g: &BigUint, p: &BigUint, bound: u64) -> Self {
        let mut table = HashMap::with_capacity(bound.min(1 << 16) as usize + 1);
        let mut power = BigUint::one() % p;
        for k in 0..=bound {
            // keep the smallest exponent if g has a small order
            table.entry(power.clone()).or_insert(k);
            power = power.modmul(g, p);
        }
        DiscreteLogTable { table }
    }

    /// Returns k such that g^k = value, if k lies within the bound.
    pub fn lookup(&self, value: &BigUint) -> Option<u64> {
        self.table.get(value).copied()
    }
}
