use crate::error::Error;
use core::ops::{Add, Mul, Sub};
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct GroupParameters {
    // modulus: p
    pub p: BigUint,

    // order of the subgroup generated by g: q
    pub q: BigUint,

    // public generator: g
    pub g: BigUint,

    // election public key: y = g^x mod p
    // - x: the (distributed) election private key
    pub y: BigUint,
}

impl GroupParameters {
    /// Returns true if `value` is a reduced, non-zero residue mod p.
    pub fn is_element(&self, value: &BigUint) -> bool {
        !value.is_zero() && value < &self.p
    }
}

#[derive(Eq, PartialEq, Clone, Debug, Hash)]
pub struct Cipher {
    // alpha = g^r mod p
    // - g: generator
    // - r: random value (r ∈ Zq)
    pub alpha: BigUint,

    // beta = y^r * g^m mod p
    // - y: election public key
    // - m: message
    pub beta: BigUint,
}

impl Cipher {
    /// The multiplicative identity (1, 1): an encryption of zero with no randomness.
    pub fn identity() -> Self {
        Cipher {
            alpha: BigUint::one(),
            beta: BigUint::one(),
        }
    }
}

pub trait ModuloOperations {
    /// Calculates the modular multiplicative of a BigUint: result = self * rhs % modulus.
    fn modmul(&self, rhs: &Self, modulus: &Self) -> Self;

    /// Calculates the modular division of two BigUints: result = self / divisor % modulus.
    fn moddiv(&self, divisor: &Self, modulus: &Self) -> Result<BigUint, Error>;

    /// Calculates the modular addition of two BigUints: result = (self + other) % modulus.
    fn modadd(&self, other: &Self, modulus: &Self) -> Self;

    /// Calculates the modular subtraction of two BigUints: result = ((self + modulus) - other) % modulus.
    fn modsub(&self, other: &Self, modulus: &Self) -> Self;

    /// Calculates the modular multiplicative inverse x of an integer a such that ax ≡ 1 (mod m).
    /// Alternative formulation: a^-1 (mod m)
    ///
    /// Fails with `Error::NotInvertible` if a and m are not coprime.
    fn invmod(&self, modulus: &Self) -> Result<BigUint, Error>;
}

impl ModuloOperations for BigUint {
    fn modmul(&self, multiplier: &Self, modulus: &Self) -> Self {
        assert!(
            !modulus.is_zero(),
            "attempt to calculate with zero modulus!"
        );
        self.mul(multiplier) % modulus
    }

    fn moddiv(&self, divisor: &Self, modulus: &Self) -> Result<BigUint, Error> {
        assert!(
            !modulus.is_zero(),
            "attempt to calculate with zero modulus!"
        );
        let inverse_divisor = (divisor % modulus).invmod(modulus)?;
        Ok(self.mul(&inverse_divisor) % modulus)
    }

    fn modadd(&self, other: &Self, modulus: &Self) -> Self {
        assert!(
            !modulus.is_zero(),
            "attempt to calculate with zero modulus!"
        );
        self.add(other) % modulus
    }

    fn modsub(&self, other: &Self, modulus: &Self) -> Self {
        assert!(
            !modulus.is_zero(),
            "attempt to calculate with zero modulus!"
        );
        // shift by the whole modulus so the difference never underflows
        self.add(modulus).sub(other % modulus) % modulus
    }

    fn invmod(&self, modulus: &Self) -> Result<BigUint, Error> {
        assert!(
            !modulus.is_zero(),
            "attempt to calculate with zero modulus!"
        );
        let a = BigInt::from(self % modulus);
        let b = BigInt::from(modulus.clone());

        let (g, x, _) = extended_gcd(&a, &b);
        if g != BigInt::one() {
            return Err(Error::NotInvertible {
                value: self.to_string(),
            });
        }
        let result = ((x % &b) + &b) % &b;
        result.to_biguint().ok_or_else(|| Error::NotInvertible {
            value: self.to_string(),
        })
    }
}

// iterative form, the recursion depth would grow with the bit length of p
fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (b.clone(), a.clone());
    let (mut old_s, mut s) = (BigInt::zero(), BigInt::one());
    let (mut old_t, mut t) = (BigInt::one(), BigInt::zero());

    while !r.is_zero() {
        let quotient = &old_r / &r;
        let next_r = &old_r - &quotient * &r;
        old_r = core::mem::replace(&mut r, next_r);
        let next_s = &old_s - &quotient * &s;
        old_s = core::mem::replace(&mut s, next_s);
        let next_t = &old_t - &quotient * &t;
        old_t = core::mem::replace(&mut t, next_t);
    }
    // old_r = gcd(a, b) = old_s * a + old_t * b
    (old_r, old_s, old_t)
}
