use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};

/// Randomness for fabricating test elections and ballots.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Random;

impl Random {
    /// Returns a uniformly random value in [0, number).
    pub fn get_random_less_than(number: &BigUint) -> BigUint {
        assert!(*number > BigUint::zero(), "q must be greater than zero!");
        let mut rng = rand::thread_rng();
        rng.gen_biguint_below(number)
    }

    /// Returns a uniformly random value in [1, number), usable as a secret
    /// exponent.
    pub fn get_random_exponent(number: &BigUint) -> BigUint {
        assert!(*number > BigUint::one(), "q must be greater than one!");
        let mut rng = rand::thread_rng();
        rng.gen_biguint_range(&BigUint::one(), number)
    }
}

#[cfg(test)]
mod tests {
    use super::Random;
    use num_bigint::BigUint;
    use num_traits::Zero;

    #[test]
    fn it_should_generate_values_below_the_bound() {
        let q = BigUint::from(11u32);
        for _ in 0..100 {
            let value = Random::get_random_less_than(&q);
            assert!(value < q);
        }
    }

    #[test]
    fn it_should_generate_non_zero_exponents() {
        let q = BigUint::from(3u32);
        for _ in 0..100 {
            let value = Random::get_random_exponent(&q);
            assert!(value > BigUint::zero());
            assert!(value < q);
        }
    }

    #[test]
    #[should_panic(expected = "q must be greater than zero!")]
    fn it_should_panic_for_an_empty_range() {
        Random::get_random_less_than(&BigUint::zero());
    }
}
