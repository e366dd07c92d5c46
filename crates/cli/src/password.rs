//! Throwaway credentials for provisioned machines.

use rand::Rng;
use rand::distr::{Alphanumeric, SampleString};

const SYMBOLS: &[u8] = b"!@#";

/// `Win-` + 10 alphanumerics + one of `!@#` + one digit.
pub fn generate() -> String {
	generate_with(&mut rand::rng())
}

pub fn generate_with<R: Rng>(rng: &mut R) -> String {
	let core = Alphanumeric.sample_string(rng, 10);
	let symbol = char::from(SYMBOLS[rng.random_range(0..SYMBOLS.len())]);
	let digit = rng.random_range(0..10u8);
	format!("Win-{core}{symbol}{digit}")
}
