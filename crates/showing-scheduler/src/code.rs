// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer-facing appointment codes.

use rand::Rng;

/// Length of every generated code.
pub const CODE_LEN: usize = 6;

/// Uppercase letters and digits without the look-alikes `0 O 1 I`.
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Produces candidate appointment codes.
///
/// Uniqueness is enforced by the store; a colliding code is simply retried.
pub trait CodeSource: Send + Sync + 'static {
    fn next_code(&self) -> String;
}

/// Codes drawn uniformly from [`ALPHABET`] with the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodes;

impl CodeSource for RandomCodes {
    fn next_code(&self) -> String {
        generate_code(&mut rand::thread_rng())
    }
}

pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LEN)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn codes_have_fixed_length_and_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let code = generate_code(&mut rng);
            assert_eq!(code.len(), CODE_LEN);
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)), "{code}");
        }
    }

    #[test]
    fn random_codes_vary() {
        let codes: std::collections::HashSet<_> = (0..50).map(|_| RandomCodes.next_code()).collect();
        assert!(codes.len() > 45);
    }
}
