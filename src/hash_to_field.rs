// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Implements the `hash_to_field` function from RFC 9380 §5.2 for the
//! extension degree m = 1 used by every supported curve.

use num_bigint::BigInt;
use num_bigint::Sign;
use num_integer::Integer;

use crate::errors::InternalError;
use crate::expand::expand_message_xmd;
use crate::hash::Hash;

/// Hashes `msg` to `count` field elements of the prime field defined by
/// `modulus`, each derived from `l` uniform bytes (`l` is the
/// security-extended length parameter `L` of the hash-to-curve suite).
pub fn hash_to_field(
    hash: Hash,
    msg: &[u8],
    dst: &[u8],
    count: usize,
    l: usize,
    modulus: &BigInt,
) -> Result<Vec<BigInt>, InternalError> {
    let uniform_bytes = expand_message_xmd(hash, msg, dst, count * l)?;

    let mut result = Vec::with_capacity(count);
    for i in 0..count {
        let window = &uniform_bytes[i * l..(i + 1) * l];
        result.push(BigInt::from_bytes_be(Sign::Plus, window).mod_floor(modulus));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Num;

    #[test]
    fn values_are_reduced_and_deterministic() {
        let modulus = BigInt::from_str_radix(
            "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff",
            16,
        )
        .unwrap();

        let a = hash_to_field(Hash::Sha256, b"input", b"test-dst", 2, 48, &modulus).unwrap();
        let b = hash_to_field(Hash::Sha256, b"input", b"test-dst", 2, 48, &modulus).unwrap();

        assert_eq!(a.len(), 2);
        assert_eq!(a, b);
        assert_ne!(a[0], a[1]);
        for value in &a {
            assert!(value >= &BigInt::from(0));
            assert!(value < &modulus);
        }
    }

    // Field element values for P-256 taken from RFC 9380, Appendix J.1.1
    // (suite P256_XMD:SHA-256_SSWU_RO_, msg = "").
    #[test]
    fn p256_suite_u_values() {
        let modulus = BigInt::from_str_radix(
            "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff",
            16,
        )
        .unwrap();
        let dst = b"QUUX-V01-CS02-with-P256_XMD:SHA-256_SSWU_RO_";

        let u = hash_to_field(Hash::Sha256, b"", dst, 2, 48, &modulus).unwrap();
        assert_eq!(
            u[0],
            BigInt::from_str_radix(
                "ad5342c66a6dd0ff080df1da0ea1c04b96e0330dd89406465eeba11582515009",
                16
            )
            .unwrap()
        );
        assert_eq!(
            u[1],
            BigInt::from_str_radix(
                "8c0f1d43204bd6f6ea70ae8013070a1518b43873bcd850aafa0a9e220e2eea5a",
                16
            )
            .unwrap()
        );
    }
}
