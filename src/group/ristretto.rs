// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Ristretto255 backend of the group abstraction.

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use rand::{CryptoRng, RngCore};

use crate::errors::InternalError;
use crate::expand::expand_message_xmd;
use crate::hash::Hash;

pub(super) const SCALAR_LENGTH: usize = 32;
pub(super) const ELEMENT_LENGTH: usize = 32;
pub(super) const H2C_SUITE: &str = "ristretto255_XMD:SHA-512_R255MAP_RO_";

// Scalars and map inputs are derived from 64 uniform bytes through wide
// reduction.
const UNIFORM_LENGTH: usize = 64;

pub(super) fn identity() -> RistrettoPoint {
    RistrettoPoint::identity()
}

pub(super) fn base() -> RistrettoPoint {
    RISTRETTO_BASEPOINT_POINT
}

pub(super) fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    loop {
        let mut bytes = [0u8; UNIFORM_LENGTH];
        rng.fill_bytes(&mut bytes);
        let scalar = Scalar::from_bytes_mod_order_wide(&bytes);
        if scalar != Scalar::ZERO {
            break scalar;
        }
    }
}

pub(super) fn hash_to_scalar(input: &[u8], dst: &[u8]) -> Result<Scalar, InternalError> {
    let uniform_bytes = expand_message_xmd(Hash::Sha512, input, dst, UNIFORM_LENGTH)?;
    let mut wide = [0u8; UNIFORM_LENGTH];
    wide.copy_from_slice(&uniform_bytes);
    Ok(Scalar::from_bytes_mod_order_wide(&wide))
}

pub(super) fn hash_to_group(input: &[u8], dst: &[u8]) -> Result<RistrettoPoint, InternalError> {
    let uniform_bytes = expand_message_xmd(Hash::Sha512, input, dst, UNIFORM_LENGTH)?;
    let mut wide = [0u8; UNIFORM_LENGTH];
    wide.copy_from_slice(&uniform_bytes);
    Ok(RistrettoPoint::from_uniform_bytes(&wide))
}

pub(super) fn deserialize_scalar(input: &[u8]) -> Result<Scalar, InternalError> {
    let bytes: [u8; SCALAR_LENGTH] =
        input.try_into().map_err(|_| InternalError::ShortBuffer)?;
    Option::from(Scalar::from_canonical_bytes(bytes)).ok_or(InternalError::InvalidEncoding)
}

pub(super) fn deserialize_element(input: &[u8]) -> Result<RistrettoPoint, InternalError> {
    let bytes: [u8; ELEMENT_LENGTH] =
        input.try_into().map_err(|_| InternalError::ShortBuffer)?;
    CompressedRistretto(bytes)
        .decompress()
        .ok_or(InternalError::InvalidEncoding)
}

pub(super) fn encode(point: &RistrettoPoint) -> Vec<u8> {
    point.compress().as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test vectors taken from RFC 9380, Appendix B
    // (suite ristretto255_XMD:SHA-512_R255MAP_RO_).
    #[test]
    fn hash_to_group_suite_vectors() {
        let dst = b"QUUX-V01-CS02-with-ristretto255_XMD:SHA-512_R255MAP_RO_";
        let cases: &[(&[u8], &str)] = &[
            (
                b"",
                "3066f82a1a747d45120d1740f14358531a8f04bbffe6a819f86dfe50f44a0a46",
            ),
            (
                b"abc",
                "f26e5b6f7d362d2d2a94c5d0e7602cb4773c95a2e5c31a64f133189fa76ed61b",
            ),
        ];

        for (msg, expected) in cases {
            let point = hash_to_group(msg, dst).unwrap();
            assert_eq!(hex::encode(encode(&point)), *expected);
        }
    }

    #[test]
    fn non_canonical_encodings_are_rejected() {
        // A field element >= p is a non-canonical ristretto encoding.
        let bytes = [0xffu8; 32];
        assert!(deserialize_element(&bytes).is_err());
    }

    #[test]
    fn scalar_encoding_is_little_endian_canonical() {
        let mut one = [0u8; 32];
        one[0] = 1;
        let s = deserialize_scalar(&one).unwrap();
        assert_eq!(s, Scalar::ONE);
        // the group order itself is non-canonical
        let ell: [u8; 32] = [
            0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9,
            0xde, 0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x10,
        ];
        assert!(deserialize_scalar(&ell).is_err());
    }
}
