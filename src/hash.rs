// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! A uniform facade over the fixed-output hash functions used by the
//! protocol suites, together with their HMAC and HKDF constructions.

use blake2::Blake2b512;
use digest::core_api::BlockSizeUser;
use digest::typenum::Unsigned;
use digest::{Digest, OutputSizeUser};
use hkdf::SimpleHkdf;
use hmac::{Mac, SimpleHmac};
use sha2::{Sha256, Sha384, Sha512};
use sha3::{Sha3_256, Sha3_512};

use crate::errors::InternalError;

/// Identifies a fixed-output hash function. The SHA-2 members back the
/// recognized protocol suites; the remaining members are available for
/// standalone use of the facade.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Hash {
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
    /// SHA3-256
    Sha3_256,
    /// SHA3-512
    Sha3_512,
    /// BLAKE2b-512
    Blake2b512,
}

impl Hash {
    /// The number of bytes produced by the hash function.
    pub fn output_size(&self) -> usize {
        match self {
            Hash::Sha256 => <Sha256 as OutputSizeUser>::OutputSize::USIZE,
            Hash::Sha384 => <Sha384 as OutputSizeUser>::OutputSize::USIZE,
            Hash::Sha512 => <Sha512 as OutputSizeUser>::OutputSize::USIZE,
            Hash::Sha3_256 => <Sha3_256 as OutputSizeUser>::OutputSize::USIZE,
            Hash::Sha3_512 => <Sha3_512 as OutputSizeUser>::OutputSize::USIZE,
            Hash::Blake2b512 => <Blake2b512 as OutputSizeUser>::OutputSize::USIZE,
        }
    }

    /// The input block size of the hash function in bytes.
    pub fn block_size(&self) -> usize {
        match self {
            Hash::Sha256 => <Sha256 as BlockSizeUser>::BlockSize::USIZE,
            Hash::Sha384 => <Sha384 as BlockSizeUser>::BlockSize::USIZE,
            Hash::Sha512 => <Sha512 as BlockSizeUser>::BlockSize::USIZE,
            Hash::Sha3_256 => <Sha3_256 as BlockSizeUser>::BlockSize::USIZE,
            Hash::Sha3_512 => <Sha3_512 as BlockSizeUser>::BlockSize::USIZE,
            Hash::Blake2b512 => <Blake2b512 as BlockSizeUser>::BlockSize::USIZE,
        }
    }

    /// Hashes the concatenation of `inputs`.
    pub fn hash(&self, inputs: &[&[u8]]) -> Vec<u8> {
        match self {
            Hash::Sha256 => hash_parts::<Sha256>(inputs),
            Hash::Sha384 => hash_parts::<Sha384>(inputs),
            Hash::Sha512 => hash_parts::<Sha512>(inputs),
            Hash::Sha3_256 => hash_parts::<Sha3_256>(inputs),
            Hash::Sha3_512 => hash_parts::<Sha3_512>(inputs),
            Hash::Blake2b512 => hash_parts::<Blake2b512>(inputs),
        }
    }

    /// Computes HMAC over `message` with `key`, producing a tag of
    /// [`output_size`](Self::output_size) bytes.
    pub fn hmac(&self, key: &[u8], message: &[u8]) -> Result<Vec<u8>, InternalError> {
        match self {
            Hash::Sha256 => hmac_parts::<Sha256>(key, message),
            Hash::Sha384 => hmac_parts::<Sha384>(key, message),
            Hash::Sha512 => hmac_parts::<Sha512>(key, message),
            Hash::Sha3_256 => hmac_parts::<Sha3_256>(key, message),
            Hash::Sha3_512 => hmac_parts::<Sha3_512>(key, message),
            Hash::Blake2b512 => hmac_parts::<Blake2b512>(key, message),
        }
    }

    /// HKDF-Extract: derives a pseudorandom key from `ikm` and `salt`.
    pub fn hkdf_extract(&self, salt: &[u8], ikm: &[u8]) -> Vec<u8> {
        match self {
            Hash::Sha256 => hkdf_extract_parts::<Sha256>(salt, ikm),
            Hash::Sha384 => hkdf_extract_parts::<Sha384>(salt, ikm),
            Hash::Sha512 => hkdf_extract_parts::<Sha512>(salt, ikm),
            Hash::Sha3_256 => hkdf_extract_parts::<Sha3_256>(salt, ikm),
            Hash::Sha3_512 => hkdf_extract_parts::<Sha3_512>(salt, ikm),
            Hash::Blake2b512 => hkdf_extract_parts::<Blake2b512>(salt, ikm),
        }
    }

    /// HKDF-Expand: expands `prk` under `info` into `length` output bytes.
    /// A `length` of zero expands to the hash output size.
    pub fn hkdf_expand(
        &self,
        prk: &[u8],
        info: &[u8],
        length: usize,
    ) -> Result<Vec<u8>, InternalError> {
        let length = if length == 0 {
            self.output_size()
        } else {
            length
        };
        match self {
            Hash::Sha256 => hkdf_expand_parts::<Sha256>(prk, info, length),
            Hash::Sha384 => hkdf_expand_parts::<Sha384>(prk, info, length),
            Hash::Sha512 => hkdf_expand_parts::<Sha512>(prk, info, length),
            Hash::Sha3_256 => hkdf_expand_parts::<Sha3_256>(prk, info, length),
            Hash::Sha3_512 => hkdf_expand_parts::<Sha3_512>(prk, info, length),
            Hash::Blake2b512 => hkdf_expand_parts::<Blake2b512>(prk, info, length),
        }
    }
}

fn hash_parts<D: Digest>(inputs: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize().to_vec()
}

fn hmac_parts<D: Digest + BlockSizeUser + Clone>(
    key: &[u8],
    message: &[u8],
) -> Result<Vec<u8>, InternalError> {
    let mut mac =
        SimpleHmac::<D>::new_from_slice(key).map_err(|_| InternalError::HmacError)?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hkdf_extract_parts<D: Digest + BlockSizeUser + Clone>(salt: &[u8], ikm: &[u8]) -> Vec<u8> {
    let (prk, _) = SimpleHkdf::<D>::extract(Some(salt), ikm);
    prk.to_vec()
}

fn hkdf_expand_parts<D: Digest + BlockSizeUser + Clone>(
    prk: &[u8],
    info: &[u8],
    length: usize,
) -> Result<Vec<u8>, InternalError> {
    let hk = SimpleHkdf::<D>::from_prk(prk).map_err(|_| InternalError::HkdfError)?;
    let mut okm = vec![0u8; length];
    hk.expand(info, &mut okm)
        .map_err(|_| InternalError::HkdfError)?;
    Ok(okm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_and_block_sizes() {
        assert_eq!(Hash::Sha256.output_size(), 32);
        assert_eq!(Hash::Sha256.block_size(), 64);
        assert_eq!(Hash::Sha384.output_size(), 48);
        assert_eq!(Hash::Sha384.block_size(), 128);
        assert_eq!(Hash::Sha512.output_size(), 64);
        assert_eq!(Hash::Sha512.block_size(), 128);
        assert_eq!(Hash::Sha3_256.output_size(), 32);
        assert_eq!(Hash::Blake2b512.output_size(), 64);
    }

    #[test]
    fn sha256_known_answer() {
        assert_eq!(
            hex::encode(Hash::Sha256.hash(&[b"abc"])),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        // split input hashes the concatenation
        assert_eq!(
            Hash::Sha256.hash(&[b"a", b"b", b"c"]),
            Hash::Sha256.hash(&[b"abc"])
        );
    }

    // RFC 4231, test case 2
    #[test]
    fn hmac_sha256_known_answer() {
        let tag = Hash::Sha256
            .hmac(b"Jefe", b"what do ya want for nothing?")
            .unwrap();
        assert_eq!(
            hex::encode(tag),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    // RFC 5869, test case 1
    #[test]
    fn hkdf_sha256_known_answer() {
        let ikm = [0x0bu8; 22];
        let salt = hex::decode("000102030405060708090a0b0c").unwrap();
        let info = hex::decode("f0f1f2f3f4f5f6f7f8f9").unwrap();

        let prk = Hash::Sha256.hkdf_extract(&salt, &ikm);
        assert_eq!(
            hex::encode(&prk),
            "077709362c2e32df0ddc3f0dc47bba6390b6c73bb50f9c3122ec844ad7c2b3e5"
        );

        let okm = Hash::Sha256.hkdf_expand(&prk, &info, 42).unwrap();
        assert_eq!(
            hex::encode(okm),
            "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf\
             34007208d5b887185865"
        );
    }

    #[test]
    fn hkdf_expand_zero_length_defaults_to_output_size() {
        let prk = Hash::Sha512.hkdf_extract(b"", b"secret");
        let okm = Hash::Sha512.hkdf_expand(&prk, b"info", 0).unwrap();
        assert_eq!(okm.len(), 64);
    }

    #[test]
    fn hkdf_expand_rejects_oversized_output() {
        let prk = Hash::Sha256.hkdf_extract(b"", b"secret");
        assert!(Hash::Sha256.hkdf_expand(&prk, b"info", 255 * 32 + 1).is_err());
    }
}
