// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Key types used throughout the OPAQUE protocol. They wrap the OPRF key
//! types so that authenticated-key-exchange keys and OPRF keys share one
//! group and one encoding.

use zeroize::Zeroize;

use crate::errors::InternalError;
use crate::group::{Element, Scalar};
use crate::oprf;

/// A private key of the suite's group.
#[derive(Clone, Debug)]
pub struct PrivateKey(pub(crate) oprf::PrivateKey);

impl PrivateKey {
    /// Derives the corresponding public key.
    pub fn public(&self) -> PublicKey {
        PublicKey(self.0.public())
    }

    /// Serializes the key as a fixed-width scalar encoding of `Nsk`
    /// bytes.
    pub fn serialize(&self) -> Vec<u8> {
        self.0.serialize()
    }

    /// Deserializes a key from a fixed-width scalar encoding.
    pub fn deserialize(suite: oprf::Suite, input: &[u8]) -> Result<Self, InternalError> {
        Ok(Self(oprf::PrivateKey::deserialize(suite, input)?))
    }

    pub(crate) fn scalar(&self) -> &Scalar {
        self.0.scalar()
    }

    /// Computes the Diffie-Hellman function with a peer public key,
    /// returning the serialized shared element.
    pub(crate) fn diffie_hellman(&self, peer: &PublicKey) -> Vec<u8> {
        peer.element().multiply(self.scalar()).encode()
    }
}

impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// A public key of the suite's group. Never the identity element.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublicKey(pub(crate) oprf::PublicKey);

impl PublicKey {
    /// Serializes the key as a compressed element encoding of `Npk`
    /// bytes.
    pub fn serialize(&self) -> Vec<u8> {
        self.0.serialize()
    }

    /// Deserializes a key from a compressed element encoding, rejecting
    /// the identity.
    pub fn deserialize(suite: oprf::Suite, input: &[u8]) -> Result<Self, InternalError> {
        Ok(Self(oprf::PublicKey::deserialize(suite, input)?))
    }

    pub(crate) fn element(&self) -> &Element {
        self.0.element()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oprf::{generate_key_pair, Suite, ALL_SUITES};
    use rand::rngs::OsRng;

    fn random_private(suite: Suite) -> PrivateKey {
        PrivateKey(generate_key_pair(suite, &mut OsRng))
    }

    #[test]
    fn public_from_private_is_stable() {
        for suite in ALL_SUITES {
            let private = random_private(suite);
            assert_eq!(private.public(), private.public());

            let restored =
                PrivateKey::deserialize(suite, &private.serialize()).unwrap();
            assert_eq!(private.public(), restored.public());
        }
    }

    #[test]
    fn diffie_hellman_is_symmetric() {
        for suite in ALL_SUITES {
            let a = random_private(suite);
            let b = random_private(suite);
            assert_eq!(
                a.diffie_hellman(&b.public()),
                b.diffie_hellman(&a.public())
            );
        }
    }

    #[test]
    fn serialization_roundtrip_and_rejection() {
        for suite in ALL_SUITES {
            let private = random_private(suite);
            let public = private.public();

            let restored = PublicKey::deserialize(suite, &public.serialize()).unwrap();
            assert_eq!(public, restored);

            let serialized = public.serialize();
            assert!(PublicKey::deserialize(suite, &serialized[1..]).is_err());
        }
    }
}
