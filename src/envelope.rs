// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! The OPAQUE envelope: the client's sealed credentials, created at
//! registration and opened at login.
//!
//! The envelope carries no encrypted payload; the client's private key is
//! re-derived from the randomized password and the envelope nonce, and the
//! authentication tag binds it to the server public key and both
//! identities.

use subtle::ConstantTimeEq;

use crate::errors::ProtocolError;
use crate::keypair::{PrivateKey, PublicKey};
use crate::opaque::{Suite, STR_AUTH_KEY, STR_EXPORT_KEY, STR_MASKING_KEY, STR_PRIVATE_KEY};
use crate::serialization::encode_vecs;

/// The envelope structure of the draft: a random nonce and an
/// authentication tag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Envelope {
    /// nonce[Nn]
    pub nonce: Vec<u8>,
    /// auth_tag[Nm]
    pub auth_tag: Vec<u8>,
}

impl Envelope {
    /// Serializes the envelope as `nonce || auth_tag`.
    pub fn serialize(&self) -> Vec<u8> {
        [&self.nonce[..], &self.auth_tag[..]].concat()
    }

    /// Deserializes an envelope from exactly `Nn + Nm` bytes.
    pub fn deserialize(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        if input.len() != suite.ne() {
            return Err(ProtocolError::DeserializationError);
        }
        Ok(Self {
            nonce: input[..suite.nn()].to_vec(),
            auth_tag: input[suite.nn()..].to_vec(),
        })
    }

    /// Encodes the envelope with 2-byte length prefixes per field.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        encode_vecs(2, &[&self.nonce, &self.auth_tag]).map_err(|_| ProtocolError::EncodingError)
    }

    /// Decodes a length-prefixed envelope.
    pub fn decode(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        let decoded = crate::serialization::decode_vecs(input, 2, 2)?;
        Self::deserialize(suite, &decoded.concat())
    }

    /// An all-zero envelope of the right width, used for synthesized
    /// records of unknown credentials.
    pub(crate) fn dummy(suite: &Suite) -> Self {
        Self {
            nonce: vec![0u8; suite.nn()],
            auth_tag: vec![0u8; suite.nm()],
        }
    }
}

/// The credentials authenticated by the envelope tag. Unset identities
/// default to the serialized public keys.
pub(crate) struct CleartextCredentials {
    server_public_key: Vec<u8>,
    server_identity: Vec<u8>,
    client_identity: Vec<u8>,
}

impl CleartextCredentials {
    pub(crate) fn new(
        server_public_key: &[u8],
        client_public_key: &[u8],
        server_identity: Option<&[u8]>,
        client_identity: Option<&[u8]>,
    ) -> Self {
        let server_identity = match server_identity {
            Some(id) if !id.is_empty() => id.to_vec(),
            _ => server_public_key.to_vec(),
        };
        let client_identity = match client_identity {
            Some(id) if !id.is_empty() => id.to_vec(),
            _ => client_public_key.to_vec(),
        };
        Self {
            server_public_key: server_public_key.to_vec(),
            server_identity,
            client_identity,
        }
    }

    /// The raw server public key followed by the length-prefixed
    /// identities, exactly the struct layout hashed into the tag.
    pub(crate) fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let identities = encode_vecs(2, &[&self.server_identity, &self.client_identity])
            .map_err(|_| ProtocolError::EncodingError)?;
        Ok([&self.server_public_key[..], &identities[..]].concat())
    }
}

impl Suite {
    /// Seals an envelope over the given credentials. Corresponds to the
    /// Store() function of the draft; the nonce is supplied by the caller
    /// so that registration can expose a deterministic variant.
    ///
    /// Returns the envelope, the client's public key, the masking key and
    /// the export key.
    pub(crate) fn store(
        &self,
        randomized_pwd: &[u8],
        server_public_key: &PublicKey,
        server_identity: Option<&[u8]>,
        client_identity: Option<&[u8]>,
        envelope_nonce: &[u8],
    ) -> Result<(Envelope, PublicKey, Vec<u8>, Vec<u8>), ProtocolError> {
        let nh = self.nh();

        let masking_key = self.expand(randomized_pwd, STR_MASKING_KEY, nh)?;
        let auth_key = self.expand(
            randomized_pwd,
            &[envelope_nonce, STR_AUTH_KEY].concat(),
            nh,
        )?;
        let export_key = self.expand(
            randomized_pwd,
            &[envelope_nonce, STR_EXPORT_KEY].concat(),
            nh,
        )?;
        let seed = self.expand(
            randomized_pwd,
            &[envelope_nonce, STR_PRIVATE_KEY].concat(),
            self.nseed(),
        )?;

        let client_private_key = self.derive_auth_key_pair(&seed)?;
        let client_public_key = client_private_key.public();

        let credentials = CleartextCredentials::new(
            &server_public_key.serialize(),
            &client_public_key.serialize(),
            server_identity,
            client_identity,
        );
        let auth_tag = self.mac(
            &auth_key,
            &[envelope_nonce, &credentials.encode()?[..]].concat(),
        )?;

        Ok((
            Envelope {
                nonce: envelope_nonce.to_vec(),
                auth_tag,
            },
            client_public_key,
            masking_key,
            export_key,
        ))
    }

    /// Opens an envelope. Corresponds to the Recover() function of the
    /// draft: re-derives the client key pair and verifies the tag in
    /// constant time.
    ///
    /// Returns the client's private key and the export key.
    pub(crate) fn recover(
        &self,
        randomized_pwd: &[u8],
        server_public_key: &PublicKey,
        envelope: &Envelope,
        server_identity: Option<&[u8]>,
        client_identity: Option<&[u8]>,
    ) -> Result<(PrivateKey, Vec<u8>), ProtocolError> {
        let nh = self.nh();

        let auth_key = self.expand(
            randomized_pwd,
            &[&envelope.nonce[..], STR_AUTH_KEY].concat(),
            nh,
        )?;
        let export_key = self.expand(
            randomized_pwd,
            &[&envelope.nonce[..], STR_EXPORT_KEY].concat(),
            nh,
        )?;
        let seed = self.expand(
            randomized_pwd,
            &[&envelope.nonce[..], STR_PRIVATE_KEY].concat(),
            self.nseed(),
        )?;

        let client_private_key = self.derive_auth_key_pair(&seed)?;

        let credentials = CleartextCredentials::new(
            &server_public_key.serialize(),
            &client_private_key.public().serialize(),
            server_identity,
            client_identity,
        );
        let expected_tag = self.mac(
            &auth_key,
            &[&envelope.nonce[..], &credentials.encode()?[..]].concat(),
        )?;

        if !bool::from(expected_tag.ct_eq(&envelope.auth_tag)) {
            return Err(ProtocolError::EnvelopeRecoveryError);
        }

        Ok((client_private_key, export_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opaque::CipherSuite;
    use rand::rngs::OsRng;
    use rand::RngCore;

    fn setup(suite: &Suite) -> (Vec<u8>, PublicKey, Vec<u8>) {
        let mut rng = OsRng;
        let mut randomized_pwd = vec![0u8; suite.nh()];
        rng.fill_bytes(&mut randomized_pwd);
        let server_public_key = suite.generate_auth_key_pair(&mut rng).unwrap().public();
        let mut nonce = vec![0u8; suite.nn()];
        rng.fill_bytes(&mut nonce);
        (randomized_pwd, server_public_key, nonce)
    }

    #[test]
    fn store_then_recover() {
        for cipher_suite in [CipherSuite::Ristretto255Sha512, CipherSuite::P256Sha256] {
            let suite = cipher_suite.suite();
            let (randomized_pwd, server_public_key, nonce) = setup(&suite);

            let (envelope, client_public_key, _, export_key) = suite
                .store(&randomized_pwd, &server_public_key, None, None, &nonce)
                .unwrap();

            let (client_private_key, recovered_export_key) = suite
                .recover(&randomized_pwd, &server_public_key, &envelope, None, None)
                .unwrap();

            assert_eq!(client_private_key.public(), client_public_key);
            assert_eq!(export_key, recovered_export_key);
        }
    }

    #[test]
    fn tampered_tag_is_rejected() {
        let suite = CipherSuite::Ristretto255Sha512.suite();
        let (randomized_pwd, server_public_key, nonce) = setup(&suite);

        let (mut envelope, _, _, _) = suite
            .store(&randomized_pwd, &server_public_key, None, None, &nonce)
            .unwrap();
        envelope.auth_tag[0] ^= 1;

        assert_eq!(
            suite
                .recover(&randomized_pwd, &server_public_key, &envelope, None, None)
                .unwrap_err(),
            ProtocolError::EnvelopeRecoveryError
        );
    }

    #[test]
    fn identity_mismatch_is_rejected() {
        let suite = CipherSuite::P256Sha256.suite();
        let (randomized_pwd, server_public_key, nonce) = setup(&suite);

        let (envelope, _, _, _) = suite
            .store(
                &randomized_pwd,
                &server_public_key,
                Some(b"server.example"),
                None,
                &nonce,
            )
            .unwrap();

        assert!(suite
            .recover(
                &randomized_pwd,
                &server_public_key,
                &envelope,
                Some(b"other.example"),
                None,
            )
            .is_err());
    }

    #[test]
    fn explicit_identity_equal_to_public_key_matches_absent() {
        let suite = CipherSuite::Ristretto255Sha512.suite();
        let (randomized_pwd, server_public_key, nonce) = setup(&suite);

        let (envelope, _, _, _) = suite
            .store(&randomized_pwd, &server_public_key, None, None, &nonce)
            .unwrap();

        // passing the serialized public key explicitly must verify
        // against an envelope sealed with the identity absent
        let spk = server_public_key.serialize();
        assert!(suite
            .recover(
                &randomized_pwd,
                &server_public_key,
                &envelope,
                Some(&spk),
                None,
            )
            .is_ok());
    }

    #[test]
    fn serialization_and_encoding_roundtrip() {
        let suite = CipherSuite::P256Sha256.suite();
        let (randomized_pwd, server_public_key, nonce) = setup(&suite);
        let (envelope, _, _, _) = suite
            .store(&randomized_pwd, &server_public_key, None, None, &nonce)
            .unwrap();

        let serialized = envelope.serialize();
        assert_eq!(serialized.len(), suite.ne());
        assert_eq!(Envelope::deserialize(&suite, &serialized).unwrap(), envelope);
        assert!(Envelope::deserialize(&suite, &serialized[1..]).is_err());

        let encoded = envelope.encode().unwrap();
        assert_eq!(Envelope::decode(&suite, &encoded).unwrap(), envelope);
    }
}
