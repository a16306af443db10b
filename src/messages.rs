// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! The OPAQUE wire messages.
//!
//! Every message carries two codecs: `serialize`/`deserialize` is the
//! fixed-width layout of the draft, matching the published test vectors
//! byte for byte; `encode`/`decode` prefixes each field with a 2-byte
//! length for contexts that want extensibility.

use crate::envelope::Envelope;
use crate::errors::ProtocolError;
use crate::group::Element;
use crate::keypair::PublicKey;
use crate::opaque::Suite;
use crate::serialization::{decode_vecs, encode_vecs};

fn deserialize_oprf_element(suite: &Suite, input: &[u8]) -> Result<Element, ProtocolError> {
    let element = suite
        .oprf()
        .group()
        .deserialize_element(input)
        .map_err(|_| ProtocolError::DeserializationError)?;
    // hashed protocol inputs never evaluate to the identity
    if element.is_identity() {
        return Err(ProtocolError::DeserializationError);
    }
    Ok(element)
}

fn deserialize_public_key(suite: &Suite, input: &[u8]) -> Result<PublicKey, ProtocolError> {
    PublicKey::deserialize(suite.oprf(), input).map_err(|_| ProtocolError::DeserializationError)
}

/// The first registration message, client to server.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegistrationRequest {
    /// blinded_message[Noe]
    pub blinded_message: Element,
}

impl RegistrationRequest {
    /// Serializes to the fixed-width layout `blinded_message`.
    pub fn serialize(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(self.blinded_message.encode())
    }

    /// Deserializes from the fixed-width layout.
    pub fn deserialize(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        if input.len() != suite.noe() {
            return Err(ProtocolError::DeserializationError);
        }
        Ok(Self {
            blinded_message: deserialize_oprf_element(suite, input)?,
        })
    }

    /// Encodes with 2-byte length prefixes.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        encode_vecs(2, &[&self.blinded_message.encode()]).map_err(|_| ProtocolError::EncodingError)
    }

    /// Decodes a length-prefixed encoding.
    pub fn decode(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        let decoded = decode_vecs(input, 1, 2)?;
        Self::deserialize(suite, &decoded.concat())
    }
}

/// The second registration message, server to client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegistrationResponse {
    /// evaluated_message[Noe]
    pub evaluated_message: Element,
    /// server_public_key[Npk]
    pub server_public_key: PublicKey,
}

impl RegistrationResponse {
    /// Serializes to the fixed-width layout
    /// `evaluated_message || server_public_key`.
    pub fn serialize(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok([
            self.evaluated_message.encode(),
            self.server_public_key.serialize(),
        ]
        .concat())
    }

    /// Deserializes from the fixed-width layout.
    pub fn deserialize(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        if input.len() != suite.noe() + suite.npk() {
            return Err(ProtocolError::DeserializationError);
        }
        Ok(Self {
            evaluated_message: deserialize_oprf_element(suite, &input[..suite.noe()])?,
            server_public_key: deserialize_public_key(suite, &input[suite.noe()..])?,
        })
    }

    /// Encodes with 2-byte length prefixes.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        encode_vecs(
            2,
            &[
                &self.evaluated_message.encode(),
                &self.server_public_key.serialize(),
            ],
        )
        .map_err(|_| ProtocolError::EncodingError)
    }

    /// Decodes a length-prefixed encoding.
    pub fn decode(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        let decoded = decode_vecs(input, 2, 2)?;
        Self::deserialize(suite, &decoded.concat())
    }
}

/// The registration record stored by the server, client to server.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegistrationRecord {
    /// client_public_key[Npk]
    pub client_public_key: PublicKey,
    /// masking_key[Nh]
    pub masking_key: Vec<u8>,
    /// envelope[Ne]
    pub envelope: Envelope,
}

impl RegistrationRecord {
    /// Serializes to the fixed-width layout
    /// `client_public_key || masking_key || envelope`.
    pub fn serialize(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok([
            self.client_public_key.serialize(),
            self.masking_key.clone(),
            self.envelope.serialize(),
        ]
        .concat())
    }

    /// Deserializes from the fixed-width layout.
    pub fn deserialize(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        if input.len() != suite.npk() + suite.nh() + suite.ne() {
            return Err(ProtocolError::DeserializationError);
        }
        let masking_key_end = suite.npk() + suite.nh();
        Ok(Self {
            client_public_key: deserialize_public_key(suite, &input[..suite.npk()])?,
            masking_key: input[suite.npk()..masking_key_end].to_vec(),
            envelope: Envelope::deserialize(suite, &input[masking_key_end..])?,
        })
    }

    /// Encodes with 2-byte length prefixes.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        if self.masking_key.is_empty() {
            return Err(ProtocolError::EncodingError);
        }
        let encoded = encode_vecs(
            2,
            &[&self.client_public_key.serialize(), &self.masking_key],
        )
        .map_err(|_| ProtocolError::EncodingError)?;
        Ok([encoded, self.envelope.encode()?].concat())
    }

    /// Decodes a length-prefixed encoding.
    pub fn decode(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        let decoded = decode_vecs(input, 4, 2)?;
        Self::deserialize(suite, &decoded.concat())
    }
}

/// The credential request inside KE1, client to server.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CredentialRequest {
    /// blinded_message[Noe]
    pub blinded_message: Element,
}

impl CredentialRequest {
    /// Serializes to the fixed-width layout `blinded_message`.
    pub fn serialize(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(self.blinded_message.encode())
    }

    /// Deserializes from the fixed-width layout.
    pub fn deserialize(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        if input.len() != suite.noe() {
            return Err(ProtocolError::DeserializationError);
        }
        Ok(Self {
            blinded_message: deserialize_oprf_element(suite, input)?,
        })
    }

    /// Encodes with 2-byte length prefixes.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        encode_vecs(2, &[&self.blinded_message.encode()]).map_err(|_| ProtocolError::EncodingError)
    }

    /// Decodes a length-prefixed encoding.
    pub fn decode(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        let decoded = decode_vecs(input, 1, 2)?;
        Self::deserialize(suite, &decoded.concat())
    }
}

/// The credential response inside KE2, server to client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CredentialResponse {
    /// evaluated_message[Noe]
    pub evaluated_message: Element,
    /// masking_nonce[Nn]
    pub masking_nonce: Vec<u8>,
    /// masked_response[Npk + Ne]
    pub masked_response: Vec<u8>,
}

impl CredentialResponse {
    /// Serializes to the fixed-width layout
    /// `evaluated_message || masking_nonce || masked_response`.
    pub fn serialize(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok([
            self.evaluated_message.encode(),
            self.masking_nonce.clone(),
            self.masked_response.clone(),
        ]
        .concat())
    }

    /// Deserializes from the fixed-width layout.
    pub fn deserialize(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        if input.len() != suite.noe() + suite.nn() + suite.npk() + suite.ne() {
            return Err(ProtocolError::DeserializationError);
        }
        let nonce_end = suite.noe() + suite.nn();
        Ok(Self {
            evaluated_message: deserialize_oprf_element(suite, &input[..suite.noe()])?,
            masking_nonce: input[suite.noe()..nonce_end].to_vec(),
            masked_response: input[nonce_end..].to_vec(),
        })
    }

    /// Encodes with 2-byte length prefixes.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        encode_vecs(
            2,
            &[
                &self.evaluated_message.encode(),
                &self.masking_nonce,
                &self.masked_response,
            ],
        )
        .map_err(|_| ProtocolError::EncodingError)
    }

    /// Decodes a length-prefixed encoding.
    pub fn decode(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        let decoded = decode_vecs(input, 3, 2)?;
        Self::deserialize(suite, &decoded.concat())
    }
}

/// The AKE request inside KE1, client to server.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthRequest {
    /// client_nonce[Nn]
    pub client_nonce: Vec<u8>,
    /// client_keyshare[Npk]
    pub client_keyshare: PublicKey,
}

impl AuthRequest {
    /// Serializes to the fixed-width layout
    /// `client_nonce || client_keyshare`.
    pub fn serialize(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok([&self.client_nonce[..], &self.client_keyshare.serialize()[..]].concat())
    }

    /// Deserializes from the fixed-width layout.
    pub fn deserialize(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        if input.len() != suite.nn() + suite.npk() {
            return Err(ProtocolError::DeserializationError);
        }
        Ok(Self {
            client_nonce: input[..suite.nn()].to_vec(),
            client_keyshare: deserialize_public_key(suite, &input[suite.nn()..])?,
        })
    }

    /// Encodes with 2-byte length prefixes.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        encode_vecs(2, &[&self.client_nonce, &self.client_keyshare.serialize()])
            .map_err(|_| ProtocolError::EncodingError)
    }

    /// Decodes a length-prefixed encoding.
    pub fn decode(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        let decoded = decode_vecs(input, 2, 2)?;
        Self::deserialize(suite, &decoded.concat())
    }
}

/// The AKE response inside KE2, server to client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthResponse {
    /// server_nonce[Nn]
    pub server_nonce: Vec<u8>,
    /// server_keyshare[Npk]
    pub server_keyshare: PublicKey,
    /// server_mac[Nm]
    pub server_mac: Vec<u8>,
}

impl AuthResponse {
    /// Serializes to the fixed-width layout
    /// `server_nonce || server_keyshare || server_mac`.
    pub fn serialize(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok([
            &self.server_nonce[..],
            &self.server_keyshare.serialize()[..],
            &self.server_mac[..],
        ]
        .concat())
    }

    /// Deserializes from the fixed-width layout.
    pub fn deserialize(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        if input.len() != suite.nn() + suite.npk() + suite.nm() {
            return Err(ProtocolError::DeserializationError);
        }
        let keyshare_end = suite.nn() + suite.npk();
        Ok(Self {
            server_nonce: input[..suite.nn()].to_vec(),
            server_keyshare: deserialize_public_key(suite, &input[suite.nn()..keyshare_end])?,
            server_mac: input[keyshare_end..].to_vec(),
        })
    }

    /// Encodes with 2-byte length prefixes.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        encode_vecs(
            2,
            &[
                &self.server_nonce,
                &self.server_keyshare.serialize(),
                &self.server_mac,
            ],
        )
        .map_err(|_| ProtocolError::EncodingError)
    }

    /// Decodes a length-prefixed encoding.
    pub fn decode(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        let decoded = decode_vecs(input, 3, 2)?;
        Self::deserialize(suite, &decoded.concat())
    }
}

/// The first login flight, client to server.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KE1 {
    /// credential_request[Noe]
    pub credential_request: CredentialRequest,
    /// auth_request[Nn + Npk]
    pub auth_request: AuthRequest,
}

impl KE1 {
    /// Serializes to the fixed-width layout
    /// `credential_request || auth_request`.
    pub fn serialize(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok([
            self.credential_request.serialize()?,
            self.auth_request.serialize()?,
        ]
        .concat())
    }

    /// Deserializes from the fixed-width layout.
    pub fn deserialize(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        if input.len() != suite.noe() + suite.nn() + suite.npk() {
            return Err(ProtocolError::DeserializationError);
        }
        Ok(Self {
            credential_request: CredentialRequest::deserialize(suite, &input[..suite.noe()])?,
            auth_request: AuthRequest::deserialize(suite, &input[suite.noe()..])?,
        })
    }

    /// Encodes with 2-byte length prefixes.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok([self.credential_request.encode()?, self.auth_request.encode()?].concat())
    }

    /// Decodes a length-prefixed encoding.
    pub fn decode(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        let decoded = decode_vecs(input, 3, 2)?;
        Self::deserialize(suite, &decoded.concat())
    }
}

/// The second login flight, server to client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KE2 {
    /// credential_response[Noe + Nn + Npk + Ne]
    pub credential_response: CredentialResponse,
    /// auth_response[Nn + Npk + Nm]
    pub auth_response: AuthResponse,
}

impl KE2 {
    /// Serializes to the fixed-width layout
    /// `credential_response || auth_response`.
    pub fn serialize(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok([
            self.credential_response.serialize()?,
            self.auth_response.serialize()?,
        ]
        .concat())
    }

    /// Deserializes from the fixed-width layout.
    pub fn deserialize(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        let credential_len = suite.noe() + suite.nn() + suite.npk() + suite.ne();
        let auth_len = suite.nn() + suite.npk() + suite.nm();
        if input.len() != credential_len + auth_len {
            return Err(ProtocolError::DeserializationError);
        }
        Ok(Self {
            credential_response: CredentialResponse::deserialize(
                suite,
                &input[..credential_len],
            )?,
            auth_response: AuthResponse::deserialize(suite, &input[credential_len..])?,
        })
    }

    /// Encodes with 2-byte length prefixes.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok([
            self.credential_response.encode()?,
            self.auth_response.encode()?,
        ]
        .concat())
    }

    /// Decodes a length-prefixed encoding.
    pub fn decode(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        let decoded = decode_vecs(input, 6, 2)?;
        Self::deserialize(suite, &decoded.concat())
    }
}

/// The third login flight, client to server.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KE3 {
    /// client_mac[Nm]
    pub client_mac: Vec<u8>,
}

impl KE3 {
    /// Serializes to the fixed-width layout `client_mac`.
    pub fn serialize(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(self.client_mac.clone())
    }

    /// Deserializes from the fixed-width layout.
    pub fn deserialize(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        if input.len() != suite.nm() {
            return Err(ProtocolError::DeserializationError);
        }
        Ok(Self {
            client_mac: input.to_vec(),
        })
    }

    /// Encodes with 2-byte length prefixes.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        encode_vecs(2, &[&self.client_mac]).map_err(|_| ProtocolError::EncodingError)
    }

    /// Decodes a length-prefixed encoding.
    pub fn decode(suite: &Suite, input: &[u8]) -> Result<Self, ProtocolError> {
        let decoded = decode_vecs(input, 1, 2)?;
        Self::deserialize(suite, &decoded.concat())
    }
}
