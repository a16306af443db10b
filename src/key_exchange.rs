// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! The OPAQUE-3DH authenticated key exchange: transcript preamble, key
//! schedule and the client/server AKE functions.

use subtle::ConstantTimeEq;

use crate::errors::ProtocolError;
use crate::keypair::{PrivateKey, PublicKey};
use crate::messages::{AuthRequest, AuthResponse, CredentialRequest, CredentialResponse, KE1, KE2, KE3};
use crate::opaque::{
    ClientLoginState, ServerLoginState, Suite, STR_CLIENT_MAC, STR_HANDSHAKE_SECRET, STR_OPAQUE,
    STR_RFC, STR_SERVER_MAC, STR_SESSION_KEY,
};
use crate::serialization::{i2osp, serialize_with_length};

//  struct {
//    uint16 length = Length;
//    opaque label<8..255> = "OPAQUE-" + Label;
//    uint8 context<0..255> = Context;
//  } CustomLabel;
fn build_label(label: &[u8], context: &[u8], length: usize) -> Result<Vec<u8>, ProtocolError> {
    let mut out = Vec::new();
    out.extend_from_slice(&i2osp(length, 2)?);
    out.extend_from_slice(&serialize_with_length(
        &[STR_OPAQUE, label].concat(),
        1,
    )?);
    out.extend_from_slice(&serialize_with_length(context, 1)?);
    Ok(out)
}

// Expand-Label(Secret, Label, Context, Length) = Expand(Secret, CustomLabel, Length)
fn expand_label(
    suite: &Suite,
    secret: &[u8],
    label: &[u8],
    context: &[u8],
    length: usize,
) -> Result<Vec<u8>, ProtocolError> {
    let custom_label = build_label(label, context, length)?;
    Ok(suite.expand(secret, &custom_label, length)?)
}

// Derive-Secret(Secret, Label, Transcript-Hash) =
//     Expand-Label(Secret, Label, Transcript-Hash, Nx)
fn derive_secret(
    suite: &Suite,
    secret: &[u8],
    label: &[u8],
    transcript: &[u8],
) -> Result<Vec<u8>, ProtocolError> {
    expand_label(suite, secret, label, transcript, suite.nx())
}

// The transcript preamble of both flights, hashed into the key schedule
// and into both MACs.
fn preamble(
    suite: &Suite,
    client_identity: &[u8],
    ke1: &KE1,
    server_identity: &[u8],
    credential_response: &CredentialResponse,
    server_nonce: &[u8],
    server_keyshare: &PublicKey,
) -> Result<Vec<u8>, ProtocolError> {
    let mut out = Vec::new();
    out.extend_from_slice(STR_RFC);
    out.extend_from_slice(&serialize_with_length(suite.context, 2)?);
    out.extend_from_slice(&serialize_with_length(client_identity, 2)?);
    out.extend_from_slice(&ke1.serialize()?);
    out.extend_from_slice(&serialize_with_length(server_identity, 2)?);
    out.extend_from_slice(&credential_response.serialize()?);
    out.extend_from_slice(server_nonce);
    out.extend_from_slice(&server_keyshare.serialize());
    Ok(out)
}

struct DerivedKeys {
    km2: Vec<u8>,
    km3: Vec<u8>,
    session_key: Vec<u8>,
}

// The shared-secret derivation of the draft:
//   prk              = Extract("", ikm)
//   handshake_secret = Derive-Secret(prk, "HandshakeSecret", Hash(preamble))
//   session_key      = Derive-Secret(prk, "SessionKey", Hash(preamble))
//   Km2              = Derive-Secret(handshake_secret, "ServerMAC", "")
//   Km3              = Derive-Secret(handshake_secret, "ClientMAC", "")
fn derive_keys(suite: &Suite, ikm: &[u8], preamble: &[u8]) -> Result<DerivedKeys, ProtocolError> {
    let hashed_preamble = suite.hash(&[preamble]);

    let prk = suite.extract(&[], ikm);
    let handshake_secret = derive_secret(suite, &prk, STR_HANDSHAKE_SECRET, &hashed_preamble)?;
    let session_key = derive_secret(suite, &prk, STR_SESSION_KEY, &hashed_preamble)?;
    let km2 = derive_secret(suite, &handshake_secret, STR_SERVER_MAC, &[])?;
    let km3 = derive_secret(suite, &handshake_secret, STR_CLIENT_MAC, &[])?;

    Ok(DerivedKeys {
        km2,
        km3,
        session_key,
    })
}

impl Suite {
    /// Corresponds to the 3DH AuthClientStart() function: wraps the
    /// credential request with the client nonce and ephemeral key share
    /// into KE1.
    pub(crate) fn auth_client_start(
        &self,
        credential_request: &CredentialRequest,
        client_nonce: &[u8],
        client_secret: &PrivateKey,
    ) -> Result<KE1, ProtocolError> {
        Ok(KE1 {
            credential_request: credential_request.clone(),
            auth_request: AuthRequest {
                client_nonce: client_nonce.to_vec(),
                client_keyshare: client_secret.public(),
            },
        })
    }

    /// Corresponds to the 3DH AuthClientFinalize() function: derives the
    /// session keys, checks the server MAC and produces KE3.
    ///
    /// `client_identity` and `server_identity` must already carry the
    /// public-key substitution for absent identities.
    pub(crate) fn auth_client_finalize(
        &self,
        state: &ClientLoginState,
        client_identity: &[u8],
        server_identity: &[u8],
        client_private_key: &PrivateKey,
        server_public_key: &PublicKey,
        ke2: &KE2,
    ) -> Result<(KE3, Vec<u8>), ProtocolError> {
        // dh1 = client_secret * ke2.server_keyshare
        let dh1 = state
            .client_secret
            .diffie_hellman(&ke2.auth_response.server_keyshare);
        // dh2 = client_secret * server_public_key
        let dh2 = state.client_secret.diffie_hellman(server_public_key);
        // dh3 = client_private_key * ke2.server_keyshare
        let dh3 = client_private_key.diffie_hellman(&ke2.auth_response.server_keyshare);
        let ikm = [dh1, dh2, dh3].concat();

        let preamble = preamble(
            self,
            client_identity,
            &state.ke1,
            server_identity,
            &ke2.credential_response,
            &ke2.auth_response.server_nonce,
            &ke2.auth_response.server_keyshare,
        )?;

        let keys = derive_keys(self, &ikm, &preamble)?;

        let expected_server_mac = self.mac(&keys.km2, &self.hash(&[&preamble]))?;
        if !bool::from(expected_server_mac.ct_eq(&ke2.auth_response.server_mac)) {
            return Err(ProtocolError::ServerAuthenticationError);
        }

        let client_mac = self.mac(
            &keys.km3,
            &self.hash(&[&preamble, &expected_server_mac]),
        )?;

        Ok((KE3 { client_mac }, keys.session_key))
    }

    /// Corresponds to the 3DH AuthServerRespond() function: derives the
    /// session keys, produces the server MAC and precomputes the expected
    /// client MAC.
    ///
    /// `server_identity` and `client_identity` must already carry the
    /// public-key substitution for absent identities.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn auth_server_respond(
        &self,
        server_private_key: &PrivateKey,
        server_identity: &[u8],
        client_identity: &[u8],
        client_public_key: &PublicKey,
        ke1: &KE1,
        credential_response: &CredentialResponse,
        server_nonce: &[u8],
        server_keyshare_secret: PrivateKey,
    ) -> Result<(ServerLoginState, AuthResponse), ProtocolError> {
        let server_keyshare = server_keyshare_secret.public();

        let preamble = preamble(
            self,
            client_identity,
            ke1,
            server_identity,
            credential_response,
            server_nonce,
            &server_keyshare,
        )?;

        // dh1 = server_keyshare_secret * ke1.client_keyshare
        let dh1 = server_keyshare_secret.diffie_hellman(&ke1.auth_request.client_keyshare);
        // dh2 = server_private_key * ke1.client_keyshare
        let dh2 = server_private_key.diffie_hellman(&ke1.auth_request.client_keyshare);
        // dh3 = server_keyshare_secret * client_public_key
        let dh3 = server_keyshare_secret.diffie_hellman(client_public_key);
        let ikm = [dh1, dh2, dh3].concat();

        let keys = derive_keys(self, &ikm, &preamble)?;

        let server_mac = self.mac(&keys.km2, &self.hash(&[&preamble]))?;
        let expected_client_mac =
            self.mac(&keys.km3, &self.hash(&[&preamble, &server_mac]))?;

        Ok((
            ServerLoginState {
                expected_client_mac,
                session_key: keys.session_key,
            },
            AuthResponse {
                server_nonce: server_nonce.to_vec(),
                server_keyshare,
                server_mac,
            },
        ))
    }

    /// Corresponds to the 3DH AuthServerFinalize() function: verifies the
    /// client MAC in constant time and releases the session key.
    pub(crate) fn auth_server_finalize(
        &self,
        state: &ServerLoginState,
        ke3: &KE3,
    ) -> Result<Vec<u8>, ProtocolError> {
        if !bool::from(state.expected_client_mac.ct_eq(&ke3.client_mac)) {
            return Err(ProtocolError::ClientAuthenticationError);
        }
        Ok(state.session_key.clone())
    }
}
