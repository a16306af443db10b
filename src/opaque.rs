// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! The OPAQUE asymmetric password-authenticated key exchange protocol:
//! cipher suite configuration, registration, credential retrieval and the
//! login facade over the OPAQUE-3DH key exchange.

use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::errors::{InternalError, ProtocolError};
use crate::group::{Element, Group, Scalar};
use crate::hash::Hash;
use crate::keypair::{PrivateKey, PublicKey};
use crate::ksf::Ksf;
use crate::messages::{
    CredentialRequest, CredentialResponse, RegistrationRecord, RegistrationRequest,
    RegistrationResponse, KE1, KE2, KE3,
};
use crate::oprf;
use crate::serialization::xor;

// Labels of the key schedule and envelope KDF chain; all of them are part
// of the wire contract.
pub(crate) const STR_RFC: &[u8] = b"RFCXXXX";
pub(crate) const STR_OPAQUE: &[u8] = b"OPAQUE-";
pub(crate) const STR_CREDENTIAL_RESPONSE_PAD: &[u8] = b"CredentialResponsePad";
pub(crate) const STR_OPRF_KEY: &[u8] = b"OprfKey";
pub(crate) const STR_MASKING_KEY: &[u8] = b"MaskingKey";
pub(crate) const STR_AUTH_KEY: &[u8] = b"AuthKey";
pub(crate) const STR_EXPORT_KEY: &[u8] = b"ExportKey";
pub(crate) const STR_PRIVATE_KEY: &[u8] = b"PrivateKey";
pub(crate) const STR_SESSION_KEY: &[u8] = b"SessionKey";
pub(crate) const STR_SERVER_MAC: &[u8] = b"ServerMAC";
pub(crate) const STR_CLIENT_MAC: &[u8] = b"ClientMAC";
pub(crate) const STR_HANDSHAKE_SECRET: &[u8] = b"HandshakeSecret";
const STR_OPAQUE_DERIVE_KEY_PAIR: &[u8] = b"OPAQUE-DeriveKeyPair";
const STR_OPAQUE_DERIVE_AUTH_KEY_PAIR: &[u8] = b"OPAQUE-DeriveAuthKeyPair";

// Application context bound into every transcript.
const CONTEXT: &[u8] = b"cryptomonyOPAQUE-v1.0.0";

const NONCE_LEN: usize = 32;
const SEED_LEN: usize = 32;

/// Identifies a recommended OPAQUE configuration.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CipherSuite {
    /// OPRF(ristretto255, SHA-512), HKDF-SHA-512, HMAC-SHA-512, SHA-512,
    /// Scrypt(32768,8,1), internal key recovery, ristretto255
    Ristretto255Sha512,
    /// OPRF(P-256, SHA-256), HKDF-SHA-256, HMAC-SHA-256, SHA-256,
    /// Scrypt(32768,8,1), internal key recovery, P-256
    P256Sha256,
}

impl CipherSuite {
    /// Instantiates the full suite configuration.
    pub fn suite(self) -> Suite {
        match self {
            CipherSuite::Ristretto255Sha512 => Suite {
                oprf: oprf::Suite::Ristretto255Sha512,
                group: Group::Ristretto255Sha512,
                ksf: Ksf::Scrypt,
                kdf: Hash::Sha512,
                mac: Hash::Sha512,
                hash: Hash::Sha512,
                context: CONTEXT,
            },
            CipherSuite::P256Sha256 => Suite {
                oprf: oprf::Suite::P256Sha256,
                group: Group::P256Sha256,
                ksf: Ksf::Scrypt,
                kdf: Hash::Sha256,
                mac: Hash::Sha256,
                hash: Hash::Sha256,
                context: CONTEXT,
            },
        }
    }
}

/// A fully instantiated OPAQUE suite: the OPRF ciphersuite, the AKE group
/// and the symmetric primitives, plus the application context string.
#[derive(Clone, Copy, Debug)]
pub struct Suite {
    oprf: oprf::Suite,
    group: Group,
    ksf: Ksf,
    kdf: Hash,
    mac: Hash,
    hash: Hash,
    pub(crate) context: &'static [u8],
}

impl Suite {
    /// The OPRF ciphersuite of the suite.
    pub fn oprf(&self) -> oprf::Suite {
        self.oprf
    }

    /// The prime-order group of the suite.
    pub fn group(&self) -> Group {
        self.group
    }

    // Dynamic lengths. Names follow the draft.

    /// Output length of the hash function.
    pub fn nh(&self) -> usize {
        self.hash.output_size()
    }

    /// Length of an encoded public key.
    pub fn npk(&self) -> usize {
        self.group.element_length()
    }

    /// Length of an encoded private key.
    pub fn nsk(&self) -> usize {
        self.group.scalar_length()
    }

    /// Output length of the MAC.
    pub fn nm(&self) -> usize {
        self.mac.output_size()
    }

    /// Output length of HKDF-Extract.
    pub fn nx(&self) -> usize {
        self.kdf.output_size()
    }

    /// Length of an encoded OPRF group element.
    pub fn noe(&self) -> usize {
        self.oprf.group().element_length()
    }

    /// Length of an encoded OPRF scalar.
    pub fn nok(&self) -> usize {
        self.oprf.group().scalar_length()
    }

    /// Nonce length.
    pub fn nn(&self) -> usize {
        NONCE_LEN
    }

    /// Key derivation seed length.
    pub fn nseed(&self) -> usize {
        SEED_LEN
    }

    /// Length of a serialized envelope.
    pub fn ne(&self) -> usize {
        self.nn() + self.nm()
    }

    // Symmetric primitives.

    /// HKDF-Expand under the suite's KDF.
    pub(crate) fn expand(
        &self,
        prk: &[u8],
        info: &[u8],
        length: usize,
    ) -> Result<Vec<u8>, InternalError> {
        self.kdf.hkdf_expand(prk, info, length)
    }

    /// HKDF-Extract under the suite's KDF.
    pub(crate) fn extract(&self, salt: &[u8], ikm: &[u8]) -> Vec<u8> {
        self.kdf.hkdf_extract(salt, ikm)
    }

    /// HMAC under the suite's MAC hash.
    pub(crate) fn mac(&self, key: &[u8], message: &[u8]) -> Result<Vec<u8>, InternalError> {
        self.mac.hmac(key, message)
    }

    /// Transcript hash.
    pub(crate) fn hash(&self, inputs: &[&[u8]]) -> Vec<u8> {
        self.hash.hash(inputs)
    }

    /// Key stretching under the suite's KSF.
    pub(crate) fn stretch(&self, password: &[u8], length: usize) -> Result<Vec<u8>, InternalError> {
        self.ksf.harden(password, &[], length)
    }

    // Key creation.

    /// Derives an OPRF-usage key pair from a seed of `Nseed` bytes.
    pub fn derive_key_pair(&self, seed: &[u8]) -> Result<PrivateKey, ProtocolError> {
        if seed.len() != self.nseed() {
            return Err(ProtocolError::SeedLengthError);
        }
        Ok(PrivateKey(oprf::derive_key_pair(
            self.oprf,
            oprf::Mode::Oprf,
            seed,
            STR_OPAQUE_DERIVE_KEY_PAIR,
        )?))
    }

    /// Generates a fresh OPRF-usage key pair.
    pub fn generate_key_pair<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<PrivateKey, ProtocolError> {
        let mut seed = vec![0u8; self.nseed()];
        rng.fill_bytes(&mut seed);
        self.derive_key_pair(&seed)
    }

    /// Derives an AKE key pair from a seed of `Nseed` bytes.
    pub fn derive_auth_key_pair(&self, seed: &[u8]) -> Result<PrivateKey, ProtocolError> {
        if seed.len() != self.nseed() {
            return Err(ProtocolError::SeedLengthError);
        }
        Ok(PrivateKey(oprf::derive_key_pair(
            self.oprf,
            oprf::Mode::Oprf,
            seed,
            STR_OPAQUE_DERIVE_AUTH_KEY_PAIR,
        )?))
    }

    /// Generates a fresh AKE key pair.
    pub fn generate_auth_key_pair<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<PrivateKey, ProtocolError> {
        let mut seed = vec![0u8; self.nseed()];
        rng.fill_bytes(&mut seed);
        self.derive_auth_key_pair(&seed)
    }

    /// Generates a random OPRF seed of `Nh` bytes for the server.
    pub fn generate_oprf_seed<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Vec<u8> {
        let mut seed = vec![0u8; self.nh()];
        rng.fill_bytes(&mut seed);
        seed
    }

    // OPRF bridging.

    // blind the password under a caller-chosen blind
    pub(crate) fn oprf_blind(
        &self,
        password: &[u8],
        blind: Scalar,
    ) -> Result<(Scalar, Element), ProtocolError> {
        let client = oprf::OprfClient::new(self.oprf);
        let (fin_data, eval_request) =
            client.deterministic_blind(&[password], vec![blind])?;
        Ok((fin_data.blinds[0], eval_request.blinded_elements[0]))
    }

    // oprf_output = Finalize(password, blind, evaluated_element)
    pub(crate) fn oprf_finalize(
        &self,
        evaluated_element: &Element,
        password: &[u8],
        blind: &Scalar,
    ) -> Result<Vec<u8>, ProtocolError> {
        let client = oprf::OprfClient::new(self.oprf);
        let fin_data = oprf::FinalizeData {
            inputs: vec![password.to_vec()],
            blinds: vec![*blind],
            eval_request: oprf::EvaluationRequest {
                blinded_elements: vec![*evaluated_element],
            },
        };
        let eval_response = oprf::EvaluationResponse {
            evaluated_elements: vec![*evaluated_element],
            proof: None,
        };
        let mut outputs = client.finalize(&fin_data, &eval_response)?;
        Ok(outputs.remove(0))
    }

    // evaluated_element = oprf_key * blinded_element
    pub(crate) fn oprf_evaluate(
        &self,
        blinded_element: &Element,
        oprf_key: &PrivateKey,
    ) -> Result<Element, ProtocolError> {
        let server = oprf::OprfServer::new(self.oprf, oprf_key.0.clone());
        let eval_request = oprf::EvaluationRequest {
            blinded_elements: vec![*blinded_element],
        };
        let mut eval_response = server.blind_evaluate(&eval_request)?;
        Ok(eval_response.evaluated_elements.remove(0))
    }

    // per-client OPRF key: DeriveKeyPair(Expand(oprf_seed, credential_identifier || "OprfKey", Nok))
    fn client_oprf_key(
        &self,
        credential_identifier: &[u8],
        oprf_seed: &[u8],
    ) -> Result<PrivateKey, ProtocolError> {
        if oprf_seed.len() != self.nh() {
            return Err(ProtocolError::OprfSeedLengthError);
        }
        let seed = self.expand(
            oprf_seed,
            &[credential_identifier, STR_OPRF_KEY].concat(),
            self.nok(),
        )?;
        self.derive_key_pair(&seed)
    }

    // randomized_pwd = Extract("", oprf_output || Stretch(oprf_output))
    fn randomized_password(&self, oprf_output: &[u8]) -> Result<Vec<u8>, ProtocolError> {
        let stretched = self.stretch(oprf_output, self.noe())?;
        Ok(self.extract(&[], &[oprf_output, &stretched[..]].concat()))
    }

    // Registration.

    /// Creates the client's registration request, blinding the password
    /// with a fresh blind kept in the returned state.
    pub fn create_registration_request<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        password: &[u8],
    ) -> Result<(ClientRegistrationState, RegistrationRequest), ProtocolError> {
        let blind = self.oprf.group().random_scalar(rng);
        self.create_registration_request_with_blind(password, blind)
    }

    /// Deterministic variant of
    /// [`create_registration_request`](Self::create_registration_request)
    /// taking the blind from the caller. Reserved for test vectors.
    pub fn create_registration_request_with_blind(
        &self,
        password: &[u8],
        blind: Scalar,
    ) -> Result<(ClientRegistrationState, RegistrationRequest), ProtocolError> {
        let (blind, blinded_element) = self.oprf_blind(password, blind)?;
        Ok((
            ClientRegistrationState {
                password: password.to_vec(),
                blind,
            },
            RegistrationRequest {
                blinded_message: blinded_element,
            },
        ))
    }

    /// Evaluates a registration request under the per-client OPRF key
    /// derived from `oprf_seed`.
    pub fn create_registration_response(
        &self,
        request: &RegistrationRequest,
        server_public_key: &PublicKey,
        credential_identifier: &[u8],
        oprf_seed: &[u8],
    ) -> Result<RegistrationResponse, ProtocolError> {
        let oprf_key = self.client_oprf_key(credential_identifier, oprf_seed)?;
        let evaluated_element = self.oprf_evaluate(&request.blinded_message, &oprf_key)?;
        Ok(RegistrationResponse {
            evaluated_message: evaluated_element,
            server_public_key: server_public_key.clone(),
        })
    }

    /// Finalizes registration on the client: derives the randomized
    /// password, seals the envelope and produces the record to store on
    /// the server together with the export key.
    pub fn finalize_registration_request<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        state: &ClientRegistrationState,
        server_identity: Option<&[u8]>,
        client_identity: Option<&[u8]>,
        response: &RegistrationResponse,
    ) -> Result<(RegistrationRecord, Vec<u8>), ProtocolError> {
        let mut envelope_nonce = vec![0u8; self.nn()];
        rng.fill_bytes(&mut envelope_nonce);
        self.finalize_registration_request_with_nonce(
            state,
            server_identity,
            client_identity,
            response,
            &envelope_nonce,
        )
    }

    /// Deterministic variant of
    /// [`finalize_registration_request`](Self::finalize_registration_request)
    /// taking the envelope nonce from the caller. Reserved for test
    /// vectors.
    pub fn finalize_registration_request_with_nonce(
        &self,
        state: &ClientRegistrationState,
        server_identity: Option<&[u8]>,
        client_identity: Option<&[u8]>,
        response: &RegistrationResponse,
        envelope_nonce: &[u8],
    ) -> Result<(RegistrationRecord, Vec<u8>), ProtocolError> {
        let oprf_output =
            self.oprf_finalize(&response.evaluated_message, &state.password, &state.blind)?;
        let randomized_pwd = self.randomized_password(&oprf_output)?;

        let (envelope, client_public_key, masking_key, export_key) = self.store(
            &randomized_pwd,
            &response.server_public_key,
            server_identity,
            client_identity,
            envelope_nonce,
        )?;

        Ok((
            RegistrationRecord {
                client_public_key,
                masking_key,
                envelope,
            },
            export_key,
        ))
    }

    // Credential retrieval.

    /// Creates the client's credential request for login.
    pub fn create_credential_request<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        password: &[u8],
    ) -> Result<(Scalar, CredentialRequest), ProtocolError> {
        let blind = self.oprf.group().random_scalar(rng);
        self.create_credential_request_with_blind(password, blind)
    }

    /// Deterministic variant of
    /// [`create_credential_request`](Self::create_credential_request)
    /// taking the blind from the caller. Reserved for test vectors.
    pub fn create_credential_request_with_blind(
        &self,
        password: &[u8],
        blind: Scalar,
    ) -> Result<(Scalar, CredentialRequest), ProtocolError> {
        let (blind, blinded_element) = self.oprf_blind(password, blind)?;
        Ok((
            blind,
            CredentialRequest {
                blinded_message: blinded_element,
            },
        ))
    }

    /// Evaluates a credential request and masks the stored credentials
    /// under the record's masking key.
    pub fn create_credential_response(
        &self,
        request: &CredentialRequest,
        server_public_key: &PublicKey,
        record: &RegistrationRecord,
        credential_identifier: &[u8],
        oprf_seed: &[u8],
        masking_nonce: &[u8],
    ) -> Result<CredentialResponse, ProtocolError> {
        let oprf_key = self.client_oprf_key(credential_identifier, oprf_seed)?;
        let evaluated_element = self.oprf_evaluate(&request.blinded_message, &oprf_key)?;

        // credential_response_pad = Expand(masking_key,
        //     masking_nonce || "CredentialResponsePad", Npk + Ne)
        let pad = self.expand(
            &record.masking_key,
            &[masking_nonce, STR_CREDENTIAL_RESPONSE_PAD].concat(),
            self.npk() + self.ne(),
        )?;

        let payload = [
            server_public_key.serialize(),
            record.envelope.serialize(),
        ]
        .concat();
        let masked_response = xor(&pad, &payload).map_err(ProtocolError::CryptoError)?;

        Ok(CredentialResponse {
            evaluated_message: evaluated_element,
            masking_nonce: masking_nonce.to_vec(),
            masked_response,
        })
    }

    /// Recovers the client's private key, the server public key and the
    /// export key from a credential response.
    pub fn recover_credentials(
        &self,
        password: &[u8],
        blind: &Scalar,
        response: &CredentialResponse,
        server_identity: Option<&[u8]>,
        client_identity: Option<&[u8]>,
    ) -> Result<(PrivateKey, PublicKey, Vec<u8>), ProtocolError> {
        let oprf_output = self.oprf_finalize(&response.evaluated_message, password, blind)?;
        let randomized_pwd = self.randomized_password(&oprf_output)?;

        let masking_key = self.expand(&randomized_pwd, STR_MASKING_KEY, self.nh())?;
        let pad = self.expand(
            &masking_key,
            &[&response.masking_nonce[..], STR_CREDENTIAL_RESPONSE_PAD].concat(),
            self.npk() + self.ne(),
        )?;

        let payload = xor(&pad, &response.masked_response)
            .map_err(|_| ProtocolError::RecoverCredentialsError)?;
        if payload.len() != self.npk() + self.ne() {
            return Err(ProtocolError::RecoverCredentialsError);
        }

        let server_public_key = PublicKey::deserialize(self.oprf, &payload[..self.npk()])
            .map_err(|_| ProtocolError::RecoverCredentialsError)?;
        let envelope = crate::envelope::Envelope::deserialize(self, &payload[self.npk()..])?;

        let (client_private_key, export_key) = self.recover(
            &randomized_pwd,
            &server_public_key,
            &envelope,
            server_identity,
            client_identity,
        )?;

        Ok((client_private_key, server_public_key, export_key))
    }

    // Login facade.

    /// Begins the AKE on the client, producing the state to keep and the
    /// KE1 message for the server.
    pub fn client_init<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        password: &[u8],
    ) -> Result<(ClientLoginState, KE1), ProtocolError> {
        let blind = self.oprf.group().random_scalar(rng);
        let mut client_nonce = vec![0u8; self.nn()];
        rng.fill_bytes(&mut client_nonce);
        let client_secret = self.generate_auth_key_pair(rng)?;
        self.client_init_with(password, blind, &client_nonce, client_secret)
    }

    /// Deterministic variant of [`client_init`](Self::client_init) taking
    /// the blind, nonce and ephemeral key from the caller. Reserved for
    /// test vectors.
    pub fn client_init_with(
        &self,
        password: &[u8],
        blind: Scalar,
        client_nonce: &[u8],
        client_secret: PrivateKey,
    ) -> Result<(ClientLoginState, KE1), ProtocolError> {
        let (blind, credential_request) =
            self.create_credential_request_with_blind(password, blind)?;
        let ke1 = self.auth_client_start(&credential_request, client_nonce, &client_secret)?;
        Ok((
            ClientLoginState {
                password: password.to_vec(),
                blind,
                client_secret,
                ke1: ke1.clone(),
            },
            ke1,
        ))
    }

    /// Processes KE1 on the server, producing the state to keep and the
    /// KE2 message for the client.
    #[allow(clippy::too_many_arguments)]
    pub fn server_init<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        server_private_key: &PrivateKey,
        server_public_key: &PublicKey,
        record: &RegistrationRecord,
        ke1: &KE1,
        credential_identifier: &[u8],
        client_identity: Option<&[u8]>,
        server_identity: Option<&[u8]>,
        oprf_seed: &[u8],
    ) -> Result<(ServerLoginState, KE2), ProtocolError> {
        let mut masking_nonce = vec![0u8; self.nn()];
        rng.fill_bytes(&mut masking_nonce);
        let mut server_nonce = vec![0u8; self.nn()];
        rng.fill_bytes(&mut server_nonce);
        let server_keyshare_secret = self.generate_auth_key_pair(rng)?;

        self.server_init_with(
            server_private_key,
            server_public_key,
            record,
            ke1,
            credential_identifier,
            client_identity,
            server_identity,
            oprf_seed,
            &masking_nonce,
            &server_nonce,
            server_keyshare_secret,
        )
    }

    /// Deterministic variant of [`server_init`](Self::server_init) taking
    /// the nonces and the ephemeral key from the caller. Reserved for test
    /// vectors.
    #[allow(clippy::too_many_arguments)]
    pub fn server_init_with(
        &self,
        server_private_key: &PrivateKey,
        server_public_key: &PublicKey,
        record: &RegistrationRecord,
        ke1: &KE1,
        credential_identifier: &[u8],
        client_identity: Option<&[u8]>,
        server_identity: Option<&[u8]>,
        oprf_seed: &[u8],
        masking_nonce: &[u8],
        server_nonce: &[u8],
        server_keyshare_secret: PrivateKey,
    ) -> Result<(ServerLoginState, KE2), ProtocolError> {
        let credential_response = self.create_credential_response(
            &ke1.credential_request,
            server_public_key,
            record,
            credential_identifier,
            oprf_seed,
            masking_nonce,
        )?;

        // unset identities are substituted with the serialized public
        // keys before any transcript hashing
        let client_identity = client_identity
            .map(|bytes| bytes.to_vec())
            .unwrap_or_else(|| record.client_public_key.serialize());
        let server_identity = server_identity
            .map(|bytes| bytes.to_vec())
            .unwrap_or_else(|| server_public_key.serialize());

        let (state, auth_response) = self.auth_server_respond(
            server_private_key,
            &server_identity,
            &client_identity,
            &record.client_public_key,
            ke1,
            &credential_response,
            server_nonce,
            server_keyshare_secret,
        )?;

        Ok((
            state,
            KE2 {
                credential_response,
                auth_response,
            },
        ))
    }

    /// Completes the AKE on the client. Produces KE3 for the server
    /// together with the session key and the export key.
    pub fn client_finish(
        &self,
        state: &ClientLoginState,
        client_identity: Option<&[u8]>,
        server_identity: Option<&[u8]>,
        ke2: &KE2,
    ) -> Result<(KE3, Vec<u8>, Vec<u8>), ProtocolError> {
        let (client_private_key, server_public_key, export_key) = self.recover_credentials(
            &state.password,
            &state.blind,
            &ke2.credential_response,
            server_identity,
            client_identity,
        )?;

        let client_identity = client_identity
            .map(|bytes| bytes.to_vec())
            .unwrap_or_else(|| client_private_key.public().serialize());
        let server_identity = server_identity
            .map(|bytes| bytes.to_vec())
            .unwrap_or_else(|| server_public_key.serialize());

        let (ke3, session_key) = self.auth_client_finalize(
            state,
            &client_identity,
            &server_identity,
            &client_private_key,
            &server_public_key,
            ke2,
        )?;

        Ok((ke3, session_key, export_key))
    }

    /// Completes the AKE on the server, yielding the session key when the
    /// client's MAC verifies.
    pub fn server_finish(
        &self,
        state: &ServerLoginState,
        ke3: &KE3,
    ) -> Result<Vec<u8>, ProtocolError> {
        self.auth_server_finalize(state, ke3)
    }

    /// Synthesizes a registration record for an unknown credential, so
    /// that a login attempt against a non-existent client is
    /// indistinguishable from a wrong password.
    pub fn fake_registration_record<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<RegistrationRecord, ProtocolError> {
        let client_private_key = self.generate_auth_key_pair(rng)?;
        let mut masking_key = vec![0u8; self.nh()];
        rng.fill_bytes(&mut masking_key);

        Ok(RegistrationRecord {
            client_public_key: client_private_key.public(),
            masking_key,
            envelope: crate::envelope::Envelope::dummy(self),
        })
    }
}

/// The client's registration state, kept between
/// [`Suite::create_registration_request`] and
/// [`Suite::finalize_registration_request`].
#[derive(Clone, Debug)]
pub struct ClientRegistrationState {
    pub(crate) password: Vec<u8>,
    pub(crate) blind: Scalar,
}

impl Zeroize for ClientRegistrationState {
    fn zeroize(&mut self) {
        self.password.zeroize();
        self.blind.zeroize();
    }
}

impl Drop for ClientRegistrationState {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// The client's login state, kept between [`Suite::client_init`] and
/// [`Suite::client_finish`].
#[derive(Clone, Debug)]
pub struct ClientLoginState {
    pub(crate) password: Vec<u8>,
    pub(crate) blind: Scalar,
    pub(crate) client_secret: PrivateKey,
    pub(crate) ke1: KE1,
}

impl Zeroize for ClientLoginState {
    fn zeroize(&mut self) {
        self.password.zeroize();
        self.blind.zeroize();
        self.client_secret.zeroize();
    }
}

impl Drop for ClientLoginState {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// The server's login state, kept between [`Suite::server_init`] and
/// [`Suite::server_finish`].
#[derive(Clone, Debug)]
pub struct ServerLoginState {
    pub(crate) expected_client_mac: Vec<u8>,
    pub(crate) session_key: Vec<u8>,
}

impl Zeroize for ServerLoginState {
    fn zeroize(&mut self) {
        self.expected_client_mac.zeroize();
        self.session_key.zeroize();
    }
}

impl Drop for ServerLoginState {
    fn drop(&mut self) {
        self.zeroize();
    }
}
