// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! An implementation of the OPRF, VOPRF and POPRF protocols from
//! draft-irtf-cfrg-voprf, over the prime-order group abstraction.
//!
//! Each mode comes as a client/server pair: [`OprfClient`]/[`OprfServer`]
//! for the base mode, [`VerifiableClient`]/[`VerifiableServer`] for the
//! verifiable mode, and [`PartialObliviousClient`]/
//! [`PartialObliviousServer`] for the partially-oblivious mode.

use rand::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::dleq::{Configuration, Dleq, Proof};
use crate::errors::{InternalError, ProtocolError};
use crate::group::{Element, Group, Scalar};
use crate::hash::Hash;
use crate::serialization::i2osp;

const STR_CONTEXT_VERSION: &[u8] = b"VOPRF10-";
const STR_HASH_TO_GROUP: &[u8] = b"HashToGroup-";
const STR_HASH_TO_SCALAR: &[u8] = b"HashToScalar-";
const STR_DERIVE_KEYPAIR: &[u8] = b"DeriveKeyPair";
const STR_FINALIZE: &[u8] = b"Finalize";
const STR_INFO: &[u8] = b"Info";

/// The protocol mode, bound into every derived key and transcript hash.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mode {
    /// Base mode
    Oprf,
    /// Verifiable mode
    Voprf,
    /// Partially-oblivious mode
    Poprf,
}

impl Mode {
    fn to_u8(self) -> u8 {
        match self {
            Mode::Oprf => 0x00,
            Mode::Voprf => 0x01,
            Mode::Poprf => 0x02,
        }
    }
}

/// Identifies an OPRF ciphersuite: a prime-order group paired with a hash
/// function.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Suite {
    /// OPRF(ristretto255, SHA-512)
    Ristretto255Sha512,
    /// OPRF(P-256, SHA-256)
    P256Sha256,
    /// OPRF(P-384, SHA-384)
    P384Sha384,
    /// OPRF(P-521, SHA-512)
    P521Sha512,
}

impl Suite {
    /// The two-byte suite identifier from the draft.
    pub fn id(&self) -> u16 {
        match self {
            Suite::Ristretto255Sha512 => 0x0001,
            Suite::P256Sha256 => 0x0003,
            Suite::P384Sha384 => 0x0004,
            Suite::P521Sha512 => 0x0005,
        }
    }

    /// The prime-order group of the suite.
    pub fn group(&self) -> Group {
        match self {
            Suite::Ristretto255Sha512 => Group::Ristretto255Sha512,
            Suite::P256Sha256 => Group::P256Sha256,
            Suite::P384Sha384 => Group::P384Sha384,
            Suite::P521Sha512 => Group::P521Sha512,
        }
    }

    /// The hash function of the suite.
    pub fn hash(&self) -> Hash {
        match self {
            Suite::Ristretto255Sha512 => Hash::Sha512,
            Suite::P256Sha256 => Hash::Sha256,
            Suite::P384Sha384 => Hash::Sha384,
            Suite::P521Sha512 => Hash::Sha512,
        }
    }
}

// contextString = "VOPRF10-" || I2OSP(mode, 1) || I2OSP(suiteID, 2)
pub(crate) fn create_context_string(mode: Mode, suite: Suite) -> Vec<u8> {
    [
        STR_CONTEXT_VERSION,
        &[mode.to_u8()],
        &suite.id().to_be_bytes(),
    ]
    .concat()
}

fn create_hash_to_group_dst(mode: Mode, suite: Suite) -> Vec<u8> {
    [STR_HASH_TO_GROUP, &create_context_string(mode, suite)[..]].concat()
}

fn create_hash_to_scalar_dst(mode: Mode, suite: Suite) -> Vec<u8> {
    [STR_HASH_TO_SCALAR, &create_context_string(mode, suite)[..]].concat()
}

fn create_derive_key_dst(mode: Mode, suite: Suite) -> Vec<u8> {
    [STR_DERIVE_KEYPAIR, &create_context_string(mode, suite)[..]].concat()
}

// framedInfo = "Info" || I2OSP(len(info), 2) || info
fn create_info_label(info: &[u8]) -> Result<Vec<u8>, InternalError> {
    Ok([STR_INFO, &i2osp(info.len(), 2)?[..], info].concat())
}

/// A private OPRF key: a scalar of the suite's group.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    suite: Suite,
    k: Scalar,
}

impl PrivateKey {
    /// The suite the key belongs to.
    pub fn suite(&self) -> Suite {
        self.suite
    }

    /// Derives the corresponding public key.
    pub fn public(&self) -> PublicKey {
        PublicKey {
            suite: self.suite,
            e: self.suite.group().base().multiply(&self.k),
        }
    }

    /// Serializes the key as a fixed-width scalar encoding.
    pub fn serialize(&self) -> Vec<u8> {
        self.k.to_bytes()
    }

    /// Deserializes a key from a fixed-width scalar encoding.
    pub fn deserialize(suite: Suite, input: &[u8]) -> Result<Self, InternalError> {
        Ok(Self {
            suite,
            k: suite.group().deserialize_scalar(input)?,
        })
    }

    pub(crate) fn scalar(&self) -> &Scalar {
        &self.k
    }
}

impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        self.k.zeroize();
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// A public OPRF key: a non-identity element of the suite's group.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublicKey {
    suite: Suite,
    e: Element,
}

impl PublicKey {
    /// The suite the key belongs to.
    pub fn suite(&self) -> Suite {
        self.suite
    }

    /// Serializes the key as a compressed element encoding.
    pub fn serialize(&self) -> Vec<u8> {
        self.e.encode()
    }

    /// Deserializes a key from a compressed element encoding, rejecting
    /// the identity.
    pub fn deserialize(suite: Suite, input: &[u8]) -> Result<Self, InternalError> {
        let e = suite.group().deserialize_element(input)?;
        if e.is_identity() {
            return Err(InternalError::InvalidEncoding);
        }
        Ok(Self { suite, e })
    }

    pub(crate) fn element(&self) -> &Element {
        &self.e
    }
}

/// Generates a fresh random private key for the suite.
pub fn generate_key_pair<R: RngCore + CryptoRng>(suite: Suite, rng: &mut R) -> PrivateKey {
    PrivateKey {
        suite,
        k: suite.group().random_scalar(rng),
    }
}

/// Deterministically derives a private key from a seed and an optional
/// info string, per the DeriveKeyPair() function of the draft.
pub fn derive_key_pair(
    suite: Suite,
    mode: Mode,
    seed: &[u8],
    info: &[u8],
) -> Result<PrivateKey, ProtocolError> {
    // deriveInput = seed || I2OSP(len(info), 2) || info
    let derive_input = [seed, &i2osp(info.len(), 2)?[..], info].concat();
    let dst = create_derive_key_dst(mode, suite);

    for counter in 0u16..=255 {
        let input = [&derive_input[..], &[counter as u8]].concat();
        let sk = suite.group().hash_to_scalar(&input, &dst)?;
        if !sk.is_zero() {
            return Ok(PrivateKey { suite, k: sk });
        }
    }

    Err(InternalError::DeriveKeyError.into())
}

/// The blinded elements sent from client to server.
#[derive(Clone, Debug)]
pub struct EvaluationRequest {
    /// blinded group elements, one per input
    pub blinded_elements: Vec<Element>,
}

/// The evaluated elements (and, in the verifiable modes, the DLEQ proof)
/// returned by the server.
#[derive(Clone, Debug)]
pub struct EvaluationResponse {
    /// evaluated group elements, one per blinded element
    pub evaluated_elements: Vec<Element>,
    /// batched DLEQ proof; `None` in the base mode
    pub proof: Option<Proof>,
}

/// The client state carried between blinding and finalization.
#[derive(Clone, Debug)]
pub struct FinalizeData {
    /// the original inputs
    pub inputs: Vec<Vec<u8>>,
    /// the blinding scalars, parallel to `inputs`
    pub blinds: Vec<Scalar>,
    /// the request sent to the server
    pub eval_request: EvaluationRequest,
}

impl Zeroize for FinalizeData {
    fn zeroize(&mut self) {
        for blind in &mut self.blinds {
            blind.zeroize();
        }
    }
}

// Shared client skeleton: hash inputs into the group and apply the blinds.
#[derive(Clone, Copy, Debug)]
struct ClientCore {
    suite: Suite,
    mode: Mode,
}

impl ClientCore {
    fn check_inputs(&self, inputs: &[&[u8]]) -> Result<(), ProtocolError> {
        if inputs.is_empty() || inputs.iter().any(|input| input.is_empty()) {
            return Err(ProtocolError::InputValidationError);
        }
        Ok(())
    }

    fn blind_with(
        &self,
        inputs: &[&[u8]],
        blinds: &[Scalar],
    ) -> Result<Vec<Element>, ProtocolError> {
        let dst = create_hash_to_group_dst(self.mode, self.suite);
        let mut blinded_elements = Vec::with_capacity(inputs.len());

        for (input, blind) in inputs.iter().zip(blinds.iter()) {
            let input_element = self.suite.group().hash_to_group(input, &dst)?;
            if input_element.is_identity() {
                return Err(ProtocolError::InvalidInputError);
            }
            blinded_elements.push(input_element.multiply(blind));
        }

        Ok(blinded_elements)
    }

    fn random_blinds<R: RngCore + CryptoRng>(&self, rng: &mut R, count: usize) -> Vec<Scalar> {
        (0..count)
            .map(|_| self.suite.group().random_scalar(rng))
            .collect()
    }

    fn validate(
        &self,
        fin_data: &FinalizeData,
        eval_response: &EvaluationResponse,
    ) -> Result<(), ProtocolError> {
        let count = fin_data.inputs.len();
        if count == 0
            || fin_data.blinds.len() != count
            || eval_response.evaluated_elements.len() != count
        {
            return Err(ProtocolError::InputValidationError);
        }
        Ok(())
    }

    // N = blind^-1 * evaluatedElement; output = Hash(framed parts || "Finalize")
    fn finalize_one(
        &self,
        input: &[u8],
        blind: &Scalar,
        evaluated_element: &Element,
        info: Option<&[u8]>,
    ) -> Result<Vec<u8>, ProtocolError> {
        let unblinded = evaluated_element.multiply(&blind.invert()).encode();
        hash_transcript(self.suite.hash(), input, info, &unblinded)
    }
}

// hashInput = I2OSP(len(input), 2) || input [|| I2OSP(len(info), 2) || info]
//             || I2OSP(len(element), 2) || element || "Finalize"
fn hash_transcript(
    hash: Hash,
    input: &[u8],
    info: Option<&[u8]>,
    element: &[u8],
) -> Result<Vec<u8>, ProtocolError> {
    let mut hash_input = Vec::new();
    hash_input.extend_from_slice(&i2osp(input.len(), 2)?);
    hash_input.extend_from_slice(input);
    if let Some(info) = info {
        hash_input.extend_from_slice(&i2osp(info.len(), 2)?);
        hash_input.extend_from_slice(info);
    }
    hash_input.extend_from_slice(&i2osp(element.len(), 2)?);
    hash_input.extend_from_slice(element);
    hash_input.extend_from_slice(STR_FINALIZE);

    Ok(hash.hash(&[&hash_input]))
}

// Shared server skeleton.
#[derive(Clone, Debug)]
struct ServerCore {
    suite: Suite,
    mode: Mode,
    private_key: PrivateKey,
}

impl ServerCore {
    fn hashed_input(&self, input: &[u8]) -> Result<Element, ProtocolError> {
        let dst = create_hash_to_group_dst(self.mode, self.suite);
        let input_element = self.suite.group().hash_to_group(input, &dst)?;
        if input_element.is_identity() {
            return Err(ProtocolError::InvalidInputError);
        }
        Ok(input_element)
    }
}

fn dleq_for(mode: Mode, suite: Suite) -> Result<Dleq, ProtocolError> {
    Ok(Dleq::new(&Configuration {
        group: suite.group(),
        dst: create_context_string(mode, suite),
    })?)
}

/// Client of the base OPRF mode.
pub struct OprfClient {
    core: ClientCore,
}

impl OprfClient {
    /// Creates a client for the given suite.
    pub fn new(suite: Suite) -> Self {
        Self {
            core: ClientCore {
                suite,
                mode: Mode::Oprf,
            },
        }
    }

    /// Blinds the inputs with fresh random blinds, returning the state for
    /// [`finalize`](Self::finalize) and the request to send to the server.
    pub fn blind<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        inputs: &[&[u8]],
    ) -> Result<(FinalizeData, EvaluationRequest), ProtocolError> {
        self.core.check_inputs(inputs)?;
        let blinds = self.core.random_blinds(rng, inputs.len());
        self.deterministic_blind(inputs, blinds)
    }

    /// Blinds the inputs with caller-supplied blinds. Reserved for test
    /// vectors; production callers use [`blind`](Self::blind).
    pub fn deterministic_blind(
        &self,
        inputs: &[&[u8]],
        blinds: Vec<Scalar>,
    ) -> Result<(FinalizeData, EvaluationRequest), ProtocolError> {
        self.core.check_inputs(inputs)?;
        if inputs.len() != blinds.len() {
            return Err(ProtocolError::InputValidationError);
        }

        let blinded_elements = self.core.blind_with(inputs, &blinds)?;
        let eval_request = EvaluationRequest { blinded_elements };

        Ok((
            FinalizeData {
                inputs: inputs.iter().map(|input| input.to_vec()).collect(),
                blinds,
                eval_request: eval_request.clone(),
            },
            eval_request,
        ))
    }

    /// Unblinds the evaluated elements and produces the protocol outputs,
    /// one per input.
    pub fn finalize(
        &self,
        fin_data: &FinalizeData,
        eval_response: &EvaluationResponse,
    ) -> Result<Vec<Vec<u8>>, ProtocolError> {
        self.core.validate(fin_data, eval_response)?;

        fin_data
            .inputs
            .iter()
            .zip(fin_data.blinds.iter())
            .zip(eval_response.evaluated_elements.iter())
            .map(|((input, blind), evaluated)| {
                self.core.finalize_one(input, blind, evaluated, None)
            })
            .collect()
    }
}

/// Server of the base OPRF mode.
pub struct OprfServer {
    core: ServerCore,
}

impl OprfServer {
    /// Creates a server for the given suite holding `private_key`.
    pub fn new(suite: Suite, private_key: PrivateKey) -> Self {
        Self {
            core: ServerCore {
                suite,
                mode: Mode::Oprf,
                private_key,
            },
        }
    }

    /// Evaluates the blinded elements under the server key.
    pub fn blind_evaluate(
        &self,
        eval_request: &EvaluationRequest,
    ) -> Result<EvaluationResponse, ProtocolError> {
        if eval_request.blinded_elements.is_empty() {
            return Err(ProtocolError::InputValidationError);
        }

        let evaluated_elements = eval_request
            .blinded_elements
            .iter()
            .map(|blinded| blinded.multiply(self.core.private_key.scalar()))
            .collect();

        Ok(EvaluationResponse {
            evaluated_elements,
            proof: None,
        })
    }

    /// Computes the protocol output for `input` directly, bypassing
    /// blinding.
    pub fn final_evaluate(&self, input: &[u8]) -> Result<Vec<u8>, ProtocolError> {
        if input.is_empty() {
            return Err(ProtocolError::InputValidationError);
        }
        let evaluated = self
            .core
            .hashed_input(input)?
            .multiply(self.core.private_key.scalar());
        hash_transcript(self.core.suite.hash(), input, None, &evaluated.encode())
    }

    /// Checks `expected_output` against a fresh evaluation of `input`, in
    /// constant time.
    pub fn verify_finalize(&self, input: &[u8], expected_output: &[u8]) -> bool {
        match self.final_evaluate(input) {
            Ok(output) => bool::from(output.ct_eq(expected_output)),
            Err(_) => false,
        }
    }
}

/// Client of the verifiable (VOPRF) mode.
pub struct VerifiableClient {
    core: ClientCore,
    server_public_key: PublicKey,
}

impl VerifiableClient {
    /// Creates a client for the given suite, pinned to the server's public
    /// key.
    pub fn new(suite: Suite, server_public_key: PublicKey) -> Result<Self, ProtocolError> {
        if server_public_key.suite() != suite {
            return Err(ProtocolError::InputValidationError);
        }
        Ok(Self {
            core: ClientCore {
                suite,
                mode: Mode::Voprf,
            },
            server_public_key,
        })
    }

    /// Blinds the inputs with fresh random blinds.
    pub fn blind<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        inputs: &[&[u8]],
    ) -> Result<(FinalizeData, EvaluationRequest), ProtocolError> {
        self.core.check_inputs(inputs)?;
        let blinds = self.core.random_blinds(rng, inputs.len());
        self.deterministic_blind(inputs, blinds)
    }

    /// Blinds the inputs with caller-supplied blinds. Reserved for test
    /// vectors.
    pub fn deterministic_blind(
        &self,
        inputs: &[&[u8]],
        blinds: Vec<Scalar>,
    ) -> Result<(FinalizeData, EvaluationRequest), ProtocolError> {
        self.core.check_inputs(inputs)?;
        if inputs.len() != blinds.len() {
            return Err(ProtocolError::InputValidationError);
        }

        let blinded_elements = self.core.blind_with(inputs, &blinds)?;
        let eval_request = EvaluationRequest { blinded_elements };

        Ok((
            FinalizeData {
                inputs: inputs.iter().map(|input| input.to_vec()).collect(),
                blinds,
                eval_request: eval_request.clone(),
            },
            eval_request,
        ))
    }

    /// Verifies the server's proof, then unblinds and hashes the outputs.
    /// Fails with [`ProtocolError::VerifyError`] if the proof does not
    /// cover the evaluation.
    pub fn finalize(
        &self,
        fin_data: &FinalizeData,
        eval_response: &EvaluationResponse,
    ) -> Result<Vec<Vec<u8>>, ProtocolError> {
        self.core.validate(fin_data, eval_response)?;
        if fin_data.eval_request.blinded_elements.len() != fin_data.inputs.len() {
            return Err(ProtocolError::InputValidationError);
        }

        let proof = eval_response
            .proof
            .as_ref()
            .ok_or(ProtocolError::VerifyError)?;

        // VerifyProof(G.Generator(), pkS, blindedElements, evaluatedElements, proof)
        let dleq = dleq_for(Mode::Voprf, self.core.suite)?;
        if !dleq.verify_proof(
            &self.core.suite.group().base(),
            self.server_public_key.element(),
            &fin_data.eval_request.blinded_elements,
            &eval_response.evaluated_elements,
            proof,
        ) {
            return Err(ProtocolError::VerifyError);
        }

        fin_data
            .inputs
            .iter()
            .zip(fin_data.blinds.iter())
            .zip(eval_response.evaluated_elements.iter())
            .map(|((input, blind), evaluated)| {
                self.core.finalize_one(input, blind, evaluated, None)
            })
            .collect()
    }
}

/// Server of the verifiable (VOPRF) mode.
pub struct VerifiableServer {
    core: ServerCore,
}

impl VerifiableServer {
    /// Creates a server for the given suite holding `private_key`.
    pub fn new(suite: Suite, private_key: PrivateKey) -> Self {
        Self {
            core: ServerCore {
                suite,
                mode: Mode::Voprf,
                private_key,
            },
        }
    }

    /// Evaluates the blinded elements and attaches a batched DLEQ proof.
    pub fn blind_evaluate<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        eval_request: &EvaluationRequest,
    ) -> Result<EvaluationResponse, ProtocolError> {
        let r = self.core.suite.group().random_scalar(rng);
        self.blind_evaluate_with_randomness(eval_request, &r)
    }

    /// Deterministic variant of [`blind_evaluate`](Self::blind_evaluate)
    /// taking the proof commitment randomness from the caller. Reserved
    /// for test vectors.
    pub fn blind_evaluate_with_randomness(
        &self,
        eval_request: &EvaluationRequest,
        r: &Scalar,
    ) -> Result<EvaluationResponse, ProtocolError> {
        if eval_request.blinded_elements.is_empty() {
            return Err(ProtocolError::InputValidationError);
        }

        let evaluated_elements: Vec<Element> = eval_request
            .blinded_elements
            .iter()
            .map(|blinded| blinded.multiply(self.core.private_key.scalar()))
            .collect();

        // proof = GenerateProof(skS, G.Generator(), pkS, blindedElements, evaluatedElements)
        let dleq = dleq_for(Mode::Voprf, self.core.suite)?;
        let proof = dleq.generate_proof_with_randomness(
            self.core.private_key.scalar(),
            &self.core.suite.group().base(),
            self.core.private_key.public().element(),
            &eval_request.blinded_elements,
            &evaluated_elements,
            r,
        )?;

        Ok(EvaluationResponse {
            evaluated_elements,
            proof: Some(proof),
        })
    }

    /// Computes the protocol output for `input` directly, bypassing
    /// blinding.
    pub fn final_evaluate(&self, input: &[u8]) -> Result<Vec<u8>, ProtocolError> {
        if input.is_empty() {
            return Err(ProtocolError::InputValidationError);
        }
        let evaluated = self
            .core
            .hashed_input(input)?
            .multiply(self.core.private_key.scalar());
        hash_transcript(self.core.suite.hash(), input, None, &evaluated.encode())
    }

    /// Checks `expected_output` against a fresh evaluation of `input`, in
    /// constant time.
    pub fn verify_finalize(&self, input: &[u8], expected_output: &[u8]) -> bool {
        match self.final_evaluate(input) {
            Ok(output) => bool::from(output.ct_eq(expected_output)),
            Err(_) => false,
        }
    }
}

/// Client of the partially-oblivious (POPRF) mode.
pub struct PartialObliviousClient {
    core: ClientCore,
    server_public_key: PublicKey,
    tweaked_key: Option<Element>,
}

impl PartialObliviousClient {
    /// Creates a client for the given suite, pinned to the server's public
    /// key.
    pub fn new(suite: Suite, server_public_key: PublicKey) -> Result<Self, ProtocolError> {
        if server_public_key.suite() != suite {
            return Err(ProtocolError::InputValidationError);
        }
        Ok(Self {
            core: ClientCore {
                suite,
                mode: Mode::Poprf,
            },
            server_public_key,
            tweaked_key: None,
        })
    }

    // tweakedKey = G.ScalarBaseMult(HashToScalar(framedInfo)) + pkS
    fn compute_tweaked_key(&self, info: &[u8]) -> Result<Element, ProtocolError> {
        let dst = create_hash_to_scalar_dst(self.core.mode, self.core.suite);
        let framed_info = create_info_label(info)?;
        let m = self.core.suite.group().hash_to_scalar(&framed_info, &dst)?;
        let t = self.core.suite.group().base().multiply(&m);
        let tweaked_key = t.add(self.server_public_key.element());
        if tweaked_key.is_identity() {
            return Err(ProtocolError::InvalidInputError);
        }
        Ok(tweaked_key)
    }

    /// Blinds the inputs with fresh random blinds, binding the public
    /// `info` string into the session.
    pub fn blind<R: RngCore + CryptoRng>(
        &mut self,
        rng: &mut R,
        inputs: &[&[u8]],
        info: &[u8],
    ) -> Result<(FinalizeData, EvaluationRequest), ProtocolError> {
        self.core.check_inputs(inputs)?;
        let blinds = self.core.random_blinds(rng, inputs.len());
        self.deterministic_blind(inputs, blinds, info)
    }

    /// Blinds the inputs with caller-supplied blinds. Reserved for test
    /// vectors.
    pub fn deterministic_blind(
        &mut self,
        inputs: &[&[u8]],
        blinds: Vec<Scalar>,
        info: &[u8],
    ) -> Result<(FinalizeData, EvaluationRequest), ProtocolError> {
        self.core.check_inputs(inputs)?;
        if inputs.len() != blinds.len() {
            return Err(ProtocolError::InputValidationError);
        }

        self.tweaked_key = Some(self.compute_tweaked_key(info)?);

        let blinded_elements = self.core.blind_with(inputs, &blinds)?;
        let eval_request = EvaluationRequest { blinded_elements };

        Ok((
            FinalizeData {
                inputs: inputs.iter().map(|input| input.to_vec()).collect(),
                blinds,
                eval_request: eval_request.clone(),
            },
            eval_request,
        ))
    }

    /// Verifies the server's proof against the tweaked key, then unblinds
    /// and hashes the outputs.
    pub fn finalize(
        &self,
        fin_data: &FinalizeData,
        eval_response: &EvaluationResponse,
        info: &[u8],
    ) -> Result<Vec<Vec<u8>>, ProtocolError> {
        self.core.validate(fin_data, eval_response)?;

        let tweaked_key = self
            .tweaked_key
            .as_ref()
            .ok_or(ProtocolError::InputValidationError)?;
        let proof = eval_response
            .proof
            .as_ref()
            .ok_or(ProtocolError::VerifyError)?;

        // VerifyProof(G.Generator(), tweakedKey, evaluatedElements, blindedElements, proof)
        let dleq = dleq_for(Mode::Poprf, self.core.suite)?;
        if !dleq.verify_proof(
            &self.core.suite.group().base(),
            tweaked_key,
            &eval_response.evaluated_elements,
            &fin_data.eval_request.blinded_elements,
            proof,
        ) {
            return Err(ProtocolError::VerifyError);
        }

        fin_data
            .inputs
            .iter()
            .zip(fin_data.blinds.iter())
            .zip(eval_response.evaluated_elements.iter())
            .map(|((input, blind), evaluated)| {
                self.core.finalize_one(input, blind, evaluated, Some(info))
            })
            .collect()
    }
}

/// Server of the partially-oblivious (POPRF) mode.
pub struct PartialObliviousServer {
    core: ServerCore,
}

impl PartialObliviousServer {
    /// Creates a server for the given suite holding `private_key`.
    pub fn new(suite: Suite, private_key: PrivateKey) -> Self {
        Self {
            core: ServerCore {
                suite,
                mode: Mode::Poprf,
                private_key,
            },
        }
    }

    // t = skS + HashToScalar(framedInfo); rejects t = 0
    fn tweaked_scalar(&self, info: &[u8]) -> Result<Scalar, ProtocolError> {
        let dst = create_hash_to_scalar_dst(self.core.mode, self.core.suite);
        let framed_info = create_info_label(info)?;
        let m = self.core.suite.group().hash_to_scalar(&framed_info, &dst)?;
        let t = self.core.private_key.scalar().add(&m);
        if t.is_zero() {
            return Err(InternalError::InverseError.into());
        }
        Ok(t)
    }

    /// Evaluates the blinded elements under the info-tweaked key and
    /// attaches a batched DLEQ proof.
    pub fn blind_evaluate<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        eval_request: &EvaluationRequest,
        info: &[u8],
    ) -> Result<EvaluationResponse, ProtocolError> {
        let r = self.core.suite.group().random_scalar(rng);
        self.blind_evaluate_with_randomness(eval_request, info, &r)
    }

    /// Deterministic variant of [`blind_evaluate`](Self::blind_evaluate)
    /// taking the proof commitment randomness from the caller. Reserved
    /// for test vectors.
    pub fn blind_evaluate_with_randomness(
        &self,
        eval_request: &EvaluationRequest,
        info: &[u8],
        r: &Scalar,
    ) -> Result<EvaluationResponse, ProtocolError> {
        if eval_request.blinded_elements.is_empty() {
            return Err(ProtocolError::InputValidationError);
        }

        let t = self.tweaked_scalar(info)?;
        let t_inverse = t.invert();

        // evaluatedElement = G.ScalarInverse(t) * blindedElement
        let evaluated_elements: Vec<Element> = eval_request
            .blinded_elements
            .iter()
            .map(|blinded| blinded.multiply(&t_inverse))
            .collect();

        // tweakedKey = G.ScalarBaseMult(t)
        let tweaked_key = self.core.suite.group().base().multiply(&t);

        // proof = GenerateProof(t, G.Generator(), tweakedKey, evaluatedElements, blindedElements)
        let dleq = dleq_for(Mode::Poprf, self.core.suite)?;
        let proof = dleq.generate_proof_with_randomness(
            &t,
            &self.core.suite.group().base(),
            &tweaked_key,
            &evaluated_elements,
            &eval_request.blinded_elements,
            r,
        )?;

        Ok(EvaluationResponse {
            evaluated_elements,
            proof: Some(proof),
        })
    }

    /// Computes the protocol output for `input` and `info` directly,
    /// bypassing blinding.
    pub fn final_evaluate(&self, input: &[u8], info: &[u8]) -> Result<Vec<u8>, ProtocolError> {
        if input.is_empty() {
            return Err(ProtocolError::InputValidationError);
        }

        let input_element = self.core.hashed_input(input)?;
        let t = self.tweaked_scalar(info)?;
        let evaluated = input_element.multiply(&t.invert());

        hash_transcript(
            self.core.suite.hash(),
            input,
            Some(info),
            &evaluated.encode(),
        )
    }

    /// Checks `expected_output` against a fresh evaluation of `input` and
    /// `info`, in constant time.
    pub fn verify_finalize(&self, input: &[u8], info: &[u8], expected_output: &[u8]) -> bool {
        match self.final_evaluate(input, info) {
            Ok(output) => bool::from(output.ct_eq(expected_output)),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
pub(crate) const ALL_SUITES: [Suite; 4] = [
    Suite::Ristretto255Sha512,
    Suite::P256Sha256,
    Suite::P384Sha384,
    Suite::P521Sha512,
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn context_string_layout() {
        let context = create_context_string(Mode::Voprf, Suite::P384Sha384);
        assert_eq!(&context[..8], b"VOPRF10-");
        assert_eq!(&context[8..], &[0x01, 0x00, 0x04]);
    }

    #[test]
    fn oprf_finalize_matches_final_evaluate() {
        let mut rng = OsRng;
        for suite in ALL_SUITES {
            let key = generate_key_pair(suite, &mut rng);
            let server = OprfServer::new(suite, key.clone());
            let client = OprfClient::new(suite);

            let inputs: &[&[u8]] = &[b"\x00", b"some-longer-input-value"];
            let (fin_data, request) = client.blind(&mut rng, inputs).unwrap();
            let response = server.blind_evaluate(&request).unwrap();
            let outputs = client.finalize(&fin_data, &response).unwrap();

            for (input, output) in inputs.iter().zip(outputs.iter()) {
                assert_eq!(output, &server.final_evaluate(input).unwrap());
                assert!(server.verify_finalize(input, output));
            }
        }
    }

    #[test]
    fn voprf_finalize_matches_final_evaluate() {
        let mut rng = OsRng;
        for suite in ALL_SUITES {
            let key = generate_key_pair(suite, &mut rng);
            let server = VerifiableServer::new(suite, key.clone());
            let client = VerifiableClient::new(suite, key.public()).unwrap();

            let inputs: &[&[u8]] = &[b"alpha", b"beta", b"gamma"];
            let (fin_data, request) = client.blind(&mut rng, inputs).unwrap();
            let response = server.blind_evaluate(&mut rng, &request).unwrap();
            let outputs = client.finalize(&fin_data, &response).unwrap();

            for (input, output) in inputs.iter().zip(outputs.iter()) {
                assert_eq!(output, &server.final_evaluate(input).unwrap());
            }
        }
    }

    #[test]
    fn poprf_finalize_matches_final_evaluate() {
        let mut rng = OsRng;
        let info = b"shared info";
        for suite in ALL_SUITES {
            let key = generate_key_pair(suite, &mut rng);
            let server = PartialObliviousServer::new(suite, key.clone());
            let mut client = PartialObliviousClient::new(suite, key.public()).unwrap();

            let inputs: &[&[u8]] = &[b"input-0", b"input-1"];
            let (fin_data, request) = client.blind(&mut rng, inputs, info).unwrap();
            let response = server.blind_evaluate(&mut rng, &request, info).unwrap();
            let outputs = client.finalize(&fin_data, &response, info).unwrap();

            for (input, output) in inputs.iter().zip(outputs.iter()) {
                assert_eq!(output, &server.final_evaluate(input, info).unwrap());
                assert!(server.verify_finalize(input, info, output));
            }
        }
    }

    #[test]
    fn final_evaluate_is_deterministic() {
        let mut rng = OsRng;
        let key = generate_key_pair(Suite::P256Sha256, &mut rng);
        let server = OprfServer::new(Suite::P256Sha256, key);
        assert_eq!(
            server.final_evaluate(b"input").unwrap(),
            server.final_evaluate(b"input").unwrap()
        );
    }

    #[test]
    fn voprf_tampered_proof_fails() {
        let mut rng = OsRng;
        let suite = Suite::Ristretto255Sha512;
        let key = generate_key_pair(suite, &mut rng);
        let server = VerifiableServer::new(suite, key.clone());
        let client = VerifiableClient::new(suite, key.public()).unwrap();

        let (fin_data, request) = client.blind(&mut rng, &[b"input"]).unwrap();
        let mut response = server.blind_evaluate(&mut rng, &request).unwrap();

        // flip a byte of the serialized proof
        let mut proof_bytes = response.proof.as_ref().unwrap().serialize();
        proof_bytes[0] ^= 0x01;
        if let Ok(bad_proof) = Proof::deserialize(suite.group(), &proof_bytes) {
            response.proof = Some(bad_proof);
            assert_eq!(
                client.finalize(&fin_data, &response),
                Err(ProtocolError::VerifyError)
            );
        }

        // tamper with an evaluated element instead
        let mut response = server.blind_evaluate(&mut rng, &request).unwrap();
        response.evaluated_elements[0] = response.evaluated_elements[0].double();
        assert_eq!(
            client.finalize(&fin_data, &response),
            Err(ProtocolError::VerifyError)
        );
    }

    #[test]
    fn poprf_wrong_info_fails_verification() {
        let mut rng = OsRng;
        let suite = Suite::P256Sha256;
        let key = generate_key_pair(suite, &mut rng);
        let server = PartialObliviousServer::new(suite, key.clone());
        let mut client = PartialObliviousClient::new(suite, key.public()).unwrap();

        let (fin_data, request) = client.blind(&mut rng, &[b"input"], b"info-a").unwrap();
        let response = server.blind_evaluate(&mut rng, &request, b"info-b").unwrap();
        assert_eq!(
            client.finalize(&fin_data, &response, b"info-a"),
            Err(ProtocolError::VerifyError)
        );
    }

    #[test]
    fn deterministic_blind_reproduces_request() {
        let mut rng = OsRng;
        let suite = Suite::P384Sha384;
        let client = OprfClient::new(suite);
        let blind = suite.group().random_scalar(&mut rng);

        let (_, request_a) = client
            .deterministic_blind(&[b"fixed"], vec![blind])
            .unwrap();
        let (_, request_b) = client
            .deterministic_blind(&[b"fixed"], vec![blind])
            .unwrap();
        assert_eq!(
            request_a.blinded_elements[0].encode(),
            request_b.blinded_elements[0].encode()
        );
    }

    #[test]
    fn input_validation_errors() {
        let mut rng = OsRng;
        let suite = Suite::P256Sha256;
        let client = OprfClient::new(suite);

        // empty input list and empty input both rejected
        assert_eq!(
            client.blind(&mut rng, &[]).unwrap_err(),
            ProtocolError::InputValidationError
        );
        let empty: &[&[u8]] = &[b""];
        assert_eq!(
            client.blind(&mut rng, empty).unwrap_err(),
            ProtocolError::InputValidationError
        );

        // mismatched parallel arrays
        let blind = suite.group().random_scalar(&mut rng);
        assert_eq!(
            client
                .deterministic_blind(&[b"a", b"b"], vec![blind])
                .unwrap_err(),
            ProtocolError::InputValidationError
        );
    }

    #[test]
    fn derive_key_pair_is_deterministic_and_mode_separated() {
        let seed = [0xa3u8; 32];
        let a = derive_key_pair(Suite::P256Sha256, Mode::Oprf, &seed, b"test key").unwrap();
        let b = derive_key_pair(Suite::P256Sha256, Mode::Oprf, &seed, b"test key").unwrap();
        assert_eq!(a.serialize(), b.serialize());

        let c = derive_key_pair(Suite::P256Sha256, Mode::Voprf, &seed, b"test key").unwrap();
        assert_ne!(a.serialize(), c.serialize());
        let d = derive_key_pair(Suite::P256Sha256, Mode::Oprf, &seed, b"other").unwrap();
        assert_ne!(a.serialize(), d.serialize());
    }

    #[test]
    fn key_serialization_roundtrip() {
        let mut rng = OsRng;
        for suite in ALL_SUITES {
            let private = generate_key_pair(suite, &mut rng);
            let restored = PrivateKey::deserialize(suite, &private.serialize()).unwrap();
            assert_eq!(private.serialize(), restored.serialize());

            let public = private.public();
            let restored = PublicKey::deserialize(suite, &public.serialize()).unwrap();
            assert_eq!(public.serialize(), restored.serialize());

            // identity public key is rejected
            let identity = suite.group().identity().encode();
            assert!(PublicKey::deserialize(suite, &identity).is_err());
        }
    }
}
