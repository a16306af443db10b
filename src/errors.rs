// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! A list of error types which are produced during an execution of the
//! protocols

use displaydoc::Display;
use thiserror::Error;

/// Represents an error in the manipulation of internal cryptographic data
#[derive(Clone, Copy, Debug, Display, Error, Eq, Hash, PartialEq)]
pub enum InternalError {
    /// Invalid length for {name}: expected {len}, but is actually {actual_len}.
    SizeError {
        /// name
        name: &'static str,
        /// length
        len: usize,
        /// actual
        actual_len: usize,
    },
    /// Buffer is shorter than the declared fixed-width layout
    ShortBuffer,
    /// Could not decode scalar or element bytes.
    InvalidEncoding,
    /// The requested group is not supported by this configuration.
    UnsupportedGroup,
    /// Computing the hash-to-curve function failed
    HashToCurveError,
    /// Requested expansion length cannot be satisfied by the expander
    ExpandLengthError,
    /// All 256 key derivation attempts produced a zero scalar
    DeriveKeyError,
    /// A tweaked private key has no multiplicative inverse
    InverseError,
    /// Computing HKDF failed while deriving subkeys
    HkdfError,
    /// Computing HMAC failed while supplying a secret key
    HmacError,
    /// Computing the key stretching function failed
    KsfError,
}

/// Represents an error in protocol handling
#[derive(Clone, Copy, Debug, Display, Error, Eq, Hash, PartialEq)]
pub enum ProtocolError {
    /// Internal error during cryptographic processing: {0}
    CryptoError(InternalError),
    /// A hashed input maps to the identity element
    InvalidInputError,
    /// Inputs of the operation are empty or of mismatched lengths
    InputValidationError,
    /// Proof verification failed
    VerifyError,
    /// A required message field was not set before serialization
    SerializationError,
    /// Message bytes do not match the fixed-width layout
    DeserializationError,
    /// A required message field was not set before encoding
    EncodingError,
    /// Length-prefixed message bytes are malformed
    DecodingError,
    /// The envelope authentication tag did not verify
    EnvelopeRecoveryError,
    /// The unmasked credential payload has an unexpected length
    RecoverCredentialsError,
    /// The KE2 server MAC did not verify
    ServerAuthenticationError,
    /// The KE3 client MAC did not verify
    ClientAuthenticationError,
    /// The OPRF seed does not have the hash output length
    OprfSeedLengthError,
    /// The key derivation seed does not have the expected length
    SeedLengthError,
}

// This is meant to express future(ly) non-trivial ways of converting the
// internal error into a ProtocolError
impl From<InternalError> for ProtocolError {
    fn from(e: InternalError) -> ProtocolError {
        ProtocolError::CryptoError(e)
    }
}
