// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! An implementation of the OPAQUE asymmetric password-authenticated key
//! exchange protocol, together with the cryptographic machinery it is
//! built from: a prime-order group abstraction with hash-to-curve over
//! Ristretto255 and the NIST P-curves, an oblivious pseudorandom function
//! family (OPRF / VOPRF / POPRF) and batched discrete-logarithm
//! equivalence proofs.
//!
//! OPAQUE lets a client authenticate to a server with a password without
//! ever revealing it: registration produces a record the server stores,
//! and every login runs an OPRF plus a triple-Diffie-Hellman key exchange
//! whose transcript authenticates both sides and yields a fresh session
//! key.
//!
//! # Example
//!
//! A full registration followed by a login:
//!
//! ```
//! use cryptomony::opaque::CipherSuite;
//! use rand::rngs::OsRng;
//!
//! # fn main() -> Result<(), cryptomony::errors::ProtocolError> {
//! let mut rng = OsRng;
//! let suite = CipherSuite::Ristretto255Sha512.suite();
//!
//! // Server setup: a static key pair and an OPRF seed, both long-lived.
//! let server_private_key = suite.generate_auth_key_pair(&mut rng)?;
//! let server_public_key = server_private_key.public();
//! let oprf_seed = suite.generate_oprf_seed(&mut rng);
//!
//! // Registration.
//! let (state, request) = suite.create_registration_request(&mut rng, b"hunter2")?;
//! let response = suite.create_registration_response(
//!     &request,
//!     &server_public_key,
//!     b"alice",
//!     &oprf_seed,
//! )?;
//! let (record, _export_key) =
//!     suite.finalize_registration_request(&mut rng, &state, None, None, &response)?;
//!
//! // Login.
//! let (client_state, ke1) = suite.client_init(&mut rng, b"hunter2")?;
//! let (server_state, ke2) = suite.server_init(
//!     &mut rng,
//!     &server_private_key,
//!     &server_public_key,
//!     &record,
//!     &ke1,
//!     b"alice",
//!     None,
//!     None,
//!     &oprf_seed,
//! )?;
//! let (ke3, client_session_key, _export_key) =
//!     suite.client_finish(&client_state, None, None, &ke2)?;
//! let server_session_key = suite.server_finish(&server_state, &ke3)?;
//! assert_eq!(client_session_key, server_session_key);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod dleq;
pub mod envelope;
pub mod errors;
pub mod expand;
pub mod group;
pub mod hash;
pub mod hash_to_field;
pub mod key_exchange;
pub mod keypair;
pub mod ksf;
pub mod messages;
pub mod opaque;
pub mod oprf;
mod serialization;
pub mod xof;

pub use crate::errors::{InternalError, ProtocolError};
pub use crate::keypair::{PrivateKey, PublicKey};
pub use crate::messages::{
    AuthRequest, AuthResponse, CredentialRequest, CredentialResponse, RegistrationRecord,
    RegistrationRequest, RegistrationResponse, KE1, KE2, KE3,
};
pub use crate::opaque::{
    CipherSuite, ClientLoginState, ClientRegistrationState, ServerLoginState, Suite,
};

#[cfg(test)]
mod tests;
