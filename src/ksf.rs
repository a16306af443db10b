// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Key stretching functions used to harden the OPRF output against
//! offline dictionary attacks.

use crate::errors::InternalError;

// Parameters pinned by the recommended configurations; changing them is a
// wire-incompatible change.
const SCRYPT_LOG_N: u8 = 15; // N = 32768
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

const ARGON2_SALT_LEN: usize = 16;

/// Identifies a key stretching function with fixed parameters.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Ksf {
    /// No stretching; passes the input through unchanged. Only suitable
    /// for tests and protocols that stretch elsewhere.
    Identity,
    /// scrypt with (N, r, p) = (32768, 8, 1)
    Scrypt,
    /// Argon2id with default memory/time parameters
    Argon2id,
}

impl Ksf {
    /// Stretches `password` (optionally salted) into `length` output
    /// bytes.
    pub fn harden(
        &self,
        password: &[u8],
        salt: &[u8],
        length: usize,
    ) -> Result<Vec<u8>, InternalError> {
        match self {
            Ksf::Identity => {
                if password.len() != length {
                    return Err(InternalError::KsfError);
                }
                Ok(password.to_vec())
            }
            Ksf::Scrypt => {
                let params = scrypt::Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, length)
                    .map_err(|_| InternalError::KsfError)?;
                let mut output = vec![0u8; length];
                scrypt::scrypt(password, salt, &params, &mut output)
                    .map_err(|_| InternalError::KsfError)?;
                Ok(output)
            }
            Ksf::Argon2id => {
                let salt = if salt.is_empty() {
                    vec![0u8; ARGON2_SALT_LEN]
                } else {
                    salt.to_vec()
                };
                let mut output = vec![0u8; length];
                argon2::Argon2::default()
                    .hash_password_into(password, &salt, &mut output)
                    .map_err(|_| InternalError::KsfError)?;
                Ok(output)
            }
        }
    }
}
