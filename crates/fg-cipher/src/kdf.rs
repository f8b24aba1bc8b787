//! Per-record key derivation.

use crate::{CipherError, Result};
use hmac::Hmac;
use sha2::Sha256;

/// PBKDF2 iteration count. Fixed: records carry no iteration field.
pub const KDF_ITERATIONS: u32 = 100_000;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Derive the AES-256 key for one record from the master secret and its salt.
pub(crate) fn derive_key(master: &[u8], salt: &[u8]) -> Result<[u8; KEY_LEN]> {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(master, salt, KDF_ITERATIONS, &mut key)
        .map_err(|_| CipherError::Configuration("master secret rejected by KDF".to_string()))?;
    Ok(key)
}
