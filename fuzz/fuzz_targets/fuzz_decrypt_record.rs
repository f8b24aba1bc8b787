//! Fuzz target for encrypted record parsing and decryption.
//!
//! Arbitrary records must never decrypt to anything but an error, and must
//! never panic, whatever their blob length or algorithm tag.

#![no_main]

use arbitrary::Arbitrary;
use fg_cipher::{checksum, Algorithm, CipherConfig, EncryptedRecord, FieldCipher, StaticKeyProvider};
use libfuzzer_sys::fuzz_target;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Arbitrary)]
struct Input {
    raw_json: Vec<u8>,
    blob: Vec<u8>,
    aes: bool,
    fix_checksum: bool,
    aad: Option<String>,
}

fn cipher() -> &'static FieldCipher {
    static CIPHER: OnceLock<FieldCipher> = OnceLock::new();
    CIPHER.get_or_init(|| {
        let provider = StaticKeyProvider::from_bytes(vec![42u8; 32]).expect("static key");
        FieldCipher::new(CipherConfig::new("fuzz-pepper"), Arc::new(provider))
    })
}

fuzz_target!(|input: Input| {
    if let Ok(record) = EncryptedRecord::from_json(&String::from_utf8_lossy(&input.raw_json)) {
        let _ = cipher().decrypt(&record, None);
    }

    let algorithm = if input.aes {
        Algorithm::Aes256Gcm
    } else {
        Algorithm::None
    };
    let mut record = EncryptedRecord::seal(input.blob, algorithm);
    if !input.fix_checksum {
        record.integrity_checksum = checksum(b"tampered");
    }
    // No valid record was sealed under this key, so nothing may decrypt.
    assert!(cipher().decrypt(&record, input.aad.as_deref()).is_err());
});
