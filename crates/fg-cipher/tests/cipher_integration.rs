//! Integration tests for fg-cipher.
//!
//! These tests verify:
//! - Round trips through JSON storage form
//! - Every single-byte tamper of blob or checksum is rejected
//! - Key-file backed ciphers survive a save/load cycle
//! - Audit entries flow to a JSONL sink without plaintext

use fg_cipher::{
    Algorithm, AuditOperation, AuditSink, CipherConfig, CipherError, EncryptedRecord, FieldCipher,
    JsonlAuditSink, KeyFile, MissingKeyProvider, StaticKeyProvider,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;

const ID: &str = "1234567890123";

fn cipher_with_pepper(pepper: &str) -> FieldCipher {
    FieldCipher::new(
        CipherConfig::new(pepper),
        Arc::new(StaticKeyProvider::from_bytes(b"0123456789abcdef0123456789abcdef".to_vec()).unwrap()),
    )
}

// ============================================================================
// Concrete Scenario
// ============================================================================

#[test]
fn test_encrypt_then_decrypt_and_hash_scenario() {
    let cipher = cipher_with_pepper("p");

    let record = cipher.encrypt(ID, None).unwrap();
    assert_eq!(cipher.decrypt(&record, None).unwrap(), ID);

    let expected = hex::encode(Sha256::digest("1234567890123:p".as_bytes()));
    assert_eq!(cipher.hash(ID).unwrap(), expected);
}

#[test]
fn test_roundtrip_through_json() {
    let cipher = cipher_with_pepper("p");
    let record = cipher.encrypt(ID, Some("tenant-7")).unwrap();

    let stored = record.to_json().unwrap();
    assert!(!stored.contains(ID));

    let loaded = EncryptedRecord::from_json(&stored).unwrap();
    assert_eq!(cipher.decrypt(&loaded, Some("tenant-7")).unwrap(), ID);
}

#[test]
fn test_hash_is_deterministic_and_distinct() {
    let cipher = cipher_with_pepper("pepper-1");
    assert_eq!(cipher.hash(ID).unwrap(), cipher.hash(ID).unwrap());
    assert_ne!(cipher.hash(ID).unwrap(), cipher.hash("1234567890124").unwrap());
    assert_ne!(
        cipher.hash(ID).unwrap(),
        cipher_with_pepper("pepper-2").hash(ID).unwrap()
    );
}

// ============================================================================
// Tamper Detection
// ============================================================================

#[test]
fn test_every_blob_byte_flip_is_rejected() {
    let cipher = cipher_with_pepper("p");
    let record = cipher.encrypt(ID, None).unwrap();

    for i in 0..record.ciphertext_blob.len() {
        let mut tampered = record.clone();
        tampered.ciphertext_blob[i] ^= 0x01;
        let err = cipher.decrypt(&tampered, None).unwrap_err();
        assert!(
            matches!(err, CipherError::Integrity),
            "byte {} flip gave {:?}",
            i,
            err
        );
    }
}

#[test]
fn test_every_checksum_char_change_is_rejected() {
    let cipher = cipher_with_pepper("p");
    let record = cipher.encrypt(ID, None).unwrap();

    for i in 0..record.integrity_checksum.len() {
        let mut tampered = record.clone();
        let mut bytes = tampered.integrity_checksum.into_bytes();
        bytes[i] = if bytes[i] == b'0' { b'1' } else { b'0' };
        tampered.integrity_checksum = String::from_utf8(bytes).unwrap();
        assert!(matches!(
            cipher.decrypt(&tampered, None),
            Err(CipherError::Integrity)
        ));
    }
}

#[test]
fn test_algorithm_swap_is_rejected() {
    let cipher = cipher_with_pepper("p");
    let mut record = cipher.encrypt(ID, None).unwrap();
    record.algorithm = Algorithm::None;
    assert!(cipher.decrypt(&record, None).is_err());
}

// ============================================================================
// Key File Provider
// ============================================================================

#[test]
fn test_key_file_provider_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keys.json");
    KeyFile::generate().unwrap().save(&path).unwrap();

    let first = FieldCipher::new(
        CipherConfig::new("p"),
        Arc::new(KeyFile::load(&path).unwrap()),
    );
    let record = first.encrypt(ID, None).unwrap();

    let second = FieldCipher::new(
        CipherConfig::new("p"),
        Arc::new(KeyFile::load(&path).unwrap()),
    );
    assert_eq!(second.decrypt(&record, None).unwrap(), ID);
}

#[test]
fn test_resaved_key_file_keeps_opening_old_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keys.json");
    KeyFile::generate().unwrap().save(&path).unwrap();

    let sealer = FieldCipher::new(
        CipherConfig::new("p"),
        Arc::new(KeyFile::load(&path).unwrap()),
    );
    let record = sealer.encrypt(ID, None).unwrap();

    KeyFile::load(&path).unwrap().save(&path).unwrap();
    let opener = FieldCipher::new(
        CipherConfig::new("p"),
        Arc::new(KeyFile::load(&path).unwrap()),
    );
    assert_eq!(opener.decrypt(&record, None).unwrap(), ID);
}

// ============================================================================
// Degraded Mode
// ============================================================================

#[test]
fn test_degraded_mode_is_symmetric() {
    let cipher = FieldCipher::new(CipherConfig::disabled(), Arc::new(MissingKeyProvider));
    let record = cipher.encrypt(ID, None).unwrap();
    assert_eq!(record.algorithm, Algorithm::None);
    assert_eq!(cipher.decrypt(&record, None).unwrap(), ID);
}

#[test]
fn test_degraded_mode_still_validates() {
    let cipher = FieldCipher::new(CipherConfig::disabled(), Arc::new(MissingKeyProvider));
    assert!(matches!(
        cipher.encrypt("not-an-id", None),
        Err(CipherError::Validation(_))
    ));
}

// ============================================================================
// Audit
// ============================================================================

#[test]
fn test_audit_entries_to_jsonl_sink() {
    let cipher = cipher_with_pepper("p");
    let mut sink = JsonlAuditSink::new(Vec::new());

    let (record, entry) = cipher.encrypt_audited(ID, None, "svc-kyc");
    sink.record(&entry).unwrap();
    let (plain, entry) = cipher.decrypt_audited(&record.unwrap(), None, "svc-kyc");
    sink.record(&entry).unwrap();
    assert_eq!(plain.unwrap(), ID);
    let (_, entry) = cipher.hash_audited("123", "svc-kyc");
    sink.record(&entry).unwrap();

    let out = String::from_utf8(sink.into_inner()).unwrap();
    assert!(!out.contains(ID));

    let entries: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["operation"], "encrypt");
    assert_eq!(entries[1]["operation"], "decrypt");
    assert_eq!(entries[2]["operation"], "hash");
    assert_eq!(entries[2]["success"], false);
    assert_eq!(entries[2]["error_kind"], "validation");
}

#[test]
fn test_audit_entry_is_pure() {
    let cipher = cipher_with_pepper("p");
    let entry = cipher.audit_entry(AuditOperation::Decrypt, "ops", false);
    assert_eq!(entry.actor_id, "ops");
    assert!(!entry.success);
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_shared_cipher_across_threads() {
    let cipher = Arc::new(cipher_with_pepper("p"));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let cipher = Arc::clone(&cipher);
            std::thread::spawn(move || {
                let id = format!("99900000000{}", i);
                let record = cipher.encrypt(&id, None).unwrap();
                assert_eq!(cipher.decrypt(&record, None).unwrap(), id);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
