//! Integration tests for the PassVault crypto module.

use passvault::crypto::aead::{self, TAG_LEN};
use passvault::crypto::kdf::{derive_master_key, generate_salt};
use passvault::crypto::keys::MasterKey;
use passvault::{Argon2Params, VaultError};

/// Low-cost Argon2 params so tests don't burn hundreds of milliseconds
/// per derivation.  Still above the enforced floor.
fn fast_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    }
}

// ---------------------------------------------------------------------------
// Key derivation (Argon2id)
// ---------------------------------------------------------------------------

#[test]
fn derive_master_key_same_inputs_same_output() {
    let password = b"my-secure-passphrase";
    let salt = generate_salt();

    let key1 = derive_master_key(password, &salt, &fast_params()).expect("derive 1");
    let key2 = derive_master_key(password, &salt, &fast_params()).expect("derive 2");

    assert_eq!(key1, key2, "same password + salt must produce the same key");
}

#[test]
fn derive_master_key_different_salts_different_keys() {
    let password = b"same-password";
    let salt1 = generate_salt();
    let salt2 = generate_salt();

    let key1 = derive_master_key(password, &salt1, &fast_params()).expect("derive 1");
    let key2 = derive_master_key(password, &salt2, &fast_params()).expect("derive 2");

    assert_ne!(key1, key2, "different salts must produce different keys");
}

#[test]
fn derive_master_key_different_passwords_different_keys() {
    let salt = generate_salt();

    let key1 = derive_master_key(b"password-one", &salt, &fast_params()).expect("derive 1");
    let key2 = derive_master_key(b"password-two", &salt, &fast_params()).expect("derive 2");

    assert_ne!(
        key1, key2,
        "different passwords must produce different keys"
    );
}

#[test]
fn derive_master_key_cost_changes_the_key() {
    let salt = generate_salt();
    let slower = Argon2Params {
        iterations: 2,
        ..fast_params()
    };

    let key1 = derive_master_key(b"pw", &salt, &fast_params()).expect("derive 1");
    let key2 = derive_master_key(b"pw", &salt, &slower).expect("derive 2");

    assert_ne!(key1, key2, "different work factors must change the key");
}

// ---------------------------------------------------------------------------
// Environment override of KDF cost
// ---------------------------------------------------------------------------

/// One test owns all three variables — the environment is
/// process-global and the suite runs multi-threaded.
#[test]
fn kdf_params_env_override() {
    std::env::set_var("PASSVAULT_KDF_MEMORY_KIB", "16384");
    std::env::set_var("PASSVAULT_KDF_ITERATIONS", "2");
    std::env::set_var("PASSVAULT_KDF_PARALLELISM", "2");
    assert_eq!(
        Argon2Params::from_env(),
        Argon2Params {
            memory_kib: 16_384,
            iterations: 2,
            parallelism: 2,
        }
    );

    // Unparseable values fall back to the default for that field.
    std::env::set_var("PASSVAULT_KDF_MEMORY_KIB", "not-a-number");
    let params = Argon2Params::from_env();
    assert_eq!(params.memory_kib, Argon2Params::default().memory_kib);
    assert_eq!(params.iterations, 2);

    std::env::remove_var("PASSVAULT_KDF_MEMORY_KIB");
    std::env::remove_var("PASSVAULT_KDF_ITERATIONS");
    std::env::remove_var("PASSVAULT_KDF_PARALLELISM");
    assert_eq!(Argon2Params::from_env(), Argon2Params::default());
}

// ---------------------------------------------------------------------------
// AEAD seal / open
// ---------------------------------------------------------------------------

#[test]
fn seal_open_roundtrip() {
    let key = [0xABu8; 32];
    let plaintext = b"an ordered sequence of entries";

    let sealed = aead::seal(&key, plaintext).expect("seal should succeed");

    // Ciphertext must carry the 16-byte tag on top of the plaintext.
    assert_eq!(sealed.ciphertext.len(), plaintext.len() + TAG_LEN);

    let recovered = aead::open(&key, &sealed).expect("open should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn seal_generates_a_fresh_nonce_each_time() {
    let key = [0xCDu8; 32];
    let plaintext = b"same plaintext";

    let s1 = aead::seal(&key, plaintext).expect("seal 1");
    let s2 = aead::seal(&key, plaintext).expect("seal 2");

    assert_ne!(s1.nonce, s2.nonce, "nonce must never repeat under a key");
    assert_ne!(s1.ciphertext, s2.ciphertext);
}

#[test]
fn open_with_wrong_key_is_tampered() {
    let key = [0x11u8; 32];
    let wrong_key = [0x22u8; 32];

    let sealed = aead::seal(&key, b"top secret").expect("seal");
    let result = aead::open(&wrong_key, &sealed);

    assert!(matches!(result, Err(VaultError::Tampered)));
}

#[test]
fn open_with_flipped_tag_bit_is_tampered() {
    let key = [0xBBu8; 32];
    let mut sealed = aead::seal(&key, b"value").expect("seal");

    // Flip a bit inside the trailing auth tag.
    let last = sealed.ciphertext.len() - 1;
    sealed.ciphertext[last] ^= 0x01;

    assert!(matches!(aead::open(&key, &sealed), Err(VaultError::Tampered)));
}

#[test]
fn open_with_truncated_ciphertext_is_corrupt() {
    let key = [0xAAu8; 32];
    let mut sealed = aead::seal(&key, b"value").expect("seal");

    // Shorter than a tag: structurally invalid, not merely unauthentic.
    sealed.ciphertext.truncate(TAG_LEN - 1);

    assert!(matches!(aead::open(&key, &sealed), Err(VaultError::Corrupt(_))));
}

// ---------------------------------------------------------------------------
// Verifier
// ---------------------------------------------------------------------------

#[test]
fn verifier_roundtrip_through_derived_key() {
    let salt = generate_salt();
    let key_bytes = derive_master_key(b"hunter2", &salt, &fast_params()).expect("derive");
    let master = MasterKey::new(key_bytes);

    let verifier = master.make_verifier().expect("make verifier");
    assert!(master.check_verifier(&verifier).expect("check verifier"));
}

#[test]
fn verifier_rejects_key_from_wrong_password() {
    let salt = generate_salt();

    let right = MasterKey::new(derive_master_key(b"right", &salt, &fast_params()).unwrap());
    let wrong = MasterKey::new(derive_master_key(b"wrong", &salt, &fast_params()).unwrap());

    let verifier = right.make_verifier().unwrap();
    assert!(!wrong.check_verifier(&verifier).unwrap());
}

// ---------------------------------------------------------------------------
// End-to-end: password -> master key -> sealed payload
// ---------------------------------------------------------------------------

#[test]
fn full_crypto_pipeline() {
    let password = b"hunter2";
    let salt = generate_salt();

    let master = MasterKey::new(derive_master_key(password, &salt, &fast_params()).unwrap());
    let data_key = master.derive_data_key().expect("derive data key");

    let plaintext = b"[{\"title\":\"Gmail\"}]";
    let sealed = aead::seal(&data_key, plaintext).expect("seal");
    let recovered = aead::open(&data_key, &sealed).expect("open");

    assert_eq!(recovered, plaintext.to_vec());
}
