// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/pixelvault-core

//! Confidentiality layer for hidden payloads.
//!
//! Key derivation is PBKDF2-HMAC-SHA256 with 100,000 iterations and a
//! random 16-byte salt; encryption is AES-256-CBC with PKCS#7 padding and
//! a random 16-byte IV. The salt and IV travel with the ciphertext inside
//! the frame (`salt || iv || ciphertext`) so the decoder can re-derive the
//! key from the password alone.
//!
//! There is deliberately no MAC: the wire format predates one. Invalid
//! PKCS#7 padding after decryption is the only wrong-password signal, and
//! it cannot be told apart from corruption; both surface as
//! [`StegoError::Authentication`]. An AEAD mode would fix this but would
//! change the wire format.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::stego::error::StegoError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// PBKDF2 salt length in bytes.
pub const SALT_LEN: usize = 16;
/// AES-CBC IV length in bytes.
pub const IV_LEN: usize = 16;
/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;
/// AES block size in bytes; PKCS#7 pads to a multiple of this.
pub const BLOCK_LEN: usize = 16;
/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Bytes the frame body grows by when encryption is on, beyond padding:
/// the embedded salt and IV.
pub const HEADER_OVERHEAD: usize = SALT_LEN + IV_LEN;

/// Derive the AES-256 key from a password and salt. Deterministic.
pub fn derive_key(password: &str, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut *key);
    key
}

/// PKCS#7-padded ciphertext length for a plaintext of `len` bytes.
/// Always strictly larger than `len`: a full block of padding is added
/// when the plaintext is already aligned.
pub fn padded_len(len: usize) -> usize {
    (len / BLOCK_LEN + 1) * BLOCK_LEN
}

/// Encrypt `plaintext` under `password`.
///
/// Draws a fresh salt and IV from the system CSPRNG and returns
/// `salt || iv || ciphertext`, the layout the frame embeds verbatim.
pub fn encrypt(plaintext: &[u8], password: &str) -> Vec<u8> {
    let mut rng = rand::thread_rng();

    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    let mut iv = [0u8; IV_LEN];
    rng.fill_bytes(&mut iv);

    let key = derive_key(password, &salt);
    let cipher = Aes256CbcEnc::new_from_slices(&*key, &iv).expect("fixed key and IV lengths");
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut out = Vec::with_capacity(HEADER_OVERHEAD + ciphertext.len());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    out
}

/// Decrypt a `salt || iv || ciphertext` body under `password`.
///
/// Any structural defect (short body, ragged ciphertext length, invalid
/// padding after decryption) is reported as [`StegoError::Authentication`].
pub fn decrypt(body: &[u8], password: &str) -> Result<Vec<u8>, StegoError> {
    if body.len() < HEADER_OVERHEAD + BLOCK_LEN {
        return Err(StegoError::Authentication);
    }
    let (salt, rest) = body.split_at(SALT_LEN);
    let (iv, ciphertext) = rest.split_at(IV_LEN);
    if ciphertext.len() % BLOCK_LEN != 0 {
        return Err(StegoError::Authentication);
    }

    let key = derive_key(password, salt);
    let cipher = Aes256CbcDec::new_from_slices(&*key, iv).expect("fixed key and IV lengths");
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| StegoError::Authentication)
}
