//! Inbound payload codec.
//!
//! Message callbacks arrive as AES-ECB ciphertext encoded with URL-safe base64 whose trailing
//! `=` padding has been stripped by the platform. The AES key is configured as an
//! "EncodingAESKey": standard base64 without its trailing `==`.

use aes::cipher::{BlockDecryptMut, BlockEncryptMut, InvalidLength, KeyInit, block_padding::Pkcs7};
use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD},
};
use tracing::debug;

use super::error::ProtocolError;

type Aes128EcbDec = ecb::Decryptor<aes::Aes128>;
type Aes192EcbDec = ecb::Decryptor<aes::Aes192>;
type Aes256EcbDec = ecb::Decryptor<aes::Aes256>;
type Aes128EcbEnc = ecb::Encryptor<aes::Aes128>;
type Aes192EcbEnc = ecb::Encryptor<aes::Aes192>;
type Aes256EcbEnc = ecb::Encryptor<aes::Aes256>;

const AES_BLOCK_SIZE: usize = 16;

/// Pad `src` with `=` up to the next multiple of four characters.
pub fn pad_base64(src: &str) -> String {
    let trailing = src.len() % 4;
    if trailing == 0 {
        return src.to_string();
    }

    let mut padded = String::with_capacity(src.len() + 4 - trailing);
    padded.push_str(src);
    padded.extend(std::iter::repeat_n('=', 4 - trailing));
    padded
}

/// Derive the raw AES key from the configured secret.
///
/// The literal suffix `==` is appended and the result decoded as standard base64. A secret whose
/// length is not two short of a multiple of four therefore fails to decode.
pub fn derive_key(secret: &str) -> Result<Vec<u8>, ProtocolError> {
    STANDARD
        .decode(format!("{secret}=="))
        .map_err(|e| ProtocolError::MalformedPayload(format!("invalid key encoding: {e}")))
}

/// Decrypt AES-ECB ciphertext with PKCS#7 padding; the key length selects AES-128/192/256.
pub fn ecb_decrypt(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    if ciphertext.is_empty() || ciphertext.len() % AES_BLOCK_SIZE != 0 {
        return Err(ProtocolError::MalformedPayload(format!(
            "ciphertext length {} is not a positive multiple of {AES_BLOCK_SIZE}",
            ciphertext.len()
        )));
    }

    let invalid_key = |_: InvalidLength| ProtocolError::MalformedPayload(format!("invalid key length {}", key.len()));

    let result = match key.len() {
        16 => Aes128EcbDec::new_from_slice(key).map_err(invalid_key)?.decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        24 => Aes192EcbDec::new_from_slice(key).map_err(invalid_key)?.decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        32 => Aes256EcbDec::new_from_slice(key).map_err(invalid_key)?.decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        n => return Err(ProtocolError::MalformedPayload(format!("invalid key length {n}"))),
    };

    result.map_err(|_| ProtocolError::MalformedPayload("invalid padding in decrypted block".into()))
}

/// Encrypt `plaintext` with AES-ECB and PKCS#7 padding.
pub fn ecb_encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let invalid_key = |_: InvalidLength| ProtocolError::MalformedPayload(format!("invalid key length {}", key.len()));

    match key.len() {
        16 => Ok(Aes128EcbEnc::new_from_slice(key).map_err(invalid_key)?.encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
        24 => Ok(Aes192EcbEnc::new_from_slice(key).map_err(invalid_key)?.encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
        32 => Ok(Aes256EcbEnc::new_from_slice(key).map_err(invalid_key)?.encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
        n => Err(ProtocolError::MalformedPayload(format!("invalid key length {n}"))),
    }
}

/// Turn a raw callback body into plaintext bytes.
pub fn decode_payload(raw_body: &[u8], secret: &str) -> Result<Vec<u8>, ProtocolError> {
    let body = std::str::from_utf8(raw_body).map_err(|e| ProtocolError::MalformedPayload(format!("body is not utf-8: {e}")))?;

    let ciphertext = URL_SAFE
        .decode(pad_base64(body))
        .map_err(|e| ProtocolError::MalformedPayload(format!("invalid base64: {e}")))?;

    let key = derive_key(secret)?;
    let plaintext = ecb_decrypt(&ciphertext, &key)?;

    debug!("Decrypted {} byte payload into {} bytes", ciphertext.len(), plaintext.len());

    Ok(plaintext)
}

/// Encode plaintext the way the platform does: encrypt, then URL-safe base64 without padding.
pub fn encode_payload(plaintext: &[u8], secret: &str) -> Result<String, ProtocolError> {
    let key = derive_key(secret)?;
    let ciphertext = ecb_encrypt(plaintext, &key)?;

    Ok(URL_SAFE_NO_PAD.encode(ciphertext))
}
