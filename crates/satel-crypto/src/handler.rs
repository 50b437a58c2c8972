use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes192;
use rand::RngCore;

use crate::error::CryptoError;

const BLOCK_LEN: usize = 16;
const PDU_HEADER_LEN: usize = 6;

/// Wraps every encrypted-channel PDU in an AES block-chained envelope and
/// keeps the rolling counters the panel uses to detect replayed or
/// out-of-order traffic.
///
/// The chaining isn't textbook CBC: a trailing block shorter than 16 bytes
/// is never padded. Instead it's XORed against a fresh keystream block
/// (the chaining value run back through AES encryption, never decryption)
/// so decoding a short tail never requires a block-cipher decrypt of
/// ciphertext that was never really a full block to begin with.
pub struct EncryptionHandler {
    cipher: Aes192,
    rolling_counter: u16,
    id_r: u8,
    id_s: u8,
}

impl EncryptionHandler {
    /// `key` is the ASCII integration key configured on the panel (up to 12
    /// characters). Each handler claims the next `id_s` from a process-wide
    /// counter so concurrently-open channels never collide.
    pub fn new(key: &str) -> Self {
        static NEXT_ID_S: std::sync::atomic::AtomicU8 = std::sync::atomic::AtomicU8::new(1);
        let id_s = NEXT_ID_S.fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        Self {
            cipher: Self::build_cipher(key),
            rolling_counter: 0,
            id_r: 0,
            id_s,
        }
    }

    /// Builds the 24-byte AES-192 key: the integration key, space-padded to
    /// 12 bytes, doubled. The panel's own key derivation — a 12-character
    /// key concatenated with itself — yields a 24-byte key, not the 16-byte
    /// key AES-128 would need, so this handler uses AES-192 throughout.
    fn build_cipher(key: &str) -> Aes192 {
        let mut padded = [b' '; 12];
        for (slot, b) in padded.iter_mut().zip(key.as_bytes()) {
            *slot = *b;
        }
        let mut key_bytes = [0u8; 24];
        key_bytes[..12].copy_from_slice(&padded);
        key_bytes[12..].copy_from_slice(&padded);
        Aes192::new(GenericArray::from_slice(&key_bytes))
    }

    fn encrypt_block(&self, block: &mut [u8; BLOCK_LEN]) {
        let mut ga = GenericArray::clone_from_slice(block);
        self.cipher.encrypt_block(&mut ga);
        block.copy_from_slice(&ga);
    }

    fn decrypt_block(&self, block: &mut [u8; BLOCK_LEN]) {
        let mut ga = GenericArray::clone_from_slice(block);
        self.cipher.decrypt_block(&mut ga);
        block.copy_from_slice(&ga);
    }

    fn data_encrypt(&self, data: &[u8]) -> Vec<u8> {
        let mut cv = [0u8; BLOCK_LEN];
        self.encrypt_block(&mut cv);
        let mut out = Vec::with_capacity(data.len());
        let mut offset = 0;
        while offset < data.len() {
            let remaining = data.len() - offset;
            if remaining >= BLOCK_LEN {
                let mut block = [0u8; BLOCK_LEN];
                for i in 0..BLOCK_LEN {
                    block[i] = data[offset + i] ^ cv[i];
                }
                self.encrypt_block(&mut block);
                out.extend_from_slice(&block);
                cv = block;
                offset += BLOCK_LEN;
            } else {
                let mut keystream = cv;
                self.encrypt_block(&mut keystream);
                for i in 0..remaining {
                    out.push(data[offset + i] ^ keystream[i]);
                }
                offset += remaining;
            }
        }
        out
    }

    fn data_decrypt(&self, data: &[u8]) -> Vec<u8> {
        let mut cv = [0u8; BLOCK_LEN];
        self.encrypt_block(&mut cv);
        let mut out = Vec::with_capacity(data.len());
        let mut offset = 0;
        while offset < data.len() {
            let remaining = data.len() - offset;
            if remaining >= BLOCK_LEN {
                let mut ciphertext = [0u8; BLOCK_LEN];
                ciphertext.copy_from_slice(&data[offset..offset + BLOCK_LEN]);
                let mut plain = ciphertext;
                self.decrypt_block(&mut plain);
                for i in 0..BLOCK_LEN {
                    plain[i] ^= cv[i];
                }
                out.extend_from_slice(&plain);
                cv = ciphertext;
                offset += BLOCK_LEN;
            } else {
                let mut keystream = cv;
                self.encrypt_block(&mut keystream);
                for i in 0..remaining {
                    out.push(data[offset + i] ^ keystream[i]);
                }
                offset += remaining;
            }
        }
        out
    }

    /// Wraps `data` in a fresh PDU header (two filler bytes, the rolling
    /// counter, our `id_s`, our view of the peer's `id_r`) and encrypts the
    /// result. Advances the rolling counter for next time.
    pub fn write_data_with_pdu(&mut self, data: &[u8]) -> Vec<u8> {
        let mut nonce = [0u8; 2];
        rand::thread_rng().fill_bytes(&mut nonce);
        let header = [
            nonce[0],
            nonce[1],
            (self.rolling_counter >> 8) as u8,
            (self.rolling_counter & 0xFF) as u8,
            self.id_s,
            self.id_r,
        ];
        self.rolling_counter = self.rolling_counter.wrapping_add(1);

        let mut pdu = Vec::with_capacity(header.len() + data.len());
        pdu.extend_from_slice(&header);
        pdu.extend_from_slice(data);
        self.data_encrypt(&pdu)
    }

    /// Decrypts an incoming PDU, adopts the peer's rolling id from it, and
    /// checks it reflects our `id_s` back — the panel's way of confirming
    /// both sides derived the same key. Returns the data that followed the
    /// header.
    pub fn read_data_from_pdu(&mut self, encrypted: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let decrypted = self.data_decrypt(encrypted);
        if decrypted.len() < PDU_HEADER_LEN {
            return Err(CryptoError::TruncatedPdu);
        }
        let header = &decrypted[..PDU_HEADER_LEN];
        self.id_r = header[4];
        if self.id_s != decrypted[5] {
            return Err(CryptoError::InvalidKey);
        }
        Ok(decrypted[PDU_HEADER_LEN..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_short_and_long_payloads_between_matched_handlers() {
        let mut a = EncryptionHandler::new("1234");
        let mut b = EncryptionHandler::new("1234");
        // force both sides to agree on id_s/id_r the way a real handshake would
        b.id_s = a.id_s;
        a.id_r = b.id_s;
        b.id_r = a.id_s;

        for payload in [&b""[..], b"x", b"hello world", &[0xFE; 40][..]] {
            let pdu = a.write_data_with_pdu(payload);
            let got = b.read_data_from_pdu(&pdu).expect("should decrypt");
            assert_eq!(got, payload);
        }
    }

    #[test]
    fn unsynchronized_ids_fail_the_reflection_check_even_with_matching_keys() {
        let mut a = EncryptionHandler::new("shared-key");
        let mut b = EncryptionHandler::new("shared-key");
        // a's id_r defaults to 0, but b's id_s is never 0 (the counter starts
        // at 1), so without a real handshake the reflection check must fail.
        let pdu = a.write_data_with_pdu(b"probe");
        let err = b.read_data_from_pdu(&pdu);
        assert!(err.is_err());
    }
}
