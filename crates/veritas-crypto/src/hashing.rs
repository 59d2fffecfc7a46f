use crate::error::CryptoError;

/// BLAKE3 digest (32 bytes).
pub type Digest = [u8; 32];

/// Hash arbitrary data using BLAKE3.
pub fn hash(data: &[u8]) -> Digest {
    *blake3::hash(data).as_bytes()
}

/// Encode a digest as lowercase hex.
pub fn digest_to_hex(digest: &Digest) -> String {
    hex::encode(digest)
}

/// Decode a hex-encoded digest, requiring exactly 32 bytes.
pub fn digest_from_hex(hex_str: &str) -> Result<Digest, CryptoError> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| CryptoError::InvalidInput(format!("invalid hex: {}", e)))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        })
}
