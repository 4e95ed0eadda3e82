//! SHA-256 content digests.

use std::io::{self, Read};

use sha2::{Digest, Sha256};

/// Name of the digest algorithm used by checksum registries.
pub const DIGEST_ALGORITHM: &str = "sha256";

/// Length of a hex-encoded digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Buffer size for streaming digests (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Compute the lowercase hex SHA-256 digest of `bytes`.
///
/// # Example
///
/// ```
/// use avspkg::checksum::compute_digest;
///
/// assert_eq!(
///     compute_digest(b"hello world"),
///     "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
/// );
/// ```
pub fn compute_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Compute the lowercase hex SHA-256 digest of everything `reader` yields.
pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_compute_digest_empty() {
        // SHA-256 of empty string
        assert_eq!(
            compute_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_digest_len_matches_constant() {
        assert_eq!(compute_digest(b"anything").len(), DIGEST_HEX_LEN);
    }

    #[test]
    fn test_reader_matches_slice_digest() {
        // Larger than the buffer so several reads are needed
        let data = vec![0xABu8; 100_000];
        let streamed = digest_reader(Cursor::new(&data)).unwrap();
        assert_eq!(streamed, compute_digest(&data));
    }
}
