//! Checksum registry codec.
//!
//! A package may ship a `checksum.txt` registry next to its `pkg/` directory.
//! Each line records the digest of one tracked file:
//!
//! ```text
//! 3a6eb0790f39ac87c94f3856b2dd2c5d110e6811602261a9a923d3bb23adc8b7  pkg/manifest.yml
//! 9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08  pkg/profile/docker-compose.yml
//! ```
//!
//! The digest algorithm is fixed for the whole format (see
//! [`DIGEST_ALGORITHM`]); changing it is a breaking change to every registry
//! already published.

mod digest;
mod registry;

pub use digest::{compute_digest, digest_reader, DIGEST_ALGORITHM, DIGEST_HEX_LEN};
pub use registry::{
    generate_registry, load_registry, parse_registry, serialize_registry, verify_registry,
    ChecksumEntry, REGISTRY_FILE_NAME,
};
