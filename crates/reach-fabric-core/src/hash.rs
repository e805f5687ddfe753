//! SHA-256 hashing: the digest type, an incremental hasher, and stream hashing.
//!
//! Every content address, Merkle node and fingerprint in the fabric is a
//! [`Sha256Hash`]. Hex output is always lowercase and 64 characters long.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{CoreError, Result};

/// Algorithm tag carried by every digest.
pub const HASH_ALGORITHM: &str = "sha256";

/// A 32-byte SHA-256 hash.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sha256Hash(pub [u8; 32]);

impl Sha256Hash {
    /// Compute the SHA-256 hash of data.
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Hash the concatenation `left || right`.
    pub fn hash_pair(left: &Self, right: &Self) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(left.0);
        hasher.update(right.0);
        Self(hasher.finalize().into())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The algorithm name, always `"sha256"`.
    pub const fn algorithm(&self) -> &'static str {
        HASH_ALGORITHM
    }

    /// Convert to lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| CoreError::InvalidHash(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidHash(format!("expected 32 bytes: {s}")))?;
        Ok(Self(arr))
    }

    /// Algorithm-tagged form: `sha256:<hex>`.
    pub fn tagged(&self) -> String {
        format!("{HASH_ALGORITHM}:{}", self.to_hex())
    }

    /// Parse the algorithm-tagged form produced by [`Sha256Hash::tagged`].
    pub fn parse_tagged(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((HASH_ALGORITHM, digest)) => Self::from_hex(digest),
            Some((other, _)) => Err(CoreError::InvalidHash(format!(
                "unsupported algorithm: {other}"
            ))),
            None => Err(CoreError::InvalidHash(format!("missing algorithm tag: {s}"))),
        }
    }
}

impl fmt::Debug for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHA256({}...)", &self.to_hex()[..8])
    }
}

impl fmt::Display for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Sha256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Sha256Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Sha256Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Sha256Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Hash a byte slice in one shot.
pub fn hash_bytes(data: &[u8]) -> Sha256Hash {
    Sha256Hash::hash(data)
}

/// Hash the UTF-8 bytes of a string in one shot.
pub fn hash_string(data: &str) -> Sha256Hash {
    Sha256Hash::hash(data.as_bytes())
}

/// Combine digests as `sha256(hex_0 ":" hex_1 ":" ...)`.
///
/// Order-sensitive. Sort the inputs first when order must not matter.
pub fn combine_hashes(hashes: &[Sha256Hash]) -> Sha256Hash {
    let joined = hashes
        .iter()
        .map(Sha256Hash::to_hex)
        .collect::<Vec<_>>()
        .join(":");
    hash_string(&joined)
}

/// Incremental SHA-256 hasher.
///
/// Once [`StreamingHasher::finalize`] has been called the hasher is spent:
/// further updates and a second finalize both fail.
#[derive(Clone)]
pub struct StreamingHasher {
    inner: Option<Sha256>,
    bytes: u64,
}

impl StreamingHasher {
    /// Create a fresh hasher.
    pub fn new() -> Self {
        Self {
            inner: Some(Sha256::new()),
            bytes: 0,
        }
    }

    /// Feed more bytes.
    pub fn update(&mut self, data: impl AsRef<[u8]>) -> Result<&mut Self> {
        let hasher = self.inner.as_mut().ok_or(CoreError::UpdateAfterFinalize)?;
        let data = data.as_ref();
        hasher.update(data);
        self.bytes += data.len() as u64;
        Ok(self)
    }

    /// Produce the digest. Can only be called once.
    pub fn finalize(&mut self) -> Result<Sha256Hash> {
        let hasher = self.inner.take().ok_or(CoreError::AlreadyFinalized)?;
        Ok(Sha256Hash(hasher.finalize().into()))
    }

    /// Whether `finalize` has already been called.
    pub fn is_finalized(&self) -> bool {
        self.inner.is_none()
    }

    /// Number of bytes fed so far.
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes
    }
}

impl Default for StreamingHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StreamingHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingHasher")
            .field("finalized", &self.is_finalized())
            .field("bytes", &self.bytes)
            .finish()
    }
}

/// Configuration for stream hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Read buffer size in bytes.
    pub chunk_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { chunk_size: 8192 }
    }
}

/// Hash an async byte stream to completion.
///
/// The stream is consumed chunk by chunk; the whole input is never buffered.
/// A read error aborts hashing and no digest is produced.
pub async fn hash_stream<R>(reader: R, config: &StreamConfig) -> Result<Sha256Hash>
where
    R: AsyncRead + Unpin,
{
    hash_stream_with_cancel(reader, config, std::future::pending::<()>()).await
}

/// Hash an async byte stream, aborting as soon as `cancel` resolves.
///
/// Cancellation is checked before every read and surfaces as
/// [`CoreError::Cancelled`]; a truncated digest is never returned.
pub async fn hash_stream_with_cancel<R, C>(
    mut reader: R,
    config: &StreamConfig,
    cancel: C,
) -> Result<Sha256Hash>
where
    R: AsyncRead + Unpin,
    C: Future<Output = ()>,
{
    let mut hasher = StreamingHasher::new();
    let mut buf = vec![0u8; config.chunk_size.max(1)];
    tokio::pin!(cancel);

    loop {
        let read = tokio::select! {
            biased;
            _ = &mut cancel => {
                tracing::debug!(bytes_read = hasher.bytes_hashed(), "stream hash cancelled");
                return Err(CoreError::Cancelled { bytes_read: hasher.bytes_hashed() });
            }
            read = reader.read(&mut buf) => read,
        };

        let n = match read {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(bytes_read = hasher.bytes_hashed(), "stream hash failed: {}", e);
                return Err(CoreError::Stream(e));
            }
        };
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n])?;
    }

    tracing::trace!(bytes = hasher.bytes_hashed(), "stream hashed");
    hasher.finalize()
}
