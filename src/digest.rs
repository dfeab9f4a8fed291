use std::{
    fmt,
    io::{self, Read},
    str::FromStr,
};

use sha2::{Digest as _, Sha256, Sha512};

/// Algorithm to compute the hash value of a blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DigestAlgorithm {
    SHA256,
    SHA512,
}

impl DigestAlgorithm {
    fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::SHA256 => "sha256",
            DigestAlgorithm::SHA512 => "sha512",
        }
    }

    /// Length of the hash value, in hexadecimal digits.
    fn hex_len(&self) -> usize {
        match self {
            DigestAlgorithm::SHA256 => 256 / 8 * 2,
            DigestAlgorithm::SHA512 => 512 / 8 * 2,
        }
    }
}

/// Content digest of a blob, like `sha256:e3b0c4...`.
///
/// # Examples
///
/// ```
/// # use imgref_resolve::*;
/// let digest = Digest::sha256(b"");
/// assert_eq!(digest.algorithm(), DigestAlgorithm::SHA256);
/// assert_eq!(
///     digest.to_string(),
///     "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
/// );
///
/// let parsed: Digest = digest.to_string().parse().unwrap();
/// assert_eq!(parsed, digest);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(try_from = "String")]
pub struct Digest {
    algorithm: DigestAlgorithm,
    hex: String,
}

/// Errors from the digest parser.
#[derive(thiserror::Error, Debug)]
pub enum DigestError {
    #[error("Invalid digest algorithm.")]
    InvalidAlgorithm,

    #[error("Invalid digest value.")]
    InvalidValue,
}

/// Content read by [`VerifyReader`] does not match the expected digest.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
#[error("Invalid digest. Expected {expected}, got {computed}.")]
pub struct DigestMismatch {
    pub expected: Digest,

    /// Hash value computed from the content.
    pub computed: String,
}

impl Digest {
    /// Compute the SHA256 digest of `data`.
    pub fn sha256(data: impl AsRef<[u8]>) -> Self {
        Digest {
            algorithm: DigestAlgorithm::SHA256,
            hex: HexString(Sha256::digest(data.as_ref())).to_string(),
        }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Hash value, as a hexadecimal string.
    pub fn hash_value(&self) -> &str {
        &self.hex
    }

    /// Return a `Read` instance that computes the digest of the data
    /// from `reader`.
    ///
    /// When all data is consumed, it verifies that the computed digest
    /// is this one. If not, `read` returns an
    /// [`InvalidData`](::std::io::ErrorKind::InvalidData) error, and
    /// [`VerifyReader::mismatch`] returns the details.
    pub fn verify<R: Read>(&self, reader: R) -> VerifyReader<R> {
        let hasher = match self.algorithm {
            DigestAlgorithm::SHA256 => Hasher::Sha256(Sha256::new()),
            DigestAlgorithm::SHA512 => Hasher::Sha512(Sha512::new()),
        };

        VerifyReader {
            hasher: Some(hasher),
            expected: self.clone(),
            mismatch: None,
            reader,
        }
    }
}

impl TryFrom<String> for Digest {
    type Error = DigestError;

    fn try_from(digest: String) -> Result<Self, Self::Error> {
        digest.parse()
    }
}

impl FromStr for Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (algorithm, value) = match s.split_once(':') {
            Some(("sha256", v)) => (DigestAlgorithm::SHA256, v),
            Some(("sha512", v)) => (DigestAlgorithm::SHA512, v),
            _ => return Err(DigestError::InvalidAlgorithm),
        };

        if value.len() != algorithm.hex_len() || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DigestError::InvalidValue);
        }

        Ok(Digest {
            algorithm,
            hex: value.to_ascii_lowercase(),
        })
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm.name(), self.hex)
    }
}

enum Hasher {
    Sha256(Sha256),
    Sha512(Sha512),
}

impl Hasher {
    fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Sha256(h) => h.update(data),
            Hasher::Sha512(h) => h.update(data),
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Hasher::Sha256(h) => HexString(h.finalize()).to_string(),
            Hasher::Sha512(h) => HexString(h.finalize()).to_string(),
        }
    }
}

/// Reader returned by [`Digest::verify`].
pub struct VerifyReader<R> {
    /// `None` after the digest was checked.
    hasher: Option<Hasher>,
    expected: Digest,
    mismatch: Option<DigestMismatch>,
    reader: R,
}

impl<R> VerifyReader<R> {
    /// Return the mismatch found at the end of the stream.
    ///
    /// `None` if the end was not reached yet, or if the content is valid.
    pub fn mismatch(&self) -> Option<&DigestMismatch> {
        self.mismatch.as_ref()
    }

    /// Return `true` if the end of the stream was reached, and the
    /// content matches the digest.
    pub fn is_verified(&self) -> bool {
        self.hasher.is_none() && self.mismatch.is_none()
    }
}

impl<R: Read> Read for VerifyReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;

        if n == 0 && !buf.is_empty() {
            if let Some(hasher) = self.hasher.take() {
                let computed = hasher.finalize_hex();
                if computed != self.expected.hex {
                    self.mismatch = Some(DigestMismatch {
                        expected: self.expected.clone(),
                        computed,
                    });
                }
            }

            // Keep failing if the stream is read again after a mismatch.
            if let Some(mismatch) = &self.mismatch {
                return Err(io::Error::new(io::ErrorKind::InvalidData, mismatch.clone()));
            }

            return Ok(0);
        }

        if let Some(hasher) = &mut self.hasher {
            hasher.update(&buf[..n]);
        }

        Ok(n)
    }
}

/// Encode a byte buffer as a lowercase hex string.
struct HexString<T>(T);

impl<T: AsRef<[u8]>> fmt::Display for HexString<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0
            .as_ref()
            .iter()
            .try_for_each(|byte| write!(f, "{:02x}", byte))
    }
}

#[test]
fn parse_digests() {
    let upper = format!("sha256:{}", "AB".repeat(32));
    let digest: Digest = upper.parse().unwrap();
    assert_eq!(digest.hash_value(), "ab".repeat(32));

    let digest: Digest = format!("sha512:{}", "0".repeat(128)).parse().unwrap();
    assert_eq!(digest.algorithm(), DigestAlgorithm::SHA512);

    assert!(matches!(
        "md5:0000".parse::<Digest>(),
        Err(DigestError::InvalidAlgorithm)
    ));

    assert!(matches!(
        "sha256:0000".parse::<Digest>(),
        Err(DigestError::InvalidValue)
    ));

    assert!(matches!(
        format!("sha256:{:064}", "x").parse::<Digest>(),
        Err(DigestError::InvalidValue)
    ));
}

#[test]
fn reject_invalid_content() {
    use std::io::Cursor;

    /// Digest for `abc`
    const DIGEST: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    let digest: Digest = format!("sha256:{DIGEST}").parse().unwrap();
    assert_eq!(digest, Digest::sha256("abc"));

    let mut output = Vec::new();
    let mut reader = digest.verify(Cursor::new("abc"));
    reader.read_to_end(&mut output).unwrap();

    assert_eq!(output, b"abc");
    assert!(reader.is_verified());
    assert!(reader.mismatch().is_none());

    output.clear();
    let mut reader = digest.verify(Cursor::new("abcx"));
    assert!(!reader.is_verified());

    let err = reader.read_to_end(&mut output).unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert!(!reader.is_verified());
    assert_eq!(reader.mismatch().map(|m| &m.expected), Some(&digest));

    // Reading again reports the same error.
    assert!(reader.read(&mut [0u8; 8]).is_err());

    let msg = err.to_string();
    assert!(msg.contains(DIGEST));
    assert!(msg.contains("7571ce1f8e21c6b13dd7ec2c5ec7c9e4dd9852e209869511853f2f1f74b17927"));
}
