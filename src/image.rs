//! Capabilities of the handles built by the backends.
//!
//! Each capability is a separate trait, since backends implement
//! different subsets of them.

use std::io::Read;

use crate::{Digest, MediaType};

/// Error from a backend. It is returned unchanged to the caller.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Manifest content, with the media type reported by the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct RawManifest {
    pub data: Vec<u8>,
    pub media_type: MediaType,
}

/// Stream to read a blob.
pub struct BlobStream {
    /// Size of the blob, if the backend knows it.
    pub size: Option<u64>,

    pub reader: Box<dyn Read + Send>,
}

/// Handle to pull an image.
pub trait ImageSource: Send {
    /// Reference of the image, as it was given to the backend.
    fn reference(&self) -> &str;

    /// Get the manifest of the image.
    ///
    /// `accept` is the list of media types that the caller can handle,
    /// in order of preference.
    fn manifest(&self, accept: &[MediaType]) -> Result<RawManifest, BackendError>;

    /// Open a blob referenced by the manifest.
    fn blob(&self, digest: &Digest) -> Result<BlobStream, BackendError>;

    /// Get the signatures of the image. Backends without
    /// signature support return an empty list.
    fn signatures(&self) -> Result<Vec<Vec<u8>>, BackendError> {
        Ok(Vec::new())
    }
}

/// Handle to push an image.
pub trait ImageDestination: Send {
    /// Reference of the image, as it was given to the backend.
    fn reference(&self) -> &str;

    /// Manifest types that this destination can store, in order of
    /// preference. An empty list means that any type is accepted.
    fn supported_manifest_types(&self) -> &[MediaType] {
        &[]
    }

    /// Write a blob. `size` is `None` if the length of the stream
    /// is unknown.
    ///
    /// `stream` must be read until it returns `0`, since the digest of
    /// the content is checked at the end of the stream.
    fn put_blob(
        &mut self,
        digest: &Digest,
        size: Option<u64>,
        stream: &mut dyn Read,
    ) -> Result<(), BackendError>;

    /// Write the manifest. It is called after all blobs are written.
    fn put_manifest(&mut self, manifest: &RawManifest) -> Result<(), BackendError>;

    fn put_signatures(&mut self, signatures: &[Vec<u8>]) -> Result<(), BackendError>;
}

/// Read-only view of an image, with its manifest and configuration
/// already decoded by the backend.
pub trait Image: Send {
    /// Reference of the image, as it was given to the backend.
    fn reference(&self) -> &str;

    fn manifest(&self) -> Result<RawManifest, BackendError>;

    /// Content of the configuration blob.
    fn config(&self) -> Result<Vec<u8>, BackendError>;

    /// Digests of the layers, from the base layer to the top one.
    fn layers(&self) -> Result<Vec<Digest>, BackendError>;

    fn signatures(&self) -> Result<Vec<Vec<u8>>, BackendError> {
        Ok(Vec::new())
    }
}
