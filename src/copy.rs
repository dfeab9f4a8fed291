use std::io::{self, Read};

use crate::{
    manifest, BackendError, Digest, DigestMismatch, EventHandler, ImageDestination, ImageSource,
    MediaType, VerifyReader,
};

#[derive(thiserror::Error, Debug)]
pub enum CopyError {
    #[error("Source failed: {0}")]
    Source(BackendError),

    #[error("Destination failed: {0}")]
    Destination(BackendError),

    #[error("Invalid manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Manifest lists can't be copied: {0}")]
    ManifestList(MediaType),

    #[error("Manifest type not supported: {0}")]
    UnsupportedManifest(MediaType),

    #[error("Blob {0} is invalid: {1}")]
    InvalidBlob(Digest, DigestMismatch),
}

/// Copy the image from `source` to `destination`.
///
/// Blobs are verified against their digests while they are written to
/// the destination. The manifest is written after all blobs, so the
/// destination never has a manifest that references missing blobs.
pub fn copy_image(
    source: &dyn ImageSource,
    destination: &mut dyn ImageDestination,
    event_handler: &impl EventHandler,
) -> Result<(), CopyError> {
    let supported = destination.supported_manifest_types();

    let accept = match supported {
        [] => MediaType::MANIFESTS,
        s => s,
    };

    let manifest = source.manifest(accept).map_err(CopyError::Source)?;

    event_handler.manifest_fetched(manifest.media_type, manifest.data.len());

    if !supported.is_empty() && !supported.contains(&manifest.media_type) {
        return Err(CopyError::UnsupportedManifest(manifest.media_type));
    }

    for digest in manifest::blobs(&manifest)? {
        let blob = source.blob(&digest).map_err(CopyError::Source)?;

        let mut reader = CountReader {
            inner: digest.verify(blob.reader),
            count: 0,
            error: None,
        };

        let result = destination.put_blob(&digest, blob.size, &mut reader);

        // The digest is checked at the end of the stream, so read
        // anything that the destination did not consume.
        let drained = match &result {
            Ok(()) => io::copy(&mut reader.inner, &mut io::sink()).map(drop),
            Err(_) => Ok(()),
        };

        // Errors from the destination are a consequence of a failure
        // in the source stream.
        if let Some(mismatch) = reader.inner.mismatch() {
            return Err(CopyError::InvalidBlob(digest, mismatch.clone()));
        }

        if let Some(e) = reader.error.take() {
            return Err(CopyError::Source(e.into()));
        }

        result.map_err(CopyError::Destination)?;
        drained.map_err(|e| CopyError::Source(e.into()))?;

        event_handler.blob_copied(&digest, reader.count);
    }

    let signatures = source.signatures().map_err(CopyError::Source)?;
    if !signatures.is_empty() {
        destination
            .put_signatures(&signatures)
            .map_err(CopyError::Destination)?;
    }

    destination
        .put_manifest(&manifest)
        .map_err(CopyError::Destination)?;

    event_handler.copy_finished();

    Ok(())
}

/// Count the bytes read by the destination, and keep the first error
/// from the source stream.
struct CountReader<R> {
    inner: VerifyReader<R>,
    count: u64,
    error: Option<io::Error>,
}

impl<R: Read> Read for CountReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Ok(n) => {
                self.count += n as u64;
                Ok(n)
            }

            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(e),

            Err(e) => {
                let copy = io::Error::new(e.kind(), e.to_string());
                self.error.get_or_insert(e);
                Err(copy)
            }
        }
    }
}
