//! Backends that keep images in memory.
//!
//! Every transport has its own namespace in the store, so `docker://foo`
//! and `dir:foo` are different images.

use std::{
    collections::HashMap,
    io::{Cursor, Read},
    path::Path,
    sync::{Arc, Mutex},
};

use imgref_resolve::{
    manifest, BackendError, Backends, BlobStream, ConnectionOptions, Digest, Image,
    ImageDestination, ImageSource, MediaType, RawManifest,
};

use super::blobs::TestImage;

#[derive(Clone, Debug, Default)]
pub struct StoredImage {
    pub manifest: Option<RawManifest>,
    pub blobs: HashMap<Digest, Vec<u8>>,
    pub signatures: Vec<Vec<u8>>,
}

impl From<&TestImage> for StoredImage {
    fn from(image: &TestImage) -> Self {
        StoredImage {
            manifest: Some(image.manifest.clone()),
            blobs: image
                .blobs()
                .map(|b| (b.digest.clone(), b.data.to_vec()))
                .collect(),
            signatures: Vec::new(),
        }
    }
}

type Store = Arc<Mutex<HashMap<String, StoredImage>>>;

#[derive(Default)]
pub struct MemoryBackends {
    store: Store,

    /// Options received by the registry-like constructors.
    pub options: Mutex<Vec<ConnectionOptions>>,
}

impl MemoryBackends {
    pub fn insert(&self, reference: &str, image: StoredImage) {
        self.store.lock().unwrap().insert(reference.to_owned(), image);
    }

    pub fn get(&self, reference: &str) -> Option<StoredImage> {
        self.store.lock().unwrap().get(reference).cloned()
    }

    fn source(&self, key: String) -> Box<dyn ImageSource> {
        Box::new(MemorySource {
            key,
            store: self.store.clone(),
        })
    }

    fn destination(
        &self,
        key: String,
        supported: &'static [MediaType],
    ) -> Box<dyn ImageDestination> {
        Box::new(MemoryDestination {
            key,
            store: self.store.clone(),
            supported,
            staged: StoredImage::default(),
        })
    }

    fn registry_key(
        &self,
        prefix: &str,
        path: &str,
        options: &ConnectionOptions,
    ) -> Result<String, BackendError> {
        self.options.lock().unwrap().push(options.clone());

        if path.is_empty() {
            return Err("Missing repository.".into());
        }

        Ok(format!("{prefix}{path}"))
    }
}

impl Backends for MemoryBackends {
    fn docker_source(
        &self,
        path: &str,
        options: &ConnectionOptions,
    ) -> Result<Box<dyn ImageSource>, BackendError> {
        Ok(self.source(self.registry_key("docker://", path, options)?))
    }

    fn docker_destination(
        &self,
        path: &str,
        options: &ConnectionOptions,
    ) -> Result<Box<dyn ImageDestination>, BackendError> {
        Ok(self.destination(self.registry_key("docker://", path, options)?, &[]))
    }

    fn atomic_source(
        &self,
        path: &str,
        options: &ConnectionOptions,
    ) -> Result<Box<dyn ImageSource>, BackendError> {
        Ok(self.source(self.registry_key("atomic:", path, options)?))
    }

    fn atomic_destination(
        &self,
        path: &str,
        options: &ConnectionOptions,
    ) -> Result<Box<dyn ImageDestination>, BackendError> {
        Ok(self.destination(self.registry_key("atomic:", path, options)?, &[]))
    }

    fn dir_source(&self, path: &Path) -> Box<dyn ImageSource> {
        self.source(format!("dir:{}", path.display()))
    }

    fn dir_destination(&self, path: &Path) -> Box<dyn ImageDestination> {
        self.destination(format!("dir:{}", path.display()), &[])
    }

    fn oci_destination(&self, path: &Path) -> Result<Box<dyn ImageDestination>, BackendError> {
        if !path.is_absolute() {
            return Err(format!("Layout path must be absolute: {}", path.display()).into());
        }

        Ok(self.destination(
            format!("oci:{}", path.display()),
            &[MediaType::OciManifest],
        ))
    }

    fn image_from_source(&self, source: Box<dyn ImageSource>) -> Box<dyn Image> {
        Box::new(MemoryImage { source })
    }
}

struct MemorySource {
    key: String,
    store: Store,
}

impl MemorySource {
    fn with_image<T>(&self, f: impl FnOnce(&StoredImage) -> Option<T>) -> Result<T, BackendError> {
        let store = self.store.lock().unwrap();
        store
            .get(&self.key)
            .and_then(f)
            .ok_or_else(|| format!("Not found in {}", self.key).into())
    }
}

impl ImageSource for MemorySource {
    fn reference(&self) -> &str {
        &self.key
    }

    fn manifest(&self, _accept: &[MediaType]) -> Result<RawManifest, BackendError> {
        self.with_image(|i| i.manifest.clone())
    }

    fn blob(&self, digest: &Digest) -> Result<BlobStream, BackendError> {
        let data = self.with_image(|i| i.blobs.get(digest).cloned())?;
        Ok(BlobStream {
            size: Some(data.len() as u64),
            reader: Box::new(Cursor::new(data)),
        })
    }

    fn signatures(&self) -> Result<Vec<Vec<u8>>, BackendError> {
        self.with_image(|i| Some(i.signatures.clone()))
    }
}

/// Keep written data in `staged`, and store it when the
/// manifest is written.
struct MemoryDestination {
    key: String,
    store: Store,
    supported: &'static [MediaType],
    staged: StoredImage,
}

impl ImageDestination for MemoryDestination {
    fn reference(&self) -> &str {
        &self.key
    }

    fn supported_manifest_types(&self) -> &[MediaType] {
        self.supported
    }

    fn put_blob(
        &mut self,
        digest: &Digest,
        _size: Option<u64>,
        stream: &mut dyn Read,
    ) -> Result<(), BackendError> {
        let mut data = Vec::new();
        stream.read_to_end(&mut data)?;
        self.staged.blobs.insert(digest.clone(), data);
        Ok(())
    }

    fn put_manifest(&mut self, manifest: &RawManifest) -> Result<(), BackendError> {
        let mut image = std::mem::take(&mut self.staged);
        image.manifest = Some(manifest.clone());
        self.store.lock().unwrap().insert(self.key.clone(), image);
        Ok(())
    }

    fn put_signatures(&mut self, signatures: &[Vec<u8>]) -> Result<(), BackendError> {
        self.staged.signatures = signatures.to_vec();
        Ok(())
    }
}

struct MemoryImage {
    source: Box<dyn ImageSource>,
}

impl MemoryImage {
    fn blobs(&self) -> Result<Vec<Digest>, BackendError> {
        Ok(manifest::blobs(&self.manifest()?)?)
    }
}

impl Image for MemoryImage {
    fn reference(&self) -> &str {
        self.source.reference()
    }

    fn manifest(&self) -> Result<RawManifest, BackendError> {
        self.source.manifest(MediaType::MANIFESTS)
    }

    fn config(&self) -> Result<Vec<u8>, BackendError> {
        let blobs = self.blobs()?;
        let config = blobs.first().ok_or("Manifest without config")?;

        let mut data = Vec::new();
        self.source.blob(config)?.reader.read_to_end(&mut data)?;
        Ok(data)
    }

    fn layers(&self) -> Result<Vec<Digest>, BackendError> {
        Ok(self.blobs()?.into_iter().skip(1).collect())
    }

    fn signatures(&self) -> Result<Vec<Vec<u8>>, BackendError> {
        self.source.signatures()
    }
}
