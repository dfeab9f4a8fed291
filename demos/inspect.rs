//! Resolve an image reference and print its manifest and blobs.
//!
//! Only `dir:` references can be read by this demo: the directory must
//! contain a `manifest.json` file, and one file for each blob, named
//! after the hash value of its digest.

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use clap::Parser;
use imgref_resolve::{
    manifest, BackendError, Backends, BlobStream, Capability, ConnectionOptions, Digest,
    EventHandler, Image, ImageDestination, ImageSource, MediaType, RawManifest, Resolver,
    Transport,
};

#[derive(Parser, Debug)]
struct Args {
    /// Directory with client certificates for the registry.
    #[arg(long)]
    cert_path: Option<PathBuf>,

    /// Don't verify the TLS certificate of the registry.
    #[arg(long)]
    tls_no_verify: bool,

    /// Image reference, like `dir:/tmp/image`.
    image: String,
}

struct Logger;

impl EventHandler for Logger {
    fn reference_resolved(&self, transport: Transport, capability: Capability, path: &str) {
        eprintln!("{capability}: {transport}{path}");
    }
}

struct DemoBackends;

fn unavailable<T>(transport: &str) -> Result<T, BackendError> {
    Err(format!("Transport {transport} is not available in this demo.").into())
}

impl Backends for DemoBackends {
    fn docker_source(
        &self,
        _: &str,
        _: &ConnectionOptions,
    ) -> Result<Box<dyn ImageSource>, BackendError> {
        unavailable("docker://")
    }

    fn docker_destination(
        &self,
        _: &str,
        _: &ConnectionOptions,
    ) -> Result<Box<dyn ImageDestination>, BackendError> {
        unavailable("docker://")
    }

    fn atomic_source(
        &self,
        _: &str,
        _: &ConnectionOptions,
    ) -> Result<Box<dyn ImageSource>, BackendError> {
        unavailable("atomic:")
    }

    fn atomic_destination(
        &self,
        _: &str,
        _: &ConnectionOptions,
    ) -> Result<Box<dyn ImageDestination>, BackendError> {
        unavailable("atomic:")
    }

    fn dir_source(&self, path: &Path) -> Box<dyn ImageSource> {
        Box::new(DirSource {
            reference: path.display().to_string(),
            path: path.to_owned(),
        })
    }

    fn dir_destination(&self, path: &Path) -> Box<dyn ImageDestination> {
        Box::new(ReadOnly(path.display().to_string()))
    }

    fn oci_destination(&self, _: &Path) -> Result<Box<dyn ImageDestination>, BackendError> {
        unavailable("oci:")
    }

    fn image_from_source(&self, source: Box<dyn ImageSource>) -> Box<dyn Image> {
        Box::new(SourceImage(source))
    }
}

struct DirSource {
    reference: String,
    path: PathBuf,
}

impl ImageSource for DirSource {
    fn reference(&self) -> &str {
        &self.reference
    }

    fn manifest(&self, _: &[MediaType]) -> Result<RawManifest, BackendError> {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Header {
            media_type: Option<MediaType>,
            schema_version: u32,
        }

        let data = std::fs::read(self.path.join("manifest.json"))?;
        let header: Header = serde_json::from_slice(&data)?;

        let media_type = match header {
            Header { media_type: Some(mt), .. } => mt,
            Header { schema_version: 1, .. } => MediaType::DockerManifestV1Signed,
            _ => MediaType::OciManifest,
        };

        Ok(RawManifest { data, media_type })
    }

    fn blob(&self, digest: &Digest) -> Result<BlobStream, BackendError> {
        let file = File::open(self.path.join(digest.hash_value()))?;
        Ok(BlobStream {
            size: Some(file.metadata()?.len()),
            reader: Box::new(file),
        })
    }
}

/// Destination that rejects all writes.
struct ReadOnly(String);

impl ImageDestination for ReadOnly {
    fn reference(&self) -> &str {
        &self.0
    }

    fn put_blob(
        &mut self,
        _: &Digest,
        _: Option<u64>,
        _: &mut dyn Read,
    ) -> Result<(), BackendError> {
        unavailable("dir: (write)")
    }

    fn put_manifest(&mut self, _: &RawManifest) -> Result<(), BackendError> {
        unavailable("dir: (write)")
    }

    fn put_signatures(&mut self, _: &[Vec<u8>]) -> Result<(), BackendError> {
        unavailable("dir: (write)")
    }
}

struct SourceImage(Box<dyn ImageSource>);

impl Image for SourceImage {
    fn reference(&self) -> &str {
        self.0.reference()
    }

    fn manifest(&self) -> Result<RawManifest, BackendError> {
        self.0.manifest(MediaType::MANIFESTS)
    }

    fn config(&self) -> Result<Vec<u8>, BackendError> {
        let blobs = manifest::blobs(&self.manifest()?)?;
        let config = blobs.first().ok_or("Missing config")?;
        Ok(std::fs::read(Path::new(self.reference()).join(config.hash_value()))?)
    }

    fn layers(&self) -> Result<Vec<Digest>, BackendError> {
        Ok(manifest::blobs(&self.manifest()?)?.into_iter().skip(1).collect())
    }
}

fn main() -> Result<(), BackendError> {
    let args = Args::parse();

    let mut options = ConnectionOptions::new().tls_verify(!args.tls_no_verify);
    if let Some(path) = &args.cert_path {
        options = options.cert_path(path);
    }

    let resolver = Resolver::new(DemoBackends).event_handler(Logger);
    let image = resolver.resolve_image(&args.image, &options)?;

    let manifest = image.manifest()?;
    println!("Manifest: {}", manifest.media_type);
    println!("Config: {} bytes", image.config()?.len());

    for layer in image.layers()? {
        println!("Layer: {layer}");
    }

    Ok(())
}
