use imgref_resolve::{Digest, MediaType, RawManifest};
use serde::ser::SerializeStruct;

#[derive(Clone, Debug)]
pub struct Blob {
    pub media_type: MediaType,
    pub digest: Digest,
    pub data: Box<[u8]>,
}

impl serde::Serialize for Blob {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut s = serializer.serialize_struct("Blob", 3)?;
        s.serialize_field("mediaType", self.media_type.as_str())?;
        s.serialize_field("digest", &self.digest.to_string())?;
        s.serialize_field("size", &self.data.len())?;
        s.end()
    }
}

impl Blob {
    pub fn new(media_type: MediaType, data: impl Into<Box<[u8]>>) -> Blob {
        let data = data.into();
        let digest = Digest::sha256(&data);

        Blob {
            media_type,
            digest,
            data,
        }
    }

    pub fn layer(data: &str) -> Blob {
        Blob::new(MediaType::OciFsTar, data.as_bytes())
    }
}

/// Image content: a manifest of type `media_type`, and its blobs.
pub struct TestImage {
    pub manifest: RawManifest,
    pub config: Blob,
    pub layers: Vec<Blob>,
}

impl TestImage {
    pub fn new(media_type: MediaType, config: &str, layers: &[&str]) -> TestImage {
        #[derive(serde::Serialize, Debug)]
        #[serde(rename_all = "camelCase")]
        struct Manifest<'a> {
            schema_version: u32,
            media_type: &'a str,
            config: &'a Blob,
            layers: &'a [Blob],
        }

        let config = Blob::new(MediaType::OciConfig, config.as_bytes());
        let layers: Vec<_> = layers.iter().map(|l| Blob::layer(l)).collect();

        let data = serde_json::to_vec(&Manifest {
            schema_version: 2,
            media_type: media_type.as_str(),
            config: &config,
            layers: &layers,
        })
        .expect("Serialize manifest");

        TestImage {
            manifest: RawManifest { data, media_type },
            config,
            layers,
        }
    }

    pub fn blobs(&self) -> impl Iterator<Item = &Blob> {
        std::iter::once(&self.config).chain(&self.layers)
    }
}
