//! Blobs referenced by an image manifest.

use crate::{CopyError, Digest, MediaType, RawManifest};

#[derive(serde::Deserialize, Debug)]
struct Blob {
    digest: Digest,
}

/// Docker schema 2 and OCI manifests.
///
/// Refs:
///
/// * https://distribution.github.io/distribution/spec/manifest-v2-2/
/// * https://github.com/opencontainers/image-spec/blob/main/manifest.md
#[derive(serde::Deserialize, Debug)]
struct Manifest {
    config: Blob,
    layers: Vec<Blob>,
}

/// Docker schema 1 manifests.
///
/// Layers are listed from the top one to the base.
#[derive(serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ManifestV1 {
    fs_layers: Vec<LayerV1>,
}

#[derive(serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct LayerV1 {
    blob_sum: Digest,
}

/// Return the digests of the blobs referenced by `manifest`.
///
/// For schema 2 and OCI manifests, the first item is the configuration,
/// followed by the layers. For schema 1 manifests, only the layers are
/// returned, without duplicates.
///
/// Manifest lists can't be handled, since they reference other manifests
/// instead of blobs.
pub fn blobs(manifest: &RawManifest) -> Result<Vec<Digest>, CopyError> {
    let data = manifest.data.as_slice();

    match manifest.media_type {
        MediaType::DockerManifestV2 | MediaType::OciManifest => {
            let Manifest { config, layers } = serde_json::from_slice(data)?;

            Ok([config]
                .into_iter()
                .chain(layers)
                .map(|b| b.digest)
                .collect())
        }

        MediaType::DockerManifestV1 | MediaType::DockerManifestV1Signed => {
            let ManifestV1 { fs_layers } = serde_json::from_slice(data)?;

            let mut digests: Vec<Digest> = Vec::with_capacity(fs_layers.len());
            for layer in fs_layers {
                if !digests.contains(&layer.blob_sum) {
                    digests.push(layer.blob_sum);
                }
            }

            Ok(digests)
        }

        mt if mt.is_index() => Err(CopyError::ManifestList(mt)),

        mt => Err(CopyError::UnsupportedManifest(mt)),
    }
}

#[cfg(test)]
fn digest(n: u8) -> Digest {
    Digest::sha256([n])
}

#[test]
fn oci_manifest_blobs() {
    let data = format!(
        r#"{{
            "schemaVersion": 2,
            "mediaType": "application/vnd.oci.image.manifest.v1+json",
            "config": {{
                "mediaType": "application/vnd.oci.image.config.v1+json",
                "digest": "{}",
                "size": 1
            }},
            "layers": [
                {{
                    "mediaType": "application/vnd.oci.image.layer.v1.tar+gzip",
                    "digest": "{}",
                    "size": 1
                }},
                {{
                    "mediaType": "application/vnd.oci.image.layer.v1.tar+gzip",
                    "digest": "{}",
                    "size": 1
                }}
            ]
        }}"#,
        digest(0),
        digest(1),
        digest(2),
    );

    let manifest = RawManifest {
        data: data.into_bytes(),
        media_type: MediaType::OciManifest,
    };

    assert_eq!(blobs(&manifest).unwrap(), [digest(0), digest(1), digest(2)]);
}

#[test]
fn schema1_manifest_blobs() {
    let data = format!(
        r#"{{
            "schemaVersion": 1,
            "name": "foo/bar",
            "tag": "latest",
            "fsLayers": [
                {{ "blobSum": "{}" }},
                {{ "blobSum": "{}" }},
                {{ "blobSum": "{}" }}
            ]
        }}"#,
        digest(3),
        digest(4),
        digest(3),
    );

    let manifest = RawManifest {
        data: data.into_bytes(),
        media_type: MediaType::DockerManifestV1Signed,
    };

    assert_eq!(blobs(&manifest).unwrap(), [digest(3), digest(4)]);
}

#[test]
fn reject_lists_and_blobs() {
    let index = RawManifest {
        data: br#"{"manifests": []}"#.to_vec(),
        media_type: MediaType::OciIndex,
    };

    assert!(matches!(
        blobs(&index),
        Err(CopyError::ManifestList(MediaType::OciIndex))
    ));

    let config = RawManifest {
        data: b"{}".to_vec(),
        media_type: MediaType::OciConfig,
    };

    assert!(matches!(
        blobs(&config),
        Err(CopyError::UnsupportedManifest(MediaType::OciConfig))
    ));

    let invalid = RawManifest {
        data: b"{}".to_vec(),
        media_type: MediaType::OciManifest,
    };

    assert!(matches!(blobs(&invalid), Err(CopyError::Json(_))));
}
