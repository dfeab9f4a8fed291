use std::{fmt, str::FromStr};

/// Generate the `MediaType` enum, its `FromStr` and `Display`
/// implementations, and the associated constant `MANIFESTS` with
/// the media types accepted by default when fetching a manifest.
macro_rules! media_types {
    (
        manifests { $($m_variant:ident = $m_type:expr,)* }
        blobs { $($b_variant:ident = $b_type:expr,)* }
    ) => {
        /// Known media types.
        #[non_exhaustive]
        #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
        pub enum MediaType {
            $(
                #[doc = concat!("Manifest type `", $m_type, "`.")]
                $m_variant,
            )*
            $(
                #[doc = concat!("Blob type `", $b_type, "`.")]
                $b_variant,
            )*
        }

        impl MediaType {
            /// Manifest types, in order of preference.
            pub const MANIFESTS: &[MediaType] = &[ $(MediaType::$m_variant),* ];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(MediaType::$m_variant => $m_type,)*
                    $(MediaType::$b_variant => $b_type,)*
                }
            }
        }

        impl FromStr for MediaType {
            type Err = InvalidMediaType;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($m_type => Ok(MediaType::$m_variant),)*
                    $($b_type => Ok(MediaType::$b_variant),)*
                    _ => Err(InvalidMediaType(s.to_owned())),
                }
            }
        }
    }
}

media_types!(
    manifests {
        OciManifest = "application/vnd.oci.image.manifest.v1+json",
        OciIndex = "application/vnd.oci.image.index.v1+json",
        DockerManifestV2 = "application/vnd.docker.distribution.manifest.v2+json",
        DockerManifestList = "application/vnd.docker.distribution.manifest.list.v2+json",
        DockerManifestV1Signed = "application/vnd.docker.distribution.manifest.v1+prettyjws",
        DockerManifestV1 = "application/vnd.docker.distribution.manifest.v1+json",
    }
    blobs {
        OciConfig = "application/vnd.oci.image.config.v1+json",
        OciFsTar = "application/vnd.oci.image.layer.v1.tar",
        OciFsTarGzip = "application/vnd.oci.image.layer.v1.tar+gzip",
        OciFsTarZstd = "application/vnd.oci.image.layer.v1.tar+zstd",
        DockerImageV1 = "application/vnd.docker.container.image.v1+json",
        DockerFsTarGzip = "application/vnd.docker.image.rootfs.diff.tar.gzip",
    }
);

impl MediaType {
    /// Return `true` if this type is a list of manifests for
    /// multiple platforms.
    pub fn is_index(&self) -> bool {
        matches!(self, MediaType::OciIndex | MediaType::DockerManifestList)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error from [`MediaType::from_str`].
#[derive(thiserror::Error, Debug)]
#[error("Unknown media type: {0}")]
pub struct InvalidMediaType(pub String);

impl<'de> serde::Deserialize<'de> for MediaType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        MediaType::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[test]
fn media_type_in_json() {
    #[derive(serde::Deserialize, Debug)]
    struct Example {
        mt: MediaType,
    }

    assert!(matches!(
        serde_json::from_str(r#"{"mt": "application/vnd.oci.image.index.v1+json"}"#),
        Ok(Example {
            mt: MediaType::OciIndex
        })
    ));

    let err = serde_json::from_str::<Example>(r#"{"mt": "text/plain"}"#).unwrap_err();
    assert!(err.to_string().contains("text/plain"));
}

#[test]
fn manifest_types() {
    assert!(MediaType::OciIndex.is_index());
    assert!(!MediaType::OciManifest.is_index());

    for mt in MediaType::MANIFESTS {
        assert_eq!(mt.as_str().parse::<MediaType>().ok(), Some(*mt));
    }
}
