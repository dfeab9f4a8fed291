use std::path::{Path, PathBuf};

/// Connection settings for registry-like backends (`docker://` and
/// `atomic:`).
///
/// It can be built with the setter methods, or deserialized from the
/// configuration of the host application. Keys are `cert-path` and
/// `tls-verify`; missing keys take their default values.
///
/// # Examples
///
/// ```
/// # use imgref_resolve::*;
/// let options = ConnectionOptions::new()
///     .cert_path("/etc/containers/certs.d")
///     .tls_verify(false);
///
/// assert_eq!(options.cert_path.as_deref(), Some(std::path::Path::new("/etc/containers/certs.d")));
/// assert!(!options.tls_verify);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConnectionOptions {
    /// Directory with client certificates and CA files.
    pub cert_path: Option<PathBuf>,

    /// Verify the TLS certificate of the registry. Enabled by default.
    pub tls_verify: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        ConnectionOptions {
            cert_path: None,
            tls_verify: true,
        }
    }
}

impl ConnectionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cert_path(mut self, path: impl AsRef<Path>) -> Self {
        self.cert_path = Some(path.as_ref().to_owned());
        self
    }

    pub fn tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }
}

#[test]
fn load_from_json() {
    let options: ConnectionOptions =
        serde_json::from_str(r#"{ "cert-path": "/etc/certs", "tls-verify": false }"#).unwrap();

    assert_eq!(options, ConnectionOptions::new().cert_path("/etc/certs").tls_verify(false));

    let options: ConnectionOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options, ConnectionOptions::default());
    assert!(options.tls_verify);
    assert!(options.cert_path.is_none());

    assert!(serde_json::from_str::<ConnectionOptions>(r#"{ "tls_verify": false }"#).is_err());
}
