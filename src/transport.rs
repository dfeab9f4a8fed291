use std::fmt;

/// Generate the `Transport` enum, its `Display` implementation, and the
/// associated constant `ALL` with the scheme table.
///
/// The order of the entries is the order used to match references.
macro_rules! transports {
    ($($(#[$doc:meta])* $variant:ident = $prefix:expr,)*) => {
        /// Backend named by the scheme prefix of an image reference.
        #[non_exhaustive]
        #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
        pub enum Transport {
            $(
                $(#[$doc])*
                $variant,
            )*
        }

        impl Transport {
            /// Scheme table, in matching order.
            pub const ALL: &[Transport] = &[ $(Transport::$variant),* ];

            /// Prefix literal for this transport, like `docker://`.
            pub fn prefix(&self) -> &'static str {
                match self {
                    $(Transport::$variant => $prefix,)*
                }
            }
        }
    }
}

transports!(
    /// Remote container registry (`docker://`).
    Docker = "docker://",
    /// Platform-specific registry variant (`atomic:`).
    Atomic = "atomic:",
    /// Local directory-backed image (`dir:`).
    Dir = "dir:",
    /// OCI image layout (`oci:`).
    Oci = "oci:",
);

impl Transport {
    /// Find the transport for `reference`, and return it with the
    /// remainder of the string after the prefix.
    ///
    /// Prefixes are tested in the order of [`Transport::ALL`]. The test
    /// is case-sensitive, and there is no partial matching.
    ///
    /// # Examples
    ///
    /// ```
    /// # use imgref_resolve::*;
    /// assert_eq!(
    ///     Transport::split("docker://quay.io/foo/bar:1.0"),
    ///     Some((Transport::Docker, "quay.io/foo/bar:1.0")),
    /// );
    ///
    /// assert_eq!(Transport::split("DIR:/tmp/x"), None);
    /// ```
    pub fn split(reference: &str) -> Option<(Transport, &str)> {
        Transport::ALL
            .iter()
            .find_map(|t| reference.strip_prefix(t.prefix()).map(|p| (*t, p)))
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Kind of handle requested from a backend.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Capability {
    /// Read-only decoded view ([`Image`](crate::Image)).
    Image,

    /// Pull handle ([`ImageSource`](crate::ImageSource)).
    Source,

    /// Push handle ([`ImageDestination`](crate::ImageDestination)).
    Destination,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::Image => "image",
            Capability::Source => "image source",
            Capability::Destination => "image destination",
        })
    }
}

#[test]
fn prefixes_are_mutually_exclusive() {
    for a in Transport::ALL {
        for b in Transport::ALL {
            if a != b {
                assert!(
                    !a.prefix().starts_with(b.prefix()),
                    "{a:?} overlaps with {b:?}"
                );
            }
        }
    }
}

#[test]
fn split_known_prefixes() {
    macro_rules! check {
        ($reference:expr, $expected:expr) => {
            assert_eq!(Transport::split($reference), $expected, "{}", $reference);
        };
    }

    check!("docker://busybox", Some((Transport::Docker, "busybox")));
    check!("atomic:ns/img:tag", Some((Transport::Atomic, "ns/img:tag")));
    check!("dir:/tmp/myimage", Some((Transport::Dir, "/tmp/myimage")));
    check!("oci:/tmp/layout", Some((Transport::Oci, "/tmp/layout")));

    // Empty remainder is still a match. The backend decides if it is valid.
    check!("dir:", Some((Transport::Dir, "")));

    check!("", None);
    check!("foo:bar", None);
    check!("http://x", None);
    check!("docker:busybox", None);
    check!("Docker://busybox", None);
    check!(" dir:/tmp", None);
}

#[test]
fn display_is_prefix() {
    assert_eq!(Transport::Docker.to_string(), "docker://");
    assert_eq!(Transport::Oci.to_string(), "oci:");
}
