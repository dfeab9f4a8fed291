use std::{fmt, str::FromStr};

use crate::{ResolveError, Transport};

/// Image reference split into its transport and the backend-defined path.
///
/// The path is opaque: it is not validated, and it is passed unchanged
/// to the backend selected by the transport.
///
/// # Examples
///
/// ```
/// # use imgref_resolve::*;
/// let reference = ImageReference::try_from("docker://registry.example.com/repo:tag").unwrap();
/// assert_eq!(reference.transport, Transport::Docker);
/// assert_eq!(reference.path, "registry.example.com/repo:tag");
/// assert_eq!(reference.to_string(), "docker://registry.example.com/repo:tag");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageReference<'a> {
    /// Backend for the image.
    pub transport: Transport,

    /// Remainder of the reference after the prefix.
    pub path: &'a str,
}

impl<'a> ImageReference<'a> {
    pub fn new(transport: Transport, path: &'a str) -> Self {
        ImageReference { transport, path }
    }

    /// Copy the path to build an instance that does not borrow
    /// the original string.
    pub fn into_owned(self) -> OwnedImageReference {
        OwnedImageReference {
            transport: self.transport,
            path: self.path.to_owned(),
        }
    }
}

impl<'a> TryFrom<&'a str> for ImageReference<'a> {
    type Error = ResolveError;

    fn try_from(reference: &'a str) -> Result<Self, Self::Error> {
        Transport::split(reference)
            .map(|(transport, path)| ImageReference { transport, path })
            .ok_or_else(|| ResolveError::UnrecognizedReference(reference.to_owned()))
    }
}

impl fmt::Display for ImageReference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.transport, self.path)
    }
}

/// Same as [`ImageReference`], but owns the path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OwnedImageReference {
    pub transport: Transport,
    pub path: String,
}

impl OwnedImageReference {
    pub fn borrowed(&self) -> ImageReference<'_> {
        ImageReference::new(self.transport, &self.path)
    }
}

impl FromStr for OwnedImageReference {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageReference::try_from(s).map(|r| r.into_owned())
    }
}

impl fmt::Display for OwnedImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.borrowed(), f)
    }
}

#[test]
fn parse_references() {
    let reference = ImageReference::try_from("oci:/tmp/layout:latest").unwrap();
    assert_eq!(reference, ImageReference::new(Transport::Oci, "/tmp/layout:latest"));

    let owned: OwnedImageReference = "atomic:ns/img".parse().unwrap();
    assert_eq!(owned.transport, Transport::Atomic);
    assert_eq!(owned.path, "ns/img");
    assert_eq!(owned.to_string(), "atomic:ns/img");
}

#[test]
fn reject_unknown_prefix() {
    for input in ["", "bogus://x", "foo:bar", "registry:quay.io/x"] {
        match ImageReference::try_from(input) {
            Err(ResolveError::UnrecognizedReference(s)) => assert_eq!(s, input),
            other => panic!("{input:?} -> {other:?}"),
        }
    }
}
