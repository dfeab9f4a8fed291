//! Resolve image references like `docker://quay.io/foo/bar:1.0` or
//! `oci:/tmp/layout` to handles provided by the backend of each transport.
//!
//! The backends are not part of this crate. The host application
//! implements [`Backends`], and [`Resolver`] selects the constructor
//! for each reference.

mod backend;
mod copy;
mod digest;
mod event_handler;
mod image;
mod mediatype;
mod options;
mod reference;
mod resolver;
mod transport;

pub mod manifest;

pub use backend::Backends;
pub use copy::{copy_image, CopyError};
pub use digest::{Digest, DigestAlgorithm, DigestError, DigestMismatch, VerifyReader};
pub use event_handler::{EventHandler, NoEventHandler};
pub use image::{BackendError, BlobStream, Image, ImageDestination, ImageSource, RawManifest};
pub use mediatype::{InvalidMediaType, MediaType};
pub use options::ConnectionOptions;
pub use reference::{ImageReference, OwnedImageReference};
pub use resolver::{ResolveError, Resolver};
pub use transport::{Capability, Transport};
