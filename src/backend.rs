use std::path::Path;

use crate::{BackendError, ConnectionOptions, Image, ImageDestination, ImageSource};

/// Constructors for the handles of every known backend.
///
/// The resolver does not implement any backend. The host application
/// provides them with an implementation of this trait, and the resolver
/// selects the constructor for the transport of each reference.
///
/// `path` is always the reference without its transport prefix.
///
/// Registry-like backends (`docker://` and `atomic:`) receive the
/// [`ConnectionOptions`] given to the resolver. Local backends (`dir:`
/// and `oci:`) don't need them.
pub trait Backends: Sync {
    /// Pull handle for a `docker://` reference.
    fn docker_source(
        &self,
        path: &str,
        options: &ConnectionOptions,
    ) -> Result<Box<dyn ImageSource>, BackendError>;

    /// Push handle for a `docker://` reference.
    fn docker_destination(
        &self,
        path: &str,
        options: &ConnectionOptions,
    ) -> Result<Box<dyn ImageDestination>, BackendError>;

    /// Pull handle for an `atomic:` reference.
    fn atomic_source(
        &self,
        path: &str,
        options: &ConnectionOptions,
    ) -> Result<Box<dyn ImageSource>, BackendError>;

    /// Push handle for an `atomic:` reference.
    fn atomic_destination(
        &self,
        path: &str,
        options: &ConnectionOptions,
    ) -> Result<Box<dyn ImageDestination>, BackendError>;

    /// Pull handle for a `dir:` reference.
    ///
    /// It can't fail: errors in the directory are reported when the
    /// handle is used.
    fn dir_source(&self, path: &Path) -> Box<dyn ImageSource>;

    /// Push handle for a `dir:` reference.
    fn dir_destination(&self, path: &Path) -> Box<dyn ImageDestination>;

    /// Push handle for an `oci:` reference.
    fn oci_destination(&self, path: &Path) -> Result<Box<dyn ImageDestination>, BackendError>;

    /// Build a read-only view from a pull handle.
    fn image_from_source(&self, source: Box<dyn ImageSource>) -> Box<dyn Image>;
}

impl<B: Backends + ?Sized> Backends for &B {
    fn docker_source(
        &self,
        path: &str,
        options: &ConnectionOptions,
    ) -> Result<Box<dyn ImageSource>, BackendError> {
        (**self).docker_source(path, options)
    }

    fn docker_destination(
        &self,
        path: &str,
        options: &ConnectionOptions,
    ) -> Result<Box<dyn ImageDestination>, BackendError> {
        (**self).docker_destination(path, options)
    }

    fn atomic_source(
        &self,
        path: &str,
        options: &ConnectionOptions,
    ) -> Result<Box<dyn ImageSource>, BackendError> {
        (**self).atomic_source(path, options)
    }

    fn atomic_destination(
        &self,
        path: &str,
        options: &ConnectionOptions,
    ) -> Result<Box<dyn ImageDestination>, BackendError> {
        (**self).atomic_destination(path, options)
    }

    fn dir_source(&self, path: &Path) -> Box<dyn ImageSource> {
        (**self).dir_source(path)
    }

    fn dir_destination(&self, path: &Path) -> Box<dyn ImageDestination> {
        (**self).dir_destination(path)
    }

    fn oci_destination(&self, path: &Path) -> Result<Box<dyn ImageDestination>, BackendError> {
        (**self).oci_destination(path)
    }

    fn image_from_source(&self, source: Box<dyn ImageSource>) -> Box<dyn Image> {
        (**self).image_from_source(source)
    }
}
