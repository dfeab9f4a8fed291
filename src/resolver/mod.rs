
use std::path::Path;

use crate::{
    BackendError, Backends, Capability, ConnectionOptions, EventHandler, Image, ImageDestination,
    ImageSource, NoEventHandler, Transport,
};

/// Errors from the resolver.
#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    /// No transport prefix matches the reference, or the transport
    /// can't provide the requested capability.
    #[error("Unrecognized image reference {0}")]
    UnrecognizedReference(String),

    /// The backend constructor failed.
    #[error(transparent)]
    Backend(BackendError),
}

/// Select the backend for an image reference, and build a handle
/// with it.
///
/// The resolver has no state besides the backends and the event handler,
/// so it can be shared between threads and used concurrently.
///
/// # Examples
///
/// ```no_run
/// # use imgref_resolve::*;
/// # fn backends() -> &'static dyn Backends { unimplemented!() }
/// let resolver = Resolver::new(backends());
/// let options = ConnectionOptions::new().tls_verify(false);
///
/// let source = resolver.resolve_source("docker://localhost:5000/foo:1.0", &options)?;
/// let destination = resolver.resolve_destination("oci:/tmp/foo", &options)?;
/// # Ok::<(), ResolveError>(())
/// ```
pub struct Resolver<B, E = NoEventHandler> {
    backends: B,
    event_handler: E,
}

impl<B: Backends> Resolver<B> {
    pub fn new(backends: B) -> Self {
        Resolver {
            backends,
            event_handler: NoEventHandler,
        }
    }
}

impl<B: Backends, E: EventHandler> Resolver<B, E> {
    /// Handler to receive notifications when a reference is resolved
    /// or rejected.
    pub fn event_handler<H: EventHandler>(self, event_handler: H) -> Resolver<B, H> {
        Resolver {
            backends: self.backends,
            event_handler,
        }
    }

    /// Build a read-only view of the image in `reference`.
    ///
    /// Only `docker://` and `dir:` references are accepted.
    pub fn resolve_image(
        &self,
        reference: &str,
        options: &ConnectionOptions,
    ) -> Result<Box<dyn Image>, ResolveError> {
        let (transport, path) = self.split(reference, Capability::Image)?;

        let source = match transport {
            Transport::Docker => self.backends.docker_source(path, options)?,
            Transport::Dir => self.backends.dir_source(Path::new(path)),
            _ => return Err(self.reject(reference, Capability::Image)),
        };

        self.accepted(transport, Capability::Image, path);
        Ok(self.backends.image_from_source(source))
    }

    /// Build a pull handle for `reference`.
    ///
    /// Accepts `docker://`, `atomic:`, and `dir:` references.
    pub fn resolve_source(
        &self,
        reference: &str,
        options: &ConnectionOptions,
    ) -> Result<Box<dyn ImageSource>, ResolveError> {
        let (transport, path) = self.split(reference, Capability::Source)?;

        let source = match transport {
            Transport::Docker => self.backends.docker_source(path, options)?,
            Transport::Atomic => self.backends.atomic_source(path, options)?,
            Transport::Dir => self.backends.dir_source(Path::new(path)),
            _ => return Err(self.reject(reference, Capability::Source)),
        };

        self.accepted(transport, Capability::Source, path);
        Ok(source)
    }

    /// Build a push handle for `reference`.
    ///
    /// Accepts `docker://`, `atomic:`, `dir:`, and `oci:` references.
    pub fn resolve_destination(
        &self,
        reference: &str,
        options: &ConnectionOptions,
    ) -> Result<Box<dyn ImageDestination>, ResolveError> {
        let (transport, path) = self.split(reference, Capability::Destination)?;

        let destination = match transport {
            Transport::Docker => self.backends.docker_destination(path, options)?,
            Transport::Atomic => self.backends.atomic_destination(path, options)?,
            Transport::Dir => self.backends.dir_destination(Path::new(path)),
            Transport::Oci => self.backends.oci_destination(Path::new(path))?,
        };

        self.accepted(transport, Capability::Destination, path);
        Ok(destination)
    }

    fn split<'a>(
        &self,
        reference: &'a str,
        capability: Capability,
    ) -> Result<(Transport, &'a str), ResolveError> {
        Transport::split(reference).ok_or_else(|| self.reject(reference, capability))
    }

    fn accepted(&self, transport: Transport, capability: Capability, path: &str) {
        self.event_handler
            .reference_resolved(transport, capability, path);
    }

    fn reject(&self, reference: &str, capability: Capability) -> ResolveError {
        self.event_handler.reference_rejected(reference, capability);
        ResolveError::UnrecognizedReference(reference.to_owned())
    }
}

impl From<BackendError> for ResolveError {
    fn from(error: BackendError) -> Self {
        ResolveError::Backend(error)
    }
}
