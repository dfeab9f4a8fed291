use crate::{Capability, Digest, MediaType, Transport};

/// Handler to receive notifications from the resolver and from
/// [`copy_image`](crate::copy_image).
///
/// All methods are optional.
#[expect(unused_variables)]
pub trait EventHandler: Sync + 'static {
    /// A reference was matched to a transport, and its backend built
    /// a handle for `path`.
    fn reference_resolved(&self, transport: Transport, capability: Capability, path: &str) {}

    /// A reference does not have a known prefix, or its transport
    /// can't provide the requested capability.
    fn reference_rejected(&self, reference: &str, capability: Capability) {}

    /// The manifest was received from the source.
    fn manifest_fetched(&self, media_type: MediaType, bytes: usize) {}

    /// A blob was written to the destination.
    fn blob_copied(&self, digest: &Digest, bytes: u64) {}

    /// The manifest was written to the destination.
    fn copy_finished(&self) {}
}

/// [`EventHandler`] instance to ignore all events.
pub struct NoEventHandler;

impl EventHandler for NoEventHandler {}
