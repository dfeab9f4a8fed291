pub mod backends;
pub mod blobs;
