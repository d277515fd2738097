//! Format transcoding between hops: raster decode/encode and PNG data URIs.

/// Base64 data URI encoding of hop payloads.
pub mod data_uri;
/// Raster decode/encode and premultiplied pixel buffers.
pub mod raster;
