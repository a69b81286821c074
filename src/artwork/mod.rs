/// Artwork image module
///
/// This module handles:
/// - Encoding bitmaps to bytes for the store and decoding them back (codec.rs)
/// - Loading image files picked by the user (codec.rs)
/// - Drawing the built-in sample artworks (samples.rs)

pub mod codec;
pub mod samples;
