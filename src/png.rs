//! Holds all the tools for decoding PNG data.
//!
//! ## Automated PNG Decoding
//! If you don't need full control over the decoding process there's functions
//! that take a PNG data stream and just give you the pixels:
//! * [`png_decode`] works on the full bytes of a PNG.
//! * [`png_decode_with_options`] lets you adjust the [`PngDecoderOptions`].
//! * [`png_decode_reader`] and [`png_decode_file`] (`std` only) read all the
//!   bytes for you first. Each has a `_with_options` version too.
//!
//! The output is a [`Bitmap<RGBA16>`](crate::Bitmap). Each channel keeps the
//! range of the image's [channel depth](IHDR::channel_depth), so a 2-bit
//! greyscale image has channel values of `0..=3`, and opaque alpha for that
//! image is also 3. Palette images always use 8-bit values.
//!
//! ## Decoding a PNG Yourself
//! The general format of a PNG is that the information is stored in "chunks".
//! There's four "critical" chunk types:
//! * **Header** - The image's dimensions, pixel format, and if the image is
//!   interlaced or not. It must be the very first chunk.
//! * **Palette** - If an image uses indexed color it will have a palette of
//!   what index values map to what `RGB8` values.
//! * **Image Data** - One or more chunks of compressed data. All of the
//!   compressed data forms a single zlib data stream.
//! * **End** - The last chunk, lets you know you had the full PNG and your data
//!   wasn't truncated accidentally.
//!
//! Other chunks are "ancillary", this crate keeps them in order but doesn't
//! interpret them.
//!
//! The steps are:
//! 1) Iterate the chunks with a [`RawChunkIter`].
//! 2) Parse the first chunk as an [`IHDR`].
//! 3) If the image is indexed, get the [`PLTE`].
//! 4) Concatenate all the `IDAT` data and [inflate](zlib_inflate) it.
//! 5) [Unfilter](unfilter_reduced_image) each reduced image. There's one
//!    reduced image for a normal PNG, and seven for an interlaced one.
//! 6) Read pixels out of each scanline with a [`PixelReader`], and place them
//!    with [`interlaced_pos_to_full_pos`].

use alloc::{string::String, vec::Vec};
use core::fmt::{Debug, Write};

#[allow(unused_imports)]
use log::{debug, trace, warn};

use crate::{
  try_split_off_byte_array, try_split_off_slice, u16_be, AsciiArray, Bitmap, HeaderProblem,
  IoFailure, PaletteProblem, PngError, RGB8, RGBA16,
};

mod crc32;
pub use crc32::*;

mod chunk;
pub use chunk::*;

mod ihdr;
pub use ihdr::*;

mod plte;
pub use plte::*;

mod unfilter;
pub use unfilter::*;

mod adam7;
pub use adam7::*;

mod pixels;
pub use pixels::*;

mod zlib;
pub use zlib::*;

mod options;
pub use options::*;

mod decoder;
pub use decoder::*;

#[cfg(test)]
mod tests;
