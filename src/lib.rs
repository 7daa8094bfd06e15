#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![forbid(unsafe_code)]

//! A crate for decoding PNG data into a raster of pixels.
//!
//! The quickest path is [`png_decode`](crate::png::png_decode), which takes
//! the full PNG bytes and gives back a [`Bitmap`] of [`RGBA16`] pixels. Each
//! channel keeps the value range of the source (a 4-bit greyscale image has
//! channel values `0..=15`), use [`Bitmap::to_rgba8`] if you want plain 8-bit
//! color.
//!
//! With the `std` feature (on by default) you can also decode from any
//! [`Read`](std::io::Read) source or straight from a file path.

extern crate alloc;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

mod error;
pub use error::*;

pub mod pixel_formats;
pub use pixel_formats::*;

pub mod ascii_array;
pub use ascii_array::*;

pub mod bit_depth_changes;
pub use bit_depth_changes::*;

pub mod image;
pub use image::*;

mod parser_helpers;
pub(crate) use parser_helpers::*;

pub mod png;
