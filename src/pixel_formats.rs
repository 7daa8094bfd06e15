//! Module for pixel formats.
//!
//! The decoder produces [`RGBA16`] pixels: four channels that are each wide
//! enough for any PNG sample. The values are *not* rescaled, they keep the
//! range of the source bit depth:
//!
//! * A greyscale or RGB image of bit depth `d` gets channel values in
//!   `0..(1 << d)`, and a synthesized alpha of `(1 << d) - 1`.
//! * Alpha-bearing images read the alpha from the data, at the same depth.
//! * Indexed images look up 8-bit [`RGB8`] palette entries, and always have an
//!   alpha of 255, whatever the index bit depth is.
//!
//! See [`bit_depth_changes`](crate::bit_depth_changes) to bring a pixel down
//! (or up) to plain [`RGBA8`].

use bytemuck::{Pod, Zeroable};

/// An RGB value, 8-bits per channel.
///
/// This is the format of a palette entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Zeroable, Pod)]
#[repr(C)]
pub struct RGB8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

/// An 8-bits per channel RGBA pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Zeroable, Pod)]
#[repr(C)]
pub struct RGBA8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}

/// An RGBA pixel with up to 16 bits of value per channel.
///
/// Values are host-endian integers, already converted from the big-endian
/// bytes of the PNG data stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Zeroable, Pod)]
#[repr(C)]
pub struct RGBA16 {
  pub r: u16,
  pub g: u16,
  pub b: u16,
  pub a: u16,
}
impl RGBA16 {
  /// A grey pixel, with the same value in all three color channels.
  #[inline]
  #[must_use]
  pub const fn grey(y: u16, a: u16) -> Self {
    Self { r: y, g: y, b: y, a }
  }
}
impl From<RGB8> for RGBA16 {
  /// Palette colors are always fully opaque at 8 bits.
  #[inline]
  fn from(RGB8 { r, g, b }: RGB8) -> Self {
    Self { r: r.into(), g: g.into(), b: b.into(), a: 255 }
  }
}
