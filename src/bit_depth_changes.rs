//! Changing the bit depth of decoded channel values.
//!
//! Only integer operations are used. To *increase* depth the current bit
//! pattern becomes the top bits and is copied down until all the new bits are
//! filled. To *reduce* depth only the top bits are kept.

use bitfrob::u8_replicate_bits;

use crate::{image::Bitmap, pixel_formats::RGBA8, RGBA16};

/// Makes a channel value of `depth` bits into an 8-bit value.
///
/// `depth` must be 1, 2, 4, 8, or 16 (the depths PNG allows), otherwise you
/// get [`None`].
#[inline]
#[must_use]
pub fn channel_to_depth_8(depth: u8, value: u16) -> Option<u8> {
  Some(match depth {
    1 | 2 | 4 => u8_replicate_bits(u32::from(depth), value as u8),
    8 => value as u8,
    16 => (value >> 8) as u8,
    _ => return None,
  })
}

/// Makes a whole pixel of `depth` bits per channel into [`RGBA8`].
#[inline]
#[must_use]
pub fn rgba16_to_rgba8(depth: u8, px: RGBA16) -> Option<RGBA8> {
  Some(RGBA8 {
    r: channel_to_depth_8(depth, px.r)?,
    g: channel_to_depth_8(depth, px.g)?,
    b: channel_to_depth_8(depth, px.b)?,
    a: channel_to_depth_8(depth, px.a)?,
  })
}

impl Bitmap<RGBA16> {
  /// Converts a decoded raster into 8 bits per channel.
  ///
  /// Pass the depth the raster's values are expressed in, which is what
  /// [`IHDR::channel_depth`](crate::png::IHDR::channel_depth) reports for the
  /// source image.
  ///
  /// ## Failure
  /// * [`None`] if `channel_depth` isn't a PNG bit depth.
  #[must_use]
  pub fn to_rgba8(&self, channel_depth: u8) -> Option<Bitmap<RGBA8>> {
    let pixels = self
      .pixels
      .iter()
      .map(|px| rgba16_to_rgba8(channel_depth, *px))
      .collect::<Option<_>>()?;
    Some(Bitmap { width: self.width, height: self.height, pixels })
  }
}

#[test]
fn test_channel_to_depth_8() {
  assert_eq!(channel_to_depth_8(1, 0), Some(0));
  assert_eq!(channel_to_depth_8(1, 1), Some(0xFF));
  assert_eq!(channel_to_depth_8(2, 0b10), Some(0b10_10_10_10));
  assert_eq!(channel_to_depth_8(4, 0xA), Some(0xAA));
  assert_eq!(channel_to_depth_8(8, 0x7F), Some(0x7F));
  assert_eq!(channel_to_depth_8(16, 0xABCD), Some(0xAB));
  assert_eq!(channel_to_depth_8(3, 1), None);
}

#[test]
fn test_to_rgba8() {
  use alloc::vec;
  let bitmap = Bitmap { width: 2, height: 1, pixels: vec![RGBA16::grey(3, 3), RGBA16::grey(0, 3)] };
  let out = bitmap.to_rgba8(2).unwrap();
  assert_eq!(out.pixels, vec![RGBA8 { r: 255, g: 255, b: 255, a: 255 }, RGBA8 {
    r: 0,
    g: 0,
    b: 0,
    a: 255
  }]);
  assert!(bitmap.to_rgba8(5).is_none());
}
