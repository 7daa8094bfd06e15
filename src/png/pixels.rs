use super::*;

/// Extracts the `pos`-th `bit_depth` wide block from a byte, most significant
/// block first.
///
/// With a `bit_depth` of 2 the byte `0b11_10_01_00` has blocks `3, 2, 1, 0`.
///
/// ## Panics
/// * If `bit_depth` is 0.
/// * In debug builds, if `bit_depth` is more than 8 or `pos` isn't less than
///   `8 / bit_depth`.
///
/// The [`PixelReader`] only calls this with depths of 1, 2, 4, and 8 and an
/// in-range `pos`.
#[inline]
#[must_use]
pub const fn get_value_from_byte(byte: u8, bit_depth: u8, pos: usize) -> u8 {
  let per_byte = 8 / bit_depth as usize;
  let shift = (bit_depth as usize) * (per_byte - 1 - pos);
  let mask = ((1_u16 << bit_depth) - 1) as u8;
  (byte >> shift) & mask
}

/// Reads pixels out of unfiltered scanlines, one variant per color type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelReader<'p> {
  Greyscale { bit_depth: u8 },
  GreyscaleAlpha { bit_depth: u8 },
  Rgb { bit_depth: u8 },
  RgbAlpha { bit_depth: u8 },
  PaletteIndexed { bit_depth: u8, palette: PLTE<'p> },
}
impl<'p> PixelReader<'p> {
  /// Picks the reader for the header's color type.
  ///
  /// ## Failure
  /// * [`PaletteProblem::Missing`] if the image is indexed and there's no
  ///   palette.
  /// * [`PngError::InvalidArguments`] if the bit depth doesn't suit the color
  ///   type.
  pub fn new(ihdr: &IHDR, palette: Option<PLTE<'p>>) -> Result<Self, PngError> {
    let bit_depth = ihdr.bit_depth;
    let reader = match ihdr.color_type {
      PngColorType::Y => Self::Greyscale { bit_depth },
      PngColorType::YA => Self::GreyscaleAlpha { bit_depth },
      PngColorType::RGB => Self::Rgb { bit_depth },
      PngColorType::RGBA => Self::RgbAlpha { bit_depth },
      PngColorType::Index => Self::PaletteIndexed {
        bit_depth,
        palette: palette.ok_or(PngError::InvalidPaletteChunk(PaletteProblem::Missing))?,
      },
    };
    if reader.bits_per_pixel().is_none() {
      return Err(PngError::InvalidArguments("bit depth not supported by the color type"));
    }
    Ok(reader)
  }

  /// Bits per pixel in the data stream, or `None` if the variant can't handle
  /// its bit depth.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> Option<usize> {
    match *self {
      Self::Greyscale { bit_depth: d @ (1 | 2 | 4 | 8 | 16) } => Some(d as usize),
      Self::GreyscaleAlpha { bit_depth: d @ (8 | 16) } => Some(2 * d as usize),
      Self::Rgb { bit_depth: d @ (8 | 16) } => Some(3 * d as usize),
      Self::RgbAlpha { bit_depth: d @ (8 | 16) } => Some(4 * d as usize),
      Self::PaletteIndexed { bit_depth: d @ (1 | 2 | 4 | 8), .. } => Some(d as usize),
      _ => None,
    }
  }

  /// Gets the pixel at `index` within an unfiltered scanline.
  ///
  /// Gives `Ok(None)` once `index` is past the end of the scanline's bytes.
  /// For sub-byte depths the padding bits at the end of the final byte still
  /// count as pixels, so callers should stop at the image width.
  ///
  /// ## Failure
  /// * [`PngError::InvalidArguments`] for a bit depth the variant can't handle.
  /// * [`PaletteProblem::IndexOutOfRange`] for an index past the end of the
  ///   palette.
  pub fn get_pixel_at(&self, scanline: &[u8], index: usize) -> Result<Option<RGBA16>, PngError> {
    let bits_per_pixel = self
      .bits_per_pixel()
      .ok_or(PngError::InvalidArguments("bit depth not supported by the color type"))?;
    if bits_per_pixel < 8 {
      let bit_depth = bits_per_pixel as u8;
      let Some(&byte) = scanline.get(index * bits_per_pixel / 8) else {
        return Ok(None);
      };
      let value = get_value_from_byte(byte, bit_depth, index % (8 / bits_per_pixel));
      return match self {
        Self::PaletteIndexed { palette, .. } => palette.get(value.into()).map(|c| Some(c.into())),
        _ => Ok(Some(RGBA16::grey(value.into(), (1 << bit_depth) - 1))),
      };
    }
    let bytes_per_pixel = bits_per_pixel / 8;
    let start = index.saturating_mul(bytes_per_pixel);
    let Some(bytes) = scanline.get(start..start.saturating_add(bytes_per_pixel)) else {
      return Ok(None);
    };
    let pixel = match *self {
      Self::PaletteIndexed { palette, .. } => palette.get(bytes[0].into())?.into(),
      Self::Greyscale { bit_depth } => {
        let [y] = channels::<1>(bytes, bit_depth);
        RGBA16::grey(y, full_alpha(bit_depth))
      }
      Self::GreyscaleAlpha { bit_depth } => {
        let [y, a] = channels::<2>(bytes, bit_depth);
        RGBA16::grey(y, a)
      }
      Self::Rgb { bit_depth } => {
        let [r, g, b] = channels::<3>(bytes, bit_depth);
        RGBA16 { r, g, b, a: full_alpha(bit_depth) }
      }
      Self::RgbAlpha { bit_depth } => {
        let [r, g, b, a] = channels::<4>(bytes, bit_depth);
        RGBA16 { r, g, b, a }
      }
    };
    Ok(Some(pixel))
  }
}

#[inline]
const fn full_alpha(bit_depth: u8) -> u16 {
  if bit_depth >= 16 {
    u16::MAX
  } else {
    (1 << bit_depth) - 1
  }
}

/// Splits one pixel's bytes into `N` channel values, 8 or 16 bits each.
#[inline]
fn channels<const N: usize>(bytes: &[u8], bit_depth: u8) -> [u16; N] {
  let mut out = [0_u16; N];
  if bit_depth == 16 {
    out.iter_mut().zip(bytes.chunks_exact(2)).for_each(|(o, b)| *o = u16_be(b[0], b[1]));
  } else {
    out.iter_mut().zip(bytes.iter()).for_each(|(o, b)| *o = u16::from(*b));
  }
  out
}

#[test]
#[should_panic]
fn test_get_value_from_byte_zero_depth_panics() {
  let _ = get_value_from_byte(0xFF, 0, 0);
}

#[test]
fn test_get_value_from_byte() {
  let byte = 0b1110_0100;
  assert_eq!([0, 1, 2, 3].map(|p| get_value_from_byte(byte, 2, p)), [3, 2, 1, 0]);
  assert_eq!([0, 1].map(|p| get_value_from_byte(byte, 4, p)), [0xE, 0x4]);
  assert_eq!(
    [0, 1, 2, 3, 4, 5, 6, 7].map(|p| get_value_from_byte(byte, 1, p)),
    [1, 1, 1, 0, 0, 1, 0, 0]
  );
  assert_eq!(get_value_from_byte(byte, 8, 0), byte);
}

#[test]
fn test_greyscale_depths() {
  let r = PixelReader::Greyscale { bit_depth: 1 };
  let line = [0b1010_0000];
  assert_eq!(r.get_pixel_at(&line, 0), Ok(Some(RGBA16::grey(1, 1))));
  assert_eq!(r.get_pixel_at(&line, 1), Ok(Some(RGBA16::grey(0, 1))));
  assert_eq!(r.get_pixel_at(&line, 7), Ok(Some(RGBA16::grey(0, 1))));
  assert_eq!(r.get_pixel_at(&line, 8), Ok(None));

  let r = PixelReader::Greyscale { bit_depth: 4 };
  assert_eq!(r.get_pixel_at(&[0x3C], 1), Ok(Some(RGBA16::grey(0xC, 15))));

  let r = PixelReader::Greyscale { bit_depth: 16 };
  let line = [0x12, 0x34, 0xAB, 0xCD];
  assert_eq!(r.get_pixel_at(&line, 1), Ok(Some(RGBA16::grey(0xABCD, 0xFFFF))));
  assert_eq!(r.get_pixel_at(&line, 2), Ok(None));
  assert_eq!(r.get_pixel_at(&line[..3], 1), Ok(None));

  assert!(matches!(
    PixelReader::Greyscale { bit_depth: 3 }.get_pixel_at(&line, 0),
    Err(PngError::InvalidArguments(_))
  ));
}

#[test]
fn test_color_models() {
  let r = PixelReader::GreyscaleAlpha { bit_depth: 8 };
  assert_eq!(r.get_pixel_at(&[9, 200, 10, 20], 1), Ok(Some(RGBA16::grey(10, 20))));

  let r = PixelReader::Rgb { bit_depth: 8 };
  assert_eq!(r.get_pixel_at(&[1, 2, 3], 0), Ok(Some(RGBA16 { r: 1, g: 2, b: 3, a: 255 })));

  let r = PixelReader::RgbAlpha { bit_depth: 16 };
  let line = [0, 1, 0, 2, 0, 3, 0x80, 0];
  assert_eq!(r.get_pixel_at(&line, 0), Ok(Some(RGBA16 { r: 1, g: 2, b: 3, a: 0x8000 })));

  assert!(PixelReader::Rgb { bit_depth: 4 }.get_pixel_at(&line, 0).is_err());
  assert!(PixelReader::GreyscaleAlpha { bit_depth: 2 }.get_pixel_at(&line, 0).is_err());
}

#[test]
fn test_palette_indexed() {
  let data = [10, 20, 30, 40, 50, 60, 70, 80, 90];
  let palette = PLTE::try_from(&data[..]).unwrap();
  let r = PixelReader::PaletteIndexed { bit_depth: 4, palette };
  let line = [0x21, 0x50];
  assert_eq!(r.get_pixel_at(&line, 0), Ok(Some(RGBA16 { r: 70, g: 80, b: 90, a: 255 })));
  assert_eq!(r.get_pixel_at(&line, 1), Ok(Some(RGBA16 { r: 40, g: 50, b: 60, a: 255 })));
  assert_eq!(
    r.get_pixel_at(&line, 2),
    Err(PngError::InvalidPaletteChunk(PaletteProblem::IndexOutOfRange { index: 5, len: 3 }))
  );
  assert_eq!(r.get_pixel_at(&line, 4), Ok(None));

  let r = PixelReader::PaletteIndexed { bit_depth: 8, palette };
  assert_eq!(r.get_pixel_at(&[0], 0), Ok(Some(RGBA16 { r: 10, g: 20, b: 30, a: 255 })));
  assert!(PixelReader::PaletteIndexed { bit_depth: 16, palette }.get_pixel_at(&[0, 0], 0).is_err());
}
