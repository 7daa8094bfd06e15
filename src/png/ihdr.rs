use super::*;

/// The types of color that PNG supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Greyscale
  Y = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette.
  ///
  /// The palette will have RGB8 data.
  Index = 3,
  /// Greyscale + Alpha
  YA = 4,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// The number of channels in this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Y => 1,
      Self::RGB => 3,
      Self::Index => 1,
      Self::YA => 2,
      Self::RGBA => 4,
    }
  }

  /// The bit depths allowed for this color type.
  #[inline]
  #[must_use]
  pub const fn allowed_bit_depths(self) -> &'static [u8] {
    match self {
      Self::Y => &[1, 2, 4, 8, 16],
      Self::RGB | Self::YA | Self::RGBA => &[8, 16],
      Self::Index => &[1, 2, 4, 8],
    }
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => PngColorType::Y,
      2 => PngColorType::RGB,
      3 => PngColorType::Index,
      4 => PngColorType::YA,
      6 => PngColorType::RGBA,
      _ => return Err(PngError::InvalidHeaderChunk(HeaderProblem::UnknownColorType(value))),
    })
  }
}

/// Image Header
///
/// The fields are checked for legality when parsed, except for the
/// `interlace_method`, which is only rejected when the image data is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IHDR {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bits per channel (or per index, for indexed color)
  pub bit_depth: u8,
  /// pixel color type
  pub color_type: PngColorType,
  /// always 0 (zlib)
  pub compression_method: u8,
  /// always 0 (adaptive, five filter types)
  pub filter_method: u8,
  /// 0 for none, 1 for Adam7
  pub interlace_method: u8,
}
impl IHDR {
  #[inline]
  #[must_use]
  pub const fn is_greyscale(&self) -> bool {
    matches!(self.color_type, PngColorType::Y)
  }
  #[inline]
  #[must_use]
  pub const fn is_rgb(&self) -> bool {
    matches!(self.color_type, PngColorType::RGB)
  }
  #[inline]
  #[must_use]
  pub const fn is_palette_indexed(&self) -> bool {
    matches!(self.color_type, PngColorType::Index)
  }
  #[inline]
  #[must_use]
  pub const fn is_greyscale_with_alpha(&self) -> bool {
    matches!(self.color_type, PngColorType::YA)
  }
  #[inline]
  #[must_use]
  pub const fn is_rgb_with_alpha(&self) -> bool {
    matches!(self.color_type, PngColorType::RGBA)
  }

  /// Bits used by one pixel of the data stream.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> usize {
    (self.bit_depth as usize) * self.color_type.channel_count()
  }

  /// The byte distance between a byte and the byte it's filtered against.
  ///
  /// This is the number of whole bytes per pixel, minimum 1.
  #[inline]
  #[must_use]
  pub const fn filter_bpp(&self) -> usize {
    let bytes = self.bits_per_pixel() / 8;
    if bytes == 0 {
      1
    } else {
      bytes
    }
  }

  /// Bytes of pixel data per scanline of the given width, not counting the
  /// filter type byte.
  ///
  /// Partial bytes at the end of a line are rounded up.
  #[inline]
  #[must_use]
  pub const fn bytes_per_scanline(&self, width: u32) -> usize {
    let bits = self.bits_per_pixel().saturating_mul(width as usize);
    (bits / 8) + (bits % 8 != 0) as usize
  }

  /// The bit depth that decoded channel values are expressed in.
  ///
  /// This is the image's bit depth, except for indexed color where palette
  /// entries are always 8-bit.
  #[inline]
  #[must_use]
  pub const fn channel_depth(&self) -> u8 {
    if self.is_palette_indexed() {
      8
    } else {
      self.bit_depth
    }
  }

  /// Gets the number of bytes that zlib decompression should produce.
  ///
  /// Every line of every reduced image is a filter byte plus the line's pixel
  /// data. Interlaced images add up all 7 reduced images.
  #[must_use]
  pub fn get_zlib_decompression_requirement(&self) -> usize {
    let temp_bytes_for_image = |width: u32, height: u32| -> usize {
      if width == 0 {
        return 0;
      }
      self.bytes_per_scanline(width).saturating_add(1).saturating_mul(height as usize)
    };
    if self.interlace_method == 1 {
      reduced_image_dimensions(self.width, self.height)[1..]
        .iter()
        .fold(0_usize, |total, &(w, h)| total.saturating_add(temp_bytes_for_image(w, h)))
    } else {
      temp_bytes_for_image(self.width, self.height)
    }
  }
}
impl TryFrom<&[u8]> for IHDR {
  type Error = PngError;
  /// Parses the 13 data bytes of an `IHDR` chunk.
  fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
    use HeaderProblem::*;
    let bad = |p| Err(PngError::InvalidHeaderChunk(p));
    match value {
      [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression_method, filter_method, interlace_method] =>
      {
        let width = u32::from_be_bytes([*w0, *w1, *w2, *w3]);
        let height = u32::from_be_bytes([*h0, *h1, *h2, *h3]);
        if width == 0 || height == 0 {
          return bad(ZeroDimension);
        }
        let color = PngColorType::try_from(*color_type)?;
        if !color.allowed_bit_depths().contains(bit_depth) {
          return bad(IllegalBitDepth { color_type: *color_type, bit_depth: *bit_depth });
        }
        if *compression_method != 0 {
          return bad(UnknownCompressionMethod(*compression_method));
        }
        if *filter_method != 0 {
          return bad(UnknownFilterMethod(*filter_method));
        }
        Ok(Self {
          width,
          height,
          bit_depth: *bit_depth,
          color_type: color,
          compression_method: *compression_method,
          filter_method: *filter_method,
          interlace_method: *interlace_method,
        })
      }
      _ => bad(WrongLength(value.len())),
    }
  }
}
impl core::fmt::Display for IHDR {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    writeln!(f, "Width: {}", self.width)?;
    writeln!(f, "Height: {}", self.height)?;
    writeln!(f, "Bit depth: {}", self.bit_depth)?;
    writeln!(f, "Color type: {:?} ({})", self.color_type, self.color_type as u8)?;
    writeln!(f, "Compression method: {}", self.compression_method)?;
    writeln!(f, "Filter method: {}", self.filter_method)?;
    writeln!(f, "Interlace method: {}", self.interlace_method)
  }
}

#[cfg(test)]
fn ihdr_bytes(width: u32, height: u32, depth: u8, color: u8, interlace: u8) -> Vec<u8> {
  let mut v = Vec::new();
  v.extend_from_slice(&width.to_be_bytes());
  v.extend_from_slice(&height.to_be_bytes());
  v.extend_from_slice(&[depth, color, 0, 0, interlace]);
  v
}

#[test]
fn test_ihdr_legality_table() {
  let table: [(u8, &[u8]); 5] =
    [(0, &[1, 2, 4, 8, 16]), (2, &[8, 16]), (3, &[1, 2, 4, 8]), (4, &[8, 16]), (6, &[8, 16])];
  for (color, allowed) in table {
    for depth in 0..=32_u8 {
      let r = IHDR::try_from(ihdr_bytes(3, 5, depth, color, 0).as_slice());
      if allowed.contains(&depth) {
        let ihdr = r.unwrap();
        assert_eq!((ihdr.width, ihdr.height, ihdr.bit_depth), (3, 5, depth));
        assert_eq!(ihdr.color_type as u8, color);
      } else {
        assert_eq!(
          r,
          Err(PngError::InvalidHeaderChunk(HeaderProblem::IllegalBitDepth {
            color_type: color,
            bit_depth: depth
          })),
          "color {color} depth {depth}"
        );
      }
    }
  }
  for color in [1, 5, 7, 255] {
    assert_eq!(
      IHDR::try_from(ihdr_bytes(1, 1, 8, color, 0).as_slice()),
      Err(PngError::InvalidHeaderChunk(HeaderProblem::UnknownColorType(color)))
    );
  }
}

#[test]
fn test_ihdr_other_fields() {
  // interlace methods are deferred to decode time
  assert_eq!(IHDR::try_from(ihdr_bytes(1, 1, 8, 0, 7).as_slice()).unwrap().interlace_method, 7);
  assert_eq!(
    IHDR::try_from(&ihdr_bytes(1, 1, 8, 0, 0)[..12]),
    Err(PngError::InvalidHeaderChunk(HeaderProblem::WrongLength(12)))
  );
  assert_eq!(
    IHDR::try_from(ihdr_bytes(0, 1, 8, 0, 0).as_slice()),
    Err(PngError::InvalidHeaderChunk(HeaderProblem::ZeroDimension))
  );
  let mut v = ihdr_bytes(1, 1, 8, 0, 0);
  v[10] = 1;
  assert_eq!(
    IHDR::try_from(v.as_slice()),
    Err(PngError::InvalidHeaderChunk(HeaderProblem::UnknownCompressionMethod(1)))
  );
  let mut v = ihdr_bytes(1, 1, 8, 0, 0);
  v[11] = 2;
  assert_eq!(
    IHDR::try_from(v.as_slice()),
    Err(PngError::InvalidHeaderChunk(HeaderProblem::UnknownFilterMethod(2)))
  );
}

#[test]
fn test_ihdr_sizes() {
  let rgb16 = IHDR::try_from(ihdr_bytes(3, 2, 16, 2, 0).as_slice()).unwrap();
  assert_eq!(rgb16.bits_per_pixel(), 48);
  assert_eq!(rgb16.filter_bpp(), 6);
  assert_eq!(rgb16.bytes_per_scanline(3), 18);
  assert_eq!(rgb16.get_zlib_decompression_requirement(), 2 * 19);
  assert_eq!(rgb16.channel_depth(), 16);

  let i2 = IHDR::try_from(ihdr_bytes(5, 1, 2, 3, 0).as_slice()).unwrap();
  assert_eq!(i2.filter_bpp(), 1);
  assert_eq!(i2.bytes_per_scanline(5), 2);
  assert_eq!(i2.channel_depth(), 8);

  // 8x8 interlaced, 8-bit grey: reduced images are
  // 1x1, 1x1, 2x1, 2x2, 4x2, 4x4, 8x4
  let y8 = IHDR::try_from(ihdr_bytes(8, 8, 8, 0, 1).as_slice()).unwrap();
  assert_eq!(y8.get_zlib_decompression_requirement(), 2 + 2 + 3 + 2 * 3 + 2 * 5 + 4 * 5 + 4 * 9);
}
