use super::*;

/// The per-scanline filter types of PNG filter method 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FilterType {
  None = 0,
  Sub = 1,
  Up = 2,
  Average = 3,
  Paeth = 4,
}
impl TryFrom<u8> for FilterType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::None,
      1 => Self::Sub,
      2 => Self::Up,
      3 => Self::Average,
      4 => Self::Paeth,
      _ => return Err(PngError::InvalidArguments("unknown scanline filter type")),
    })
  }
}

/// The Paeth predictor.
///
/// Picks whichever neighbor is closest to `left + above - upper_left`. Ties
/// prefer `left`, then `above`.
#[inline]
#[must_use]
pub const fn paeth_predict(left: u8, above: u8, upper_left: u8) -> u8 {
  let (a, b, c) = (left as i16, above as i16, upper_left as i16);
  // distances from the estimate `a + b - c`
  let from_left = (b - c).abs();
  let from_above = (a - c).abs();
  let from_upper_left = (a + b - 2 * c).abs();
  if from_left <= from_above && from_left <= from_upper_left {
    left
  } else if from_above <= from_upper_left {
    above
  } else {
    upper_left
  }
}

/// Reverses the filter of one scanline, in place.
///
/// * `bpp` is the [filter byte distance](IHDR::filter_bpp).
/// * `prev` is the previous scanline *after* it was unfiltered, or `None` for
///   the first line of a reduced image. Missing bytes count as 0.
/// * `line` is the scanline's data, without the filter type byte.
pub fn unfilter_line(filter: FilterType, bpp: usize, prev: Option<&[u8]>, line: &mut [u8]) {
  let above = |i: usize| -> u8 { prev.and_then(|p| p.get(i)).copied().unwrap_or(0) };
  match filter {
    FilterType::None => (),
    FilterType::Sub => {
      for i in bpp..line.len() {
        line[i] = line[i].wrapping_add(line[i - bpp]);
      }
    }
    FilterType::Up => {
      if let Some(p) = prev {
        line.iter_mut().zip(p.iter()).for_each(|(x, b)| *x = x.wrapping_add(*b));
      }
    }
    FilterType::Average => {
      for i in 0..line.len() {
        let a = if i >= bpp { line[i - bpp] } else { 0 };
        let b = above(i);
        line[i] = line[i].wrapping_add(((u16::from(a) + u16::from(b)) / 2) as u8);
      }
    }
    FilterType::Paeth => {
      for i in 0..line.len() {
        let (a, c) = if i >= bpp { (line[i - bpp], above(i - bpp)) } else { (0, 0) };
        let b = above(i);
        line[i] = line[i].wrapping_add(paeth_predict(a, b, c));
      }
    }
  }
}

/// One unfiltered reduced image.
///
/// A non-interlaced PNG has just one of these, the full image. An interlaced
/// PNG has seven, some of which can be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReducedImage<'d> {
  pub width: u32,
  pub height: u32,
  /// Bytes per line, including the (now zeroed) filter byte.
  pub stride: usize,
  data: &'d [u8],
}
impl<'d> ReducedImage<'d> {
  /// The pixel bytes of line `y`, or `None` past the last line.
  #[inline]
  #[must_use]
  pub fn scanline(&self, y: u32) -> Option<&'d [u8]> {
    if y >= self.height {
      return None;
    }
    let start = (y as usize) * self.stride;
    self.data.get(start + 1..start + self.stride)
  }

  /// Iterates the pixel bytes of each line, top to bottom.
  #[inline]
  pub fn scanlines(&self) -> impl Iterator<Item = &'d [u8]> + 'd {
    let d: &'d [u8] = self.data;
    d.chunks_exact(self.stride.max(1)).map(|line| &line[1..])
  }
}

/// Unfilters one reduced image at the front of `data`, in place.
///
/// Returns the unfiltered image and the bytes after it, which is where the
/// next reduced image starts.
///
/// ## Failure
/// * [`CompressionError::InvalidData`](crate::CompressionError::InvalidData)
///   if `data` is too short for the image.
/// * [`PngError::InvalidArguments`] if a line has an unknown filter type.
pub fn unfilter_reduced_image<'d>(
  ihdr: &IHDR, width: u32, height: u32, data: &'d mut [u8],
) -> Result<(ReducedImage<'d>, &'d mut [u8]), PngError> {
  let stride = ihdr.bytes_per_scanline(width) + 1;
  if width == 0 || height == 0 {
    let (empty, rest) = data.split_at_mut(0);
    let image = ReducedImage { width, height: 0, stride, data: empty };
    return Ok((image, rest));
  }
  let total = stride.checked_mul(height as usize).ok_or(PngError::DimensionsTooLarge)?;
  if data.len() < total {
    debug!("reduced image {width}x{height} needs {total} bytes, have {}", data.len());
    return Err(PngError::Compression(crate::CompressionError::InvalidData));
  }
  let (these, rest) = data.split_at_mut(total);
  let bpp = ihdr.filter_bpp();
  let mut prev: Option<&[u8]> = None;
  for row in these.chunks_exact_mut(stride) {
    let (f, line) = row.split_at_mut(1);
    let filter = FilterType::try_from(f[0])?;
    unfilter_line(filter, bpp, prev, line);
    f[0] = FilterType::None as u8;
    let line: &[u8] = line;
    prev = Some(line);
  }
  let image = ReducedImage { width, height, stride, data: these };
  Ok((image, rest))
}

#[cfg(test)]
fn filter_line(filter: FilterType, bpp: usize, prev: &[u8], raw: &[u8]) -> Vec<u8> {
  let left = |i: usize| if i >= bpp { raw[i - bpp] } else { 0 };
  let upper_left = |i: usize| if i >= bpp { prev[i - bpp] } else { 0 };
  (0..raw.len())
    .map(|i| {
      let predicted = match filter {
        FilterType::None => 0,
        FilterType::Sub => left(i),
        FilterType::Up => prev[i],
        FilterType::Average => ((u16::from(left(i)) + u16::from(prev[i])) / 2) as u8,
        FilterType::Paeth => paeth_predict(left(i), prev[i], upper_left(i)),
      };
      raw[i].wrapping_sub(predicted)
    })
    .collect()
}

#[test]
fn test_paeth_tie_breaks() {
  // estimate 20, left and above are both 10 away
  assert_eq!(paeth_predict(10, 10, 0), 10);
  // estimate 0, which is left itself
  assert_eq!(paeth_predict(0, 10, 10), 0);
  // estimate 5, above and upper left are both 5 away and left is 10 away
  assert_eq!(paeth_predict(15, 0, 10), 0);
  // estimate 5, all three are 0 away
  assert_eq!(paeth_predict(5, 5, 5), 5);
  assert_eq!(paeth_predict(20, 30, 20), 30);
  assert_eq!(paeth_predict(200, 10, 100), 100);
}

#[test]
fn test_unfilter_inverts_filter() {
  let mut seed = 0x1234_5678_u32;
  let mut next_byte = move || {
    seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
    (seed >> 16) as u8
  };
  let filters =
    [FilterType::None, FilterType::Sub, FilterType::Up, FilterType::Average, FilterType::Paeth];
  for bpp in [1, 2, 3, 4, 6, 8] {
    for len in [bpp, bpp * 5, bpp * 5 + 1] {
      let prev: Vec<u8> = (0..len).map(|_| next_byte()).collect();
      let raw: Vec<u8> = (0..len).map(|_| next_byte()).collect();
      for filter in filters {
        let mut line = filter_line(filter, bpp, &prev, &raw);
        unfilter_line(filter, bpp, Some(prev.as_slice()), &mut line);
        assert_eq!(line, raw, "filter {filter:?} bpp {bpp} len {len}");
        // the first line of an image is filtered against zeroes
        let zeroes = alloc::vec![0_u8; len];
        let mut line = filter_line(filter, bpp, &zeroes, &raw);
        unfilter_line(filter, bpp, None, &mut line);
        assert_eq!(line, raw, "filter {filter:?} bpp {bpp} len {len} (first line)");
      }
    }
  }
}

#[test]
fn test_unfilter_reduced_image() {
  let ihdr = IHDR {
    width: 2,
    height: 2,
    bit_depth: 8,
    color_type: PngColorType::Y,
    compression_method: 0,
    filter_method: 0,
    interlace_method: 0,
  };
  // Sub line then Up line, plus one spare byte
  let mut data = [1, 5, 3, 2, 1, 1, 99];
  let (image, rest) = unfilter_reduced_image(&ihdr, 2, 2, &mut data).unwrap();
  assert_eq!(image.scanline(0), Some(&[5, 8][..]));
  assert_eq!(image.scanline(1), Some(&[6, 9][..]));
  assert_eq!(image.scanline(2), None);
  assert_eq!(image.scanlines().count(), 2);
  assert_eq!(&rest[..], &[99_u8][..]);

  let mut short = [0, 1, 2, 0, 1];
  assert_eq!(
    unfilter_reduced_image(&ihdr, 2, 2, &mut short).map(|(i, _)| i.height),
    Err(PngError::Compression(crate::CompressionError::InvalidData))
  );
  let mut bad_filter = [5, 1, 2];
  assert!(matches!(
    unfilter_reduced_image(&ihdr, 2, 1, &mut bad_filter),
    Err(PngError::InvalidArguments(_))
  ));
  let mut any = [7_u8; 3];
  let (empty, rest) = unfilter_reduced_image(&ihdr, 0, 2, &mut any).unwrap();
  assert_eq!(empty.scanlines().count(), 0);
  assert_eq!(rest.len(), 3);
}
