//! Provides the heap-allocated raster the decoder writes into.

use alloc::vec::Vec;

use crate::PngError;

/// Converts an `(x,y)` position within a given `width` 2D space into a linear
/// index.
///
/// This is how [`Bitmap`] turns 2d coordinates into an index within its
/// `pixels` vector.
#[inline]
#[must_use]
pub const fn xy_width_to_index(x: u32, y: u32, width: u32) -> usize {
  (y as usize) * (width as usize) + (x as usize)
}

/// A direct-color image.
///
/// Pixels are stored row-major, with the origin at the top left.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub struct Bitmap<P> {
  pub width: u32,
  pub height: u32,
  pub pixels: Vec<P>,
}
impl<P: Clone + Default> Bitmap<P> {
  /// Makes a `height` by `width` bitmap filled with the default pixel.
  ///
  /// ## Failure
  /// * [`PngError::Alloc`] if the pixel storage can't be allocated.
  pub fn try_new(height: u32, width: u32) -> Result<Self, PngError> {
    let pixel_count =
      (width as usize).checked_mul(height as usize).ok_or(PngError::DimensionsTooLarge)?;
    let mut pixels: Vec<P> = Vec::new();
    pixels.try_reserve_exact(pixel_count)?;
    pixels.resize(pixel_count, P::default());
    Ok(Self { width, height, pixels })
  }
}
impl<P> Bitmap<P> {
  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get(&self, x: u32, y: u32) -> Option<&P> {
    if x < self.width && y < self.height {
      self.pixels.get(xy_width_to_index(x, y, self.width))
    } else {
      None
    }
  }

  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut P> {
    if x < self.width && y < self.height {
      self.pixels.get_mut(xy_width_to_index(x, y, self.width))
    } else {
      None
    }
  }

  /// Writes the pixel at `(row, col)`.
  ///
  /// Returns `false` (and writes nothing) when the position is out of bounds.
  #[inline]
  pub fn set(&mut self, row: u32, col: u32, pixel: P) -> bool {
    match self.get_mut(col, row) {
      Some(p) => {
        *p = pixel;
        true
      }
      None => false,
    }
  }

  /// Iterates the rows of the image, top to bottom.
  #[inline]
  pub fn rows(&self) -> impl Iterator<Item = &[P]> + '_ {
    self.pixels.chunks_exact(self.width.max(1) as usize).take(self.height as usize)
  }

  /// Flips the image top to bottom.
  #[inline]
  pub fn vertical_flip(&mut self) {
    let mut data: &mut [P] = self.pixels.as_mut_slice();
    let mut temp_height = self.height;
    while temp_height > 1 {
      let (low, mid) = data.split_at_mut(self.width as usize);
      let (mid, high) = mid.split_at_mut(mid.len() - self.width as usize);
      low.swap_with_slice(high);
      data = mid;
      temp_height -= 2;
    }
  }
}

#[test]
fn test_bitmap_set_get_flip() {
  let mut b: Bitmap<u8> = Bitmap::try_new(3, 2).unwrap();
  assert_eq!(b.pixels.len(), 6);
  assert!(b.set(0, 1, 5));
  assert!(b.set(2, 0, 7));
  assert!(!b.set(3, 0, 9));
  assert!(!b.set(0, 2, 9));
  assert_eq!(b.get(1, 0), Some(&5));
  assert_eq!(b.get(0, 2), Some(&7));
  b.vertical_flip();
  assert_eq!(b.get(1, 2), Some(&5));
  assert_eq!(b.get(0, 0), Some(&7));
  assert_eq!(b.rows().count(), 3);
}
