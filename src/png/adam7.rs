//! Geometry of the Adam7 interlacing.
//!
//! ```txt
//! 1 6 4 6 2 6 4 6
//! 7 7 7 7 7 7 7 7
//! 5 6 5 6 5 6 5 6
//! 7 7 7 7 7 7 7 7
//! 3 6 4 6 3 6 4 6
//! 7 7 7 7 7 7 7 7
//! 5 6 5 6 5 6 5 6
//! 7 7 7 7 7 7 7 7
//! ```
//!
//! The 8x8 pattern repeats over the whole image. Each numbered position
//! belongs to that pass's reduced image.

use super::*;

/// Where each pass's pixels sit in the 8x8 pattern, as
/// `(x_offset, x_step, y_offset, y_step)`.
const ADAM7_PASSES: [(u32, u32, u32, u32); 7] = [
  (0, 8, 0, 8),
  (4, 8, 0, 8),
  (0, 4, 4, 8),
  (2, 4, 0, 4),
  (0, 2, 2, 4),
  (1, 2, 0, 2),
  (0, 1, 1, 2),
];

/// How many of `0..full` are at `offset + k * step`, that is
/// `ceil((full - offset) / step)`, or 0 when `full <= offset`.
#[inline]
const fn pass_span(full: u32, offset: u32, step: u32) -> u32 {
  if full <= offset {
    0
  } else {
    (full - offset - 1) / step + 1
  }
}

/// Gets the dimensions of the full image and each reduced image.
///
/// Index 0 is the full image, and indexes 1 through 7 are passes 1 through 7.
/// A pass can be 0 wide or 0 high when the image is small.
#[inline]
#[must_use]
pub const fn reduced_image_dimensions(full_width: u32, full_height: u32) -> [(u32, u32); 8] {
  let mut out = [(full_width, full_height); 8];
  let mut pass = 0;
  while pass < ADAM7_PASSES.len() {
    let (x_offset, x_step, y_offset, y_step) = ADAM7_PASSES[pass];
    out[pass + 1] =
      (pass_span(full_width, x_offset, x_step), pass_span(full_height, y_offset, y_step));
    pass += 1;
  }
  out
}

/// The dimensions of a single pass's reduced image.
///
/// ## Failure
/// * [`PngError::InvalidArguments`] if `pass` isn't 1 through 7.
#[inline]
pub fn pass_dimensions(pass: usize, full_width: u32, full_height: u32) -> Result<(u32, u32), PngError> {
  match pass {
    1..=7 => Ok(reduced_image_dimensions(full_width, full_height)[pass]),
    _ => Err(PngError::InvalidArguments("interlace pass must be 1 through 7")),
  }
}

/// Converts a reduced image location into the full image location.
///
/// Level 0 is the full image, so the position comes back unchanged.
///
/// ## Failure
/// * [`PngError::InvalidArguments`] if the image level given exceeds 7.
#[inline]
pub const fn interlaced_pos_to_full_pos(
  image_level: usize, reduced_x: u32, reduced_y: u32,
) -> Result<(u32, u32), PngError> {
  match image_level {
    0 => Ok((reduced_x, reduced_y)),
    1..=7 => {
      let (x_offset, x_step, y_offset, y_step) = ADAM7_PASSES[image_level - 1];
      Ok((reduced_x * x_step + x_offset, reduced_y * y_step + y_offset))
    }
    _ => Err(PngError::InvalidArguments("reduced image level must be 0 through 7")),
  }
}

#[test]
fn test_pass_dimensions_formulas() {
  // ceil((n - offset) / step), written out the long way
  let ceil_from = |n: u32, offset: u32, step: u32| (n.saturating_sub(offset) + step - 1) / step;
  for w in 0..40 {
    for h in 0..40 {
      let expected = [
        (ceil_from(w, 0, 8), ceil_from(h, 0, 8)),
        (ceil_from(w, 4, 8), ceil_from(h, 0, 8)),
        (ceil_from(w, 0, 4), ceil_from(h, 4, 8)),
        (ceil_from(w, 2, 4), ceil_from(h, 0, 4)),
        (ceil_from(w, 0, 2), ceil_from(h, 2, 4)),
        (ceil_from(w, 1, 2), ceil_from(h, 0, 2)),
        (w, ceil_from(h, 1, 2)),
      ];
      for (i, ex) in expected.into_iter().enumerate() {
        assert_eq!(pass_dimensions(i + 1, w, h), Ok(ex), "pass {} of {w}x{h}", i + 1);
      }
    }
  }
  assert_eq!(
    reduced_image_dimensions(8, 8),
    [(8, 8), (1, 1), (1, 1), (2, 1), (2, 2), (4, 2), (4, 4), (8, 4)]
  );
  assert_eq!(reduced_image_dimensions(0, 0), [(0, 0); 8]);
  assert_eq!(reduced_image_dimensions(u32::MAX, 1)[7], (u32::MAX, 0));
  assert!(pass_dimensions(0, 8, 8).is_err());
  assert!(pass_dimensions(8, 8, 8).is_err());
}

#[test]
fn test_adam7_passes_partition_the_image() {
  for (w, h) in [(1, 1), (1, 9), (9, 1), (5, 3), (8, 8), (13, 17), (32, 7)] {
    let mut hits = alloc::vec![0_u8; (w * h) as usize];
    for pass in 1..=7 {
      let (pw, ph) = pass_dimensions(pass, w, h).unwrap();
      for ry in 0..ph {
        for rx in 0..pw {
          let (x, y) = interlaced_pos_to_full_pos(pass, rx, ry).unwrap();
          assert!(x < w && y < h, "pass {pass} ({rx},{ry}) -> ({x},{y}) outside {w}x{h}");
          hits[(y * w + x) as usize] += 1;
        }
      }
    }
    assert!(hits.iter().all(|&n| n == 1), "{w}x{h}: {hits:?}");
  }
  assert!(interlaced_pos_to_full_pos(8, 0, 0).is_err());
  assert_eq!(interlaced_pos_to_full_pos(0, 3, 4), Ok((3, 4)));
}
