use super::*;

/// Builds the filter-type-0 image data for `pixels`, interlaced or not.
fn rgb8_image_data(width: u32, height: u32, pixels: &[[u8; 3]], interlaced: bool) -> Vec<u8> {
  let mut out = Vec::new();
  let levels = if interlaced { 1..=7 } else { 0..=0 };
  for level in levels {
    let (w, h) = reduced_image_dimensions(width, height)[level];
    if w == 0 {
      continue;
    }
    for y in 0..h {
      out.push(0);
      for x in 0..w {
        let (fx, fy) = interlaced_pos_to_full_pos(level, x, y).unwrap();
        out.extend_from_slice(&pixels[(fy * width + fx) as usize]);
      }
    }
  }
  out
}

#[test]
fn test_interlaced_matches_plain() {
  let (width, height) = (11, 6);
  let pixels: Vec<[u8; 3]> =
    (0..width * height).map(|i| [i as u8, (i * 7) as u8, 255 - i as u8]).collect();
  let ihdr = |interlace| IHDR {
    width,
    height,
    bit_depth: 8,
    color_type: PngColorType::RGB,
    compression_method: 0,
    filter_method: 0,
    interlace_method: interlace,
  };
  let reader = PixelReader::new(&ihdr(0), None).unwrap();

  let mut plain = rgb8_image_data(width, height, &pixels, false);
  assert_eq!(plain.len(), ihdr(0).get_zlib_decompression_requirement());
  let (image, rest) = unfilter_reduced_image(&ihdr(0), width, height, &mut plain).unwrap();
  assert!(rest.is_empty());

  let mut interlaced = rgb8_image_data(width, height, &pixels, true);
  assert_eq!(interlaced.len(), ihdr(1).get_zlib_decompression_requirement());
  let mut rest: &mut [u8] = &mut interlaced;
  let mut placed = 0;
  for level in 1..=7 {
    let (w, h) = pass_dimensions(level, width, height).unwrap();
    let (pass, more) = unfilter_reduced_image(&ihdr(1), w, h, core::mem::take(&mut rest)).unwrap();
    rest = more;
    for (y, line) in (0_u32..).zip(pass.scanlines()) {
      for x in 0..w {
        let (fx, fy) = interlaced_pos_to_full_pos(level, x, y).unwrap();
        let from_pass = reader.get_pixel_at(line, x as usize).unwrap();
        let from_plain = reader.get_pixel_at(image.scanline(fy).unwrap(), fx as usize).unwrap();
        assert_eq!(from_pass, from_plain, "pass {level} ({x},{y})");
        placed += 1;
      }
    }
  }
  assert!(rest.is_empty());
  assert_eq!(placed, width * height);
}
