use png_raster::{
  png::{
    interlaced_pos_to_full_pos, paeth_predict, png_crc32, png_decode, png_decode_file,
    png_decode_file_with_options, png_decode_reader, png_decode_reader_with_options,
    png_decode_with_options, png_get_header, reduced_image_dimensions,
    PngDecoderOptions, RawChunkIter, PNG_SIGNATURE,
  },
  Bitmap, IoFailure, PngError, RGBA16, RGBA8,
};

/// Assembles PNG files for the tests.
struct PngBuilder {
  bytes: Vec<u8>,
}
impl PngBuilder {
  fn new() -> Self {
    Self { bytes: PNG_SIGNATURE.to_vec() }
  }

  fn chunk(mut self, label: &[u8; 4], data: &[u8]) -> Self {
    self.bytes.extend_from_slice(&(data.len() as u32).to_be_bytes());
    self.bytes.extend_from_slice(label);
    self.bytes.extend_from_slice(data);
    let crc = png_crc32(label.iter().copied().chain(data.iter().copied()));
    self.bytes.extend_from_slice(&crc.to_be_bytes());
    self
  }

  fn ihdr(self, width: u32, height: u32, depth: u8, color: u8, interlace: u8) -> Self {
    let mut data = Vec::new();
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[depth, color, 0, 0, interlace]);
    self.chunk(b"IHDR", &data)
  }

  /// Compresses the filtered data and spreads it over several `IDAT` chunks.
  fn idat(mut self, filtered: &[u8], chunk_size: usize) -> Self {
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(filtered, 8);
    for part in compressed.chunks(chunk_size) {
      self = self.chunk(b"IDAT", part);
    }
    self
  }

  fn finish(self) -> Vec<u8> {
    self.chunk(b"IEND", &[]).bytes
  }
}

/// Applies a forward PNG filter to one line.
fn filter_line(filter: u8, bpp: usize, prev: Option<&[u8]>, raw: &[u8]) -> Vec<u8> {
  let above = |i: usize| prev.map_or(0, |p| p[i]);
  let left = |i: usize| if i >= bpp { raw[i - bpp] } else { 0 };
  let upper_left = |i: usize| if i >= bpp { above(i - bpp) } else { 0 };
  let mut out = vec![filter];
  out.extend((0..raw.len()).map(|i| {
    let predicted = match filter {
      0 => 0,
      1 => left(i),
      2 => above(i),
      3 => ((u16::from(left(i)) + u16::from(above(i))) / 2) as u8,
      4 => paeth_predict(left(i), above(i), upper_left(i)),
      _ => unreachable!(),
    };
    raw[i].wrapping_sub(predicted)
  }));
  out
}

/// Builds the filtered image data for a byte-aligned pixel format.
///
/// Line `n` of each reduced image uses filter type `n % 5`.
fn filtered_image_data(
  width: u32, height: u32, bytes_per_pixel: usize, interlaced: bool,
  pixel: impl Fn(u32, u32) -> Vec<u8>,
) -> Vec<u8> {
  let mut out = Vec::new();
  let levels = if interlaced { 1..=7 } else { 0..=0 };
  for level in levels {
    let (w, h) = reduced_image_dimensions(width, height)[level];
    if w == 0 || h == 0 {
      continue;
    }
    let mut prev: Option<Vec<u8>> = None;
    for y in 0..h {
      let mut raw = Vec::new();
      for x in 0..w {
        let (fx, fy) = interlaced_pos_to_full_pos(level, x, y).unwrap();
        raw.extend(pixel(fx, fy));
      }
      out.extend(filter_line((y % 5) as u8, bytes_per_pixel, prev.as_deref(), &raw));
      prev = Some(raw);
    }
  }
  out
}

/// Decodes with the `png` crate, expanding palettes and low bit depths.
fn reference_decode(bytes: &[u8]) -> (::png::OutputInfo, Vec<u8>) {
  let mut decoder = ::png::Decoder::new(bytes);
  decoder.set_transformations(::png::Transformations::EXPAND);
  let mut reader = decoder.read_info().unwrap();
  let mut buf = vec![0; reader.output_buffer_size()];
  let info = reader.next_frame(&mut buf).unwrap();
  buf.truncate(info.buffer_size());
  (info, buf)
}

fn assert_header_dimensions(bytes: &[u8], bitmap: &Bitmap<RGBA16>) {
  let header = png_get_header(bytes).unwrap();
  assert_eq!((bitmap.width, bitmap.height), (header.width, header.height));
  assert_eq!(bitmap.pixels.len(), (header.width * header.height) as usize);
}

fn rgb8_fixture() -> Vec<u8> {
  let (width, height) = (23_u32, 17_u32);
  let mut data = Vec::new();
  for y in 0..height {
    for x in 0..width {
      data.extend_from_slice(&[(x * 11) as u8, (y * 13) as u8, ((x ^ y) * 7) as u8]);
    }
  }
  let mut out = Vec::new();
  {
    let mut encoder = ::png::Encoder::new(&mut out, width, height);
    encoder.set_color(::png::ColorType::Rgb);
    encoder.set_depth(::png::BitDepth::Eight);
    encoder.set_adaptive_filter(::png::AdaptiveFilterType::Adaptive);
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(&data).unwrap();
    writer.finish().unwrap();
  }
  out
}

#[test]
fn test_rgb8_matches_reference_decoder() {
  let bytes = rgb8_fixture();
  let bitmap = png_decode(&bytes).unwrap();
  assert_header_dimensions(&bytes, &bitmap);
  let (info, expected) = reference_decode(&bytes);
  assert_eq!(info.color_type, ::png::ColorType::Rgb);
  for (px, rgb) in bitmap.pixels.iter().zip(expected.chunks_exact(3)) {
    let rgb: Vec<u16> = rgb.iter().map(|&c| u16::from(c)).collect();
    assert_eq!([px.r, px.g, px.b, px.a], [rgb[0], rgb[1], rgb[2], 255]);
  }
  assert_eq!(bitmap.pixels.len() * 3, expected.len());
}

#[test]
fn test_palette_4bit_packed_indices() {
  let (width, height) = (5_u32, 3_u32);
  let palette: Vec<u8> = (0..16_u8).flat_map(|i| [i * 16, 255 - i * 16, i]).collect();
  let index = |x: u32, y: u32| ((x + 3 * y) % 16) as u8;
  // 5 pixels at 4 bits is 2.5 bytes, the last low nibble is padding
  let mut filtered = Vec::new();
  let mut prev: Option<Vec<u8>> = None;
  for y in 0..height {
    let raw: Vec<u8> = (0..3)
      .map(|b| {
        let hi = index(2 * b, y);
        let lo = if 2 * b + 1 < width { index(2 * b + 1, y) } else { 0 };
        (hi << 4) | lo
      })
      .collect();
    filtered.extend(filter_line(y as u8, 1, prev.as_deref(), &raw));
    prev = Some(raw);
  }
  let bytes = PngBuilder::new()
    .ihdr(width, height, 4, 3, 0)
    .chunk(b"PLTE", &palette)
    .idat(&filtered, 7)
    .finish();

  let bitmap = png_decode(&bytes).unwrap();
  assert_header_dimensions(&bytes, &bitmap);
  for y in 0..height {
    for x in 0..width {
      let i = usize::from(index(x, y)) * 3;
      let expected = RGBA16 {
        r: palette[i].into(),
        g: palette[i + 1].into(),
        b: palette[i + 2].into(),
        a: 255,
      };
      assert_eq!(bitmap.get(x, y), Some(&expected), "({x},{y})");
    }
  }
  let (_, reference) = reference_decode(&bytes);
  let ours: Vec<u8> = bitmap.to_rgba8(8).unwrap().pixels.iter().flat_map(|p| [p.r, p.g, p.b]).collect();
  assert_eq!(ours, reference);
}

#[test]
fn test_greyscale_alpha_16bit_interlaced_matches_plain() {
  let (width, height) = (13_u32, 10_u32);
  let pixel = |x: u32, y: u32| {
    let grey = (x * 4099 + y * 257) as u16;
    let alpha = 0xFFFF - (x * y * 331) as u16;
    [grey.to_be_bytes(), alpha.to_be_bytes()].concat()
  };
  let plain = PngBuilder::new()
    .ihdr(width, height, 16, 4, 0)
    .idat(&filtered_image_data(width, height, 4, false, pixel), 50)
    .finish();
  let interlaced = PngBuilder::new()
    .ihdr(width, height, 16, 4, 1)
    .chunk(b"tEXt", b"Comment\0interlaced")
    .idat(&filtered_image_data(width, height, 4, true, pixel), 50)
    .finish();

  let plain_bitmap = png_decode(&plain).unwrap();
  let interlaced_bitmap = png_decode(&interlaced).unwrap();
  assert_header_dimensions(&interlaced, &interlaced_bitmap);
  assert_eq!(plain_bitmap, interlaced_bitmap);

  let (_, reference) = reference_decode(&interlaced);
  for (px, ga) in interlaced_bitmap.pixels.iter().zip(reference.chunks_exact(4)) {
    let grey = u16::from_be_bytes([ga[0], ga[1]]);
    let alpha = u16::from_be_bytes([ga[2], ga[3]]);
    assert_eq!(*px, RGBA16::grey(grey, alpha));
  }
  assert_eq!(
    interlaced_bitmap.get(3, 2),
    Some(&RGBA16::grey((3 * 4099 + 2 * 257) as u16, 0xFFFF - 6 * 331))
  );
}

#[test]
fn test_tiny_interlaced_images() {
  // some of the reduced images are empty for these sizes
  for (width, height) in [(1, 1), (2, 1), (1, 3), (3, 2), (5, 5)] {
    let pixel = |x: u32, y: u32| vec![(x * 40 + y) as u8, 200, (y * 40) as u8];
    let bytes = PngBuilder::new()
      .ihdr(width, height, 8, 2, 1)
      .idat(&filtered_image_data(width, height, 3, true, pixel), 1000)
      .finish();
    let bitmap = png_decode(&bytes).unwrap();
    assert_header_dimensions(&bytes, &bitmap);
    for y in 0..height {
      for x in 0..width {
        let p = pixel(x, y);
        let expected = RGBA16 { r: p[0].into(), g: p[1].into(), b: p[2].into(), a: 255 };
        assert_eq!(bitmap.get(x, y), Some(&expected), "{width}x{height} ({x},{y})");
      }
    }
  }
}

#[test]
fn test_tampered_idat_crc_is_rejected() {
  let mut bytes = rgb8_fixture();
  let idat_crc_offset = {
    let mut offset = 8;
    let mut found = None;
    for chunk in RawChunkIter::new(&bytes) {
      let chunk = chunk.unwrap();
      offset += 8 + chunk.data.len();
      if chunk.chunk_type.0.as_bytes() == b"IDAT" {
        found = Some(offset);
        break;
      }
      offset += 4;
    }
    found.unwrap()
  };
  bytes[idat_crc_offset + 2] ^= 0x40;
  match png_decode(&bytes) {
    Err(PngError::InvalidCrcChecksum { chunk_type, dump, .. }) => {
      assert_eq!(chunk_type.0.as_bytes(), b"IDAT");
      assert!(dump.contains("type: IDAT"));
    }
    other => panic!("expected a crc error, got {other:?}"),
  }
}

#[test]
fn test_any_bit_flip_breaks_the_crc() {
  let bytes = PngBuilder::new().ihdr(2, 2, 1, 0, 0).idat(&[0, 0x80, 0, 0x40], 100).finish();
  assert!(png_decode(&bytes).is_ok());
  // every bit of every chunk's type and data, but not the length or crc
  let mut offset = 8;
  let mut ranges = Vec::new();
  for chunk in RawChunkIter::new(&bytes) {
    let len = chunk.unwrap().data.len();
    ranges.push(offset + 4..offset + 8 + len);
    offset += 12 + len;
  }
  assert_eq!(ranges.len(), 3);
  for range in ranges {
    for i in range {
      for bit in 0..8 {
        let mut corrupt = bytes.clone();
        corrupt[i] ^= 1 << bit;
        assert!(
          matches!(png_decode(&corrupt), Err(PngError::InvalidCrcChecksum { .. })),
          "byte {i} bit {bit}"
        );
      }
    }
  }
}

#[test]
fn test_crc_confirmation_can_be_turned_off() {
  let mut bytes = PngBuilder::new().ihdr(1, 1, 8, 0, 0).idat(&[0, 99], 100).finish();
  let len = bytes.len();
  // the IEND crc
  bytes[len - 1] ^= 0xFF;
  assert!(matches!(png_decode(&bytes), Err(PngError::InvalidCrcChecksum { chunk_index: 2, .. })));
  let options = PngDecoderOptions::default().set_confirm_crc(false);
  let bitmap = png_decode_with_options(&bytes, options).unwrap();
  assert_eq!(bitmap.pixels, vec![RGBA16::grey(99, 255)]);
}

#[test]
fn test_truncated_input() {
  let bytes = rgb8_fixture();
  for cut in [bytes.len() - 1, bytes.len() - 7, 40, 20] {
    assert!(
      matches!(png_decode(&bytes[..cut]), Err(PngError::Io(IoFailure::Truncated { .. }))),
      "cut at {cut}"
    );
  }
  assert_eq!(png_decode(&bytes[..5]), Err(PngError::Io(IoFailure::Truncated { what: "signature", offset: 0 })));
}

#[test]
fn test_to_rgba8() {
  let bytes = PngBuilder::new().ihdr(4, 1, 2, 0, 0).idat(&[0, 0b00_01_10_11], 100).finish();
  let bitmap = png_decode(&bytes).unwrap();
  let depth = png_get_header(&bytes).unwrap().channel_depth();
  let rgba8 = bitmap.to_rgba8(depth).unwrap();
  let greys: Vec<u8> = rgba8.pixels.iter().map(|p| p.r).collect();
  assert_eq!(greys, [0x00, 0x55, 0xAA, 0xFF]);
  assert!(rgba8.pixels.iter().all(|p| *p == RGBA8 { r: p.r, g: p.r, b: p.r, a: 255 }));
}

#[test]
fn test_reader_and_file_entry_points() {
  let bytes = rgb8_fixture();
  assert_eq!(png_decode_reader(bytes.as_slice()), png_decode(&bytes));
  let header = png_get_header(&bytes).unwrap();
  let short = PngDecoderOptions::default().set_max_height(header.height - 1);
  assert_eq!(png_decode_reader_with_options(bytes.as_slice(), short), Err(PngError::DimensionsTooLarge));
  let narrow = PngDecoderOptions::default().set_max_width(header.width - 1);
  assert_eq!(png_decode_reader_with_options(bytes.as_slice(), narrow), Err(PngError::DimensionsTooLarge));
  assert_eq!(
    png_decode_file_with_options("tests/this_file_does_not_exist.png", narrow),
    Err(PngError::Io(IoFailure::Open(std::io::ErrorKind::NotFound)))
  );
  assert_eq!(
    png_decode_file("tests/this_file_does_not_exist.png"),
    Err(PngError::Io(IoFailure::Open(std::io::ErrorKind::NotFound)))
  );
}

#[test]
fn test_png_decode_no_panics() {
  // random data should never panic the decoder
  for _ in 0..50 {
    let v = super::rand_bytes(1024);
    assert!(png_decode(&v).is_err());
  }
  // nor should random chunks after a correct signature
  for _ in 0..50 {
    let mut v = PNG_SIGNATURE.to_vec();
    v.extend(super::rand_bytes(512));
    let _ = png_decode(&v);
    for _ in RawChunkIter::new(&v) {
      //
    }
  }
}
