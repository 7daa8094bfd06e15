use super::*;

/// Decodes the full bytes of a PNG, with the default options.
///
/// See [`png_decode_with_options`].
#[inline]
pub fn png_decode(bytes: &[u8]) -> Result<Bitmap<RGBA16>, PngError> {
  png_decode_with_options(bytes, PngDecoderOptions::default())
}

/// Decodes the full bytes of a PNG.
///
/// The steps are strictly in order, and the first error ends the decode:
/// 1) Check the signature and frame all the chunks.
/// 2) Check the chunks: `IHDR` first, every CRC, and (when enabled) the
///    stricter ordering rules.
/// 3) Parse the header, then the palette if the image is indexed.
/// 4) Inflate all of the `IDAT` data as one zlib stream.
/// 5) Unfilter each reduced image and place its pixels into the output.
///
/// The output has the header's dimensions. Channel values stay in the
/// image's [channel depth](IHDR::channel_depth).
pub fn png_decode_with_options(
  bytes: &[u8], options: PngDecoderOptions,
) -> Result<Bitmap<RGBA16>, PngError> {
  split_png_signature(bytes)?;
  trace!("signature ok, reading chunks");
  let chunks: Vec<RawChunk<'_>> = RawChunkIter::new(bytes).collect::<Result<_, _>>()?;
  trace!("read {} chunks", chunks.len());
  validate_chunks(&chunks, &options)?;

  let ihdr = IHDR::try_from(chunks[0].data)?;
  debug!(
    "IHDR: {}x{}, {:?} at {} bits, interlace {}",
    ihdr.width, ihdr.height, ihdr.color_type, ihdr.bit_depth, ihdr.interlace_method
  );
  if ihdr.width > options.get_max_width() || ihdr.height > options.get_max_height() {
    return Err(PngError::DimensionsTooLarge);
  }
  let levels = match ihdr.interlace_method {
    0 => 0..=0,
    1 => 1..=7,
    other => return Err(PngError::UnsupportedInterlaceMethod(other)),
  };
  let palette = if ihdr.is_palette_indexed() {
    let plte = PLTE::find_in(&chunks)?;
    debug!("palette has {} entries", plte.entries().len());
    Some(plte)
  } else {
    None
  };

  let compressed = concatenate_idat(&chunks)?;
  let expected = ihdr.get_zlib_decompression_requirement();
  let mut inflated = zlib_inflate(&compressed, expected)?;
  drop(compressed);
  debug!("inflated {} bytes, the image needs {expected}", inflated.len());

  let reader = PixelReader::new(&ihdr, palette)?;
  let mut bitmap: Bitmap<RGBA16> = Bitmap::try_new(ihdr.height, ihdr.width)?;
  let dimensions = reduced_image_dimensions(ihdr.width, ihdr.height);
  let mut rest: &mut [u8] = inflated.as_mut_slice();
  for level in levels {
    let (width, height) = dimensions[level];
    let (image, more) = unfilter_reduced_image(&ihdr, width, height, core::mem::take(&mut rest))?;
    rest = more;
    trace!("reduced image {level}: {width}x{height}");
    for (y, line) in (0_u32..).zip(image.scanlines()) {
      for x in 0..width {
        let pixel = reader
          .get_pixel_at(line, x as usize)?
          .ok_or(PngError::InvalidArguments("scanline shorter than the image width"))?;
        let (full_x, full_y) = interlaced_pos_to_full_pos(level, x, y)?;
        if !bitmap.set(full_y, full_x, pixel) {
          return Err(PngError::InvalidArguments("pixel position outside the image"));
        }
      }
    }
  }
  trace!("decode complete");
  Ok(bitmap)
}

/// Reads all the bytes from the source and then decodes them, with the
/// default options.
#[cfg(feature = "std")]
#[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
#[inline]
pub fn png_decode_reader<R: std::io::Read>(reader: R) -> Result<Bitmap<RGBA16>, PngError> {
  png_decode_reader_with_options(reader, PngDecoderOptions::default())
}

/// Reads all the bytes from the source and then decodes them.
#[cfg(feature = "std")]
#[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
pub fn png_decode_reader_with_options<R: std::io::Read>(
  mut reader: R, options: PngDecoderOptions,
) -> Result<Bitmap<RGBA16>, PngError> {
  let mut bytes = Vec::new();
  reader.read_to_end(&mut bytes)?;
  png_decode_with_options(&bytes, options)
}

/// Opens the file and decodes it, with the default options.
#[cfg(feature = "std")]
#[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
#[inline]
pub fn png_decode_file<P: AsRef<std::path::Path>>(path: P) -> Result<Bitmap<RGBA16>, PngError> {
  png_decode_file_with_options(path, PngDecoderOptions::default())
}

/// Opens the file and decodes it.
///
/// ## Failure
/// * [`IoFailure::Open`] if the file can't be opened.
/// * Any error of [`png_decode_reader_with_options`].
#[cfg(feature = "std")]
#[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
pub fn png_decode_file_with_options<P: AsRef<std::path::Path>>(
  path: P, options: PngDecoderOptions,
) -> Result<Bitmap<RGBA16>, PngError> {
  let path = path.as_ref();
  trace!("opening {}", path.display());
  let file = std::fs::File::open(path).map_err(|e| PngError::Io(IoFailure::Open(e.kind())))?;
  png_decode_reader_with_options(std::io::BufReader::new(file), options)
}

/// Checks the chunk list before anything in it is interpreted.
///
/// * Every chunk's CRC must be correct (unless `confirm_crc` is off). This
///   goes first, so a corrupted `IHDR` label is reported as a CRC error.
/// * The first chunk must be `IHDR`.
/// * With `strict_chunk_order`, see [`check_chunk_order`].
pub fn validate_chunks(chunks: &[RawChunk<'_>], options: &PngDecoderOptions) -> Result<(), PngError> {
  for (chunk_index, chunk) in chunks.iter().enumerate() {
    let computed = chunk.compute_actual_crc();
    if computed == chunk.declared_crc {
      continue;
    }
    if options.get_confirm_crc() {
      return Err(PngError::InvalidCrcChecksum {
        chunk_index,
        chunk_type: chunk.chunk_type,
        declared: chunk.declared_crc,
        computed,
        dump: chunk.hex_dump(),
      });
    }
    warn!(
      "chunk {chunk_index} ({}) has crc {:#010X} but should be {computed:#010X}",
      chunk.chunk_type, chunk.declared_crc
    );
  }
  match chunks.first() {
    None => return Err(PngError::InvalidHeaderChunk(HeaderProblem::Missing)),
    Some(c) if c.kind() != ChunkKind::Header => {
      return Err(PngError::InvalidHeaderChunk(HeaderProblem::NotFirst))
    }
    Some(_) => (),
  }
  if options.get_strict_chunk_order() {
    check_chunk_order(chunks)?;
  }
  Ok(())
}

/// The ordering rules past "`IHDR` first".
///
/// * Only one `IHDR`.
/// * `PLTE` can't come after an `IDAT`.
/// * All `IDAT` chunks are next to each other.
/// * `IEND` is present, last, and empty.
pub fn check_chunk_order(chunks: &[RawChunk<'_>]) -> Result<(), PngError> {
  let mut seen_idat = false;
  let mut idat_ended = false;
  for (i, chunk) in chunks.iter().enumerate() {
    match chunk.kind() {
      ChunkKind::Header if i != 0 => {
        return Err(PngError::InvalidChunkOrder("more than one IHDR chunk"))
      }
      ChunkKind::Palette if seen_idat => {
        return Err(PngError::InvalidChunkOrder("PLTE chunk after IDAT"))
      }
      ChunkKind::ImageData if idat_ended => {
        return Err(PngError::InvalidChunkOrder("IDAT chunks are not contiguous"))
      }
      ChunkKind::ImageData => seen_idat = true,
      ChunkKind::End if i + 1 != chunks.len() => {
        return Err(PngError::InvalidChunkOrder("IEND is not the last chunk"))
      }
      ChunkKind::End if !chunk.data.is_empty() => {
        return Err(PngError::InvalidChunkOrder("IEND chunk has data"))
      }
      _ => idat_ended |= seen_idat,
    }
  }
  match chunks.last() {
    Some(c) if c.kind() == ChunkKind::End => Ok(()),
    _ => Err(PngError::InvalidChunkOrder("missing IEND chunk")),
  }
}

/// Joins the data of every `IDAT` chunk, in order.
fn concatenate_idat(chunks: &[RawChunk<'_>]) -> Result<Vec<u8>, PngError> {
  let idats = || chunks.iter().filter(|c| c.kind() == ChunkKind::ImageData);
  let total = idats().fold(0_usize, |total, c| total.saturating_add(c.data.len()));
  let mut out = Vec::new();
  out.try_reserve_exact(total)?;
  idats().for_each(|c| out.extend_from_slice(c.data));
  trace!("{} bytes of compressed image data", out.len());
  Ok(out)
}

/// Gets the header of the PNG, if the first chunk is a valid one.
///
/// CRCs aren't checked.
#[must_use]
pub fn png_get_header(bytes: &[u8]) -> Option<IHDR> {
  if !is_png_signature_correct(bytes) {
    return None;
  }
  match RawChunkIter::new(bytes).next()? {
    Ok(chunk) if chunk.kind() == ChunkKind::Header => IHDR::try_from(chunk.data).ok(),
    _ => None,
  }
}

/// Gets the palette of the PNG, if there's a valid one.
///
/// CRCs aren't checked.
#[must_use]
pub fn png_get_palette(bytes: &[u8]) -> Option<PLTE<'_>> {
  RawChunkIter::new(bytes)
    .map_while(Result::ok)
    .find(|c| c.kind() == ChunkKind::Palette)
    .and_then(|c| PLTE::try_from(c.data).ok())
}

/// Iterates the data of every `IDAT` chunk.
///
/// Concatenate all of these and you have the zlib stream of the image data.
/// CRCs aren't checked.
pub fn png_get_idat(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
  RawChunkIter::new(bytes)
    .map_while(Result::ok)
    .filter(|c| c.kind() == ChunkKind::ImageData)
    .map(|c| c.data)
}

#[cfg(test)]
fn chunk(label: &[u8; 4], data: &[u8]) -> Vec<u8> {
  let mut v = Vec::new();
  v.extend_from_slice(&(data.len() as u32).to_be_bytes());
  v.extend_from_slice(label);
  v.extend_from_slice(data);
  let crc = png_crc32(label.iter().copied().chain(data.iter().copied()));
  v.extend_from_slice(&crc.to_be_bytes());
  v
}

#[cfg(test)]
fn png_bytes(chunks: &[Vec<u8>]) -> Vec<u8> {
  let mut v = PNG_SIGNATURE.to_vec();
  chunks.iter().for_each(|c| v.extend_from_slice(c));
  v
}

#[cfg(test)]
fn ihdr_chunk(width: u32, height: u32, depth: u8, color: u8, interlace: u8) -> Vec<u8> {
  let mut data = Vec::new();
  data.extend_from_slice(&width.to_be_bytes());
  data.extend_from_slice(&height.to_be_bytes());
  data.extend_from_slice(&[depth, color, 0, 0, interlace]);
  chunk(b"IHDR", &data)
}

#[cfg(test)]
fn idat_chunk(filtered: &[u8]) -> Vec<u8> {
  chunk(b"IDAT", &miniz_oxide::deflate::compress_to_vec_zlib(filtered, 6))
}

#[test]
fn test_decode_small_greyscale() {
  // 3x2 2-bit grey, rows use the None and Sub filters
  let filtered = [0, 0b00_01_10_00, 1, 0b01_01_01_00];
  let png = png_bytes(&[ihdr_chunk(3, 2, 2, 0, 0), idat_chunk(&filtered), chunk(b"IEND", &[])]);
  let bitmap = png_decode(&png).unwrap();
  assert_eq!((bitmap.width, bitmap.height), (3, 2));
  let greys: Vec<u16> = bitmap.pixels.iter().map(|p| p.r).collect();
  // Sub adds whole bytes, so the second row's byte is just 0b01_01_01_00
  assert_eq!(greys, [0, 1, 2, 1, 1, 1]);
  assert!(bitmap.pixels.iter().all(|p| p.a == 3));
}

#[test]
fn test_decode_palette_and_ancillary() {
  let filtered = [0, 0, 1];
  let png = png_bytes(&[
    ihdr_chunk(2, 1, 8, 3, 0),
    chunk(b"tEXt", b"Comment\0hi"),
    chunk(b"PLTE", &[255, 0, 0, 0, 0, 255]),
    idat_chunk(&filtered[..2]),
    idat_chunk(&filtered[2..]),
    chunk(b"IEND", &[]),
  ]);
  // two IDAT chunks that are each a full zlib stream isn't one zlib stream
  assert!(png_decode(&png).is_err());

  let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&filtered, 6);
  let (a, b) = compressed.split_at(3);
  let png = png_bytes(&[
    ihdr_chunk(2, 1, 8, 3, 0),
    chunk(b"tEXt", b"Comment\0hi"),
    chunk(b"PLTE", &[255, 0, 0, 0, 0, 255]),
    chunk(b"IDAT", a),
    chunk(b"IDAT", b),
    chunk(b"IEND", &[]),
  ]);
  let bitmap = png_decode(&png).unwrap();
  assert_eq!(
    bitmap.pixels,
    [RGBA16 { r: 255, g: 0, b: 0, a: 255 }, RGBA16 { r: 0, g: 0, b: 255, a: 255 }]
  );
  assert_eq!(png_get_header(&png).map(|h| h.width), Some(2));
  assert_eq!(png_get_palette(&png).map(|p| p.entries().len()), Some(2));
  assert_eq!(png_get_idat(&png).count(), 2);

  let missing = png_bytes(&[ihdr_chunk(2, 1, 8, 3, 0), chunk(b"IDAT", &compressed), chunk(b"IEND", &[])]);
  assert_eq!(png_decode(&missing), Err(PngError::InvalidPaletteChunk(PaletteProblem::Missing)));
}

#[test]
fn test_decode_error_kinds() {
  let end = chunk(b"IEND", &[]);
  let idat = idat_chunk(&[0, 0]);
  assert_eq!(png_decode(&PNG_SIGNATURE), Err(PngError::InvalidHeaderChunk(HeaderProblem::Missing)));
  assert_eq!(
    png_decode(&png_bytes(&[end.clone()])),
    Err(PngError::InvalidHeaderChunk(HeaderProblem::NotFirst))
  );
  assert_eq!(
    png_decode(&png_bytes(&[ihdr_chunk(1, 1, 8, 0, 2), idat.clone(), end.clone()])),
    Err(PngError::UnsupportedInterlaceMethod(2))
  );
  assert_eq!(
    png_decode(&png_bytes(&[ihdr_chunk(1, 1, 3, 0, 0), idat.clone(), end.clone()])),
    Err(PngError::InvalidHeaderChunk(HeaderProblem::IllegalBitDepth { color_type: 0, bit_depth: 3 }))
  );
  assert_eq!(
    png_decode(&png_bytes(&[ihdr_chunk(2, 1, 8, 0, 0), idat.clone(), end.clone()])),
    Err(PngError::Compression(crate::CompressionError::InvalidData))
  );
  let big = png_bytes(&[ihdr_chunk(100, 1, 8, 0, 0), idat.clone(), end.clone()]);
  assert_eq!(
    png_decode_with_options(&big, PngDecoderOptions::default().set_max_width(99)),
    Err(PngError::DimensionsTooLarge)
  );
  let tall = png_bytes(&[ihdr_chunk(1, 100, 8, 0, 0), idat.clone(), end.clone()]);
  assert_eq!(
    png_decode_with_options(&tall, PngDecoderOptions::default().set_max_height(99)),
    Err(PngError::DimensionsTooLarge)
  );
  // at the limit is fine, it only fails later for lack of image data
  assert_eq!(
    png_decode_with_options(&tall, PngDecoderOptions::default().set_max_height(100)),
    Err(PngError::Compression(crate::CompressionError::InvalidData))
  );
  let mut bad_sig = png_bytes(&[ihdr_chunk(1, 1, 8, 0, 0), idat.clone(), end.clone()]);
  bad_sig[1] = b'Q';
  assert_eq!(png_decode(&bad_sig), Err(PngError::InvalidSignature));
}

#[test]
fn test_oversized_image_data_is_not_inflated() {
  // a 1x1 grey image needs 2 bytes, this stream holds 8 MiB
  let mut filtered = alloc::vec![0_u8; 8 << 20];
  filtered[1] = 9;
  let png = png_bytes(&[ihdr_chunk(1, 1, 8, 0, 0), idat_chunk(&filtered), chunk(b"IEND", &[])]);
  assert!(png.len() < 64 * 1024);
  assert_eq!(png_decode(&png).map(|b| b.pixels), Ok(alloc::vec![RGBA16::grey(9, 255)]));
  let idat: Vec<u8> = png_get_idat(&png).flatten().copied().collect();
  assert_eq!(zlib_inflate(&idat, 2).map(|v| v.len()), Ok(2));
}

#[test]
fn test_crc_checks() {
  let mut bytes = png_bytes(&[ihdr_chunk(1, 1, 8, 0, 0), idat_chunk(&[0, 77]), chunk(b"IEND", &[])]);
  // the last byte of the IDAT crc
  let idat_crc_end = 8 + 25 + 12 + (bytes.len() - 8 - 25 - 12 - 12);
  bytes[idat_crc_end - 1] ^= 1;
  match png_decode(&bytes) {
    Err(PngError::InvalidCrcChecksum { chunk_index, chunk_type, dump, .. }) => {
      assert_eq!(chunk_index, 1);
      assert_eq!(chunk_type, ChunkType::IDAT);
      assert!(dump.starts_with("length: "));
    }
    other => panic!("expected a crc error, got {other:?}"),
  }
  let relaxed = PngDecoderOptions::default().set_confirm_crc(false);
  let bitmap = png_decode_with_options(&bytes, relaxed).unwrap();
  assert_eq!(bitmap.pixels, [RGBA16::grey(77, 255)]);
}

#[test]
fn test_strict_chunk_order() {
  let strict = PngDecoderOptions::default().set_strict_chunk_order(true);
  let ihdr = ihdr_chunk(1, 1, 8, 0, 0);
  let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&[0, 5], 6);
  let (a, b) = compressed.split_at(4);
  let (a, b) = (chunk(b"IDAT", a), chunk(b"IDAT", b));
  let text = chunk(b"tEXt", b"k\0v");
  let end = chunk(b"IEND", &[]);

  let split_idat = png_bytes(&[ihdr.clone(), a.clone(), text.clone(), b.clone(), end.clone()]);
  assert!(png_decode(&split_idat).is_ok());
  assert_eq!(
    png_decode_with_options(&split_idat, strict),
    Err(PngError::InvalidChunkOrder("IDAT chunks are not contiguous"))
  );
  let no_end = png_bytes(&[ihdr.clone(), a.clone(), b.clone()]);
  assert!(png_decode(&no_end).is_ok());
  assert_eq!(
    png_decode_with_options(&no_end, strict),
    Err(PngError::InvalidChunkOrder("missing IEND chunk"))
  );
  let end_first = png_bytes(&[ihdr.clone(), end.clone(), a.clone(), b.clone(), end.clone()]);
  assert_eq!(
    png_decode_with_options(&end_first, strict),
    Err(PngError::InvalidChunkOrder("IEND is not the last chunk"))
  );
  let two_headers = png_bytes(&[ihdr.clone(), ihdr.clone(), a.clone(), b.clone(), end.clone()]);
  assert_eq!(
    png_decode_with_options(&two_headers, strict),
    Err(PngError::InvalidChunkOrder("more than one IHDR chunk"))
  );
  let good = png_bytes(&[ihdr, text, a, b, end]);
  assert_eq!(png_decode_with_options(&good, strict).map(|b| b.pixels), Ok(alloc::vec![RGBA16::grey(5, 255)]));
}
