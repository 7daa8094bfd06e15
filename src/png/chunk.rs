use super::*;

/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Checks if the PNG's initial 8 bytes are correct.
///
/// * If this is the case, the rest of the bytes are very likely PNG data.
/// * If this is *not* the case, the rest of the bytes are very likely *not* PNG
///   data.
#[inline]
#[must_use]
pub const fn is_png_signature_correct(bytes: &[u8]) -> bool {
  matches!(bytes, [137, 80, 78, 71, 13, 10, 26, 10, ..])
}

/// Splits the signature off the front of the PNG bytes.
///
/// ## Failure
/// * [`PngError::Io`] if there's less than 8 bytes.
/// * [`PngError::InvalidSignature`] if the 8 bytes aren't [`PNG_SIGNATURE`].
pub fn split_png_signature(bytes: &[u8]) -> Result<&[u8], PngError> {
  match try_split_off_byte_array::<8>(bytes) {
    Some((signature, rest)) if signature == PNG_SIGNATURE => Ok(rest),
    Some(_) => Err(PngError::InvalidSignature),
    None => Err(PngError::Io(IoFailure::Truncated { what: "signature", offset: 0 })),
  }
}

/// The four byte label of a chunk, such as `IHDR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub AsciiArray<4>);
#[allow(nonstandard_style)]
impl ChunkType {
  pub const IHDR: Self = Self(AsciiArray(*b"IHDR"));
  pub const PLTE: Self = Self(AsciiArray(*b"PLTE"));
  pub const IDAT: Self = Self(AsciiArray(*b"IDAT"));
  pub const IEND: Self = Self(AsciiArray(*b"IEND"));

  /// Which role this chunk plays in decoding.
  #[inline]
  #[must_use]
  pub const fn kind(self) -> ChunkKind {
    match self.0 .0 {
      [b'I', b'H', b'D', b'R'] => ChunkKind::Header,
      [b'P', b'L', b'T', b'E'] => ChunkKind::Palette,
      [b'I', b'D', b'A', b'T'] => ChunkKind::ImageData,
      [b'I', b'E', b'N', b'D'] => ChunkKind::End,
      _ => ChunkKind::Ancillary,
    }
  }
}
impl core::fmt::Display for ChunkType {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    core::fmt::Display::fmt(&self.0, f)
  }
}

/// The critical chunk types, and everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChunkKind {
  /// `IHDR`
  Header,
  /// `PLTE`
  Palette,
  /// `IDAT`
  ImageData,
  /// `IEND`
  End,
  /// Any other label. These are kept in order but not interpreted.
  Ancillary,
}

/// An unparsed chunk from a PNG.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawChunk<'b> {
  pub chunk_type: ChunkType,
  pub data: &'b [u8],
  pub declared_crc: u32,
}
impl Debug for RawChunk<'_> {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("RawChunk")
      .field("chunk_type", &self.chunk_type)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}
impl<'b> RawChunk<'b> {
  #[inline]
  #[must_use]
  pub const fn kind(&self) -> ChunkKind {
    self.chunk_type.kind()
  }

  /// The CRC of the chunk's type label followed by its data.
  #[inline]
  #[must_use]
  pub fn compute_actual_crc(&self) -> u32 {
    png_crc32(self.chunk_type.0.as_bytes().iter().copied().chain(self.data.iter().copied()))
  }

  #[inline]
  #[must_use]
  pub fn is_crc_correct(&self) -> bool {
    self.compute_actual_crc() == self.declared_crc
  }

  /// A multi-line description of the chunk with every data byte in hex.
  #[must_use]
  pub fn hex_dump(&self) -> String {
    let mut s = String::with_capacity(64 + self.data.len() * 3);
    // writing to a String can't fail
    let _ = writeln!(s, "length: {}", self.data.len());
    let _ = writeln!(s, "type: {}", self.chunk_type);
    let _ = writeln!(s, "crc: {}", self.declared_crc);
    s.push_str("data:");
    for byte in self.data {
      let _ = write!(s, " {byte:02X}");
    }
    s.push('\n');
    s
  }
}

/// An iterator that produces successive raw chunks from PNG bytes.
///
/// * Running out of bytes exactly where a chunk would begin ends the iteration.
/// * Running out of bytes anywhere *inside* a chunk gives an error, and then
///   the iteration ends.
#[derive(Debug, Clone)]
pub struct RawChunkIter<'b> {
  spare: &'b [u8],
  offset: usize,
}
impl<'b> RawChunkIter<'b> {
  /// Pass the full PNG bytes, it will skip the 8 signature bytes
  /// automatically (without checking them).
  #[inline]
  #[must_use]
  pub const fn new(bytes: &'b [u8]) -> Self {
    match bytes {
      [_, _, _, _, _, _, _, _, rest @ ..] => Self { spare: rest, offset: 8 },
      _ => Self { spare: &[], offset: bytes.len() },
    }
  }

  fn truncated(&mut self, what: &'static str, offset: usize) -> Option<Result<RawChunk<'b>, PngError>> {
    self.spare = &[];
    Some(Err(PngError::Io(IoFailure::Truncated { what, offset })))
  }
}
impl<'b> Iterator for RawChunkIter<'b> {
  type Item = Result<RawChunk<'b>, PngError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.spare.is_empty() {
      return None;
    }
    let chunk_start = self.offset;
    let Some((len_bytes, rest)) = try_split_off_byte_array::<4>(self.spare) else {
      warn!("ignoring {} trailing bytes at offset {}", self.spare.len(), chunk_start);
      self.spare = &[];
      return None;
    };
    let chunk_len = u32::from_be_bytes(len_bytes) as usize;
    let Some((type_bytes, rest)) = try_split_off_byte_array::<4>(rest) else {
      return self.truncated("chunk type", chunk_start + 4);
    };
    let Some((data, rest)) = try_split_off_slice(rest, chunk_len) else {
      return self.truncated("chunk data", chunk_start + 8);
    };
    let Some((crc_bytes, rest)) = try_split_off_byte_array::<4>(rest) else {
      return self.truncated("chunk crc", chunk_start + 8 + chunk_len);
    };
    self.spare = rest;
    self.offset = chunk_start + 12 + chunk_len;
    let chunk = RawChunk {
      chunk_type: ChunkType(AsciiArray(type_bytes)),
      data,
      declared_crc: u32::from_be_bytes(crc_bytes),
    };
    trace!("chunk {} ({} bytes) at offset {}", chunk.chunk_type, data.len(), chunk_start);
    Some(Ok(chunk))
  }
}

#[test]
fn test_split_png_signature() {
  let mut bytes = PNG_SIGNATURE.to_vec();
  bytes.push(9);
  assert_eq!(split_png_signature(&bytes), Ok(&[9_u8][..]));
  assert!(is_png_signature_correct(&bytes));
  bytes[0] = 0x88;
  assert_eq!(split_png_signature(&bytes), Err(PngError::InvalidSignature));
  assert!(matches!(split_png_signature(&PNG_SIGNATURE[..5]), Err(PngError::Io(_))));
}

#[test]
fn test_chunk_kinds() {
  assert_eq!(ChunkType::IHDR.kind(), ChunkKind::Header);
  assert_eq!(ChunkType::PLTE.kind(), ChunkKind::Palette);
  assert_eq!(ChunkType::IDAT.kind(), ChunkKind::ImageData);
  assert_eq!(ChunkType::IEND.kind(), ChunkKind::End);
  assert_eq!(ChunkType(AsciiArray(*b"tEXt")).kind(), ChunkKind::Ancillary);
  // labels are case sensitive
  assert_eq!(ChunkType(AsciiArray(*b"idat")).kind(), ChunkKind::Ancillary);
}

#[test]
fn test_raw_chunk_iter_framing() {
  let mut bytes = PNG_SIGNATURE.to_vec();
  bytes.extend_from_slice(&[0, 0, 0, 2]);
  bytes.extend_from_slice(b"abCD");
  bytes.extend_from_slice(&[7, 8]);
  let crc = png_crc32(b"abCD\x07\x08".iter().copied());
  bytes.extend_from_slice(&crc.to_be_bytes());
  bytes.extend_from_slice(&[0, 0, 0, 0]);
  bytes.extend_from_slice(b"IEND");
  bytes.extend_from_slice(&0xAE42_6082_u32.to_be_bytes());

  let chunks: Vec<_> = RawChunkIter::new(&bytes).collect::<Result<_, _>>().unwrap();
  assert_eq!(chunks.len(), 2);
  assert_eq!(chunks[0].data, &[7, 8]);
  assert_eq!(chunks[0].kind(), ChunkKind::Ancillary);
  assert!(chunks[0].is_crc_correct());
  assert_eq!(chunks[1].kind(), ChunkKind::End);
  assert!(chunks[1].is_crc_correct());

  // cut inside the final crc: one good chunk, then an error, then nothing
  let cut = &bytes[..bytes.len() - 2];
  let mut it = RawChunkIter::new(cut);
  assert!(it.next().unwrap().is_ok());
  assert_eq!(
    it.next(),
    Some(Err(PngError::Io(IoFailure::Truncated { what: "chunk crc", offset: 30 })))
  );
  assert_eq!(it.next(), None);

  // a partial length field is treated like the end of input
  let mut extra = bytes.clone();
  extra.extend_from_slice(&[0, 0]);
  assert_eq!(RawChunkIter::new(&extra).count(), 2);
}

#[test]
fn test_hex_dump() {
  let chunk = RawChunk { chunk_type: ChunkType::IDAT, data: &[0x0A, 0xFF], declared_crc: 5 };
  assert_eq!(chunk.hex_dump(), "length: 2\ntype: IDAT\ncrc: 5\ndata: 0A FF\n");
}
