use super::*;

/// Palette
///
/// The entries of an indexed color image, in storage order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(nonstandard_style)]
pub struct PLTE<'b>(&'b [RGB8]);
impl<'b> PLTE<'b> {
  /// All of the palette's entries.
  #[inline]
  #[must_use]
  pub const fn entries(&self) -> &'b [RGB8] {
    self.0
  }

  /// Looks up the color of an index from the pixel data.
  ///
  /// ## Failure
  /// * [`PaletteProblem::IndexOutOfRange`] if the palette is too short.
  #[inline]
  pub fn get(&self, index: usize) -> Result<RGB8, PngError> {
    self.0.get(index).copied().ok_or(PngError::InvalidPaletteChunk(
      PaletteProblem::IndexOutOfRange { index, len: self.0.len() },
    ))
  }

  /// Finds the first palette chunk and parses it.
  ///
  /// ## Failure
  /// * [`PaletteProblem::Missing`] if none of the chunks is a palette.
  /// * Any error from parsing the chunk data.
  pub fn find_in(chunks: &[RawChunk<'b>]) -> Result<Self, PngError> {
    chunks
      .iter()
      .find(|c| c.kind() == ChunkKind::Palette)
      .ok_or(PngError::InvalidPaletteChunk(PaletteProblem::Missing))
      .and_then(|c| Self::try_from(c.data))
  }
}
impl<'b> TryFrom<&'b [u8]> for PLTE<'b> {
  type Error = PngError;
  /// Views the chunk data as `RGB8` entries, without copying.
  #[inline]
  fn try_from(data: &'b [u8]) -> Result<Self, Self::Error> {
    if data.is_empty() {
      return Err(PngError::InvalidPaletteChunk(PaletteProblem::Empty));
    }
    match bytemuck::try_cast_slice::<u8, RGB8>(data) {
      Ok(entries) => Ok(Self(entries)),
      Err(_) => Err(PngError::InvalidPaletteChunk(PaletteProblem::LengthNotMultipleOf3(data.len()))),
    }
  }
}
impl Debug for PLTE<'_> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    write!(f, "PLTE({} entries: {:?}", self.0.len(), &self.0[..self.0.len().min(4)])?;
    if self.0.len() > 4 {
      f.write_str(" ..")?;
    }
    f.write_str(")")
  }
}

#[test]
fn test_plte_parse() {
  let data = [1, 2, 3, 4, 5, 6];
  let p = PLTE::try_from(&data[..]).unwrap();
  assert_eq!(p.entries().len(), 2);
  assert_eq!(p.get(1), Ok(RGB8 { r: 4, g: 5, b: 6 }));
  assert_eq!(
    p.get(2),
    Err(PngError::InvalidPaletteChunk(PaletteProblem::IndexOutOfRange { index: 2, len: 2 }))
  );
  assert_eq!(
    PLTE::try_from(&data[..5]),
    Err(PngError::InvalidPaletteChunk(PaletteProblem::LengthNotMultipleOf3(5)))
  );
  assert_eq!(PLTE::try_from(&data[..0]), Err(PngError::InvalidPaletteChunk(PaletteProblem::Empty)));
}

#[test]
fn test_plte_find_in() {
  let data = [9, 8, 7];
  let text = RawChunk { chunk_type: ChunkType(AsciiArray(*b"tEXt")), data: &[], declared_crc: 0 };
  let plte = RawChunk { chunk_type: ChunkType::PLTE, data: &data, declared_crc: 0 };
  assert_eq!(
    PLTE::find_in(&[text]),
    Err(PngError::InvalidPaletteChunk(PaletteProblem::Missing))
  );
  assert_eq!(PLTE::find_in(&[text, plte]).unwrap().entries(), &[RGB8 { r: 9, g: 8, b: 7 }]);
}
