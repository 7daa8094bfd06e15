/// Knobs for [`png_decode_with_options`](super::png_decode_with_options).
///
/// Built up by value:
///
/// ```
/// use png_raster::png::PngDecoderOptions;
/// let opts = PngDecoderOptions::default().set_max_width(512).set_strict_chunk_order(true);
/// assert_eq!(opts.get_max_width(), 512);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PngDecoderOptions {
  /// Images wider than this fail with `DimensionsTooLarge`.
  ///
  /// - Default value: 16384
  max_width: u32,
  /// Images taller than this fail with `DimensionsTooLarge`.
  ///
  /// - Default value: 16384
  max_height: u32,
  /// When `false` a CRC mismatch is logged as a warning instead of being an
  /// error.
  ///
  /// - Default value: true
  confirm_crc: bool,
  /// When `true` the chunk ordering rules past "IHDR first" are enforced.
  ///
  /// - Default value: false
  strict_chunk_order: bool,
}
impl Default for PngDecoderOptions {
  fn default() -> Self {
    Self { max_width: 1 << 14, max_height: 1 << 14, confirm_crc: true, strict_chunk_order: false }
  }
}
impl PngDecoderOptions {
  #[inline]
  #[must_use]
  pub const fn get_max_width(&self) -> u32 {
    self.max_width
  }
  #[inline]
  #[must_use]
  pub const fn get_max_height(&self) -> u32 {
    self.max_height
  }
  /// Whether chunk CRC mismatches are errors.
  #[inline]
  #[must_use]
  pub const fn get_confirm_crc(&self) -> bool {
    self.confirm_crc
  }
  #[inline]
  #[must_use]
  pub const fn get_strict_chunk_order(&self) -> bool {
    self.strict_chunk_order
  }

  #[inline]
  #[must_use]
  pub const fn set_max_width(mut self, width: u32) -> Self {
    self.max_width = width;
    self
  }
  #[inline]
  #[must_use]
  pub const fn set_max_height(mut self, height: u32) -> Self {
    self.max_height = height;
    self
  }
  /// Set whether a chunk with a bad CRC aborts the decode.
  #[inline]
  #[must_use]
  pub const fn set_confirm_crc(mut self, yes: bool) -> Self {
    self.confirm_crc = yes;
    self
  }
  /// Set whether to also require that:
  /// * there's only one `IHDR`,
  /// * `PLTE` comes before the first `IDAT`,
  /// * all `IDAT` chunks are next to each other,
  /// * `IEND` is present, last, and empty.
  #[inline]
  #[must_use]
  pub const fn set_strict_chunk_order(mut self, yes: bool) -> Self {
    self.strict_chunk_order = yes;
    self
  }
}
