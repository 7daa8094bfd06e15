use alloc::string::String;
use core::fmt;

use crate::png::ChunkType;

/// An error from decoding PNG data.
///
/// The first error found aborts the whole decode, there's no partial output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PngError {
  /// The source couldn't be read, or it ended in the middle of a chunk.
  Io(IoFailure),

  /// The first 8 bytes aren't the PNG signature.
  InvalidSignature,

  /// The header chunk is missing, misplaced, or has illegal field values.
  InvalidHeaderChunk(HeaderProblem),

  /// The palette chunk is missing when required, or is malformed.
  InvalidPaletteChunk(PaletteProblem),

  /// Chunks appear in an order that isn't allowed.
  ///
  /// Only checked beyond "header first" when
  /// [`strict_chunk_order`](crate::png::PngDecoderOptions::set_strict_chunk_order)
  /// is enabled.
  InvalidChunkOrder(&'static str),

  /// A chunk's declared CRC doesn't match the CRC of its type and data.
  InvalidCrcChecksum {
    /// Position of the chunk in the stream (0 is the first chunk).
    chunk_index: usize,
    /// The chunk's type label.
    chunk_type: ChunkType,
    /// CRC stored in the stream.
    declared: u32,
    /// CRC computed from the chunk's bytes.
    computed: u32,
    /// Human readable dump of the chunk's contents.
    dump: String,
  },

  /// The header's interlace method is neither 0 (none) nor 1 (Adam7).
  UnsupportedInterlaceMethod(u8),

  /// The zlib stream of the image data couldn't be inflated.
  Compression(CompressionError),

  /// An internal contract was violated (unknown filter type, a bit depth a
  /// pixel model can't handle, a pass number outside `1..=7`, ...).
  InvalidArguments(&'static str),

  /// The image is larger than the decoder options allow.
  DimensionsTooLarge,

  /// The allocator couldn't give us enough space.
  Alloc,
}

/// What went wrong while pulling bytes from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoFailure {
  /// The data ended while reading `what`, which started at `offset`.
  Truncated { what: &'static str, offset: usize },
  /// The source couldn't be opened.
  #[cfg(feature = "std")]
  Open(std::io::ErrorKind),
  /// Reading from the source failed.
  #[cfg(feature = "std")]
  Read(std::io::ErrorKind),
}

/// Why the header chunk was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderProblem {
  /// There were no chunks at all.
  Missing,
  /// The first chunk wasn't `IHDR`.
  NotFirst,
  /// The chunk data wasn't exactly 13 bytes.
  WrongLength(usize),
  /// Width or height was 0.
  ZeroDimension,
  /// The color type isn't one of 0, 2, 3, 4, 6.
  UnknownColorType(u8),
  /// The bit depth isn't allowed for the color type.
  IllegalBitDepth { color_type: u8, bit_depth: u8 },
  /// Compression method other than 0 (zlib).
  UnknownCompressionMethod(u8),
  /// Filter method other than 0 (adaptive).
  UnknownFilterMethod(u8),
}

/// Why the palette was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteProblem {
  /// An indexed image without a `PLTE` chunk.
  Missing,
  /// A `PLTE` chunk with no entries.
  Empty,
  /// The chunk length isn't a multiple of 3.
  LengthNotMultipleOf3(usize),
  /// Pixel data used an index past the end of the palette.
  IndexOutOfRange { index: usize, len: usize },
}

/// The failure signals of the zlib inflate step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionError {
  /// The inflater was given bad parameters (zlib's "stream error").
  InvalidCompressionLevel,
  /// The compressed data is corrupt or ends early.
  InvalidData,
  /// Memory for the inflated data couldn't be allocated.
  OutOfMemory,
  /// The inflater reported an incompatible library version.
  VersionMismatch,
}

impl From<CompressionError> for PngError {
  #[inline]
  fn from(e: CompressionError) -> Self {
    Self::Compression(e)
  }
}
impl From<IoFailure> for PngError {
  #[inline]
  fn from(e: IoFailure) -> Self {
    Self::Io(e)
  }
}
impl From<alloc::collections::TryReserveError> for PngError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::Alloc
  }
}
#[cfg(feature = "std")]
impl From<std::io::Error> for PngError {
  #[inline]
  fn from(e: std::io::Error) -> Self {
    match e.kind() {
      std::io::ErrorKind::UnexpectedEof => {
        Self::Io(IoFailure::Truncated { what: "source", offset: 0 })
      }
      kind => Self::Io(IoFailure::Read(kind)),
    }
  }
}

impl fmt::Display for CompressionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::InvalidCompressionLevel => "zlib invalid compression level",
      Self::InvalidData => "zlib invalid inflate data",
      Self::OutOfMemory => "zlib out of memory",
      Self::VersionMismatch => "zlib library version mismatch",
    })
  }
}

impl fmt::Display for PngError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Io(IoFailure::Truncated { what, offset }) => {
        write!(f, "input ended while reading {what} at offset {offset}")
      }
      #[cfg(feature = "std")]
      Self::Io(IoFailure::Open(kind)) => write!(f, "unable to open source: {kind:?}"),
      #[cfg(feature = "std")]
      Self::Io(IoFailure::Read(kind)) => write!(f, "unable to read from source: {kind:?}"),
      Self::InvalidSignature => f.write_str("invalid PNG signature"),
      Self::InvalidHeaderChunk(p) => write!(f, "invalid header (IHDR) chunk: {p:?}"),
      Self::InvalidPaletteChunk(p) => write!(f, "invalid palette (PLTE) chunk: {p:?}"),
      Self::InvalidChunkOrder(msg) => write!(f, "invalid chunk order: {msg}"),
      Self::InvalidCrcChecksum { chunk_index, computed, dump, .. } => {
        write!(f, "invalid crc checksum: computed {computed:#010X}, chunk number {chunk_index}:\n{dump}")
      }
      Self::UnsupportedInterlaceMethod(m) => write!(f, "unsupported interlace method: {m}"),
      Self::Compression(e) => write!(f, "{e}"),
      Self::InvalidArguments(msg) => write!(f, "invalid argument: {msg}"),
      Self::DimensionsTooLarge => f.write_str("image dimensions exceed the decoder limits"),
      Self::Alloc => f.write_str("allocation failed"),
    }
  }
}

#[cfg(feature = "std")]
impl std::error::Error for CompressionError {}

#[cfg(feature = "std")]
impl std::error::Error for PngError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Compression(e) => Some(e),
      _ => None,
    }
  }
}
