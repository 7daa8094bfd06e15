use super::*;

use crate::CompressionError;
use miniz_oxide::{
  inflate::stream::{inflate, InflateState},
  DataFormat, MZError, MZFlush, MZStatus,
};

/// Size of the fixed output window that each inflate step writes into.
const INFLATE_WINDOW: usize = 16 * 1024;

/// Inflates a zlib stream, keeping at most `limit` bytes of output.
///
/// `limit` is how many bytes the caller can use, usually from
/// [`IHDR::get_zlib_decompression_requirement`]. Space for that much is
/// reserved up front. Once a stream gives more than `limit` bytes the rest of
/// it is never inflated, and the first `limit` bytes are returned.
///
/// ## Failure
/// * `InvalidData` for a corrupt stream, or one that ends early.
/// * `OutOfMemory` if the output can't be grown.
/// * `InvalidCompressionLevel` and `VersionMismatch` if the inflater rejects
///   its parameters.
pub fn zlib_inflate(compressed: &[u8], limit: usize) -> Result<Vec<u8>, CompressionError> {
  let mut state = InflateState::new_boxed(DataFormat::Zlib);
  let mut window = alloc::vec![0_u8; INFLATE_WINDOW];
  let mut out: Vec<u8> = Vec::new();
  out.try_reserve_exact(limit).map_err(|_| CompressionError::OutOfMemory)?;

  let mut input = compressed;
  loop {
    let step = inflate(&mut state, input, &mut window, MZFlush::None);
    input = input.get(step.bytes_consumed..).unwrap_or(&[]);
    let written = &window[..step.bytes_written];
    let (kept, over) = written.split_at(written.len().min(limit - out.len()));
    out.extend_from_slice(kept);
    if !over.is_empty() {
      warn!("zlib stream is longer than the {limit} bytes needed, stopping early");
      return Ok(out);
    }
    let made_progress = step.bytes_consumed != 0 || step.bytes_written != 0;
    match step.status {
      Ok(MZStatus::StreamEnd) => {
        if !input.is_empty() {
          warn!("ignoring {} bytes after the end of the zlib stream", input.len());
        }
        trace!("inflated {} bytes into {} bytes", compressed.len(), out.len());
        return Ok(out);
      }
      Ok(MZStatus::Ok) | Err(MZError::Buf) if made_progress => continue,
      Ok(MZStatus::Ok) | Err(MZError::Buf) => return Err(CompressionError::InvalidData),
      Ok(MZStatus::NeedDict) => return Err(CompressionError::InvalidData),
      Err(e) => return Err(mz_error_to_compression_error(e)),
    }
  }
}

#[inline]
const fn mz_error_to_compression_error(e: MZError) -> CompressionError {
  match e {
    MZError::Stream | MZError::Param => CompressionError::InvalidCompressionLevel,
    MZError::Mem => CompressionError::OutOfMemory,
    MZError::Version => CompressionError::VersionMismatch,
    _ => CompressionError::InvalidData,
  }
}

#[test]
fn test_zlib_inflate_round_trip() {
  let raw: Vec<u8> = (0..100_000_u32).map(|i| (i % 251) as u8 ^ (i / 1000) as u8).collect();
  let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
  assert_eq!(zlib_inflate(&compressed, raw.len()).as_deref(), Ok(raw.as_slice()));
  assert_eq!(zlib_inflate(&compressed, raw.len() + 10).as_deref(), Ok(raw.as_slice()));
  assert_eq!(zlib_inflate(&compressed, 1000).as_deref(), Ok(&raw[..1000]));
  assert_eq!(zlib_inflate(&compressed, 0).as_deref(), Ok(&[][..]));
}

#[test]
fn test_zlib_inflate_stops_at_the_limit() {
  // 8 MiB of zeroes squeeze down to a few KiB
  let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&alloc::vec![0_u8; 8 << 20], 9);
  assert!(compressed.len() < 32 * 1024);
  let out = zlib_inflate(&compressed, 2).unwrap();
  assert_eq!(out, [0, 0]);
  assert!(out.capacity() < INFLATE_WINDOW);
}

#[test]
fn test_zlib_inflate_failures() {
  assert_eq!(zlib_inflate(&[], 10), Err(CompressionError::InvalidData));
  assert_eq!(zlib_inflate(&[1, 2, 3, 4, 5, 6, 7, 8], 10), Err(CompressionError::InvalidData));

  let raw = [7_u8; 300];
  let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
  let truncated = &compressed[..compressed.len() - 5];
  assert_eq!(zlib_inflate(truncated, 300), Err(CompressionError::InvalidData));

  assert_eq!(mz_error_to_compression_error(MZError::Param), CompressionError::InvalidCompressionLevel);
  assert_eq!(mz_error_to_compression_error(MZError::Mem), CompressionError::OutOfMemory);
  assert_eq!(mz_error_to_compression_error(MZError::Version), CompressionError::VersionMismatch);
  assert_eq!(mz_error_to_compression_error(MZError::Data), CompressionError::InvalidData);
}
