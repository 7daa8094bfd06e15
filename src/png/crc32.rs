//! The CRC-32 used by PNG chunks.
//!
//! This is CRC-32/ISO-HDLC: polynomial `0x04C11DB7` (reflected as
//! `0xEDB88320`), initial value `0xFFFF_FFFF`, reflected input and output, and
//! a final XOR of `0xFFFF_FFFF`.

const CRC_TABLE: [u32; 256] = make_crc_table();

const fn make_crc_table() -> [u32; 256] {
  let mut out = [0; 256];
  let mut n = 0;
  while n < 256 {
    let mut c = n as u32;
    let mut k = 0;
    while k < 8 {
      if (c & 1) != 0 {
        c = 0xEDB8_8320_u32 ^ (c >> 1);
      } else {
        c >>= 1;
      }
      //
      k += 1;
    }
    out[n] = c;
    //
    n += 1;
  }
  out
}

/// Feeds more bytes into a running (not yet finalized) CRC value.
#[inline]
#[must_use]
pub fn update_crc(mut crc: u32, iter: impl IntoIterator<Item = u8>) -> u32 {
  for byte in iter {
    let i = (crc ^ u32::from(byte)) as u8 as usize;
    crc = CRC_TABLE[i] ^ (crc >> 8);
  }
  crc
}

/// Computes the PNG CRC of all the bytes given.
#[inline]
#[must_use]
pub fn png_crc32(iter: impl IntoIterator<Item = u8>) -> u32 {
  update_crc(u32::MAX, iter) ^ u32::MAX
}

#[test]
fn test_png_crc32_check_values() {
  assert_eq!(png_crc32(b"123456789".iter().copied()), 0xCBF4_3926);
  assert_eq!(png_crc32([]), 0);
  // the CRC of an empty IEND chunk, as found at the end of every PNG
  assert_eq!(png_crc32(b"IEND".iter().copied()), 0xAE42_6082);
}

#[test]
fn test_update_crc_is_incremental() {
  let whole = png_crc32(b"IHDRsome data".iter().copied());
  let split = update_crc(update_crc(u32::MAX, b"IHDR".iter().copied()), b"some data".iter().copied())
    ^ u32::MAX;
  assert_eq!(whole, split);
}
