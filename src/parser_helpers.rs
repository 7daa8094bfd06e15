//! Just has shorthands for the byte splitting the chunk framing needs.

#[inline]
#[must_use]
pub(crate) fn try_split_off_byte_array<const N: usize>(bytes: &[u8]) -> Option<([u8; N], &[u8])> {
  if bytes.len() >= N {
    let (head, tail) = bytes.split_at(N);
    let mut a = [0_u8; N];
    a.copy_from_slice(head);
    Some((a, tail))
  } else {
    None
  }
}

#[inline]
#[must_use]
pub(crate) fn try_split_off_slice(bytes: &[u8], n: usize) -> Option<(&[u8], &[u8])> {
  if bytes.len() >= n {
    Some(bytes.split_at(n))
  } else {
    None
  }
}

#[inline]
#[must_use]
pub(crate) const fn u16_be(hi: u8, lo: u8) -> u16 {
  u16::from_be_bytes([hi, lo])
}

#[test]
fn test_try_split_off() {
  let bytes = [1, 2, 3, 4, 5];
  assert_eq!(try_split_off_byte_array::<4>(&bytes), Some(([1, 2, 3, 4], &bytes[4..])));
  assert_eq!(try_split_off_byte_array::<6>(&bytes), None);
  assert_eq!(try_split_off_slice(&bytes, 5), Some((&bytes[..], &[][..])));
  assert_eq!(try_split_off_slice(&bytes, 6), None);
  assert_eq!(u16_be(0x12, 0x34), 0x1234);
}
