//! Content hashing used for class names and CSS variable names.
//!
//! The hash is MurmurHash2 (the "gc" variant) fed with the low byte of every UTF-16 code
//! unit of the input, printed in base 36. Class names produced by the runtime package use
//! the same function, so names computed here line up with names computed anywhere else.

const M: u32 = 0x5bd1_e995;

/// Hashes `input` with a zero seed.
pub fn hash(input: &str) -> String {
  hash_with_seed(input, 0)
}

pub fn hash_with_seed(input: &str, seed: u32) -> String {
  let bytes: Vec<u32> = input.encode_utf16().map(|unit| (unit & 0xff) as u32).collect();
  to_base36(murmur2(&bytes, seed))
}

/// At most the first `len` characters of the hash of `input`.
pub fn short_hash(input: &str, len: usize) -> String {
  hash(input).chars().take(len).collect()
}

fn murmur2(bytes: &[u32], seed: u32) -> u32 {
  let mut h = seed ^ bytes.len() as u32;
  let mut chunks = bytes.chunks_exact(4);

  for chunk in &mut chunks {
    let k = chunk[0] | (chunk[1] << 8) | (chunk[2] << 16) | (chunk[3] << 24);
    let k = multiply(k);
    let k = multiply(k ^ (k >> 24));
    h = multiply(h) ^ k;
  }

  let tail = chunks.remainder();
  if !tail.is_empty() {
    for (index, byte) in tail.iter().enumerate().rev() {
      h ^= byte << (8 * index);
    }
    h = multiply(h);
  }

  h ^= h >> 13;
  h = multiply(h);
  h ^ (h >> 15)
}

// Emulates 32-bit multiplication done in two 16-bit halves.
#[inline]
fn multiply(value: u32) -> u32 {
  let low = (value & 0xffff).wrapping_mul(M);
  let high = (value >> 16).wrapping_mul(M);
  low.wrapping_add(high << 16)
}

fn to_base36(mut value: u32) -> String {
  const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

  if value == 0 {
    return String::from("0");
  }

  let mut out = Vec::with_capacity(7);
  while value > 0 {
    out.push(DIGITS[(value % 36) as usize] as char);
    value /= 36;
  }
  out.iter().rev().collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hashes_known_inputs() {
    assert_eq!(hash("compiled"), "3mvezc");
    assert_eq!(hash("css"), "12w0n9j");
    assert_eq!(hash_with_seed("compiled", 1), "yzbs45");
    assert_eq!(hash("undefined&color"), "syazsv");
    assert_eq!(hash("blue"), "13q2bts");
  }

  #[test]
  fn builds_class_name_from_group_and_value() {
    let class_name = format!(
      "_{}{}",
      short_hash("undefined& >:is(div,button)flex-shrink", 4),
      short_hash("0", 4)
    );
    assert_eq!(class_name, "_1puhidpf");
  }

  #[test]
  fn truncates_without_padding() {
    assert_eq!(short_hash("compiled", 4), "3mve");
    assert_eq!(short_hash("", 4), "0");
  }
}
