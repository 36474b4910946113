//-
// Copyright (c) 2025, the Mailward authors
//
// This file is part of Mailward.
//
// Mailward is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Mailward is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along
// with Mailward. If not, see <http://www.gnu.org/licenses/>.

//! The base-32 bit packer underlying the SRS tags.
//!
//! This is not RFC 4648 base32. Bytes are consumed into an accumulator
//! least-significant-bit first, each completed 5-bit group is prepended to
//! the output, and no padding is emitted. The layout is pinned by addresses
//! already circulating in the wild, so the tests below assert exact byte
//! layouts rather than abstract properties.

/// The 32-symbol alphabet. Tags in SRS addresses are drawn from this set.
pub const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Encodes all bits of `data`.
pub fn encode(data: &[u8]) -> String {
    encode_limited(data, usize::MAX)
}

/// Encodes `data`, discarding any bits beyond `bit_limit` before the final
/// flush. This is how a 10-bit counter is forced into exactly two symbols.
///
/// Bit counts are tracked as signed values: once the limit is crossed the
/// running count can go negative, which suppresses the flush. Callers that
/// care about the exact output shape should keep `data` no longer than
/// `bit_limit` rounded up to a whole byte.
pub fn encode_limited(data: &[u8], bit_limit: usize) -> String {
    let mut out = Vec::<u8>::new();
    let mut buffer: u32 = 0;
    let mut bits_in_buffer: i32 = 0;
    let mut total_bits: usize = 0;

    for &b in data {
        buffer |= u32::from(b).wrapping_shl(bits_in_buffer as u32);
        total_bits += 8;
        bits_in_buffer += 8;

        if total_bits > bit_limit {
            bits_in_buffer -= (total_bits - bit_limit) as i32;
        }

        while bits_in_buffer >= 5 && total_bits <= bit_limit {
            out.push(ALPHABET[(buffer & 0x1F) as usize]);
            buffer >>= 5;
            bits_in_buffer -= 5;
        }
    }

    if bits_in_buffer > 0 {
        // Left-align the partial group within its symbol.
        buffer <<= 5 - bits_in_buffer;
        out.push(ALPHABET[(buffer & 0x1F) as usize]);
    }

    // Symbols were emitted low bits first; the string reads high bits first.
    out.reverse();
    String::from_utf8(out).expect("alphabet is ASCII")
}

/// Decodes `s`, skipping `=` and any character outside the alphabet.
///
/// Characters are consumed from the end of the string toward the start,
/// mirroring the prepend order of [`encode`]. A final partial byte is
/// emitted if bits remain, so decode is the exact inverse of encode only
/// when the encoded bit count divided evenly into whole symbols.
pub fn decode(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity((s.len() * 5 + 7) / 8);
    let mut buffer: u32 = 0;
    let mut bits_in_buffer = 0;

    for c in s.bytes().rev() {
        let ix = match ALPHABET.iter().position(|&a| a == c) {
            Some(ix) => ix as u32,
            None => continue,
        };

        buffer |= ix << bits_in_buffer;
        bits_in_buffer += 5;
        if bits_in_buffer >= 8 {
            out.push(buffer as u8);
            buffer >>= 8;
            bits_in_buffer -= 8;
        }
    }

    if bits_in_buffer > 0 {
        out.push(buffer as u8);
    }

    out
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn encode_pinned_layouts() {
        assert_eq!("AQBQEAIA", encode(&[0x00, 0x01, 0x02, 0x03, 0x04]));
        assert_eq!("N5WGYZLI", encode(b"hello"));
        assert_eq!("77777777", encode(&[0xFF; 5]));
        assert_eq!("UL", encode(&[0xAB]));
        assert_eq!("", encode(&[]));
    }

    #[test]
    fn encode_limited_packs_ten_bits_into_two_symbols() {
        // Low byte first; the symbols read the value big-endian.
        assert_eq!("AF", encode_limited(&[0x05, 0x00], 10));
        assert_eq!("77", encode_limited(&[0xFF, 0x03], 10));
        // Bits 10 and up are discarded.
        assert_eq!("AF", encode_limited(&[0x05, 0xFC], 10));
        assert_eq!("AA", encode_limited(&[0x00, 0x04], 10));
    }

    #[test]
    fn decode_pinned_layouts() {
        assert_eq!(vec![0x00, 0x01, 0x02, 0x03, 0x04], decode("AQBQEAIA"));
        assert_eq!(b"hello".to_vec(), decode("N5WGYZLI"));
        assert_eq!(vec![0x05, 0x00], decode("AF"));
        assert_eq!(vec![0xFF, 0x03], decode("77"));
        assert_eq!(Vec::<u8>::new(), decode(""));
    }

    #[test]
    fn decode_skips_padding_and_foreign_characters() {
        // 'n' is outside the alphabet (case matters), '5' is not.
        assert_eq!(vec![0x68, 0x65, 0x6C, 0x6C, 0x07], decode("n5=WGYZLI!"));
        assert_eq!(b"hello".to_vec(), decode("N5WG=YZLI"));
    }

    #[test]
    fn single_byte_does_not_round_trip() {
        // 8 bits occupy two symbols = 10 bits; the partial-byte flush on
        // decode yields a shifted first byte plus a spill byte. The codec
        // only inverts itself on bit counts that fill whole symbols.
        assert_eq!(vec![0x8B, 0x02], decode(&encode(&[0xAB])));
    }

    proptest! {
        #[test]
        fn five_byte_multiples_round_trip(
            data in prop::collection::vec(any::<u8>(), 0..40)
        ) {
            // 5 bytes = 40 bits = 8 whole symbols.
            let bytes = &data[..data.len() / 5 * 5];
            prop_assert_eq!(bytes.to_vec(), decode(&encode(bytes)));
        }

        #[test]
        fn output_is_always_in_alphabet(data in prop::collection::vec(any::<u8>(), 0..64)) {
            for c in encode(&data).bytes() {
                prop_assert!(ALPHABET.contains(&c));
            }
        }

        #[test]
        fn decode_never_panics(s in ".*") {
            decode(&s);
        }
    }
}
