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

//! Derivation of the two short tags embedded in an SRS address.

use chrono::prelude::*;

use super::base32;
use crate::support::error::Error;

const SECONDS_PER_DAY: f64 = 86400.0;

/// The timestamp tag for the current wall-clock time.
///
/// Two characters encoding `(days since the UNIX epoch) mod 1024`, so the
/// counter wraps roughly every 2.8 years. This is a coarse, storage-free
/// freshness marker; rejecting stale tags is the caller's policy, not ours.
pub fn timestamp_tag() -> String {
    timestamp_tag_at(Utc::now().timestamp())
}

/// The timestamp tag for the given UNIX time, always exactly 2 characters.
pub fn timestamp_tag_at(unix_seconds: i64) -> String {
    let counter =
        ((unix_seconds as f64 / SECONDS_PER_DAY) % 1024.0).round() as u32;
    // Low byte first; the 10-bit limit drops the wrap at counter 1024.
    let raw = [(counter & 0xFF) as u8, ((counter >> 8) & 0xFF) as u8];
    base32::encode_limited(&raw, 10)
}

/// The keyed integrity tag for an original sender, always exactly 3
/// characters.
///
/// The tag is the first 3 symbols of the base-32 form of
/// `HMAC-SHA1(key, "{domain};{local_part}")`, a roughly 15-bit MAC. That is
/// enough to deter casually forged bounce targets and nothing more; the
/// truncation is part of the address format and cannot be widened without
/// invalidating addresses already in circulation.
pub fn hash_tag(
    key: &str,
    domain: &str,
    local_part: &str,
) -> Result<String, Error> {
    let digest = hmac_sha1(
        &utf16le(key),
        &utf16le(&format!("{};{}", domain, local_part)),
    )?;
    let encoded = base32::encode(&digest);
    Ok(encoded[..3].to_owned())
}

fn hmac_sha1(key: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
    let key = openssl::pkey::PKey::hmac(key)?;
    let mut signer =
        openssl::sign::Signer::new(openssl::hash::MessageDigest::sha1(), &key)?;
    Ok(signer.sign_oneshot_to_vec(data)?)
}

// The MAC is computed over the UTF-16LE form of key and message, not UTF-8.
// Deployed rewriters of this scheme hash wide strings, and a tag derived
// from the UTF-8 bytes would never verify against their addresses.
fn utf16le(s: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(s.len() * 2);
    for unit in s.encode_utf16() {
        buf.extend_from_slice(&unit.to_le_bytes());
    }
    buf
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn timestamp_pinned_values() {
        // Day 5.
        assert_eq!("AF", timestamp_tag_at(5 * 86400));
        // Day 1023, all ten bits set.
        assert_eq!("77", timestamp_tag_at(1023 * 86400));
        // Day 19676 wraps to counter 220.
        assert_eq!("G4", timestamp_tag_at(1_700_000_000));
        assert_eq!("AA", timestamp_tag_at(0));
    }

    #[test]
    fn timestamp_rounds_to_nearest_day() {
        // 11:00 UTC on day 5 is closer to day 5; 13:00 rounds up to day 6.
        assert_eq!("AF", timestamp_tag_at(5 * 86400 + 11 * 3600));
        assert_eq!("AG", timestamp_tag_at(5 * 86400 + 13 * 3600));
    }

    #[test]
    fn hash_pinned_values() {
        // Computed with an independent HMAC-SHA1 over the UTF-16LE inputs.
        assert_eq!(
            "XQO",
            hash_tag("R2D2", "origin.com", "sender").unwrap()
        );
        assert_eq!(
            "FX7",
            hash_tag("hunter2", "example.org", "alice").unwrap()
        );
        assert_eq!("F5L", hash_tag("R2D2", "example.com", "bob").unwrap());
    }

    #[test]
    fn hash_is_keyed() {
        assert_ne!(
            hash_tag("R2D2", "origin.com", "sender").unwrap(),
            hash_tag("C3PO", "origin.com", "sender").unwrap(),
        );
    }

    proptest! {
        #[test]
        fn timestamp_is_always_two_symbols(unix in 0i64..4_000_000_000) {
            let tag = timestamp_tag_at(unix);
            prop_assert_eq!(2, tag.len());
            for c in tag.bytes() {
                prop_assert!(base32::ALPHABET.contains(&c));
            }
        }

        #[test]
        fn hash_is_always_three_symbols(
            key in ".+", domain in ".*", local in ".*"
        ) {
            let tag = hash_tag(&key, &domain, &local).unwrap();
            prop_assert_eq!(3, tag.len());
            for c in tag.bytes() {
                prop_assert!(base32::ALPHABET.contains(&c));
            }
        }
    }
}
