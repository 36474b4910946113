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

//! Building and verifying whole SRS addresses.

use chrono::prelude::*;

use super::{base32, tag};
use crate::support::config::SrsConfig;
use crate::support::error::Error;

/// The SRS address codec, bound to one configuration.
///
/// Encoding and decoding share the secret key and the address template, so
/// both directions live on one value constructed from [`SrsConfig`].
#[derive(Clone, Debug)]
pub struct Srs {
    hash_key: String,
    template: String,
    marker: String,
}

/// The fields recovered from a structurally valid, hash-verified SRS
/// address.
///
/// The original sender is `{local_part}@{domain}`. No expiry check is
/// applied to `timestamp_tag`; that policy belongs to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedSrsAddress {
    pub hash_tag: String,
    pub timestamp_tag: String,
    pub domain: String,
    pub local_part: String,
    pub new_domain: String,
}

impl Srs {
    pub fn new(config: &SrsConfig) -> Self {
        Srs {
            hash_key: config.hash_key.clone(),
            template: config.template.clone(),
            marker: config.marker.clone(),
        }
    }

    /// Builds the forward-direction rewritten address for the current time.
    ///
    /// `orig_*` name the original sender being rewritten; `new_*` name the
    /// sender the forwarded copy will appear to come from. The hash tag
    /// covers only the original sender, so the address survives any choice
    /// of forwarding target.
    pub fn encode(
        &self,
        orig_domain: &str,
        orig_local_part: &str,
        new_domain: &str,
        new_local_part: &str,
    ) -> Result<String, Error> {
        self.encode_at(
            orig_domain,
            orig_local_part,
            new_domain,
            new_local_part,
            Utc::now().timestamp(),
        )
    }

    /// As [`Srs::encode`], with an explicit clock.
    pub fn encode_at(
        &self,
        orig_domain: &str,
        orig_local_part: &str,
        new_domain: &str,
        new_local_part: &str,
        unix_seconds: i64,
    ) -> Result<String, Error> {
        // A literal '=' or '@' in a recoverable field cannot be
        // distinguished from a field separator on the way back, so refuse
        // to produce an address we could not decode.
        for field in &[orig_domain, orig_local_part] {
            if field.contains('=') || field.contains('@') {
                return Err(Error::UnencodableSrsField((*field).to_owned()));
            }
        }

        let hash =
            tag::hash_tag(&self.hash_key, orig_domain, orig_local_part)?;
        let timestamp = tag::timestamp_tag_at(unix_seconds);

        Ok(self
            .template
            .replace("{hash}", &hash)
            .replace("{timestamp}", &timestamp)
            .replace("{origSenderDomain}", orig_domain)
            .replace("{origSenderLocalPart}", orig_local_part)
            .replace("{newSenderDomain}", new_domain)
            .replace("{newSenderLocalPart}", new_local_part))
    }

    /// Parses and verifies a candidate rewritten address.
    ///
    /// The candidate is split at its last `@`; the configured marker is
    /// removed from the local side (deployed templates embed the marker so
    /// bounces can be found by substring search); and the remainder is read
    /// positionally as `scheme=hash=timestamp=origDomain=origLocalPart`.
    ///
    /// Fails closed: any structural surprise is `MalformedSrsAddress` and a
    /// recomputed-hash mismatch is `SrsVerification`. Neither is ever
    /// "corrected".
    pub fn decode(&self, candidate: &str) -> Result<DecodedSrsAddress, Error> {
        let (local_side, new_domain) = candidate
            .rsplit_once('@')
            .ok_or(Error::MalformedSrsAddress)?;
        let local_side = local_side.replace(&self.marker, "");

        let mut fields = local_side.splitn(5, '=');
        let _scheme = fields.next().ok_or(Error::MalformedSrsAddress)?;
        let hash = fields.next().ok_or(Error::MalformedSrsAddress)?;
        let timestamp = fields.next().ok_or(Error::MalformedSrsAddress)?;
        let domain = fields.next().ok_or(Error::MalformedSrsAddress)?;
        let local_part = fields.next().ok_or(Error::MalformedSrsAddress)?;

        if !is_tag(hash, 3) || !is_tag(timestamp, 2) {
            return Err(Error::MalformedSrsAddress);
        }

        // Mirror of the restriction applied at encode time.
        for field in &[domain, local_part] {
            if field.is_empty()
                || field.contains('=')
                || field.contains('@')
            {
                return Err(Error::MalformedSrsAddress);
            }
        }

        let expected = tag::hash_tag(&self.hash_key, domain, local_part)?;
        if expected != hash {
            return Err(Error::SrsVerification);
        }

        Ok(DecodedSrsAddress {
            hash_tag: hash.to_owned(),
            timestamp_tag: timestamp.to_owned(),
            domain: domain.to_owned(),
            local_part: local_part.to_owned(),
            new_domain: new_domain.to_owned(),
        })
    }
}

fn is_tag(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|c| base32::ALPHABET.contains(&c))
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    const DAY5: i64 = 5 * 86400;

    fn srs() -> Srs {
        Srs::new(&SrsConfig::default())
    }

    #[test]
    fn encode_default_template() {
        assert_eq!(
            "SRS0=XQO=AF=origin.com=sender@other.com",
            srs()
                .encode_at("origin.com", "sender", "other.com", "you", DAY5)
                .unwrap(),
        );
    }

    #[test]
    fn encode_substitutes_new_local_part_when_templated() {
        let srs = Srs::new(&SrsConfig {
            template: "SRS0={hash}={timestamp}={origSenderDomain}\
                       ={origSenderLocalPart}@{newSenderLocalPart}\
                       .{newSenderDomain}"
                .to_owned(),
            ..SrsConfig::default()
        });
        assert_eq!(
            "SRS0=XQO=AF=origin.com=sender@you.other.com",
            srs.encode_at("origin.com", "sender", "other.com", "you", DAY5)
                .unwrap(),
        );
    }

    #[test]
    fn encode_passes_unknown_placeholders_through() {
        let srs = Srs::new(&SrsConfig {
            template: "SRS0={hash}={timestamp}={origSenderDomain}\
                       ={origSenderLocalPart}{junk}@{newSenderDomain}"
                .to_owned(),
            ..SrsConfig::default()
        });
        assert_eq!(
            "SRS0=XQO=AF=origin.com=sender{junk}@other.com",
            srs.encode_at("origin.com", "sender", "other.com", "you", DAY5)
                .unwrap(),
        );
    }

    #[test]
    fn encode_rejects_separator_characters_in_recoverable_fields() {
        assert_matches!(
            Err(Error::UnencodableSrsField(..)),
            srs().encode_at("origin.com", "a=b", "other.com", "you", DAY5),
        );
        assert_matches!(
            Err(Error::UnencodableSrsField(..)),
            srs().encode_at("a@b.com", "sender", "other.com", "you", DAY5),
        );
        // The forwarding target is not recoverable and not restricted.
        assert!(srs()
            .encode_at("origin.com", "sender", "other.com", "y=ou", DAY5)
            .is_ok());
    }

    #[test]
    fn decode_recovers_original_sender() {
        let encoded = srs()
            .encode_at("origin.com", "sender", "other.com", "you", DAY5)
            .unwrap();
        let decoded = srs().decode(&encoded).unwrap();
        assert_eq!("origin.com", decoded.domain);
        assert_eq!("sender", decoded.local_part);
        assert_eq!("other.com", decoded.new_domain);
        assert_eq!("XQO", decoded.hash_tag);
        assert_eq!("AF", decoded.timestamp_tag);
    }

    #[test]
    fn decode_strips_marker_before_parsing() {
        let decoded = srs()
            .decode("SRS0=XQO=AF=origin.com=sender+SRS=@other.com")
            .unwrap();
        assert_eq!("origin.com", decoded.domain);
        assert_eq!("sender", decoded.local_part);
    }

    #[test]
    fn decode_rejects_any_single_character_change_to_the_hash() {
        assert!(srs()
            .decode("SRS0=XQO=AF=origin.com=sender@other.com")
            .is_ok());

        for ix in 0..3 {
            // Swap one tag character for a different alphabet character.
            let mut hash = *b"XQO";
            hash[ix] = if hash[ix] == b'Z' { b'Y' } else { b'Z' };
            let tampered = format!(
                "SRS0={}=AF=origin.com=sender@other.com",
                std::str::from_utf8(&hash).unwrap(),
            );
            assert_matches!(
                Err(Error::SrsVerification),
                srs().decode(&tampered),
            );
        }
    }

    #[test]
    fn decode_rejects_wrong_secret() {
        let encoded = srs()
            .encode_at("origin.com", "sender", "other.com", "you", DAY5)
            .unwrap();
        let other = Srs::new(&SrsConfig {
            hash_key: "C3PO".to_owned(),
            ..SrsConfig::default()
        });
        assert_matches!(Err(Error::SrsVerification), other.decode(&encoded));
    }

    proptest! {
        #[test]
        fn any_encoded_sender_is_recovered_under_the_same_secret(
            domain in "[a-z0-9.-]{1,24}",
            local in "[a-z0-9.+_-]{1,24}",
            key in "[ -~]{1,16}",
        ) {
            let srs = Srs::new(&SrsConfig {
                hash_key: key,
                ..SrsConfig::default()
            });
            let encoded = srs
                .encode(&domain, &local, "fwd.example", "fwd")
                .unwrap();
            let decoded = srs.decode(&encoded).unwrap();
            prop_assert_eq!(domain, decoded.domain);
            prop_assert_eq!(local, decoded.local_part);
            prop_assert_eq!("fwd.example", decoded.new_domain.as_str());
        }
    }

    #[test]
    fn decode_rejects_structural_garbage() {
        for candidate in &[
            "",
            "no-at-sign",
            "plain@other.com",
            "SRS0=XQO=AF=origin.com@other.com",
            "SRS0=xqo=AF=origin.com=sender@other.com",
            "SRS0=XQOX=AF=origin.com=sender@other.com",
            "SRS0=XQO=AFF=origin.com=sender@other.com",
            "SRS0=XQO=AF==sender@other.com",
            "SRS0=XQO=AF=origin.com=@other.com",
            "SRS0=XQO=AF=origin.com=sen=der@other.com",
        ] {
            assert_matches!(
                Err(Error::MalformedSrsAddress),
                srs().decode(candidate),
            );
        }
    }
}
