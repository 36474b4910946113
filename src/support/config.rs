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

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::support::error::Error;

/// The default address template. `{newSenderLocalPart}` may also be used.
pub const DEFAULT_TEMPLATE: &str = "SRS0={hash}={timestamp}\
                                    ={origSenderDomain}={origSenderLocalPart}\
                                    @{newSenderDomain}";
/// The default marker identifying return-path candidates.
pub const DEFAULT_MARKER: &str = "+SRS=";
/// A deliberately weak placeholder key. Any real installation must
/// configure its own secret; this one only exists so a scratch setup can
/// round-trip addresses at all.
pub const DEFAULT_HASH_KEY: &str = "R2D2";

/// The forwarder configuration.
///
/// This is the root of the TOML file stored in `mailward.toml`. It is read
/// once and is read-only for the process lifetime. All defaults are
/// resolved here at deserialisation time; nothing downstream falls back on
/// its own.
///
/// Transport endpoints (IMAP/SMTP hosts, credentials) are configured on the
/// transport collaborator, not here.
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct Config {
    /// The address of the watched mailbox. A message whose To contains
    /// exactly this address (case-sensitive) is forwarded. Required for any
    /// pass to run.
    pub mailbox_address: Option<String>,

    /// Display name used when the forwarder itself becomes the visible
    /// sender of a returned message.
    #[serde(default)]
    pub mailbox_name: String,

    /// The address forwarded mail is delivered to. Required for any pass to
    /// run.
    pub forward_to: Option<String>,

    /// Display name attached to `forward_to` on forwarded copies.
    #[serde(default)]
    pub forward_to_name: String,

    /// If set, a copy of every dispatched message is appended to this
    /// folder, best effort.
    #[serde(default)]
    pub sent_folder: Option<String>,

    /// If set and the transport can move messages, the original message is
    /// moved here after a successful dispatch, best effort.
    #[serde(default)]
    pub archive_folder: Option<String>,

    /// The SRS codec settings.
    #[serde(default)]
    pub srs: SrsConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SrsConfig {
    /// Secret key for the hash tag. Both ends of a forward/bounce exchange
    /// must share it. The default is a well-known placeholder and MUST be
    /// overridden in production.
    pub hash_key: String,

    /// Template for the rewritten address. See [`DEFAULT_TEMPLATE`] for the
    /// recognised placeholders; anything else passes through literally, so
    /// the marker can be embedded where the deployment wants it.
    pub template: String,

    /// Substring identifying a To address as a return-path candidate.
    pub marker: String,
}

impl Default for SrsConfig {
    fn default() -> Self {
        SrsConfig {
            hash_key: DEFAULT_HASH_KEY.to_owned(),
            template: DEFAULT_TEMPLATE.to_owned(),
            marker: DEFAULT_MARKER.to_owned(),
        }
    }
}

impl Config {
    /// Reads and parses the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Config, Error> {
        let mut raw = Vec::new();
        fs::File::open(path)?.read_to_end(&mut raw)?;
        Ok(toml::from_slice(&raw)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_resolve_at_parse_time() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(None, config.mailbox_address);
        assert_eq!(None, config.forward_to);
        assert_eq!(DEFAULT_HASH_KEY, config.srs.hash_key);
        assert_eq!(DEFAULT_TEMPLATE, config.srs.template);
        assert_eq!(DEFAULT_MARKER, config.srs.marker);
    }

    #[test]
    fn parses_full_file() {
        let config: Config = toml::from_str(
            r#"
            mailbox_address = "me@example.com"
            mailbox_name = "Me"
            forward_to = "you@other.com"
            forward_to_name = "You"
            sent_folder = "Sent"
            archive_folder = "Archive"

            [srs]
            hash_key = "hunter2"
            marker = "+srs."
            "#,
        )
        .unwrap();

        assert_eq!(Some("me@example.com".to_owned()), config.mailbox_address);
        assert_eq!("Me", config.mailbox_name);
        assert_eq!(Some("you@other.com".to_owned()), config.forward_to);
        assert_eq!(Some("Archive".to_owned()), config.archive_folder);
        assert_eq!("hunter2", config.srs.hash_key);
        assert_eq!("+srs.", config.srs.marker);
        // Unset SRS fields still default.
        assert_eq!(DEFAULT_TEMPLATE, config.srs.template);
    }
}
