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

use std::path::{Path, PathBuf};

use structopt::StructOpt;

use crate::forward::model::MailAddress;
use crate::srs::Srs;
use crate::support::config::{Config, DEFAULT_HASH_KEY};
use crate::support::error::Error;
use crate::support::sysexits::*;

/// Operator tooling for the forwarder.
///
/// Forwarding itself runs embedded in a host that owns the scheduler and
/// the mail-transport connections; these commands cover the pieces an
/// operator touches directly: the configuration file and the SRS codec.
#[derive(StructOpt)]
#[structopt(max_term_width = 80)]
enum Command {
    /// Load the configuration and report anything missing or defaulted.
    Check(CommonOptions),
    /// Print the SRS rewrite of a sender address.
    ///
    /// The address is rewritten as it would be when forwarding a message
    /// from that sender to the configured forward target, using the
    /// configured secret, template, and the current timestamp.
    Encode(EncodeSubcommand),
    /// Verify a candidate SRS address.
    ///
    /// On success, prints the recovered original sender. Exits non-zero if
    /// the address is structurally invalid or its hash tag does not verify
    /// against the configured secret.
    Decode(DecodeSubcommand),
}

#[derive(StructOpt, Default)]
struct CommonOptions {
    /// The configuration file
    /// [default: /etc/mailward.toml or ./mailward.toml]
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,
}

#[derive(StructOpt)]
struct EncodeSubcommand {
    #[structopt(flatten)]
    common: CommonOptions,

    /// The original sender address to rewrite.
    address: String,
}

#[derive(StructOpt)]
struct DecodeSubcommand {
    #[structopt(flatten)]
    common: CommonOptions,

    /// The candidate SRS address, as found in a bounce's To header.
    address: String,
}

pub fn main() {
    // Clap exits with status 1 instead of EX_USAGE if we use the more
    // concise API
    let cmd = Command::from_clap(&match Command::clap().get_matches_safe() {
        Ok(matches) => matches,
        Err(
            e @ clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                ..
            },
        )
        | Err(
            e @ clap::Error {
                kind: clap::ErrorKind::VersionDisplayed,
                ..
            },
        ) => {
            println!("{}", e.message);
            return;
        },
        Err(e) => {
            eprintln!("{}", e.message);
            EX_USAGE.exit()
        },
    });

    match cmd {
        Command::Check(common) => check(common),
        Command::Encode(cmd) => encode(cmd),
        Command::Decode(cmd) => decode(cmd),
    }
}

fn load_config(common: &CommonOptions) -> Config {
    let path = common.config.clone().unwrap_or_else(|| {
        if Path::new("/etc/mailward.toml").is_file() {
            "/etc/mailward.toml".to_owned().into()
        } else if Path::new("mailward.toml").is_file() {
            "mailward.toml".to_owned().into()
        } else {
            eprintln!(
                "Neither /etc/mailward.toml nor ./mailward.toml exists;\n\
                 use --config=/path/to/mailward.toml if your configuration\n\
                 is elsewhere."
            );
            EX_CONFIG.exit()
        }
    });

    // A logging.toml next to the configuration file takes over logging;
    // otherwise log plainly to stderr.
    let log_config_file = path.with_file_name("logging.toml");
    if log_config_file.is_file() {
        log4rs::init_file(log_config_file, log4rs::file::Deserializers::new())
            .expect("Failed to initialise logging");
    } else {
        crate::init_simple_log();
    }

    match Config::load(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error in config file at '{}': {}", path.display(), e);
            EX_CONFIG.exit()
        },
    }
}

fn check(common: CommonOptions) {
    let config = load_config(&common);
    let mut usable = true;

    match config.mailbox_address {
        Some(ref a) if a.contains('@') => println!("watching      {}", a),
        Some(ref a) => {
            println!("mailbox_address {:?} has no domain part", a);
            usable = false;
        },
        None => {
            println!("mailbox_address is not set");
            usable = false;
        },
    }
    match config.forward_to {
        Some(ref a) if a.contains('@') => println!("forwarding to {}", a),
        Some(ref a) => {
            println!("forward_to {:?} has no domain part", a);
            usable = false;
        },
        None => {
            println!("forward_to is not set");
            usable = false;
        },
    }

    println!("marker        {:?}", config.srs.marker);
    match config.sent_folder {
        Some(ref f) => println!("sent copies   {:?}", f),
        None => println!("sent copies   (not kept)"),
    }
    match config.archive_folder {
        Some(ref f) => println!("archiving to  {:?}", f),
        None => println!("archiving     (disabled)"),
    }

    if config.srs.hash_key == DEFAULT_HASH_KEY {
        println!(
            "srs.hash_key is the well-known placeholder; \
             set a real secret before going live"
        );
    }

    if !usable {
        EX_CONFIG.exit()
    }
}

fn encode(cmd: EncodeSubcommand) {
    let config = load_config(&cmd.common);

    let target = match config.forward_to.as_ref().and_then(|f| {
        MailAddress::parse(None, f)
    }) {
        Some(t) => t,
        None => {
            eprintln!("forward_to is not set to a usable address");
            EX_CONFIG.exit()
        },
    };
    let orig = match MailAddress::parse(None, &cmd.address) {
        Some(o) => o,
        None => {
            eprintln!("Not an address: {:?}", cmd.address);
            EX_USAGE.exit()
        },
    };

    match Srs::new(&config.srs).encode(
        &orig.domain,
        &orig.local_part,
        &target.domain,
        &target.local_part,
    ) {
        Ok(address) => println!("{}", address),
        Err(e) => {
            eprintln!("{}", e);
            EX_DATAERR.exit()
        },
    }
}

fn decode(cmd: DecodeSubcommand) {
    let config = load_config(&cmd.common);

    match Srs::new(&config.srs).decode(&cmd.address) {
        Ok(decoded) => {
            println!("{}@{}", decoded.local_part, decoded.domain)
        },
        Err(e @ Error::MalformedSrsAddress)
        | Err(e @ Error::SrsVerification) => {
            eprintln!("{}", e);
            EX_DATAERR.exit()
        },
        Err(e) => {
            eprintln!("{}", e);
            EX_SOFTWARE.exit()
        },
    }
}
