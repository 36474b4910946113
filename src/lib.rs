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

//! Mailward forwards mail arriving at one mailbox to a designated external
//! address, rewriting the sender with SRS so the forwarded copy stays
//! aligned with sender-authentication checks, and reverses the rewrite when
//! a bounce comes back.
//!
//! The crate is the forwarding *core*: the SRS codec ([`srs`]) and the
//! per-message decision engine ([`forward::engine`]). Mail transport is a
//! collaborator behind [`forward::transport::Transport`]; a host implements
//! that trait with its IMAP/SMTP client of choice and calls
//! [`forward::engine::Forwarder::run_pass`] from its own scheduler, which
//! owns intervals, retry, backoff, and cancellation.

#[cfg(test)]
macro_rules! assert_matches {
    ($expected:pat, $actual:expr $(,)?) => {
        match $actual {
            $expected => (),
            unexpected => panic!(
                "Expected {} matches {}, got {:?}",
                stringify!($expected),
                stringify!($actual),
                unexpected
            ),
        }
    };
}

pub mod cli;
pub mod forward;
pub mod srs;
pub mod support;

/// Log to stderr, for interactive use.
pub fn init_simple_log() {
    use log4rs::append::console::{ConsoleAppender, Target};
    use log4rs::config::{Appender, Config, Root};
    use log4rs::encode::pattern::PatternEncoder;

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S%.3f)} [{l}][{t}] {m}{n}",
        )))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(
            Root::builder()
                .appender("stderr")
                .build(log::LevelFilter::Debug),
        )
        .expect("Failed to build stderr logging config");
    // Ignore failure so tests can call this more than once.
    let _ = log4rs::init_config(config);
}
