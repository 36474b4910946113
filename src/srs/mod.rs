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

//! The Sender Rewriting Scheme address codec.
//!
//! When mail is forwarded, the new hop's domain no longer matches the
//! original envelope sender, which trips SPF-style sender authentication at
//! the destination. SRS rewrites the sender into an address under the
//! forwarding domain that embeds the original domain and local part, a
//! rolling timestamp tag, and a short keyed hash tag:
//!
//! ```text
//! SRS0=<3-char hash>=<2-char timestamp>=<orig domain>=<orig local>@<new domain>
//! ```
//!
//! The scheme is deliberately stateless: everything needed to route a bounce
//! back to the original sender travels inside the address string itself. The
//! hash tag is a truncated MAC (about 15 bits) that deters casual forgery of
//! return addresses; it is not cryptographic-grade and must not be lengthened
//! without breaking compatibility with addresses already in the wild.

pub mod address;
pub mod base32;
pub mod tag;

pub use self::address::{DecodedSrsAddress, Srs};
