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

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A configuration field without which no pass can run is unset. Aborts
    /// the current pass; the next scheduled pass will see any fixed
    /// configuration.
    #[error("Required configuration missing: {0}")]
    ConfigurationMissing(&'static str),
    /// A candidate SRS address did not have the expected shape. Per-message;
    /// never fatal to a pass.
    #[error("SRS address is structurally invalid")]
    MalformedSrsAddress,
    /// The recomputed hash tag did not match the one in the address.
    /// Per-message; the message is dropped without a send.
    #[error("SRS hash tag verification failed")]
    SrsVerification,
    /// An original-sender field contained a character the address format
    /// reserves as a separator.
    #[error("Cannot SRS-encode field containing '=' or '@': {0:?}")]
    UnencodableSrsField(String),
    /// Reported by the transport collaborator. Aborts the remainder of the
    /// pass; retry and backoff belong to the invoking scheduler.
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    ConfigParse(#[from] toml::de::Error),
    #[error(transparent)]
    Ssl(#[from] openssl::error::ErrorStack),
}
