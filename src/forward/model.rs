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

/// An email address with an optional display name.
///
/// Identity is `local_part@domain`; rule matching in the engine goes
/// through [`MailAddress::address`], so the display name never influences
/// a forwarding decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailAddress {
    /// The display name, if present.
    pub name: Option<String>,
    /// The part before the `@`.
    pub local_part: String,
    /// The part after the `@`.
    pub domain: String,
}

impl MailAddress {
    pub fn new(
        name: Option<String>,
        local_part: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        MailAddress {
            name,
            local_part: local_part.into(),
            domain: domain.into(),
        }
    }

    /// Splits `address` at its last `@`. SRS local parts may contain
    /// template-provided `@`-free structure but the domain never does.
    pub fn parse(name: Option<String>, address: &str) -> Option<Self> {
        let (local_part, domain) = address.rsplit_once('@')?;
        Some(MailAddress::new(name, local_part, domain))
    }

    /// The plain `local_part@domain` form.
    pub fn address(&self) -> String {
        format!("{}@{}", self.local_part, self.domain)
    }
}

/// The envelope fields of one fetched message.
///
/// Fetched transiently per processing pass and never persisted; the engine
/// mutates a copy and hands it to the transport for delivery.
#[derive(Debug, Clone, Default)]
pub struct Message {
    pub from: Vec<MailAddress>,
    pub to: Vec<MailAddress>,
    pub cc: Vec<MailAddress>,
    pub bcc: Vec<MailAddress>,
    pub reply_to: Vec<MailAddress>,
    pub sender: Option<MailAddress>,
    pub subject: Option<String>,
}
