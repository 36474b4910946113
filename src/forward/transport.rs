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

use crate::forward::model::Message;
use crate::support::error::Error;

/// Identifies one message within the watched mailbox for the duration of a
/// pass. Assigned by the transport; opaque to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u32);

/// The only query shape the engine issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Matches messages where any To address contains any of the given
    /// substrings.
    ToContainsAny(Vec<String>),
}

/// The mail-transport capability consumed by the engine.
///
/// Implementations own connection, authentication, and wire protocol;
/// typically an IMAP client for `search`/`fetch`/`append`/`move_to_folder`
/// and an SMTP submission client for `send`. The engine performs no I/O of
/// its own and blocks on each call, so implementations are free to keep a
/// single connection per pass.
///
/// Any `Err` from these methods is a transport failure: the engine aborts
/// the remainder of the pass and surfaces the error to its caller, which
/// owns retry and backoff.
pub trait Transport {
    /// Searches the watched mailbox, returning matching ids in mailbox
    /// order. The engine processes them strictly in this order.
    fn search(&mut self, query: &SearchQuery) -> Result<Vec<MessageId>, Error>;

    /// Fetches the envelope of one message.
    fn fetch(&mut self, id: MessageId) -> Result<Message, Error>;

    /// Submits a message for delivery.
    fn send(&mut self, message: &Message) -> Result<(), Error>;

    /// Appends a copy of `message` to `folder`.
    fn append(&mut self, folder: &str, message: &Message) -> Result<(), Error>;

    /// Whether the transport can move messages between folders. Archival is
    /// skipped entirely when this is false.
    fn supports_move(&self) -> bool;

    /// Moves the identified message out of the watched mailbox into
    /// `folder`.
    fn move_to_folder(
        &mut self,
        id: MessageId,
        folder: &str,
    ) -> Result<(), Error>;
}
