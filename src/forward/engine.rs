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

use log::{debug, info, warn};

use crate::forward::model::{MailAddress, Message};
use crate::forward::transport::{MessageId, SearchQuery, Transport};
use crate::srs::Srs;
use crate::support::config::Config;
use crate::support::error::Error;

/// What happened to one message under one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Rewritten and dispatched toward the forwarding target.
    Forwarded,
    /// Decoded and dispatched back toward the original sender.
    Returned,
    /// Matched the search but no rule, or lacked the fields a rule needs.
    Skipped,
    /// A rule matched but the message could not be rewritten; it was
    /// dropped without a send.
    Failed,
}

/// Aggregated outcome of one pass, returned to the invoking scheduler.
///
/// A message satisfying both rules contributes two entries, one per
/// dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub forwarded: usize,
    pub returned: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl PassSummary {
    fn record(&mut self, disposition: Disposition) {
        match disposition {
            Disposition::Forwarded => self.forwarded += 1,
            Disposition::Returned => self.returned += 1,
            Disposition::Skipped => self.skipped += 1,
            Disposition::Failed => self.failed += 1,
        }
    }
}

/// The forwarding decision engine.
///
/// Owns no connection and no state beyond the read-only configuration; the
/// transport collaborator is passed into each pass. Scheduling, retry,
/// backoff, and cancellation all belong to the caller — a cancelled
/// scheduler simply stops invoking [`Forwarder::run_pass`].
pub struct Forwarder {
    config: Config,
    srs: Srs,
}

impl Forwarder {
    pub fn new(config: Config) -> Self {
        let srs = Srs::new(&config.srs);
        Forwarder { config, srs }
    }

    /// Runs one synchronous processing pass.
    ///
    /// Messages are processed strictly in the order the transport's search
    /// returns them. Two independent rules are evaluated per message:
    ///
    /// - FORWARD: a To address equals the configured mailbox address,
    ///   case-sensitively. The message is re-addressed to the forward
    ///   target with an SRS-rewritten From.
    /// - RETURN: a To address contains the configured marker. The SRS
    ///   address is decoded and verified and the message re-addressed to
    ///   the recovered original sender; on verification failure it is
    ///   dropped without a send.
    ///
    /// Per-message problems are recorded in the summary and do not stop
    /// the pass; any transport error aborts it.
    pub fn run_pass(
        &self,
        transport: &mut dyn Transport,
    ) -> Result<PassSummary, Error> {
        let mailbox_address = self
            .config
            .mailbox_address
            .as_deref()
            .ok_or(Error::ConfigurationMissing("mailbox_address"))?;
        // An address we cannot split is as unusable as no address.
        let mailbox = MailAddress::parse(
            display_name(&self.config.mailbox_name),
            mailbox_address,
        )
        .ok_or(Error::ConfigurationMissing("mailbox_address"))?;
        let target = MailAddress::parse(
            display_name(&self.config.forward_to_name),
            self.config
                .forward_to
                .as_deref()
                .ok_or(Error::ConfigurationMissing("forward_to"))?,
        )
        .ok_or(Error::ConfigurationMissing("forward_to"))?;

        let marker = self.config.srs.marker.clone();
        debug!("pass start: watching {}", mailbox_address);

        let ids = transport.search(&SearchQuery::ToContainsAny(vec![
            mailbox_address.to_owned(),
            marker.clone(),
        ]))?;
        debug!("pass: {} candidate message(s)", ids.len());

        let mut summary = PassSummary::default();
        for id in ids {
            let message = transport.fetch(id)?;
            let mut matched = false;

            if message
                .to
                .iter()
                .any(|a| a.address() == mailbox_address)
            {
                matched = true;
                summary.record(
                    self.forward_message(transport, id, &message, &target)?,
                );
            }

            if let Some(srs_to) = message
                .to
                .iter()
                .find(|a| a.address().contains(marker.as_str()))
            {
                matched = true;
                summary.record(self.return_message(
                    transport, id, &message, srs_to, &mailbox,
                )?);
            }

            if !matched {
                // The transport's search may match more loosely than the
                // rules (IMAP substring search is case-insensitive).
                debug!("message {:?} matched no rule", id);
                summary.record(Disposition::Skipped);
            }
        }

        debug!("pass end: {:?}", summary);
        Ok(summary)
    }

    /// Applies the FORWARD rewrite and dispatches.
    fn forward_message(
        &self,
        transport: &mut dyn Transport,
        id: MessageId,
        message: &Message,
        target: &MailAddress,
    ) -> Result<Disposition, Error> {
        let orig_from = match message.from.first() {
            Some(a) => a.clone(),
            None => {
                warn!("message {:?} has no From address; not forwarding", id);
                return Ok(Disposition::Skipped);
            },
        };

        let srs_address = match self.srs.encode(
            &orig_from.domain,
            &orig_from.local_part,
            &target.domain,
            &target.local_part,
        ) {
            Ok(a) => a,
            Err(e) => {
                warn!(
                    "message {:?}: cannot rewrite sender {}: {}",
                    id,
                    orig_from.address(),
                    e,
                );
                return Ok(Disposition::Failed);
            },
        };
        let new_from =
            match MailAddress::parse(orig_from.name.clone(), &srs_address) {
                Some(a) => a,
                None => {
                    warn!(
                        "message {:?}: template produced a domainless \
                         address {:?}",
                        id, srs_address,
                    );
                    return Ok(Disposition::Failed);
                },
            };

        info!(
            "forward message {:?}: sender {} recipient {} subject {:?}",
            id,
            orig_from.address(),
            target.address(),
            message.subject,
        );

        let mut outgoing = message.clone();
        outgoing.to = vec![target.clone()];
        outgoing.from = vec![new_from];
        outgoing.reply_to = vec![orig_from];
        outgoing.cc.clear();
        outgoing.bcc.clear();
        outgoing.sender = None;

        self.dispatch(transport, id, &outgoing)?;
        Ok(Disposition::Forwarded)
    }

    /// Applies the RETURN rewrite and dispatches, or drops the message if
    /// the candidate address does not verify.
    fn return_message(
        &self,
        transport: &mut dyn Transport,
        id: MessageId,
        message: &Message,
        srs_to: &MailAddress,
        mailbox: &MailAddress,
    ) -> Result<Disposition, Error> {
        let decoded = match self.srs.decode(&srs_to.address()) {
            Ok(d) => d,
            Err(e @ Error::MalformedSrsAddress)
            | Err(e @ Error::SrsVerification) => {
                // Fail closed: a bounce target we cannot verify could have
                // been forged to bounce-relay spam through us.
                warn!(
                    "message {:?}: dropping return candidate {}: {}",
                    id,
                    srs_to.address(),
                    e,
                );
                return Ok(Disposition::Failed);
            },
            Err(e) => return Err(e),
        };

        let new_to = MailAddress::new(
            srs_to.name.clone(),
            decoded.local_part,
            decoded.domain,
        );
        info!(
            "return message {:?}: sender {} recipient {} subject {:?}",
            id,
            mailbox.address(),
            new_to.address(),
            message.subject,
        );

        let mut outgoing = message.clone();
        outgoing.to = vec![new_to];
        outgoing.from = vec![mailbox.clone()];
        outgoing.reply_to = vec![mailbox.clone()];
        outgoing.cc.clear();
        outgoing.bcc.clear();
        outgoing.sender = None;

        self.dispatch(transport, id, &outgoing)?;
        Ok(Disposition::Returned)
    }

    /// Sends `message`, then runs the two best-effort side effects: append
    /// a copy to the sent folder and move the original to the archive
    /// folder. Only the send itself can fail the pass.
    fn dispatch(
        &self,
        transport: &mut dyn Transport,
        id: MessageId,
        message: &Message,
    ) -> Result<(), Error> {
        transport.send(message)?;

        if let Some(ref folder) = self.config.sent_folder {
            if let Err(e) = transport.append(folder, message) {
                warn!("could not append copy to {:?}: {}", folder, e);
            }
        }

        if let Some(ref folder) = self.config.archive_folder {
            if transport.supports_move() {
                if let Err(e) = transport.move_to_folder(id, folder) {
                    warn!(
                        "could not archive message {:?} to {:?}: {}",
                        id, folder, e,
                    );
                }
            }
        }

        Ok(())
    }
}

fn display_name(name: &str) -> Option<String> {
    if name.is_empty() {
        None
    } else {
        Some(name.to_owned())
    }
}
