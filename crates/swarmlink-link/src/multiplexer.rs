use std::collections::VecDeque;
use std::fmt;

use swarmlink_transport::{LineTransport, TransportError};
use swarmlink_wire::{reply_payload, Command, ReplyValue};
use tokio::sync::{watch, Mutex};
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use crate::config::LinkConfig;
use crate::error::{LinkError, Result};
use crate::handshake::{bring_up, HandshakeConfig, HandshakeResult};
use crate::state::LinkState;

/// Owns one line transport and multiplexes request/reply exchanges with
/// unsolicited notifications over it.
///
/// At most one correlated exchange is in flight: `send_and_wait` holds the
/// exclusive section from the write until its reply has been read. Lines that
/// are not replies are queued and handed out by `poll_notification`, oldest
/// first, before any fresh input.
///
/// Share it behind an `Arc`; every operation takes `&self`.
pub struct Multiplexer {
    exchange: Mutex<Exchange>,
    state: watch::Sender<LinkState>,
    config: LinkConfig,
}

/// Everything guarded by the exclusive section.
struct Exchange {
    transport: Box<dyn LineTransport>,
    pending: VecDeque<String>,
    /// Replies still owed to requests that timed out.
    orphaned_replies: usize,
}

impl Multiplexer {
    /// Wrap `transport`. The link starts `Uninitialized`.
    pub fn new(transport: Box<dyn LineTransport>, config: LinkConfig) -> Self {
        let (state, _) = watch::channel(LinkState::Uninitialized);
        Self {
            exchange: Mutex::new(Exchange {
                transport,
                pending: VecDeque::new(),
                orphaned_replies: 0,
            }),
            state,
            config,
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Current connection state.
    pub fn state(&self) -> LinkState {
        *self.state.borrow()
    }

    /// Receiver that observes every state transition.
    pub fn watch_state(&self) -> watch::Receiver<LinkState> {
        self.state.subscribe()
    }

    /// Reset the board and wait for its CLI banner, then go `Ready`.
    ///
    /// Any failure closes the transport and leaves the link `Closed`.
    pub async fn handshake(&self, config: &HandshakeConfig) -> Result<HandshakeResult> {
        let mut exchange = self.exchange.lock().await;
        self.ensure_state(LinkState::Uninitialized, "handshake")?;
        self.set_state(LinkState::Handshaking);

        match bring_up(exchange.transport.as_mut(), config).await {
            Ok(result) => {
                info!(banner = %result.banner, "handshake complete");
                self.set_state(LinkState::Ready);
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, "handshake failed");
                if let Err(close_err) = exchange.transport.close().await {
                    debug!(error = %close_err, "closing transport after failed handshake");
                }
                self.set_state(LinkState::Closed);
                Err(err)
            }
        }
    }

    /// Go `Ready` without bring-up, for a board already in CLI mode.
    pub async fn skip_handshake(&self) -> Result<()> {
        let _exchange = self.exchange.lock().await;
        self.ensure_state(LinkState::Uninitialized, "skip handshake")?;
        self.set_state(LinkState::Ready);
        Ok(())
    }

    /// Write `command` and, if `expect_reply`, wait for its reply payload.
    ///
    /// Lines read while waiting that are not replies are queued in arrival
    /// order. Fails with [`LinkError::Timeout`] after the configured reply
    /// timeout; the next reply to arrive afterwards is discarded as late.
    pub async fn send_and_wait(
        &self,
        command: &Command,
        expect_reply: bool,
    ) -> Result<Option<String>> {
        self.ensure_ready("send")?;
        let mut exchange = self.exchange.lock().await;
        self.ensure_ready("send")?;

        let line = command.to_line();
        if let Err(err) = exchange.transport.write_line(&line).await {
            return Err(self.fail(err));
        }
        debug!(%line, "sent command");

        if !expect_reply {
            return Ok(None);
        }

        let max_pending = self.config.max_pending_notifications;
        let orphans_before = exchange.orphaned_replies;
        let waited = timeout(self.config.reply_timeout, exchange.await_reply(max_pending)).await;
        match waited {
            Ok(Ok(payload)) => Ok(Some(payload)),
            Ok(Err(err)) => Err(self.fail(err)),
            Err(_) => {
                // A reply discarded during this wait was most likely our own,
                // so nothing new is owed. At most one reply is ever owed.
                if exchange.orphaned_replies == orphans_before {
                    exchange.orphaned_replies = 1;
                }
                warn!(
                    %line,
                    timeout = ?self.config.reply_timeout,
                    "no reply in time"
                );
                Err(LinkError::Timeout(self.config.reply_timeout))
            }
        }
    }

    /// `send_and_wait` using the command's own reply expectation, with the
    /// payload parsed.
    pub async fn send(&self, command: &Command) -> Result<Option<ReplyValue>> {
        let payload = self
            .send_and_wait(command, command.expects_reply())
            .await?;
        Ok(payload.as_deref().map(ReplyValue::parse))
    }

    /// Next line that was not consumed as a reply, or `None` if nothing is
    /// waiting.
    ///
    /// Queued lines come first. Otherwise this only reads when bytes are
    /// already available, and gives up on a partial line after the
    /// configured line read timeout, leaving it buffered.
    pub async fn poll_notification(&self) -> Result<Option<String>> {
        self.ensure_ready("poll")?;
        let mut exchange = self.exchange.lock().await;
        self.ensure_ready("poll")?;

        if let Some(line) = exchange.pending.pop_front() {
            return Ok(Some(line));
        }

        match exchange.transport.bytes_available().await {
            Ok(true) => {}
            Ok(false) => return Ok(None),
            Err(err) => return Err(self.fail(err)),
        }

        let read = timeout(self.config.line_read_timeout, exchange.transport.read_line()).await;
        let line = match read {
            Ok(Ok(line)) => line,
            Ok(Err(TransportError::LineTooLong { len, max })) => {
                warn!(len, max, "dropping overlong line");
                return Ok(None);
            }
            Ok(Err(err)) => return Err(self.fail(err)),
            Err(_) => {
                trace!("line still incomplete");
                return Ok(None);
            }
        };

        if exchange.orphaned_replies > 0 && reply_payload(&line).is_some() {
            exchange.orphaned_replies -= 1;
            warn!(%line, "discarding late reply");
            return Ok(None);
        }

        debug!(%line, "read line");
        Ok(Some(line))
    }

    /// Number of queued lines.
    pub async fn pending_notifications(&self) -> usize {
        self.exchange.lock().await.pending.len()
    }

    /// Close the transport. Idempotent; the link stays `Closed`.
    pub async fn close(&self) -> Result<()> {
        self.set_state(LinkState::Closed);

        let mut exchange = self.exchange.lock().await;
        exchange.pending.clear();
        if exchange.transport.is_closed() {
            return Ok(());
        }
        exchange.transport.close().await?;
        Ok(())
    }

    fn ensure_ready(&self, operation: &'static str) -> Result<()> {
        self.ensure_state(LinkState::Ready, operation)
    }

    fn ensure_state(&self, expected: LinkState, operation: &'static str) -> Result<()> {
        match self.state() {
            state if state == expected => Ok(()),
            LinkState::Closed => Err(LinkError::Closed),
            state => Err(LinkError::InvalidState { state, operation }),
        }
    }

    fn set_state(&self, next: LinkState) {
        self.state.send_if_modified(|current| {
            if !current.can_transition_to(next) {
                return false;
            }
            info!(from = %current, to = %next, "link state changed");
            *current = next;
            true
        });
    }

    /// Map a transport failure, closing the link when it is gone for good.
    fn fail(&self, err: TransportError) -> LinkError {
        if err.is_closed() {
            self.set_state(LinkState::Closed);
        }
        LinkError::Transport(err)
    }
}

impl Exchange {
    async fn await_reply(&mut self, max_pending: usize) -> std::result::Result<String, TransportError> {
        loop {
            let line = match self.transport.read_line().await {
                Ok(line) => line,
                Err(TransportError::LineTooLong { len, max }) => {
                    warn!(len, max, "dropping overlong line");
                    continue;
                }
                Err(err) => return Err(err),
            };

            let Some(payload) = reply_payload(&line) else {
                self.enqueue(line, max_pending);
                continue;
            };

            if self.orphaned_replies > 0 {
                self.orphaned_replies -= 1;
                warn!(payload, "discarding late reply");
                continue;
            }
            debug!(payload, "received reply");
            return Ok(payload.to_string());
        }
    }

    fn enqueue(&mut self, line: String, max_pending: usize) {
        if self.pending.len() >= max_pending {
            if let Some(dropped) = self.pending.pop_front() {
                warn!(%dropped, "notification queue full, dropping oldest");
            }
        }
        debug!(%line, "buffered notification");
        self.pending.push_back(line);
    }
}

impl fmt::Debug for Multiplexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Multiplexer")
            .field("state", &self.state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
