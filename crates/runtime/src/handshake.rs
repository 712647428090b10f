//! Yes/no confirmation from a specific counterparty.
//!
//! A challenge (duel, coinflip, faction invite) is addressed to one user in
//! one channel. The request parks a oneshot sender keyed by
//! `(channel, counterparty)`; the counterparty's answer in that channel
//! completes it. No answer within the timeout aborts the challenge.
//!
//! Nothing here touches storage: an unanswered challenge leaves no trace.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use arena_core::UserId;
use thiserror::Error;
use tokio::sync::oneshot;

type Key = (String, UserId);

struct Waiter {
    ticket: u64,
    reply: oneshot::Sender<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Accepted,
    Declined,
    TimedOut,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("{counterparty} already has a pending challenge in {channel}")]
    AlreadyPending { channel: String, counterparty: UserId },
}

/// Registry of challenges awaiting an answer.
#[derive(Clone)]
pub struct ConfirmationBroker {
    waiters: Arc<Mutex<HashMap<Key, Waiter>>>,
    next_ticket: Arc<AtomicU64>,
    timeout: Duration,
}

impl ConfirmationBroker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            waiters: Arc::new(Mutex::new(HashMap::new())),
            next_ticket: Arc::new(AtomicU64::new(1)),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn waiters(&self) -> MutexGuard<'_, HashMap<Key, Waiter>> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a challenge for `counterparty` in `channel`.
    ///
    /// Only one challenge per counterparty and channel may be open at a time.
    pub fn request(
        &self,
        channel: &str,
        counterparty: &UserId,
    ) -> Result<PendingConfirmation, HandshakeError> {
        let key = (channel.to_owned(), counterparty.clone());
        let (reply, answer) = oneshot::channel();
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);

        let mut waiters = self.waiters();
        if waiters.contains_key(&key) {
            return Err(HandshakeError::AlreadyPending {
                channel: key.0,
                counterparty: key.1,
            });
        }
        waiters.insert(key.clone(), Waiter { ticket, reply });
        drop(waiters);

        tracing::debug!(channel, %counterparty, ticket, "awaiting confirmation");
        Ok(PendingConfirmation {
            broker: self.clone(),
            key,
            ticket,
            answer,
        })
    }

    /// Deliver `responder`'s answer. Returns false when nothing was waiting on them.
    pub fn respond(&self, channel: &str, responder: &UserId, accept: bool) -> bool {
        let key = (channel.to_owned(), responder.clone());
        let Some(waiter) = self.waiters().remove(&key) else {
            return false;
        };
        waiter.reply.send(accept).is_ok()
    }

    /// Challenges still open.
    pub fn pending(&self) -> usize {
        self.waiters().len()
    }

    fn release(&self, key: &Key, ticket: u64) {
        let mut waiters = self.waiters();
        if waiters.get(key).is_some_and(|w| w.ticket == ticket) {
            waiters.remove(key);
        }
    }
}

/// An open challenge. Dropping it withdraws the challenge.
pub struct PendingConfirmation {
    broker: ConfirmationBroker,
    key: Key,
    ticket: u64,
    answer: oneshot::Receiver<bool>,
}

impl PendingConfirmation {
    pub fn counterparty(&self) -> &UserId {
        &self.key.1
    }

    /// Wait for the answer, bounded by the broker's timeout.
    pub async fn wait(mut self) -> Confirmation {
        let timeout = self.broker.timeout;
        match tokio::time::timeout(timeout, &mut self.answer).await {
            Ok(Ok(true)) => Confirmation::Accepted,
            Ok(Ok(false)) | Ok(Err(_)) => Confirmation::Declined,
            Err(_) => {
                tracing::debug!(
                    channel = %self.key.0,
                    counterparty = %self.key.1,
                    "confirmation timed out"
                );
                Confirmation::TimedOut
            }
        }
    }
}

impl Drop for PendingConfirmation {
    fn drop(&mut self) {
        self.broker.release(&self.key, self.ticket);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broker(ms: u64) -> ConfirmationBroker {
        ConfirmationBroker::new(Duration::from_millis(ms))
    }

    #[tokio::test]
    async fn accepted_answer_is_delivered() {
        let broker = broker(1_000);
        let bob = UserId::from("bob");
        let pending = broker.request("general", &bob).unwrap();

        assert!(broker.respond("general", &bob, true));
        assert_eq!(pending.wait().await, Confirmation::Accepted);
        assert_eq!(broker.pending(), 0);
    }

    #[tokio::test]
    async fn declined_answer_is_delivered() {
        let broker = broker(1_000);
        let bob = UserId::from("bob");
        let pending = broker.request("general", &bob).unwrap();

        let responder = broker.clone();
        let answer = tokio::spawn(async move { responder.respond("general", &bob, false) });

        assert_eq!(pending.wait().await, Confirmation::Declined);
        assert!(answer.await.unwrap());
    }

    #[tokio::test]
    async fn only_the_counterparty_in_that_channel_can_answer() {
        let broker = broker(50);
        let bob = UserId::from("bob");
        let pending = broker.request("general", &bob).unwrap();

        assert!(!broker.respond("general", &UserId::from("eve"), true));
        assert!(!broker.respond("random", &bob, true));
        assert_eq!(pending.wait().await, Confirmation::TimedOut);
        assert_eq!(broker.pending(), 0);
    }

    #[tokio::test]
    async fn one_open_challenge_per_counterparty() {
        let broker = broker(1_000);
        let bob = UserId::from("bob");
        let first = broker.request("general", &bob).unwrap();

        assert!(matches!(
            broker.request("general", &bob),
            Err(HandshakeError::AlreadyPending { .. })
        ));
        assert!(broker.request("trade", &bob).is_ok());

        drop(first);
        assert!(broker.request("general", &bob).is_ok());
    }
}
