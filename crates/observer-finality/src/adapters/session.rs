//! In-process flow sessions over tokio channels

use crate::error::{FinalityError, FinalityResult};
use crate::ports::outbound::FlowSession;
use async_trait::async_trait;
use shared_types::Party;
use tokio::sync::{mpsc, Mutex};
use tracing::trace;

/// One end of a bidirectional in-memory session.
///
/// `counterparty` is the party on the other end. Dropping one end closes the
/// session for the other: its `receive` drains what was already sent and then
/// yields `None`, and its `send` fails with `SessionClosed`.
pub struct ChannelSession {
    counterparty: Party,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    inbound: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl ChannelSession {
    /// Connected ends for `a` and `b`. The first end is held by `a` and talks
    /// to `b`; the second is held by `b` and talks to `a`.
    pub fn pair(a: &Party, b: &Party) -> (ChannelSession, ChannelSession) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        (
            ChannelSession {
                counterparty: b.clone(),
                outbound: a_tx,
                inbound: Mutex::new(a_rx),
            },
            ChannelSession {
                counterparty: a.clone(),
                outbound: b_tx,
                inbound: Mutex::new(b_rx),
            },
        )
    }
}

#[async_trait]
impl FlowSession for ChannelSession {
    fn counterparty(&self) -> &Party {
        &self.counterparty
    }

    async fn send(&self, payload: Vec<u8>) -> FinalityResult<()> {
        trace!(to = %self.counterparty, bytes = payload.len(), "[finality] Session send");
        self.outbound
            .send(payload)
            .map_err(|_| FinalityError::SessionClosed {
                counterparty: self.counterparty.name.clone(),
            })
    }

    async fn receive(&self) -> FinalityResult<Option<Vec<u8>>> {
        let payload = self.inbound.lock().await.recv().await;
        trace!(
            from = %self.counterparty,
            bytes = payload.as_ref().map(Vec::len),
            "[finality] Session receive"
        );
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::PublicKey;

    fn party(name: &str, seed: u8) -> Party {
        Party::new(name, PublicKey([seed; 32]))
    }

    #[tokio::test]
    async fn test_pair_delivers_in_order() {
        let alice = party("O=Alice", 1);
        let bob = party("O=Bob", 2);
        let (to_bob, to_alice) = ChannelSession::pair(&alice, &bob);

        assert_eq!(to_bob.counterparty(), &bob);
        assert_eq!(to_alice.counterparty(), &alice);

        to_bob.send(vec![1]).await.unwrap();
        to_bob.send(vec![2, 2]).await.unwrap();
        assert_eq!(to_alice.receive().await.unwrap(), Some(vec![1]));
        assert_eq!(to_alice.receive().await.unwrap(), Some(vec![2, 2]));

        to_alice.send(vec![3]).await.unwrap();
        assert_eq!(to_bob.receive().await.unwrap(), Some(vec![3]));
    }

    #[tokio::test]
    async fn test_drop_closes_session() {
        let alice = party("O=Alice", 1);
        let bob = party("O=Bob", 2);
        let (to_bob, to_alice) = ChannelSession::pair(&alice, &bob);

        to_bob.send(vec![9]).await.unwrap();
        drop(to_bob);

        assert_eq!(to_alice.receive().await.unwrap(), Some(vec![9]));
        assert_eq!(to_alice.receive().await.unwrap(), None);
        assert!(matches!(
            to_alice.send(vec![1]).await,
            Err(FinalityError::SessionClosed { .. })
        ));
    }
}
