use super::backend::Channel;
use super::{Element, Rank, Tag};
use crate::error::{LifeError, Result};
use crate::grid::try_copied;
use crossbeam::channel::{Receiver, Sender};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use tracing::{trace, warn};

/// One message on the wire: a tag and the elements it carries.
#[derive(Debug)]
pub struct Envelope<T> {
    pub tag: Tag,
    pub payload: Vec<T>,
}

/// A channel-based communicator for shards running as threads of one process.
///
/// Every ordered pair of ranks (including a rank and itself) has its own unbounded
/// `crossbeam` channel. `outboxes[d]` sends to rank `d`; `inboxes[s]` receives from rank
/// `s`. Because the only sender feeding `inboxes[s]` lives in rank `s`'s communicator,
/// a receive from a shard that has gone away fails instead of blocking forever.
///
/// Sends never block. A receive for `(source, tag)` takes the oldest matching message
/// from `source`; messages from that source with a different tag are parked in a
/// stash until someone asks for them. The stash is never pruned: a message whose tag
/// is never received stays parked until the communicator is dropped, which logs a
/// warning for it.
pub struct Communicator<T: Element> {
    rank: Rank,
    world_size: usize,
    outboxes: Vec<Sender<Envelope<T>>>,
    inboxes: Vec<Receiver<Envelope<T>>>,
    stash: RefCell<HashMap<(Rank, Tag), VecDeque<Vec<T>>>>,
}

impl<T: Element> Communicator<T> {
    /// Creates a communicator from its row of the channel matrix.
    ///
    /// Both vectors hold exactly one endpoint per rank, indexed by peer.
    pub(crate) fn from_parts(
        rank: Rank,
        world_size: usize,
        outboxes: Vec<Sender<Envelope<T>>>,
        inboxes: Vec<Receiver<Envelope<T>>>,
    ) -> Self {
        Self {
            rank,
            world_size,
            outboxes,
            inboxes,
            stash: RefCell::new(HashMap::new()),
        }
    }

    fn outbox(&self, dest: Rank) -> Result<&Sender<Envelope<T>>> {
        self.outboxes.get(dest).ok_or(LifeError::InvalidRank {
            rank: dest,
            size: self.world_size,
        })
    }

    fn inbox(&self, source: Rank) -> Result<&Receiver<Envelope<T>>> {
        self.inboxes.get(source).ok_or(LifeError::InvalidRank {
            rank: source,
            size: self.world_size,
        })
    }

    /// Number of messages that arrived but have not been received yet.
    pub(crate) fn parked(&self) -> usize {
        self.stash.borrow().values().map(VecDeque::len).sum()
    }

    /// Takes the oldest payload from `source` tagged `tag`, parking anything else.
    fn take(&self, source: Rank, tag: Tag) -> Result<Vec<T>> {
        if let Some(payload) = self
            .stash
            .borrow_mut()
            .get_mut(&(source, tag))
            .and_then(VecDeque::pop_front)
        {
            return Ok(payload);
        }

        let inbox = self.inbox(source)?;
        loop {
            let envelope = inbox
                .recv()
                .map_err(|_| LifeError::Disconnected { peer: source })?;
            if envelope.tag == tag {
                return Ok(envelope.payload);
            }
            trace!(
                rank = self.rank,
                source,
                tag = envelope.tag,
                "parking out-of-order message"
            );
            self.stash
                .borrow_mut()
                .entry((source, envelope.tag))
                .or_default()
                .push_back(envelope.payload);
        }
    }
}

impl<T: Element> Drop for Communicator<T> {
    fn drop(&mut self) {
        let parked = self.parked();
        if parked > 0 {
            warn!(rank = self.rank, parked, "dropping unreceived messages");
        }
    }
}

impl<T: Element> Channel<T> for Communicator<T> {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.world_size
    }

    fn send(&self, buf: &[T], dest: Option<Rank>, tag: Tag) -> Result<()> {
        let Some(dest) = dest else {
            return Ok(());
        };
        let outbox = self.outbox(dest)?;
        let payload = try_copied(buf, "message buffer")?;

        outbox
            .send(Envelope { tag, payload })
            .map_err(|_| LifeError::Disconnected { peer: dest })?;
        trace!(rank = self.rank, dest, tag, len = buf.len(), "sent");
        Ok(())
    }

    fn recv(&self, buf: &mut [T], source: Option<Rank>, tag: Tag) -> Result<()> {
        let Some(source) = source else {
            return Ok(());
        };
        let payload = self.take(source, tag)?;
        if payload.len() != buf.len() {
            return Err(LifeError::Communication {
                peer: source,
                reason: format!(
                    "expected {} elements with tag {tag}, received {}",
                    buf.len(),
                    payload.len()
                ),
            });
        }

        buf.copy_from_slice(&payload);
        trace!(rank = self.rank, source, tag, len = buf.len(), "received");
        Ok(())
    }
}
