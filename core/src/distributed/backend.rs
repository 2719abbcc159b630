use super::{Element, Rank, Tag};
use crate::error::{LifeError, Result};

/// A send that has been posted but not yet waited on.
#[derive(Debug)]
#[must_use = "a posted send must be completed with `wait_send`"]
pub struct SendRequest {
    dest: Option<Rank>,
    tag: Tag,
}

impl SendRequest {
    /// Destination of the send, `None` for the null process.
    pub fn dest(&self) -> Option<Rank> {
        self.dest
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }
}

/// A receive that has been posted but not yet waited on.
///
/// The request only records *what* to match. The destination buffer is handed over at
/// `wait_recv`, so the caller keeps ownership of its memory in the meantime.
#[derive(Debug)]
#[must_use = "a posted receive must be completed with `wait_recv`"]
pub struct RecvRequest {
    source: Option<Rank>,
    tag: Tag,
    len: usize,
}

/// Point-to-point messaging between the shards of one group.
///
/// This trait allows swapping the transport without touching the halo exchange or the
/// collectives:
/// - **Channels**: [`Communicator`](super::Communicator), one thread per shard.
/// - Anything else that can move a tagged slice from one rank to another.
///
/// Implementors provide `send` and `recv`. The posted (`isend`/`irecv`) and combined
/// (`sendrecv`) forms have default implementations on top of them that are correct for
/// any transport whose sends are buffered, i.e. never wait for the receiver.
pub trait Channel<T: Element> {
    /// Returns the rank of this shard.
    fn rank(&self) -> Rank;

    /// Returns the number of shards in the group.
    fn world_size(&self) -> usize;

    /// Sends `buf` to `dest` with the given tag. A `None` destination is a no-op.
    fn send(&self, buf: &[T], dest: Option<Rank>, tag: Tag) -> Result<()>;

    /// Receives the oldest message from `source` carrying `tag` into `buf`.
    ///
    /// A `None` source is a no-op and leaves `buf` untouched. The message must hold
    /// exactly `buf.len()` elements.
    fn recv(&self, buf: &mut [T], source: Option<Rank>, tag: Tag) -> Result<()>;

    /// Sends `send` to `dest` while receiving from `source` into `recv`.
    ///
    /// Both halves may involve the null process independently.
    fn sendrecv(
        &self,
        send: &[T],
        dest: Option<Rank>,
        send_tag: Tag,
        recv: &mut [T],
        source: Option<Rank>,
        recv_tag: Tag,
    ) -> Result<()> {
        self.send(send, dest, send_tag)?;
        self.recv(recv, source, recv_tag)
    }

    /// Posts a send. The data is captured before this returns.
    fn isend(&self, buf: &[T], dest: Option<Rank>, tag: Tag) -> Result<SendRequest> {
        self.send(buf, dest, tag)?;
        Ok(SendRequest { dest, tag })
    }

    /// Posts a receive of `len` elements from `source`.
    fn irecv(&self, source: Option<Rank>, tag: Tag, len: usize) -> RecvRequest {
        RecvRequest { source, tag, len }
    }

    /// Blocks until a posted send has completed.
    fn wait_send(&self, _request: SendRequest) -> Result<()> {
        Ok(())
    }

    /// Blocks until a posted receive has completed, writing the message into `buf`.
    fn wait_recv(&self, request: RecvRequest, buf: &mut [T]) -> Result<()> {
        if buf.len() != request.len {
            return Err(LifeError::ShapeMismatch {
                expected: vec![request.len],
                got: vec![buf.len()],
            });
        }
        self.recv(buf, request.source, request.tag)
    }
}
