//! The abstract message transport between two isolated execution contexts.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use tokio::sync::mpsc;

use tetherwire::Message;

/// Typed identity of one channel endpoint.
///
/// The exposure registry is keyed by this, so two endpoints of the same
/// in-memory pair are distinct channels for registration purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u64);

static NEXT_CHANNEL: AtomicU64 = AtomicU64::new(1);

impl ChannelId {
    /// Allocate a process-unique channel identity.
    pub fn fresh() -> Self {
        ChannelId(NEXT_CHANNEL.fetch_add(1, Ordering::Relaxed))
    }
}

/// One endpoint of an asynchronous, bidirectional message transport.
///
/// Implement this trait to carry tether over a new medium (pipes, sockets,
/// worker queues). The engine assumes nothing about delivery except FIFO
/// ordering per direction: an action and its reply must not be reordered,
/// nor a callback ref's creation and its invocation.
///
/// `send` mirrors `postMessage`: a non-blocking enqueue with no delivery
/// confirmation. A lost message surfaces as a request that never resolves,
/// which is out of scope for the engine.
pub trait Channel: Send + Sync + 'static {
    /// Identity of this endpoint.
    fn id(&self) -> ChannelId;

    /// Enqueue a message toward the other side. Must not block.
    fn send(&self, message: Message) -> anyhow::Result<()>;

    /// Register a new incoming-message stream.
    ///
    /// Every live subscriber sees every incoming message. Dropping the
    /// receiver detaches the handler.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<Message>;
}
