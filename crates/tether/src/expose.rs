//! Host dispatcher: binds a target object to a channel.
//!
//! At most one object may be exposed per channel at a time; the process-wide
//! registry enforces that, and disposal is what frees the slot. Nothing ever
//! escapes the dispatch task: every target-side failure is caught at this
//! boundary and reported as a `RESULT_ERROR`.

use std::sync::Arc;
use std::sync::LazyLock;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;
use tracing::warn;

use tetherwire::ApplyData;
use tetherwire::ErrorDescriptor;
use tetherwire::Message;
use tetherwire::Token;
use tetherwire::WireArg;

use crate::channel::Channel;
use crate::channel::ChannelId;
use crate::error::Error;
use crate::error::Result;
use crate::target::CallArg;
use crate::target::RemoteCallback;
use crate::target::RemoteTarget;

/// Which channels currently serve an exposed object.
static EXPOSURES: LazyLock<DashMap<ChannelId, ()>> = LazyLock::new(DashMap::new);

/// The binding of a target object to a channel.
///
/// Disposing (or dropping) removes the message handler and frees the channel
/// for a new exposure; afterwards the channel silently stops responding to
/// actions. Requests already sent by the other side stay pending; no
/// transport-level close is involved.
pub struct Exposure {
    channel: ChannelId,
    task: Option<JoinHandle<()>>,
}

impl Exposure {
    /// Detach the dispatcher and free the channel for a new exposure.
    pub fn dispose(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            EXPOSURES.remove(&self.channel);
            info!(channel = self.channel.0, "exposure disposed");
        }
    }
}

impl Drop for Exposure {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Expose `target` on `channel` so the other side can proxy it.
///
/// Fails with [`Error::AlreadyExposed`], before attaching any listener, if
/// the channel already serves an object.
pub fn expose(target: impl RemoteTarget, channel: Arc<dyn Channel>) -> Result<Exposure> {
    let id = channel.id();
    // Claim through the entry so two racing exposures cannot both win.
    match EXPOSURES.entry(id) {
        Entry::Occupied(_) => return Err(Error::AlreadyExposed),
        Entry::Vacant(slot) => {
            slot.insert(());
        }
    }

    let mut incoming = channel.subscribe();
    let target = Arc::new(target);
    let task = tokio::spawn(async move {
        while let Some(message) = incoming.recv().await {
            dispatch(&target, &channel, message).await;
        }
    });

    info!(channel = id.0, "exposure bound");
    Ok(Exposure {
        channel: id,
        task: Some(task),
    })
}

/// Reflect one incoming action onto the target and report the outcome.
///
/// Gets and sets are answered in arrival order. An apply runs in its own
/// task: the invocation may suspend for as long as the method pleases, and a
/// still-pending call must not hold up later actions on the channel.
async fn dispatch<T: RemoteTarget>(target: &Arc<T>, channel: &Arc<dyn Channel>, message: Message) {
    match message {
        Message::Get { id, data } => {
            let result = target.get(&data.key).await;
            reply_success(channel, id, result);
        }
        Message::Set { id, data } => {
            let outcome = target.set(&data.key, data.value).await;
            reply_success(channel, id, Value::Bool(outcome));
        }
        Message::Apply { id, data } => {
            let ApplyData { key, args } = data;
            let args = args
                .into_iter()
                .map(|arg| match arg {
                    WireArg::Function { reference } => CallArg::Callback(RemoteCallback::new(
                        id.clone(),
                        reference,
                        channel.clone(),
                    )),
                    WireArg::Plain(value) => CallArg::Value(value),
                })
                .collect();
            let target = target.clone();
            let channel = channel.clone();
            tokio::spawn(async move {
                match target.invoke(&key, args).await {
                    Ok(result) => reply_success(&channel, id, result),
                    Err(err) => reply_error(&channel, id, ErrorDescriptor::capture(&err)),
                }
            });
        }
        // Result traffic flowing the other way is not ours to answer.
        other => debug!(id = %other.id(), "ignoring non-action message"),
    }
}

fn reply_success(channel: &Arc<dyn Channel>, id: Token, result: Value) {
    if let Err(err) = channel.send(Message::Success { id, result }) {
        warn!(error = %err, "success reply not delivered");
    }
}

fn reply_error(channel: &Arc<dyn Channel>, id: Token, error: ErrorDescriptor) {
    if let Err(err) = channel.send(Message::Error { id, error }) {
        warn!(error = %err, "error reply not delivered");
    }
}
