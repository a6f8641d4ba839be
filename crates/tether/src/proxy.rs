//! Client proxy: deferred member accessors and the request dispatcher.
//!
//! Every member access or call on a [`Proxy`] becomes an action message with
//! a fresh correlation token. A spawned receive task owns the pending-request
//! table and routes replies and callback invocations back to their request.

use std::collections::HashMap;
use std::future::Future;
use std::future::IntoFuture;
use std::pin::Pin;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::OnceCell;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::warn;

use tetherwire::ApplyData;
use tetherwire::CallbackInvocation;
use tetherwire::GetData;
use tetherwire::Message;
use tetherwire::SetData;
use tetherwire::Token;
use tetherwire::WireArg;

use crate::channel::Channel;
use crate::error::Error;
use crate::error::Result;

type ReplySender = oneshot::Sender<Result<Value>>;

/// A local one-shot function retained while the remote side may still invoke
/// its ref. Shared through the pending table across the dispatcher task, so
/// it must be `Sync` as well as `Send`.
pub type CallbackFn = Box<dyn FnOnce(Vec<Value>) + Send + Sync>;

/// One in-flight request on the calling side.
///
/// The entry stays in the table until the primary result has arrived *and*
/// the callback table is empty, so a late callback invocation is never
/// missed. Exactly one of resolve/reject fires for the primary result.
struct Pending {
    reply: Option<ReplySender>,
    callbacks: HashMap<Token, CallbackFn>,
}

impl Pending {
    fn exhausted(&self) -> bool {
        self.reply.is_none() && self.callbacks.is_empty()
    }
}

/// A positional argument for a remote call.
pub enum Arg {
    /// A plain transported value.
    Value(Value),
    /// A local function the remote side may invoke back, at most once.
    Callback(CallbackFn),
}

impl Arg {
    /// Wrap a transportable value.
    pub fn value(value: impl Into<Value>) -> Self {
        Arg::Value(value.into())
    }

    /// Wrap a local one-shot function as a callback argument.
    ///
    /// The function itself never travels; a ref token stands in for it on
    /// the wire, and the remote side invokes it back through the channel.
    pub fn callback(f: impl FnOnce(Vec<Value>) + Send + Sync + 'static) -> Self {
        Arg::Callback(Box::new(f))
    }
}

/// The local stand-in for a remote object.
///
/// Cloning is cheap; clones share one dispatcher. Dropping the last clone
/// aborts the receive task and drops the pending table, including callback
/// refs that were never invoked; calls still awaiting then fail with
/// [`Error::ChannelClosed`].
#[derive(Clone)]
pub struct Proxy {
    inner: Arc<ProxyInner>,
}

struct ProxyInner {
    channel: Arc<dyn Channel>,
    pending: Arc<DashMap<Token, Pending>>,
    task: JoinHandle<()>,
}

impl Drop for ProxyInner {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl Proxy {
    /// Connect a proxy to the consumer end of a channel.
    pub fn connect(channel: Arc<dyn Channel>) -> Self {
        let pending: Arc<DashMap<Token, Pending>> = Arc::new(DashMap::new());
        let mut incoming = channel.subscribe();
        let table = pending.clone();
        let task = tokio::spawn(async move {
            while let Some(message) = incoming.recv().await {
                route(&table, message);
            }
        });
        Self {
            inner: Arc::new(ProxyInner {
                channel,
                pending,
                task,
            }),
        }
    }

    /// Deferred accessor for a named member. Creating it sends nothing.
    pub fn member(&self, key: impl Into<String>) -> Member {
        Member {
            proxy: self.clone(),
            key: key.into(),
            cached: OnceCell::new(),
        }
    }

    /// Read a named member. Always sends a fresh get action; see
    /// [`Member::get`] for the memoized path.
    pub async fn get(&self, key: &str) -> Result<Value> {
        let id = Token::fresh();
        let message = Message::Get {
            id: id.clone(),
            data: GetData { key: key.to_string() },
        };
        let rx = self.dispatch(id, HashMap::new(), message)?;
        await_reply(rx).await
    }

    /// Assign a named member.
    ///
    /// Fire-and-forget: the channel cannot express a synchronous failure, so
    /// local success is reported unconditionally and the remote boolean
    /// outcome is dropped on arrival. A failed enqueue is logged and
    /// swallowed.
    pub fn set(&self, key: &str, value: Value) {
        let message = Message::Set {
            id: Token::fresh(),
            data: SetData {
                key: key.to_string(),
                value,
            },
        };
        if let Err(err) = self.inner.channel.send(message) {
            warn!(key, error = %err, "set action not delivered");
        }
    }

    /// Invoke a named member with positional arguments.
    ///
    /// Function-valued arguments are replaced by callback refs before
    /// transport; the functions stay in this request's callback table until
    /// invoked once from the remote side.
    pub async fn call(&self, key: &str, args: Vec<Arg>) -> Result<Value> {
        let id = Token::fresh();
        let mut callbacks = HashMap::new();
        let args = args
            .into_iter()
            .map(|arg| match arg {
                Arg::Value(value) => WireArg::Plain(value),
                Arg::Callback(f) => {
                    let reference = Token::fresh();
                    callbacks.insert(reference.clone(), f);
                    WireArg::Function { reference }
                }
            })
            .collect();
        let message = Message::Apply {
            id: id.clone(),
            data: ApplyData {
                key: key.to_string(),
                args,
            },
        };
        let rx = self.dispatch(id, callbacks, message)?;
        await_reply(rx).await
    }

    /// Register the pending entry, then send; an enqueue failure unwinds the
    /// registration so the table cannot grow on dead sends.
    fn dispatch(
        &self,
        id: Token,
        callbacks: HashMap<Token, CallbackFn>,
        message: Message,
    ) -> Result<oneshot::Receiver<Result<Value>>> {
        let (tx, rx) = oneshot::channel();
        self.inner.pending.insert(
            id.clone(),
            Pending {
                reply: Some(tx),
                callbacks,
            },
        );
        if let Err(err) = self.inner.channel.send(message) {
            self.inner.pending.remove(&id);
            return Err(Error::Transport(err.to_string()));
        }
        Ok(rx)
    }
}

async fn await_reply(rx: oneshot::Receiver<Result<Value>>) -> Result<Value> {
    rx.await.map_err(|_| Error::ChannelClosed)?
}

/// Route one incoming message to its pending request.
fn route(table: &DashMap<Token, Pending>, message: Message) {
    match message {
        Message::Success { id, result } => settle(table, id, Ok(result)),
        Message::Error { id, error } => settle(table, id, Err(Error::Remote(error.into_error()))),
        Message::Callback { id, func } => {
            let CallbackInvocation { reference, args } = func;
            let callback = match table.get_mut(&id) {
                Some(mut entry) => entry.callbacks.remove(&reference),
                None => None,
            };
            match callback {
                Some(f) => f(args),
                // Already consumed, or another request's ref: a benign race,
                // never an error.
                None => debug!(id = %id, reference = %reference, "callback ref not found"),
            }
            drop_if_exhausted(table, &id);
        }
        // Action traffic flowing the other way is not ours to answer.
        other => debug!(id = %other.id(), "ignoring unmatched message"),
    }
}

fn settle(table: &DashMap<Token, Pending>, id: Token, outcome: Result<Value>) {
    let Some(mut entry) = table.get_mut(&id) else {
        // Set replies and post-disposal stragglers land here.
        debug!(id = %id, "reply with no matching request");
        return;
    };
    match entry.reply.take() {
        Some(tx) => {
            // The caller may have stopped awaiting; that is its business.
            let _ = tx.send(outcome);
        }
        None => warn!(id = %id, "duplicate reply for fulfilled request"),
    }
    drop(entry);
    drop_if_exhausted(table, &id);
}

fn drop_if_exhausted(table: &DashMap<Token, Pending>, id: &Token) {
    table.remove_if(id, |_, pending| pending.exhausted());
}

/// Deferred accessor for one named member of a remote object.
///
/// Creating one sends nothing. Reading it (`get`, or awaiting the member
/// directly) performs the get action lazily and memoizes the outcome per
/// accessor, so repeated awaits do not resend the request. Calling it always
/// sends a fresh apply action.
pub struct Member {
    proxy: Proxy,
    key: String,
    cached: OnceCell<Result<Value>>,
}

impl Member {
    /// Read the member's value, lazily and memoized per accessor.
    pub async fn get(&self) -> Result<Value> {
        self.cached
            .get_or_init(|| self.proxy.get(&self.key))
            .await
            .clone()
    }

    /// Invoke the member as a function.
    pub async fn call(&self, args: Vec<Arg>) -> Result<Value> {
        self.proxy.call(&self.key, args).await
    }
}

impl IntoFuture for Member {
    type Output = Result<Value>;
    type IntoFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.get().await })
    }
}
