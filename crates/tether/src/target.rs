//! Host-side target abstraction: the object an exposure serves.
//!
//! Rust has no transparent member interception, so an exposed object answers
//! an explicit get/set/invoke trio instead. [`TargetObject`] is the provided
//! dispatch-table implementation; implement [`RemoteTarget`] directly for
//! full control over member lookup.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use tetherwire::CallbackInvocation;
use tetherwire::Message;
use tetherwire::RemoteError;
use tetherwire::Token;

use crate::channel::Channel;
use crate::error::Error;
use crate::error::Result;

/// The member trio every exposed object answers.
#[async_trait]
pub trait RemoteTarget: Send + Sync + 'static {
    /// Read a named member.
    ///
    /// An absent member reads as `Value::Null`, a benign value, never an
    /// error.
    async fn get(&self, key: &str) -> Value;

    /// Assign a named member, reporting whether the assignment took.
    async fn set(&self, key: &str, value: Value) -> bool;

    /// Invoke a named member with positional arguments.
    ///
    /// The dispatcher awaits the returned future before replying, so
    /// asynchronous implementations are transparent to the remote caller.
    async fn invoke(&self, key: &str, args: Vec<CallArg>)
    -> core::result::Result<Value, RemoteError>;
}

/// One positional argument as seen by the exposed side.
pub enum CallArg {
    /// A plain transported value.
    Value(Value),
    /// A one-shot handle back to a function on the calling side.
    Callback(RemoteCallback),
}

impl CallArg {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            CallArg::Value(value) => Some(value),
            CallArg::Callback(_) => None,
        }
    }

    pub fn into_callback(self) -> Option<RemoteCallback> {
        match self {
            CallArg::Callback(callback) => Some(callback),
            CallArg::Value(_) => None,
        }
    }
}

/// A synthesized stand-in for a function argument that lives on the calling
/// side.
///
/// Invoking it sends a `RESULT_CALLBACK` message carrying the ref and the
/// arguments back over the channel. A second invocation fails locally with
/// [`Error::CallbackConsumed`]; the underlying function is one-shot.
pub struct RemoteCallback {
    request: Token,
    reference: Token,
    channel: Arc<dyn Channel>,
    consumed: AtomicBool,
}

impl RemoteCallback {
    pub(crate) fn new(request: Token, reference: Token, channel: Arc<dyn Channel>) -> Self {
        Self {
            request,
            reference,
            channel,
            consumed: AtomicBool::new(false),
        }
    }

    /// Invoke the remote function with the given arguments, at most once.
    pub fn invoke(&self, args: Vec<Value>) -> Result<()> {
        if self.consumed.swap(true, Ordering::SeqCst) {
            return Err(Error::CallbackConsumed);
        }
        self.channel
            .send(Message::Callback {
                id: self.request.clone(),
                func: CallbackInvocation {
                    reference: self.reference.clone(),
                    args,
                },
            })
            .map_err(|e| Error::Transport(e.to_string()))
    }
}

type MethodFuture = Pin<Box<dyn Future<Output = core::result::Result<Value, RemoteError>> + Send>>;
type MethodFn = Box<dyn Fn(Vec<CallArg>) -> MethodFuture + Send + Sync>;

enum Slot {
    Mutable(Value),
    Constant(Value),
}

/// A dispatch-table target: named values plus named methods.
///
/// Cheap to clone; all clones share state, so host code can keep a handle
/// and observe assignments made through the proxy after exposure.
#[derive(Clone)]
pub struct TargetObject {
    inner: Arc<TargetInner>,
}

struct TargetInner {
    values: Mutex<HashMap<String, Slot>>,
    methods: HashMap<String, MethodFn>,
}

impl TargetObject {
    pub fn builder() -> TargetBuilder {
        TargetBuilder {
            values: HashMap::new(),
            methods: HashMap::new(),
        }
    }

    /// Read a member directly on the host side, bypassing the channel.
    pub async fn value_of(&self, key: &str) -> Option<Value> {
        match self.inner.values.lock().await.get(key) {
            Some(Slot::Mutable(value)) | Some(Slot::Constant(value)) => Some(value.clone()),
            None => None,
        }
    }
}

/// Fluent construction of a [`TargetObject`].
pub struct TargetBuilder {
    values: HashMap<String, Slot>,
    methods: HashMap<String, MethodFn>,
}

impl TargetBuilder {
    /// Add an assignable named value.
    pub fn value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), Slot::Mutable(value.into()));
        self
    }

    /// Add a read-only named value; remote assignment reports `false`.
    pub fn constant(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), Slot::Constant(value.into()));
        self
    }

    /// Add a synchronous method.
    pub fn method<F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<CallArg>) -> core::result::Result<Value, RemoteError> + Send + Sync + 'static,
    {
        self.methods.insert(
            key.into(),
            Box::new(move |args| {
                let out = f(args);
                Box::pin(async move { out }) as MethodFuture
            }),
        );
        self
    }

    /// Add an asynchronous method; its result is awaited before the reply
    /// goes out.
    pub fn method_async<F, Fut>(mut self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<CallArg>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = core::result::Result<Value, RemoteError>> + Send + 'static,
    {
        self.methods
            .insert(key.into(), Box::new(move |args| Box::pin(f(args)) as MethodFuture));
        self
    }

    pub fn build(self) -> TargetObject {
        TargetObject {
            inner: Arc::new(TargetInner {
                values: Mutex::new(self.values),
                methods: self.methods,
            }),
        }
    }
}

#[async_trait]
impl RemoteTarget for TargetObject {
    async fn get(&self, key: &str) -> Value {
        // Methods are not transportable values; reading one is as benign as
        // reading an absent member.
        self.value_of(key).await.unwrap_or(Value::Null)
    }

    async fn set(&self, key: &str, value: Value) -> bool {
        if self.inner.methods.contains_key(key) {
            return false;
        }
        let mut values = self.inner.values.lock().await;
        if matches!(values.get(key), Some(Slot::Constant(_))) {
            return false;
        }
        values.insert(key.to_string(), Slot::Mutable(value));
        true
    }

    async fn invoke(
        &self,
        key: &str,
        args: Vec<CallArg>,
    ) -> core::result::Result<Value, RemoteError> {
        match self.inner.methods.get(key) {
            Some(method) => method(args).await,
            None => Err(RemoteError::type_error(format!("{} is not a function", key))),
        }
    }
}
