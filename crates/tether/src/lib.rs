//! # tether
//!
//! Transparent remote-object RPC over an asynchronous message channel.
//!
//! ## Architecture
//!
//! tether makes an object in one isolated execution context look local to
//! another, with nothing but an ordered, asynchronous message channel between
//! them:
//!
//! - **Proxy**: the consumer-side handle. Member reads, assignments, and
//!   calls become actions on the wire; replies are correlated back by id.
//! - **Exposure**: the provider-side binding of a real object to a channel,
//!   reflecting incoming actions onto it and reporting results or errors.
//! - **Channel**: the abstract transport. [`LocalChannel`] is the built-in
//!   in-memory pair; anything that moves [`tetherwire::Message`] values in
//!   FIFO order per direction works.
//!
//! Function-valued call arguments never travel. They are replaced by one-shot
//! callback refs that the exposed side can invoke back across the channel.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use tether::{expose, Arg, LocalChannel, Proxy, TargetObject};
//!
//! # async fn example() -> tether::Result<()> {
//! let (host_end, client_end) = LocalChannel::pair();
//!
//! let target = TargetObject::builder()
//!     .value("x", 42)
//!     .method("add", |args| {
//!         let a = args[0].as_value().and_then(|v| v.as_i64()).unwrap_or(0);
//!         let b = args[1].as_value().and_then(|v| v.as_i64()).unwrap_or(0);
//!         Ok(json!(a + b))
//!     })
//!     .build();
//! let _exposure = expose(target, Arc::new(host_end))?;
//!
//! let proxy = Proxy::connect(Arc::new(client_end));
//! let x = proxy.member("x").get().await?;
//! let sum = proxy.call("add", vec![Arg::value(2), Arg::value(3)]).await?;
//! proxy.set("y", json!(7));
//! # let _ = (x, sum);
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod error;
pub mod expose;
pub mod proxy;
pub mod system;
pub mod target;

pub use channel::Channel;
pub use channel::ChannelId;
pub use error::Error;
pub use error::Result;
pub use expose::expose;
pub use expose::Exposure;
pub use proxy::Arg;
pub use proxy::Member;
pub use proxy::Proxy;
pub use system::local_channel::LocalChannel;
pub use target::CallArg;
pub use target::RemoteCallback;
pub use target::RemoteTarget;
pub use target::TargetObject;

pub use tetherwire::ErrorKind;
pub use tetherwire::Message;
pub use tetherwire::RemoteError;
