// crates/tetherwire/src/lib.rs
//! Wire protocol for tether: remote member access over a message channel.

mod errors;
mod message;
mod types;

#[cfg(test)]
mod tests;

pub use crate::types::Result;
pub use crate::types::Error;
pub use crate::types::Token;

pub use crate::message::Message;
pub use crate::message::GetData;
pub use crate::message::SetData;
pub use crate::message::ApplyData;
pub use crate::message::WireArg;
pub use crate::message::CallbackInvocation;
pub use crate::message::to_bytes;
pub use crate::message::from_bytes;

pub use crate::errors::ErrorKind;
pub use crate::errors::RemoteError;
pub use crate::errors::ErrorDescriptor;
