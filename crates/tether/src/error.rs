//! The engine's failure taxonomy.
//!
//! `Remote` carries a reconstructed target-side failure; every other variant
//! is local protocol misuse or transport trouble at the point of use.

use std::error;
use std::fmt;

use tetherwire::RemoteError;

/// A specialized Result type for proxy and exposure operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Failures surfaced by the proxy and host dispatchers.
///
/// Clone so a memoized member read can hand the same outcome to every
/// awaiter.
#[derive(Debug, Clone)]
pub enum Error {
    /// The channel already has an exposed object; dispose it first.
    AlreadyExposed,
    /// A one-shot callback was invoked a second time.
    CallbackConsumed,
    /// The proxy's dispatcher or the channel went away mid-call.
    ChannelClosed,
    /// The channel refused to enqueue a message.
    Transport(String),
    /// The remote target reported a failure.
    Remote(RemoteError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AlreadyExposed => write!(
                f,
                "the channel already has an exposed object; dispose the previous exposure first"
            ),
            Error::CallbackConsumed => write!(f, "cannot invoke a one-shot callback multiple times"),
            Error::ChannelClosed => write!(f, "channel closed before a reply arrived"),
            Error::Transport(msg) => write!(f, "transport failure: {}", msg),
            Error::Remote(e) => write!(f, "{}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Remote(e) => Some(e),
            _ => None,
        }
    }
}
