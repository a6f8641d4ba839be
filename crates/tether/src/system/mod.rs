//! Built-in channel implementations.

pub mod local_channel;

pub use local_channel::LocalChannel;
