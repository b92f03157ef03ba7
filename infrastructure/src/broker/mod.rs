//! Message broker implementations

pub mod channel;

pub use channel::ChannelBroker;
