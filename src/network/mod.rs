//! Network Module
//!
//! Binds the codec to a TCP socket.
//!
//! ## Responsibilities
//! - Open the socket and apply timeouts / nodelay from [`Config`](crate::Config)
//! - Split the stream into a buffered reader and writer
//! - Hand out the serializer/deserializer pair for the session
//!
//! Handshake and packet semantics belong to the layer above.

mod channel;

pub use channel::{Channel, ChannelDeserializer, ChannelSerializer};
