//! Pub/sub wire contract
//!
//! Message payloads, destination naming, the broker transport seam, and
//! the publisher that turns pipeline decisions into outbound frames.

pub mod messages;
pub mod publisher;
pub mod transport;

pub use messages::{
    DestinationScheme, DetectPayload, GestureUpdate, RegisterPayload, StartPayload, StopPayload,
};
pub use publisher::EventPublisher;
pub use transport::{ChannelTransport, PublishedFrame, Transport};
