mod event;
mod ids;
mod proposal;
mod types;
pub mod wire;
mod world;

pub use crate::event::*;
pub use crate::ids::*;
pub use crate::proposal::*;
pub use crate::types::*;
pub use crate::wire::{
    deserialize_client_message, deserialize_server_message, serialize_client_message,
    serialize_server_message, ClientMessage, ServerMessage, WireError,
};
pub use crate::world::*;
