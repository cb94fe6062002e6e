//! Wire protocol for Roundkeep.
//!
//! This crate defines what clients and the server exchange over HTTP:
//!
//! - **Types** ([`GameId`], [`Layout`], [`RoundState`], [`PlayerState`], etc.):
//!   the JSON bodies of requests and responses.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those bodies are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between the HTTP handlers (raw bodies) and the
//! session store (game state). It knows nothing about locking or lifetimes,
//! only about the shape of the data.
//!
//! ```text
//! HTTP (bytes) → Protocol (Layout, RoundState) → Session store
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    is_monster, CreateGameResponse, GameId, Layout, LayoutRequest,
    PlayerState, RoundState, MONSTER_ROLE,
};
