//! Game session state for Roundkeep.
//!
//! This crate owns everything the server remembers about a game:
//!
//! 1. **Codes**: short, unambiguous game ids ([`GameIdGenerator`])
//! 2. **Layouts**: the one-time random level setup ([`LayoutGenerator`])
//! 3. **Rounds**: per-player state for the last few rounds, plus activity
//!    timestamps for garbage collection ([`SessionStore`])
//!
//! # How it fits in the stack
//!
//! ```text
//! HTTP handlers / reaper (above)  ← share one `Mutex<SessionStore>`
//!     ↕
//! Session Layer (this crate)  ← game codes, layouts, round state
//!     ↕
//! Protocol Layer (below)  ← provides GameId, Layout, RoundState
//! ```

mod error;
mod id;
mod layout;
mod store;

pub use error::SessionError;
pub use id::{GameIdGenerator, ALPHABET, DEFAULT_ID_LENGTH};
pub use layout::LayoutGenerator;
pub use store::{
    ClearOutcome, SessionStore, StoreConfig, DROP_ROUND_OFFSET, STALE_AFTER,
};
