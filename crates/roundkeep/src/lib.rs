//! # Roundkeep
//!
//! Coordination server for two-role ("monster" vs "child"), round-based
//! games. It hands out game codes, rolls a one-time level layout per game,
//! keeps the last few rounds of player state, and forgets games that are
//! cleared or abandoned.
//!
//! ## Routes
//!
//! | Method | Path                                    | Response          |
//! |--------|-----------------------------------------|-------------------|
//! | GET    | `/createGame`                           | `{"gameid": ..}`  |
//! | POST   | `/:gameid/init`                         | layout JSON       |
//! | POST   | `/:gameid/updateState/:playerId/:round` | round state JSON  |
//! | GET    | `/:gameid/clear`                        | `State cleared`   |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roundkeep::prelude::*;
//!
//! # async fn start() -> Result<(), RoundkeepError> {
//! let config = ServerConfig::from_env()?;
//! let server = RoundkeepServerBuilder::from_config(&config).build().await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{ConfigError, ServerConfig};
pub use error::RoundkeepError;
pub use server::{RoundkeepServer, RoundkeepServerBuilder};

/// Everything needed to run a server, in one import.
pub mod prelude {
    pub use crate::{
        ConfigError, RoundkeepError, RoundkeepServer, RoundkeepServerBuilder,
        ServerConfig,
    };
    pub use roundkeep_protocol::{
        Codec, CreateGameResponse, GameId, JsonCodec, Layout, LayoutRequest,
        PlayerState, RoundState,
    };
    pub use roundkeep_reaper::ReaperConfig;
    pub use roundkeep_session::{SessionStore, StoreConfig};
}
