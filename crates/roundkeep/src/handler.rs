//! HTTP handlers: one per route, each a thin adapter over the store.
//!
//! Every handler takes the store lock exactly once, does its work, and
//! releases it before the response is encoded. Bodies are decoded through
//! the server's [`Codec`]; malformed JSON becomes a 400.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use roundkeep_protocol::{
    Codec, CreateGameResponse, GameId, LayoutRequest, PlayerState,
};
use serde::Serialize;

use crate::server::ServerState;
use crate::RoundkeepError;

/// Plain-text body of a successful clear.
pub(crate) const CLEARED: &str = "State cleared";

/// `GET /createGame`
pub(crate) async fn create_game<C: Codec>(
    State(state): State<Arc<ServerState<C>>>,
) -> Result<Response, RoundkeepError> {
    let gameid = state.store.lock().await.create_session();
    encode(&state.codec, &CreateGameResponse { gameid })
}

/// `POST /:gameid/init`
///
/// A stored layout is returned without looking at the body, so repeat
/// calls succeed whatever they send.
pub(crate) async fn init_layout<C: Codec>(
    State(state): State<Arc<ServerState<C>>>,
    Path(game_id): Path<String>,
    body: Bytes,
) -> Result<Response, RoundkeepError> {
    let game_id = GameId::from(game_id);
    let request = state.codec.decode::<LayoutRequest>(&body);

    let layout = {
        let mut store = state.store.lock().await;
        match store.layout(&game_id) {
            Some(layout) => layout.clone(),
            None => store.get_or_init_layout(&game_id, &request?)?,
        }
    };

    encode(&state.codec, &layout)
}

/// `POST /:gameid/updateState/:playerId/:roundId`
pub(crate) async fn update_state<C: Codec>(
    State(state): State<Arc<ServerState<C>>>,
    Path((game_id, player_id, round)): Path<(String, String, u64)>,
    body: Bytes,
) -> Result<Response, RoundkeepError> {
    let game_id = GameId::from(game_id);
    let payload: PlayerState = state.codec.decode(&body)?;

    let round_state = state.store.lock().await.update_round_state(
        &game_id, &player_id, round, payload,
    );

    encode(&state.codec, &round_state)
}

/// `GET /:gameid/clear`
///
/// Always answers 200, whether or not anything was removed.
pub(crate) async fn clear<C: Codec>(
    State(state): State<Arc<ServerState<C>>>,
    Path(game_id): Path<String>,
) -> impl IntoResponse {
    let game_id = GameId::from(game_id);
    let outcome = state.store.lock().await.clear_session(&game_id);
    tracing::debug!(%game_id, ?outcome, "clear requested");
    (StatusCode::OK, CLEARED)
}

/// Encodes `value` with the server's codec into a 200 response.
fn encode<C: Codec, T: Serialize>(
    codec: &C,
    value: &T,
) -> Result<Response, RoundkeepError> {
    let bytes = codec.encode(value)?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, codec.content_type())],
        bytes,
    )
        .into_response())
}
