//! Core protocol types for Roundkeep's HTTP bodies.
//!
//! Every type here is what a client sees on the wire. Field names follow the
//! camelCase JSON that the game clients already speak (`numExits`,
//! `openExits`, `hasMonster`, ...), so serde attributes matter more than the
//! Rust names.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A short, human-typable session code such as `"K7QZ"`.
///
/// Newtype over `String` so a game code can't be mixed up with a player id,
/// which is also a string.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Wraps a raw code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Borrows the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for GameId {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl From<&str> for GameId {
    fn from(code: &str) -> Self {
        Self(code.to_owned())
    }
}

/// The reserved player id for the monster role.
pub const MONSTER_ROLE: &str = "monster";

/// Returns `true` if `player_id` names the monster role.
///
/// The check is case-insensitive (`"Monster"`, `"MONSTER"` all count);
/// every other id is a child.
pub fn is_monster(player_id: &str) -> bool {
    player_id.eq_ignore_ascii_case(MONSTER_ROLE)
}

// ---------------------------------------------------------------------------
// Game creation
// ---------------------------------------------------------------------------

/// Response body of `GET /createGame`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGameResponse {
    pub gameid: GameId,
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Request body of `POST /:gameid/init`.
///
/// All four fields are required. Ignored entirely once a layout exists for
/// the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    /// Total number of exits in the level.
    pub num_exits: u32,
    /// How many of those exits are open.
    pub num_open_exits: u32,
    /// Number of candidate monster spawn points.
    pub num_monster_spawns: u32,
    /// Number of candidate child spawn points.
    pub num_child_spawns: u32,
}

/// The fixed level parameters of one game. Generated once, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    /// Distinct exit indices in `[0, numExits)`, ascending.
    pub open_exits: Vec<u32>,
    /// Index in `[0, numMonsterSpawns)`.
    pub monster_spawn: u32,
    /// Index in `[0, numChildSpawns)`.
    pub child_spawn: u32,
}

// ---------------------------------------------------------------------------
// Player and round state
// ---------------------------------------------------------------------------

/// Whatever a player last posted for a round.
///
/// Clients may post any JSON. Objects get special treatment: posting an
/// object on top of an object merges the two. Everything else replaces.
///
/// `#[serde(untagged)]` means no wrapper on the wire: `{"x":1}` decodes as
/// `Object`, `"hiding"` or `[1,2]` or `null` as `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayerState {
    /// A JSON object.
    Object(Map<String, Value>),
    /// A scalar, an array, or null.
    Other(Value),
}

impl PlayerState {
    /// Folds `incoming` into `self`.
    ///
    /// Object onto object is a shallow merge: incoming keys overwrite,
    /// other existing keys stay. Any other pairing replaces `self`.
    pub fn merge(&mut self, incoming: PlayerState) {
        match (self, incoming) {
            (PlayerState::Object(existing), PlayerState::Object(update)) => {
                existing.extend(update);
            }
            (slot, incoming) => *slot = incoming,
        }
    }

    /// Returns the object fields if this is an `Object`.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            PlayerState::Object(map) => Some(map),
            PlayerState::Other(_) => None,
        }
    }
}

impl From<Value> for PlayerState {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => PlayerState::Object(map),
            other => PlayerState::Other(other),
        }
    }
}

const HAS_MONSTER: &str = "hasMonster";
const HAS_CHILD: &str = "hasChild";

/// Everything posted during one round of one game.
///
/// On the wire the player entries and the role flags live in the same JSON
/// object, e.g. `{"monster": {"x": 1}, "hasMonster": true}`. A flag is
/// omitted until some player of that role has posted. A set flag takes
/// the key over from a player posting under the same id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RoundState {
    /// Set once the monster has posted in this round.
    #[serde(rename = "hasMonster", default)]
    pub has_monster: bool,

    /// Set once any non-monster player has posted in this round.
    #[serde(rename = "hasChild", default)]
    pub has_child: bool,

    /// Per-player state, keyed by the case-sensitive player id.
    #[serde(flatten)]
    pub players: BTreeMap<String, PlayerState>,
}

impl Serialize for RoundState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let shadowed = |key: &str| {
            (self.has_monster && key == HAS_MONSTER)
                || (self.has_child && key == HAS_CHILD)
        };

        let mut map = serializer.serialize_map(None)?;
        for (player_id, state) in &self.players {
            if shadowed(player_id) {
                continue;
            }
            map.serialize_entry(player_id, state)?;
        }
        if self.has_monster {
            map.serialize_entry(HAS_MONSTER, &true)?;
        }
        if self.has_child {
            map.serialize_entry(HAS_CHILD, &true)?;
        }
        map.end()
    }
}

impl RoundState {
    /// Looks up what `player_id` posted this round.
    pub fn player(&self, player_id: &str) -> Option<&PlayerState> {
        self.players.get(player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // =====================================================================
    // GameId
    // =====================================================================

    #[test]
    fn test_game_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&GameId::new("K7QZ")).unwrap();
        assert_eq!(json, "\"K7QZ\"");
    }

    #[test]
    fn test_game_id_display() {
        assert_eq!(GameId::from("AB23").to_string(), "AB23");
    }

    #[test]
    fn test_create_game_response_shape() {
        let resp = CreateGameResponse {
            gameid: GameId::new("AB23"),
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value, json!({ "gameid": "AB23" }));
    }

    // =====================================================================
    // Roles
    // =====================================================================

    #[test]
    fn test_is_monster_ignores_case() {
        assert!(is_monster("monster"));
        assert!(is_monster("Monster"));
        assert!(is_monster("MONSTER"));
        assert!(!is_monster("child"));
        assert!(!is_monster("monster2"));
    }

    // =====================================================================
    // Layout
    // =====================================================================

    #[test]
    fn test_layout_request_uses_camel_case() {
        let req: LayoutRequest = serde_json::from_value(json!({
            "numExits": 5,
            "numOpenExits": 2,
            "numMonsterSpawns": 3,
            "numChildSpawns": 4,
        }))
        .unwrap();
        assert_eq!(req.num_exits, 5);
        assert_eq!(req.num_open_exits, 2);
        assert_eq!(req.num_monster_spawns, 3);
        assert_eq!(req.num_child_spawns, 4);
    }

    #[test]
    fn test_layout_request_rejects_negative_counts() {
        let result = serde_json::from_value::<LayoutRequest>(json!({
            "numExits": -1,
            "numOpenExits": 0,
            "numMonsterSpawns": 1,
            "numChildSpawns": 1,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_layout_serializes_as_camel_case() {
        let layout = Layout {
            open_exits: vec![1, 3],
            monster_spawn: 0,
            child_spawn: 2,
        };
        let value = serde_json::to_value(&layout).unwrap();
        assert_eq!(
            value,
            json!({ "openExits": [1, 3], "monsterSpawn": 0, "childSpawn": 2 })
        );
    }

    // =====================================================================
    // PlayerState
    // =====================================================================

    #[test]
    fn test_player_state_object_decodes_as_object() {
        let state: PlayerState = serde_json::from_value(json!({"x": 1})).unwrap();
        assert!(state.as_object().is_some());
    }

    #[test]
    fn test_player_state_array_decodes_as_other() {
        let state: PlayerState = serde_json::from_value(json!([1, 2])).unwrap();
        assert_eq!(state, PlayerState::Other(json!([1, 2])));
    }

    #[test]
    fn test_merge_object_onto_object_is_shallow() {
        let mut state = PlayerState::from(json!({"x": 1, "pos": {"a": 1}}));
        state.merge(PlayerState::from(json!({"y": 2, "pos": {"b": 2}})));
        // `pos` is overwritten wholesale, not merged recursively.
        assert_eq!(
            state,
            PlayerState::from(json!({"x": 1, "y": 2, "pos": {"b": 2}}))
        );
    }

    #[test]
    fn test_merge_scalar_onto_object_replaces() {
        let mut state = PlayerState::from(json!({"x": 1}));
        state.merge(PlayerState::from(json!("scalarValue")));
        assert_eq!(state, PlayerState::Other(json!("scalarValue")));
    }

    #[test]
    fn test_merge_object_onto_scalar_replaces() {
        let mut state = PlayerState::from(json!(42));
        state.merge(PlayerState::from(json!({"x": 1})));
        assert_eq!(state, PlayerState::from(json!({"x": 1})));
    }

    #[test]
    fn test_merge_null_onto_object_replaces() {
        let mut state = PlayerState::from(json!({"x": 1}));
        state.merge(PlayerState::from(Value::Null));
        assert_eq!(state, PlayerState::Other(Value::Null));
    }

    // =====================================================================
    // RoundState
    // =====================================================================

    #[test]
    fn test_round_state_flattens_players_and_flags() {
        let mut round = RoundState::default();
        round
            .players
            .insert("monster".into(), PlayerState::from(json!({"x": 1})));
        round.has_monster = true;

        let value = serde_json::to_value(&round).unwrap();
        assert_eq!(value, json!({ "monster": {"x": 1}, "hasMonster": true }));
    }

    #[test]
    fn test_round_state_omits_unset_flags() {
        let value = serde_json::to_value(RoundState::default()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_round_state_set_flag_shadows_player_with_same_id() {
        let mut round = RoundState::default();
        round
            .players
            .insert("hasChild".into(), PlayerState::from(json!({"x": 1})));
        round.has_child = true;

        // Compare raw text: a duplicate key would survive as two entries.
        let wire = serde_json::to_string(&round).unwrap();
        assert_eq!(wire, r#"{"hasChild":true}"#);
    }

    #[test]
    fn test_round_state_unset_flag_leaves_player_visible() {
        let mut round = RoundState::default();
        round
            .players
            .insert("hasMonster".into(), PlayerState::from(json!("hiding")));
        round.has_child = true;

        let wire = serde_json::to_string(&round).unwrap();
        assert_eq!(wire, r#"{"hasMonster":"hiding","hasChild":true}"#);
    }

    #[test]
    fn test_round_state_player_lookup_is_case_sensitive() {
        let mut round = RoundState::default();
        round
            .players
            .insert("Alice".into(), PlayerState::from(json!(1)));
        assert!(round.player("Alice").is_some());
        assert!(round.player("alice").is_none());
    }
}
