//! Viewer connections and their match rooms
//!
//! Tracks which connected clients have joined which match rooms and parses
//! the room control messages they send. Joining a second room never leaves
//! the first.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use types::ids::MatchId;

/// Default cap on rooms a single client may join.
pub const DEFAULT_MAX_ROOMS_PER_CLIENT: usize = 16;

/// Unique client identifier.
pub type ClientId = u64;

/// Room control message sent by a viewer.
///
/// `{"action":"joinMatch","matchId":"0001"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ClientMessage {
    JoinMatch {
        #[serde(rename = "matchId")]
        match_id: MatchId,
    },
    LeaveMatch {
        #[serde(rename = "matchId")]
        match_id: MatchId,
    },
}

/// Parse a raw text frame into a `ClientMessage`.
pub fn parse_client_message(json: &str) -> Result<ClientMessage, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid message: {e}"))
}

/// Control replies; match signals are forwarded as `Signal`s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    JoinedMatch {
        #[serde(rename = "matchId")]
        match_id: MatchId,
    },
    LeftMatch {
        #[serde(rename = "matchId")]
        match_id: MatchId,
    },
    /// Signals were dropped; reload `/matches/{id}/stats` to reconcile
    Lagged {
        #[serde(rename = "matchId")]
        match_id: MatchId,
        skipped: u64,
    },
    Error {
        message: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Client not found: {0}")]
    ClientNotFound(ClientId),

    #[error("Max rooms ({limit}) reached")]
    TooManyRooms { limit: usize },
}

/// Result of a join request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyJoined,
}

/// Per-client state
#[derive(Debug, Clone)]
pub struct ClientState {
    pub client_id: ClientId,
    pub rooms: BTreeSet<MatchId>,
    pub connected_at: DateTime<Utc>,
}

impl ClientState {
    pub fn new(client_id: ClientId, connected_at: DateTime<Utc>) -> Self {
        Self {
            client_id,
            rooms: BTreeSet::new(),
            connected_at,
        }
    }

    pub fn is_in(&self, match_id: &MatchId) -> bool {
        self.rooms.contains(match_id)
    }
}

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub max_rooms_per_client: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_rooms_per_client: DEFAULT_MAX_ROOMS_PER_CLIENT,
        }
    }
}

/// All connected clients, in id order
#[derive(Debug)]
pub struct ClientRegistry {
    clients: BTreeMap<ClientId, ClientState>,
    next_id: ClientId,
    config: RegistryConfig,
}

impl ClientRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            clients: BTreeMap::new(),
            next_id: 1,
            config,
        }
    }

    /// Register a new client and return its ID.
    pub fn register(&mut self, connected_at: DateTime<Utc>) -> ClientId {
        let id = self.next_id;
        self.next_id += 1;
        self.clients.insert(id, ClientState::new(id, connected_at));
        id
    }

    /// Remove a client along with all its room memberships.
    pub fn disconnect(&mut self, client_id: ClientId) -> Option<ClientState> {
        self.clients.remove(&client_id)
    }

    pub fn get(&self, client_id: ClientId) -> Option<&ClientState> {
        self.clients.get(&client_id)
    }

    pub fn join(
        &mut self,
        client_id: ClientId,
        match_id: MatchId,
    ) -> Result<JoinOutcome, RegistryError> {
        let limit = self.config.max_rooms_per_client;
        let client = self
            .clients
            .get_mut(&client_id)
            .ok_or(RegistryError::ClientNotFound(client_id))?;

        if client.is_in(&match_id) {
            return Ok(JoinOutcome::AlreadyJoined);
        }
        if client.rooms.len() >= limit {
            return Err(RegistryError::TooManyRooms { limit });
        }
        client.rooms.insert(match_id);
        Ok(JoinOutcome::Joined)
    }

    /// Leave a room. Returns whether the client was in it.
    pub fn leave(&mut self, client_id: ClientId, match_id: &MatchId) -> bool {
        self.clients
            .get_mut(&client_id)
            .is_some_and(|client| client.rooms.remove(match_id))
    }

    /// Clients currently in a match room.
    pub fn subscribers(&self, match_id: &MatchId) -> Vec<ClientId> {
        self.clients
            .iter()
            .filter(|(_, state)| state.is_in(match_id))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
