//! Connection registry
//!
//! This module tracks every connection attached to the game and the role
//! it has taken: admin console, public display, or not yet decided. It
//! fans messages out to all connections of a role through a tunnel lookup
//! supplied by the embedding server.

use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
    str::FromStr,
};

use enum_map::{Enum, EnumMap};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use uuid::Uuid;

use super::{SyncMessage, UpdateMessage, session::Tunnel};

/// A unique identifier for a connection
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    /// Creates a new random connection ID (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    /// Formats the ID as a UUID string
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    /// Parses an ID from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// The role a connection plays in the game
///
/// Admins drive the game and see everything; displays show the public
/// board. A connection stays unassigned until it joins as one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum Role {
    /// A connection that hasn't joined yet
    Unassigned,
    /// The operator console
    Admin,
    /// A public display screen
    Display,
}

/// Serialization helper for Watchers struct
#[derive(Deserialize)]
struct WatchersSerde {
    mapping: HashMap<Id, Role>,
}

/// Manages all connections of the game
///
/// Keeps a mapping from connection to role and the reverse index by role,
/// so that broadcasting to one role never scans the others.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(from = "WatchersSerde")]
pub struct Watchers {
    /// Primary mapping from connection ID to its role
    mapping: HashMap<Id, Role>,

    /// Reverse mapping organized by role for efficient filtering
    #[serde(skip_serializing)]
    reverse_mapping: EnumMap<Role, HashSet<Id>>,
}

impl From<WatchersSerde> for Watchers {
    /// Rebuilds the reverse mapping, which is not serialized
    fn from(serde: WatchersSerde) -> Self {
        let WatchersSerde { mapping } = serde;
        let mut reverse_mapping: EnumMap<Role, HashSet<Id>> = EnumMap::default();
        for (id, role) in &mapping {
            reverse_mapping[*role].insert(*id);
        }
        Self {
            mapping,
            reverse_mapping,
        }
    }
}

/// Errors that can occur when managing watchers
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// No more connections can be attached to the game
    #[error("maximum number of connections reached")]
    MaximumWatchers,
}

impl Watchers {
    /// Gets the connections of one role that still have a live tunnel
    ///
    /// # Arguments
    ///
    /// * `filter` - The role to include
    /// * `tunnel_finder` - Function to retrieve the tunnel for a given ID
    ///
    /// # Returns
    ///
    /// Vector of (ID, Tunnel) pairs
    pub fn specific_vec<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        filter: Role,
        tunnel_finder: F,
    ) -> Vec<(Id, T)> {
        self.reverse_mapping[filter]
            .iter()
            .filter_map(|id| tunnel_finder(*id).map(|tunnel| (*id, tunnel)))
            .collect_vec()
    }

    /// Gets the number of connections with a role
    pub fn specific_count(&self, filter: Role) -> usize {
        self.reverse_mapping[filter].len()
    }

    /// Registers a new connection
    ///
    /// # Errors
    ///
    /// Returns `Error::MaximumWatchers` if the registry already holds the
    /// maximum number of connections.
    pub fn add_watcher(&mut self, watcher_id: Id, role: Role) -> Result<(), Error> {
        if self.mapping.len() >= crate::constants::watchers::MAX_WATCHER_COUNT {
            return Err(Error::MaximumWatchers);
        }

        if let Some(old) = self.mapping.insert(watcher_id, role) {
            self.reverse_mapping[old].remove(&watcher_id);
        }
        self.reverse_mapping[role].insert(watcher_id);

        Ok(())
    }

    /// Changes the role of a known connection
    ///
    /// Unknown connections are left unregistered.
    pub fn update_watcher_role(&mut self, watcher_id: Id, role: Role) {
        let Some(old) = self.mapping.get(&watcher_id).copied() else {
            return;
        };
        if old != role {
            self.reverse_mapping[old].remove(&watcher_id);
            self.reverse_mapping[role].insert(watcher_id);
        }
        self.mapping.insert(watcher_id, role);
    }

    /// Gets the role of a connection, if it is registered
    pub fn get_watcher_role(&self, watcher_id: Id) -> Option<Role> {
        self.mapping.get(&watcher_id).copied()
    }

    /// Checks if a connection is registered
    pub fn has_watcher(&self, watcher_id: Id) -> bool {
        self.mapping.contains_key(&watcher_id)
    }

    /// Forgets a connection and closes its tunnel if it is still open
    ///
    /// # Returns
    ///
    /// The role the connection had, or `None` if it was not registered
    pub fn remove_watcher<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        watcher_id: Id,
        tunnel_finder: F,
    ) -> Option<Role> {
        if let Some(tunnel) = tunnel_finder(watcher_id) {
            tunnel.close();
        }
        let role = self.mapping.remove(&watcher_id)?;
        self.reverse_mapping[role].remove(&watcher_id);
        Some(role)
    }

    /// Sends a state synchronization message to a specific connection
    pub fn send_state<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        message: &SyncMessage,
        watcher_id: Id,
        tunnel_finder: F,
    ) {
        let Some(session) = tunnel_finder(watcher_id) else {
            return;
        };

        session.send_state(message);
    }

    /// Broadcasts an update message to every admin and display
    ///
    /// Unassigned connections receive nothing.
    pub fn announce<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        message: &UpdateMessage,
        tunnel_finder: F,
    ) {
        for role in [Role::Admin, Role::Display] {
            self.announce_specific(role, message, &tunnel_finder);
        }
    }

    /// Sends an update message to every connection of a role
    pub fn announce_specific<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        filter: Role,
        message: &UpdateMessage,
        tunnel_finder: F,
    ) {
        for (_, session) in self.specific_vec(filter, tunnel_finder) {
            session.send_message(message);
        }
    }

    /// Sends a state synchronization message to every connection of a role
    pub fn announce_state_specific<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        filter: Role,
        message: &SyncMessage,
        tunnel_finder: F,
    ) {
        for (_, session) in self.specific_vec(filter, tunnel_finder) {
            session.send_state(message);
        }
    }
}
