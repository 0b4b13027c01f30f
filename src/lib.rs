//! # Feud Game Library
//!
//! This library provides the core game logic for a two-team survey game
//! show. It owns the game state machine (face-offs, board control,
//! strikes, steals and scoring), projects it into the views shown on the
//! admin console and the public display, and keeps every connected client
//! synchronized as the admin drives the game.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]
use serde::Serialize;

pub mod constants;

pub mod catalog;
pub mod game;
pub mod host;
pub mod logging;
pub mod names;
pub mod session;
pub mod view;
pub mod watcher;

/// The catalog as sent to an admin when it connects
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CatalogMessage {
    /// Every question that can be selected during setup
    pub questions: Vec<catalog::Question>,
    /// Sorted distinct tags across all questions
    pub tags: Vec<String>,
}

impl From<&catalog::Catalog> for CatalogMessage {
    fn from(catalog: &catalog::Catalog) -> Self {
        Self {
            questions: catalog.questions().to_vec(),
            tags: catalog.tags().to_vec(),
        }
    }
}

/// Messages sent to synchronize state between the server and its clients
///
/// Each message carries a complete view, so a client can render from the
/// latest one alone.
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum SyncMessage {
    /// Public view for display screens
    Display(view::PublicSnapshot),
    /// Full view for admin consoles
    Admin(view::AdminSnapshot),
    /// The question catalog, sent once per admin connection
    Catalog(CatalogMessage),
}

impl SyncMessage {
    /// Converts the sync message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Transient signals that let clients sequence their animations
///
/// These are not part of the game state. They are sent around a state
/// change, in a fixed order relative to the snapshots, and a client that
/// misses one only misses an effect.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub enum UpdateMessage {
    /// An answer was just turned over on the board
    Reveal(view::RevealedAnswer),
    /// The controlling team got a strike
    Strike {
        /// Strikes this round, including the new one
        count: u8,
    },
    /// A steal attempt missed
    StealFailed,
}

impl From<view::RevealedAnswer> for UpdateMessage {
    fn from(answer: view::RevealedAnswer) -> Self {
        Self::Reveal(answer)
    }
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}
