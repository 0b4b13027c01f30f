//! Outbound connection abstraction
//!
//! The game never talks to a socket directly. The embedding server wraps
//! each connection in a [`Tunnel`] and hands the host a way to look tunnels
//! up by connection id.

use super::{SyncMessage, UpdateMessage};

/// Trait for sending messages through a communication tunnel
///
/// Implementations might use WebSockets, Server-Sent Events, or any other
/// real-time transport. Sending is fire-and-forget: a tunnel that cannot
/// deliver is expected to drop the message.
pub trait Tunnel {
    /// Sends a transient signal to the client
    ///
    /// # Arguments
    ///
    /// * `message` - The update message to send
    fn send_message(&self, message: &UpdateMessage);

    /// Sends a full view to the client
    ///
    /// Sync messages replace whatever the client rendered before, on
    /// connection and after every command.
    ///
    /// # Arguments
    ///
    /// * `state` - The synchronization message to send
    fn send_state(&self, state: &SyncMessage);

    /// Closes the communication tunnel
    ///
    /// Called when a connection is removed from the game.
    fn close(self);
}
