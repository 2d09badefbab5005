//! Session directory: maps short shareable codes to live connections.
//!
//! Codes exist only while their connection is open. Uses `DashMap` for
//! shard-level concurrency plus a `connection id -> code` index so that
//! disconnect is O(1) instead of a scan over the code map.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::Rng;
use tokio::sync::mpsc;

use super::events::ServerMessage;

/// Alphabet session codes are sampled from.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a session code (36^5 possible codes).
pub const CODE_LEN: usize = 5;

/// Attempts at finding an unused code before the connection is refused.
const MAX_CODE_ATTEMPTS: usize = 1024;

/// Opaque identifier for a live connection, assigned at registration.
pub type ConnectionId = u64;

/// Outbound side of a registered connection.
struct ConnectionHandle {
    sender: mpsc::UnboundedSender<ServerMessage>,
}

/// Shared registry of all live gateway connections, keyed by session code.
pub struct SessionDirectory {
    codes: DashMap<String, ConnectionHandle>,
    by_conn: DashMap<ConnectionId, String>,
    next_conn_id: AtomicU64,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self {
            codes: DashMap::new(),
            by_conn: DashMap::new(),
            next_conn_id: AtomicU64::new(1),
        }
    }

    /// Register a connection: assigns a connection id and a fresh unique
    /// session code. The caller transmits the code to the client as its
    /// public identity.
    pub fn register(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<(ConnectionId, String), &'static str> {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code(&mut rand::thread_rng());
            // entry() keeps the occupancy check and insert atomic per key.
            match self.codes.entry(code.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(vacant) => {
                    vacant.insert(ConnectionHandle {
                        sender: sender.clone(),
                    });
                    self.by_conn.insert(conn_id, code.clone());
                    return Ok((conn_id, code));
                }
            }
        }

        Err("session code space exhausted")
    }

    /// Remove a connection and free its code. No-op for ids that were never
    /// registered.
    pub fn unregister(&self, conn_id: ConnectionId) {
        if let Some((_, code)) = self.by_conn.remove(&conn_id) {
            self.codes.remove(&code);
        }
    }

    /// Look up the outbound sender for a code.
    pub fn resolve(&self, code: &str) -> Option<mpsc::UnboundedSender<ServerMessage>> {
        self.codes.get(code).map(|entry| entry.sender.clone())
    }

    /// Best-effort delivery of a single message to the connection behind
    /// `code`. Returns false when the code is not registered or the
    /// connection is already gone.
    pub fn send_to(&self, code: &str, message: ServerMessage) -> bool {
        match self.resolve(code) {
            Some(sender) => sender.send(message).is_ok(),
            None => false,
        }
    }

    /// Number of currently registered connections.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for SessionDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_code<R: Rng>(rng: &mut R) -> String {
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_one(directory: &SessionDirectory) -> (ConnectionId, String) {
        let (tx, _rx) = mpsc::unbounded_channel();
        directory.register(tx).expect("register")
    }

    #[test]
    fn register_assigns_codes_from_alphabet() {
        let directory = SessionDirectory::new();
        let (_, code) = register_one(&directory);
        assert_eq!(code.len(), CODE_LEN);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn registered_codes_are_unique() {
        let directory = SessionDirectory::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            let (_, code) = register_one(&directory);
            assert!(seen.insert(code));
        }
        assert_eq!(directory.len(), 500);
    }

    #[test]
    fn unregister_frees_code_and_reverse_index() {
        let directory = SessionDirectory::new();
        let (conn_id, code) = register_one(&directory);
        assert!(directory.resolve(&code).is_some());

        directory.unregister(conn_id);
        assert!(directory.resolve(&code).is_none());
        assert!(directory.is_empty());
        assert!(directory.by_conn.is_empty());
    }

    #[test]
    fn unregister_unknown_connection_is_a_noop() {
        let directory = SessionDirectory::new();
        let (_, code) = register_one(&directory);

        directory.unregister(9999);
        assert!(directory.resolve(&code).is_some());
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn send_to_unknown_code_returns_false() {
        let directory = SessionDirectory::new();
        assert!(!directory.send_to("ZZZZ9", ServerMessage::vote_allowed()));
    }

    #[test]
    fn send_to_delivers_to_the_matching_connection() {
        let directory = SessionDirectory::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let (_, code_a) = directory.register(tx_a).unwrap();
        let (_, _code_b) = directory.register(tx_b).unwrap();

        assert!(directory.send_to(&code_a, ServerMessage::vote_allowed()));

        let delivered = rx_a.try_recv().expect("message for a");
        assert_eq!(delivered.event, "vote-allowed");
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn send_to_dead_receiver_returns_false() {
        let directory = SessionDirectory::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let (_, code) = directory.register(tx).unwrap();
        drop(rx);

        assert!(!directory.send_to(&code, ServerMessage::vote_allowed()));
    }
}
