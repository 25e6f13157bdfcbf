//! In-memory store of active game sessions, keyed by id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{debug, info};

use crate::engine::models::{BoardSize, Mode, SessionId};
use crate::engine::session::GameSession;
use crate::error::{GameError, Result};

type SessionSlot = Arc<Mutex<GameSession>>;

/// Registry of live sessions.
///
/// The id map sits behind an `RwLock`; each session has its own `Mutex`, so
/// rounds on one session are serialized while different sessions run in
/// parallel. Id generation happens under the map's write lock.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SessionSlot>>,
}

fn lock(slot: &SessionSlot) -> MutexGuard<'_, GameSession> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn next_id(sessions: &HashMap<SessionId, SessionSlot>) -> SessionId {
    sessions
        .keys()
        .filter_map(|id| id.parse::<u64>().ok())
        .max()
        .map_or(1, |max| max + 1)
        .to_string()
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the session stored under `session.id`.
    pub fn store(&self, session: GameSession) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        match sessions.get(&session.id) {
            Some(slot) => *lock(slot) = session,
            None => {
                sessions.insert(session.id.clone(), Arc::new(Mutex::new(session)));
            }
        }
    }

    /// Snapshot of the session with the given id.
    pub fn retrieve(&self, id: &str) -> Result<GameSession> {
        let slot = self.slot(id)?;
        let session = lock(&slot).clone();
        Ok(session)
    }

    /// `"1"` for an empty registry, otherwise one past the largest numeric id.
    pub fn new_id(&self) -> SessionId {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        next_id(&sessions)
    }

    pub fn clear(&self) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let dropped = sessions.len();
        sessions.clear();
        info!(dropped, "cleared session registry");
    }

    /// Allocate an id and store a fresh session under it, atomically.
    pub fn create(&self, size: BoardSize, mode: Mode) -> GameSession {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let id = next_id(&sessions);
        let session = GameSession::new(id.clone(), size, mode);
        sessions.insert(id.clone(), Arc::new(Mutex::new(session.clone())));
        info!(session_id = %id, %size, %mode, "created game session");
        session
    }

    /// Run one round on a stored session while holding that session's lock,
    /// returning the updated snapshot.
    pub fn play(&self, id: &str, raw_position: &str) -> Result<GameSession> {
        let slot = self.slot(id)?;
        let mut session = lock(&slot);
        session.round(raw_position);
        debug!(
            session_id = %id,
            message = %session.message,
            result = ?session.result,
            "round played"
        );
        Ok(session.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<SessionId> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<SessionId> = sessions.keys().cloned().collect();
        ids.sort_by_key(|id| (id.parse::<u64>().unwrap_or(u64::MAX), id.clone()));
        ids
    }

    fn slot(&self, id: &str) -> Result<SessionSlot> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions
            .get(id)
            .cloned()
            .ok_or_else(|| GameError::SessionNotFound(id.to_string()))
    }
}
