//! Tournament actor: the single writer for one tournament.
//!
//! Mutations queue on the actor's inbox and are applied one at a time to a
//! copy of the current state. The copy is saved through the repository and
//! only then published, so readers holding a snapshot never observe a
//! half-applied propagation or an unsaved change.

use super::{
    errors::{ServiceError, ServiceResult},
    messages::{Mutation, TournamentMessage},
    models::{Tournament, TournamentId},
};
use crate::db::TournamentRepository;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Inbox capacity per tournament
const INBOX_CAPACITY: usize = 64;

/// Tournament actor handle for sending messages and reading snapshots
#[derive(Clone)]
pub struct TournamentHandle {
    sender: mpsc::Sender<TournamentMessage>,
    snapshot: watch::Receiver<Arc<Tournament>>,
    tournament_id: TournamentId,
}

impl TournamentHandle {
    /// Get tournament ID
    pub fn tournament_id(&self) -> TournamentId {
        self.tournament_id
    }

    /// Latest committed state
    ///
    /// Never waits on the actor; concurrent readers all see a complete state.
    pub fn snapshot(&self) -> Arc<Tournament> {
        self.snapshot.borrow().clone()
    }

    /// Apply a mutation and wait for the committed result
    ///
    /// # Errors
    ///
    /// - `Tournament` if the engine rejects the mutation
    /// - `Storage` if the new state could not be saved (nothing is committed)
    /// - `Unavailable` if the actor has stopped
    pub async fn apply(&self, mutation: Mutation) -> ServiceResult<Arc<Tournament>> {
        let (response, rx) = oneshot::channel();
        self.sender
            .send(TournamentMessage::Apply { mutation, response })
            .await
            .map_err(|_| ServiceError::Unavailable(self.tournament_id))?;
        rx.await
            .map_err(|_| ServiceError::Unavailable(self.tournament_id))?
    }

    /// Stop the actor after it drains the messages queued before this one
    pub async fn close(&self) {
        let (response, rx) = oneshot::channel();
        if self
            .sender
            .send(TournamentMessage::Close { response })
            .await
            .is_ok()
        {
            let _ = rx.await;
        }
    }
}

/// Actor owning a single tournament
pub struct TournamentActor {
    /// Committed state
    tournament: Arc<Tournament>,

    /// Message inbox
    inbox: mpsc::Receiver<TournamentMessage>,

    /// Persistence collaborator
    repository: Arc<dyn TournamentRepository>,

    /// Publishes committed snapshots to handles
    published: watch::Sender<Arc<Tournament>>,
}

impl TournamentActor {
    /// Create a new tournament actor
    ///
    /// # Returns
    ///
    /// * `(TournamentActor, TournamentHandle)` - Actor and handle for sending messages
    pub fn new(tournament: Tournament, repository: Arc<dyn TournamentRepository>) -> (Self, TournamentHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let tournament_id = tournament.id;
        let tournament = Arc::new(tournament);
        let (published, snapshot) = watch::channel(tournament.clone());

        let actor = Self {
            tournament,
            inbox,
            repository,
            published,
        };
        let handle = TournamentHandle {
            sender,
            snapshot,
            tournament_id,
        };

        (actor, handle)
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        log::debug!("Tournament {} actor starting", self.tournament.id);

        while let Some(message) = self.inbox.recv().await {
            match message {
                TournamentMessage::Apply { mutation, response } => {
                    let result = self.handle_mutation(mutation).await;
                    let _ = response.send(result);
                }
                TournamentMessage::Close { response } => {
                    let _ = response.send(());
                    break;
                }
            }
        }

        log::debug!("Tournament {} actor stopped", self.tournament.id);
    }

    async fn handle_mutation(&mut self, mutation: Mutation) -> ServiceResult<Arc<Tournament>> {
        let action = mutation.name();
        let mut next = Tournament::clone(&self.tournament);

        if let Err(e) = mutation.apply(&mut next, Utc::now()) {
            log::debug!("Tournament {}: {} rejected: {}", next.id, action, e);
            return Err(e.into());
        }

        if let Err(e) = self.repository.save(&next).await {
            log::error!("Tournament {}: failed to save after {}: {}", next.id, action, e);
            return Err(e.into());
        }

        let next = Arc::new(next);
        self.tournament = next.clone();
        self.published.send_replace(next.clone());
        Ok(next)
    }
}
