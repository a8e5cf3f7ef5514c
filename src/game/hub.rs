//! Shared handle that serializes every game transition.
//!
//! The controller sits behind one async mutex. Each transition's dispatch is pushed into the
//! gateway before the lock is released, so every connection sees messages in mutation order.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use super::controller::{Dispatch, Outbound, SessionController};
use super::movement::MovementFlags;
use super::{ConnectionId, GameError};
use crate::gateway::{BroadcastGateway, WsTx};

/// Point-in-time view of the session for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubStatus {
    pub players: usize,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct GameHub {
    controller: Arc<Mutex<SessionController>>,
    gateway: BroadcastGateway,
}

impl GameHub {
    #[must_use]
    pub fn new(controller: SessionController, gateway: BroadcastGateway) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            gateway,
        }
    }

    #[must_use]
    pub const fn gateway(&self) -> &BroadcastGateway {
        &self.gateway
    }

    /// Register a new connection and push its initial state.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IdentitiesExhausted`] if no identity is left to hand out.
    pub async fn connect(&self, tx: WsTx) -> Result<ConnectionId, GameError> {
        let mut controller = self.controller.lock().await;
        let (id, dispatch) = controller.on_player_connect()?;
        self.gateway.register(id, tx);
        self.deliver(dispatch);
        Ok(id)
    }

    pub async fn disconnect(&self, id: ConnectionId) {
        let mut controller = self.controller.lock().await;
        self.gateway.unregister(id);
        let dispatch = controller.on_player_disconnect(id);
        self.deliver(dispatch);
    }

    pub async fn movement(&self, id: ConnectionId, flags: MovementFlags) {
        let mut controller = self.controller.lock().await;
        match controller.on_movement(id, flags, Utc::now()) {
            Ok(dispatch) => self.deliver(dispatch),
            Err(GameError::UnknownPlayer(id)) => {
                tracing::debug!(player = %id, "Ignoring movement from unregistered player");
            }
            Err(err) => tracing::warn!("Movement failed: {err}"),
        }
    }

    pub async fn status(&self) -> HubStatus {
        let controller = self.controller.lock().await;
        HubStatus {
            players: controller.registry().len(),
            generation: controller.round().generation,
        }
    }

    fn deliver(&self, dispatch: Dispatch) {
        for outbound in dispatch {
            let (target, message) = match outbound {
                Outbound::To(id, message) => (Some(id), message),
                Outbound::All(message) => (None, message),
            };
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!(kind = message.kind(), "Failed to encode message: {err}");
                    continue;
                }
            };
            match target {
                Some(id) => self.gateway.send_to(id, &text),
                None => self.gateway.broadcast_all(&text),
            }
        }
    }
}
