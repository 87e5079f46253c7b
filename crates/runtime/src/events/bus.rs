//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use battle_core::{PlayerId, SessionId};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};

use super::types::ArenaEvent;

/// Topics for event routing
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Match-start notifications for one participant
    Player(PlayerId),
    /// Turn results and conclusion of one session
    Session(SessionId),
}

/// Topic-based event bus
///
/// Channels are created on first subscription and dropped by [`EventBus::close`]
/// or [`EventBus::prune`]; publishing to a topic nobody listens on is a no-op.
pub struct EventBus {
    channels: Arc<RwLock<HashMap<Topic, broadcast::Sender<ArenaEvent>>>>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Publish an event to a topic. Returns the number of receivers reached.
    pub async fn publish(&self, topic: &Topic, event: ArenaEvent) -> usize {
        let channels = self.channels.read().await;
        match channels.get(topic) {
            Some(tx) => tx.send(event).unwrap_or_else(|_| {
                tracing::trace!(target: "arena::events", ?topic, "no subscribers");
                0
            }),
            None => 0,
        }
    }

    /// Subscribe to a topic, creating its channel on first use.
    pub async fn subscribe(&self, topic: Topic) -> broadcast::Receiver<ArenaEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(topic)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Drops a topic's channel; its receivers observe `Closed` once drained.
    pub async fn close(&self, topic: &Topic) -> bool {
        self.channels.write().await.remove(topic).is_some()
    }

    /// Drops every channel without receivers.
    pub async fn prune(&self) -> usize {
        let mut channels = self.channels.write().await;
        let before = channels.len();
        channels.retain(|_, tx| tx.receiver_count() > 0);
        before - channels.len()
    }

    pub async fn topic_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
            capacity: self.capacity,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{
        AssetId, BattleState, Card, CardEffect, Combatant, CombatantSpec, EffectKind, Element,
        Elements, MatchMode, Participant, SideState, TargetSelector,
    };

    fn state() -> BattleState {
        let unit = || {
            Combatant::from_spec(CombatantSpec {
                id: AssetId::new("u"),
                name: "U".into(),
                elements: Elements::single(Element::Fire),
                hp: 10,
                energy: 10,
                speed: 1,
                attack: 1,
                defense: 1,
                cards: vec![Card::new(
                    "c",
                    "C",
                    Element::Fire,
                    1,
                    vec![CardEffect::new(EffectKind::Damage, 1, TargetSelector::Enemy)],
                )],
            })
            .unwrap()
        };
        BattleState::new(
            SideState::new(Participant::human(PlayerId::new("a")), vec![unit()]).unwrap(),
            SideState::new(Participant::human(PlayerId::new("b")), vec![unit()]).unwrap(),
        )
    }

    fn started(id: u64) -> ArenaEvent {
        ArenaEvent::MatchStarted {
            session: SessionId(id),
            mode: MatchMode::Ranked,
            state: Box::new(state()),
        }
    }

    #[tokio::test]
    async fn events_reach_only_their_topic() {
        let bus = EventBus::with_capacity(4);
        let mut one = bus.subscribe(Topic::Session(SessionId(1))).await;
        let mut two = bus.subscribe(Topic::Session(SessionId(2))).await;

        assert_eq!(bus.publish(&Topic::Session(SessionId(1)), started(1)).await, 1);
        assert_eq!(one.recv().await.unwrap().session(), SessionId(1));
        assert!(two.try_recv().is_err());

        // Unknown topics are silently dropped.
        assert_eq!(bus.publish(&Topic::Player(PlayerId::new("z")), started(3)).await, 0);
    }

    #[tokio::test]
    async fn closing_a_topic_ends_its_receivers() {
        let bus = EventBus::new();
        let topic = Topic::Session(SessionId(9));
        let mut rx = bus.subscribe(topic.clone()).await;
        bus.publish(&topic, started(9)).await;
        assert!(bus.close(&topic).await);

        assert!(rx.recv().await.is_ok());
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }

    #[tokio::test]
    async fn prune_drops_abandoned_topics() {
        let bus = EventBus::new();
        let kept = bus.subscribe(Topic::Player(PlayerId::new("kept"))).await;
        drop(bus.subscribe(Topic::Player(PlayerId::new("gone"))).await);

        assert_eq!(bus.prune().await, 1);
        assert_eq!(bus.topic_count().await, 1);
        drop(kept);
    }
}
