//! Game events and the queue carrying them from input to game logic.

use crossbeam_channel::{Receiver, Sender, unbounded};

/// Something the player (or a script) asked the game to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Fire the focused tank with its current aim.
    Fire,
    /// Fire a specific tank with an explicit aim.
    Shoot { tank: u32, angle: f64, power: f64 },
    /// Rotate the focused tank's aim by this many radians.
    Aim(f64),
    /// Change the focused tank's power.
    Power(f64),
    /// Focus the next living tank.
    NextTank,
    Quit,
}

/// Unbounded multi-producer queue of [`GameEvent`]s.
#[derive(Clone)]
pub struct EventQueue {
    tx: Sender<GameEvent>,
    rx: Receiver<GameEvent>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Handle for producers on other threads.
    pub fn sender(&self) -> Sender<GameEvent> {
        self.tx.clone()
    }

    pub fn push(&self, event: GameEvent) {
        // Cannot fail: the queue owns a receiver.
        let _ = self.tx.send(event);
    }

    /// Take every queued event, oldest first, without blocking.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_in_order() {
        let queue = EventQueue::new();
        queue.push(GameEvent::Aim(0.1));
        queue.sender().send(GameEvent::Fire).unwrap();
        assert_eq!(queue.drain(), vec![GameEvent::Aim(0.1), GameEvent::Fire]);
        assert!(queue.drain().is_empty());
    }
}
