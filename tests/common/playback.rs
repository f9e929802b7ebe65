//! Helpers for driving players under a paused tokio clock

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use keyreplay::{KeystrokePlayer, PlayerOptions};
use tokio::time::Instant;

/// Counts completion callbacks
#[derive(Clone, Default)]
pub struct CompletionCounter(Rc<Cell<usize>>);

impl CompletionCounter {
    pub fn count(&self) -> usize {
        self.0.get()
    }

    /// Options that bump this counter on completion
    pub fn attach(&self, options: PlayerOptions) -> PlayerOptions {
        let counter = Rc::clone(&self.0);
        options.on_complete(move || counter.set(counter.get() + 1))
    }
}

/// Sleep in small steps until the player completes; returns the time waited
pub async fn wait_for_completion(player: &KeystrokePlayer) -> Duration {
    let started = Instant::now();
    while !player.is_completed() {
        assert!(
            started.elapsed() < super::test_timeout(),
            "playback did not complete: {:?}",
            player
        );
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    started.elapsed()
}
