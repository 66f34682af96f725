//! Progress delivery to the observer side.

use msgvault_core::BackupState;
use tokio::sync::mpsc;

/// Receives ordered state snapshots from a running engine.
///
/// Called for every phase transition and every processed chunk;
/// implementations must tolerate rapid calls while the run is in the
/// running phase, and must not block the engine.
pub trait ProgressSink: Send + Sync {
    /// Deliver one snapshot.
    fn on_state(&self, state: BackupState);
}

/// Sink that forwards snapshots into an unbounded channel.
///
/// The engine side stays non-blocking; the observer drains the receiver at
/// its own pace. Once the receiver is dropped, further snapshots are
/// silently discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<BackupState>,
}

impl ChannelSink {
    /// Create a sink and the receiver the observer drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BackupState>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn on_state(&self, state: BackupState) {
        // Observer gone is not the engine's problem
        let _ = self.tx.send(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msgvault_core::Phase;
    use msgvault_types::RunKind;

    #[tokio::test]
    async fn snapshots_arrive_in_emission_order() {
        let (sink, mut rx) = ChannelSink::new();

        let queued = BackupState::queued(RunKind::Manual);
        sink.on_state(queued.clone());
        sink.on_state(queued.advance(Phase::Login));

        assert_eq!(rx.recv().await.unwrap().phase, Phase::Queued);
        assert_eq!(rx.recv().await.unwrap().phase, Phase::Login);
    }

    #[tokio::test]
    async fn dropped_receiver_is_tolerated() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);

        // Must not panic or error
        sink.on_state(BackupState::queued(RunKind::Scheduled));
    }
}
