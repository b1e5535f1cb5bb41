use crate::core::ScenarioRecord;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Holds the current scenario.
///
/// Records are swapped whole behind a watch channel, so a reader sees either
/// the previous record or the new one, never a mix. Clones share the same
/// record.
#[derive(Clone)]
pub struct ScenarioStore {
    current: Arc<watch::Sender<Arc<ScenarioRecord>>>,
}

impl ScenarioStore {
    pub fn new(seed: ScenarioRecord) -> Self {
        let (sender, _) = watch::channel(Arc::new(seed));
        Self {
            current: Arc::new(sender),
        }
    }

    /// Snapshot of the current record
    pub fn current(&self) -> Arc<ScenarioRecord> {
        self.current.borrow().clone()
    }

    /// Replace the record, notifying subscribers
    pub fn replace(&self, record: ScenarioRecord) {
        debug!(
            transaction_id = record.transaction_id,
            deal_amount = %record.deal_amount,
            "scenario replaced"
        );
        self.current.send_replace(Arc::new(record));
    }

    /// Receive a notification on every replace
    pub fn subscribe(&self) -> watch::Receiver<Arc<ScenarioRecord>> {
        self.current.subscribe()
    }
}
