// ============================================================================
// Transfer Executor Interface
// Moves assets on behalf of the settlement engine
// ============================================================================

use std::collections::BTreeSet;

use crate::error::TransferError;
use crate::types::{short_hex, Address, ConduitKey, Execution, ItemType, ReceivedItem, ZERO_WORD};

/// Performs the asset transfers derived by the engine.
pub trait TransferExecutor {
    /// Move `item` from `from`, through the conduit selected by `conduit_key`
    /// (zero for a direct transfer).
    fn transfer(
        &mut self,
        item: &ReceivedItem,
        from: &Address,
        conduit_key: &ConduitKey,
    ) -> Result<(), TransferError>;

    /// Run a batch of executions in order.
    ///
    /// The engine commits state only after this returns `Ok`, so an
    /// implementation must either perform every transfer or none of them.
    /// The default runs transfers one by one and is only all-or-nothing for
    /// executors whose `transfer` has no side effects on failure.
    fn execute_batch(&mut self, executions: &[Execution]) -> Result<(), TransferError> {
        for execution in executions {
            self.transfer(&execution.item, &execution.offerer, &execution.conduit_key)?;
        }
        Ok(())
    }
}

/// Executor that records transfers in memory.
///
/// Direct transfers always pass; conduit transfers require the conduit to be
/// opened first. Unique tokens must move with amount 1. A failure can be
/// injected on the n-th transfer to exercise batch rollback.
#[derive(Debug, Clone, Default)]
pub struct RecordingExecutor {
    transfers: Vec<Execution>,
    conduits: BTreeSet<ConduitKey>,
    fail_on: Option<usize>,
    attempts: usize,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow transfers through `conduit_key`
    pub fn open_conduit(&mut self, conduit_key: ConduitKey) {
        self.conduits.insert(conduit_key);
    }

    /// Reject the n-th transfer attempt (0-based, counted across batches)
    pub fn fail_on(&mut self, attempt: usize) {
        self.fail_on = Some(attempt);
    }

    /// Committed transfers in execution order
    pub fn transfers(&self) -> &[Execution] {
        &self.transfers
    }

    fn check(
        &mut self,
        item: &ReceivedItem,
        conduit_key: &ConduitKey,
    ) -> Result<(), TransferError> {
        let attempt = self.attempts;
        self.attempts += 1;

        if self.fail_on == Some(attempt) {
            return Err(TransferError::Rejected {
                reason: format!("injected failure on transfer {}", attempt),
            });
        }
        if *conduit_key != ZERO_WORD && !self.conduits.contains(conduit_key) {
            return Err(TransferError::UnknownConduit {
                conduit: short_hex(conduit_key),
            });
        }
        if item.item_type == ItemType::Unique && item.amount != 1 {
            return Err(TransferError::InvalidUniqueAmount { amount: item.amount });
        }
        Ok(())
    }
}

impl TransferExecutor for RecordingExecutor {
    fn transfer(
        &mut self,
        item: &ReceivedItem,
        from: &Address,
        conduit_key: &ConduitKey,
    ) -> Result<(), TransferError> {
        self.check(item, conduit_key)?;
        self.transfers.push(Execution::new(item.clone(), *from, *conduit_key));
        Ok(())
    }

    fn execute_batch(&mut self, executions: &[Execution]) -> Result<(), TransferError> {
        for execution in executions {
            self.check(&execution.item, &execution.conduit_key)?;
        }
        self.transfers.extend_from_slice(executions);
        Ok(())
    }
}
