//! Configuration types for the replica planner.

use crate::error::{Error, Result};
use crate::executor::strategy::{ReplicaMovementStrategy, StrategyKind};

/// Main configuration for the execution task planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    /// First execution id handed out by a planning call.
    pub first_execution_id: u64,

    /// Strategies applied to replica tasks, in chain order.
    pub strategies: Vec<StrategyKind>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            first_execution_id: 0,
            strategies: vec![StrategyKind::SingleReplica],
        }
    }
}

impl PlannerConfig {
    /// Create a configuration with the default strategy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first execution id.
    pub fn with_first_execution_id(mut self, first_execution_id: u64) -> Self {
        self.first_execution_id = first_execution_id;
        self
    }

    /// Set the strategy chain.
    pub fn with_strategies(mut self, strategies: Vec<StrategyKind>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Set the strategy chain from configuration names.
    pub fn with_strategy_names<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self> {
        self.strategies = names
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<Vec<_>>>()?;
        Ok(self)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.strategies.is_empty() {
            return Err(Error::Config(
                "at least one replica movement strategy is required".to_string(),
            ));
        }
        if self.strategies.len() > 1 && self.strategies.contains(&StrategyKind::SingleReplica) {
            return Err(Error::Config(format!(
                "{} cannot be combined with other strategies",
                StrategyKind::SingleReplica
            )));
        }
        Ok(())
    }

    /// Build the configured strategy chain.
    pub fn build_strategy(&self) -> Result<ReplicaMovementStrategy> {
        self.validate()?;
        let mut kinds = self.strategies.iter();
        let mut strategy = match kinds.next() {
            Some(kind) => ReplicaMovementStrategy::from_kind(*kind, self.first_execution_id),
            None => return Err(Error::Config("empty strategy chain".to_string())),
        };
        for kind in kinds {
            strategy =
                strategy.chain(ReplicaMovementStrategy::from_kind(*kind, self.first_execution_id))?;
        }
        Ok(strategy)
    }
}
