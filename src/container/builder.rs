use std::sync::Arc;

use crate::config::{ContainerConfig, FaultPolicy};
use crate::error::StateError;
use crate::record::Record;
use crate::scheduler::{Scheduler, TokioScheduler};

use super::ObservableState;

/// Builder for [`ObservableState`].
///
/// Without an explicit scheduler, [`StateBuilder::build`] binds the
/// container to the tokio runtime it is called on.
#[derive(Default)]
pub struct StateBuilder {
    initial: Record,
    name: Option<String>,
    fault_policy: FaultPolicy,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial(mut self, record: Record) -> Self {
        self.initial = record;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    /// Apply name and fault policy from configuration.
    pub fn config(mut self, config: &ContainerConfig) -> Self {
        if let Some(name) = &config.name {
            self.name = Some(name.clone());
        }
        self.fault_policy = config.fault_policy;
        self
    }

    pub fn scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
        self.scheduler = Some(Arc::new(scheduler));
        self
    }

    /// # Errors
    /// Returns [`StateError::NoRuntime`] if no scheduler was set and no tokio
    /// runtime is running.
    pub fn build(self) -> Result<ObservableState, StateError> {
        let scheduler = match self.scheduler {
            Some(scheduler) => scheduler,
            None => Arc::new(TokioScheduler::from_current()?),
        };
        Ok(ObservableState::from_parts(
            self.initial,
            self.name,
            self.fault_policy,
            scheduler,
        ))
    }
}
