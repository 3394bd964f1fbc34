//! Shared application state.

use std::sync::Arc;

use crate::config::{Config, ReplicaConfig};
use crate::dispatch::Dispatcher;
use crate::model::ModelRegistry;

/// Identity of this running replica.
#[derive(Debug, Clone)]
pub struct ReplicaIdentity {
    /// Short random id, unique per process start.
    pub id: String,
    /// `<name>_<id>`
    pub deployment_name: String,
    pub stage: String,
}

impl ReplicaIdentity {
    pub fn new(config: &ReplicaConfig) -> Self {
        let id: String = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        Self {
            deployment_name: format!("{}_{}", config.name, id),
            id,
            stage: config.stage.clone(),
        }
    }
}

/// Shared application state passed to all handlers.
pub struct AppState {
    pub replica: ReplicaIdentity,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: &Config, registry: Arc<ModelRegistry>) -> Self {
        Self {
            replica: ReplicaIdentity::new(&config.replica),
            dispatcher: Dispatcher::new(registry),
        }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        self.dispatcher.registry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replica_identity() {
        let replica = ReplicaIdentity::new(&ReplicaConfig::default());
        assert_eq!(replica.id.len(), 8);
        assert_eq!(replica.deployment_name, format!("switchboard_{}", replica.id));
        assert_eq!(replica.stage, "development");

        let other = ReplicaIdentity::new(&ReplicaConfig::default());
        assert_ne!(replica.id, other.id);
    }
}
