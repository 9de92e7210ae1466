use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::transcript::Transcript;
use crate::types::ScenarioRow;

/// Obtains a transcript for a scenario. This is the external-collaborator
/// boundary: the engine places no constraints on how a rollout runs
/// (concurrency, timeouts, cancellation are the implementor's business).
#[async_trait]
pub trait Rollout: Send + Sync {
    async fn run(&self, row: &ScenarioRow) -> Result<Transcript>;
}

/// Wrap an async closure as a `Rollout`.
pub fn from_async_fn<F, Fut>(f: F) -> Arc<dyn Rollout>
where
    F: Send + Sync + 'static + Fn(&ScenarioRow) -> Fut,
    Fut: Future<Output = Result<Transcript>> + Send + 'static,
{
    struct ClosureRollout<F, Fut>
    where
        F: Send + Sync + 'static + Fn(&ScenarioRow) -> Fut,
        Fut: Future<Output = Result<Transcript>> + Send + 'static,
    {
        f: F,
    }

    #[async_trait]
    impl<F, Fut> Rollout for ClosureRollout<F, Fut>
    where
        F: Send + Sync + 'static + Fn(&ScenarioRow) -> Fut,
        Fut: Future<Output = Result<Transcript>> + Send + 'static,
    {
        async fn run(&self, row: &ScenarioRow) -> Result<Transcript> {
            (self.f)(row).await
        }
    }

    Arc::new(ClosureRollout { f })
}
