//! Sequential execution of provisioning plans.
//!
//! The runner drives a plan against a [`CatalogProvider`], one step at a
//! time. There is no retry and no rollback: the first failure aborts the
//! run and surfaces the failed step. A cancellation flag is checked before
//! every provider call, and each call runs under a step time limit.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

use crate::catalog::CatalogProvider;
use crate::error::{ProviderResult, ProvisionError, Result, WorkshopError};

use super::plan::{ProvisionPlan, ProvisionStep};

/// Default time limit for one step, in seconds.
const DEFAULT_STEP_TIMEOUT_SECS: u64 = 60;

/// Cooperative cancellation flag shared with signal handlers.
///
/// Cancellation is checked between steps; a step already in flight is
/// allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a new, unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the run sharing this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of one executed step.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    /// Step identifier.
    pub step: String,
    /// Human-readable description.
    pub description: String,
    /// Wall-clock duration of the provider call, in milliseconds.
    pub duration_ms: u64,
}

/// Report of a completed run. This is the workflow's only output; the
/// provider remains the source of truth for resource state.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    /// Unique identifier of this run.
    pub run_id: Uuid,
    /// Catalog the run operated on.
    pub catalog: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Executed steps in order.
    pub steps: Vec<StepOutcome>,
}

impl StatusReport {
    /// Returns the total run duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds().max(0)
    }
}

impl std::fmt::Display for StatusReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Run {}: {} steps completed for catalog '{}' in {} ms",
            self.run_id,
            self.steps.len(),
            self.catalog,
            self.duration_ms()
        )
    }
}

/// Executor for provisioning plans.
pub struct StepRunner<'a> {
    /// Provider receiving the steps.
    provider: &'a dyn CatalogProvider,
    /// Time limit for one step.
    step_timeout: Duration,
    /// Cooperative cancellation flag.
    cancel: CancelFlag,
}

impl<'a> StepRunner<'a> {
    /// Creates a runner with the default step time limit.
    #[must_use]
    pub fn new(provider: &'a dyn CatalogProvider) -> Self {
        Self {
            provider,
            step_timeout: Duration::from_secs(DEFAULT_STEP_TIMEOUT_SECS),
            cancel: CancelFlag::new(),
        }
    }

    /// Sets the time limit for one step.
    #[must_use]
    pub const fn with_step_timeout(mut self, secs: u64) -> Self {
        self.step_timeout = Duration::from_secs(secs);
        self
    }

    /// Attaches a cancellation flag.
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Executes a plan to completion.
    ///
    /// # Errors
    ///
    /// Returns an error naming the step that failed, timed out, or was
    /// pending when cancellation was requested. Steps after a failure are
    /// not executed.
    pub async fn run(&self, plan: &ProvisionPlan) -> Result<StatusReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        info!(
            "Run {run_id}: executing {} steps for catalog '{}'",
            plan.steps.len(),
            plan.catalog
        );

        let mut steps = Vec::with_capacity(plan.steps.len());

        for step in &plan.steps {
            if self.cancel.is_cancelled() {
                info!("Run {run_id} cancelled before step '{}'", step.id());
                return Err(ProvisionError::cancelled(step.id()).into());
            }

            info!("Run {run_id}: {}", step.description());
            let step_started = std::time::Instant::now();

            match tokio::time::timeout(self.step_timeout, self.dispatch(step)).await {
                Ok(Ok(())) => {
                    steps.push(StepOutcome {
                        step: step.id(),
                        description: step.description(),
                        duration_ms: step_started
                            .elapsed()
                            .as_millis()
                            .try_into()
                            .unwrap_or(u64::MAX),
                    });
                }
                Ok(Err(provider_error)) => {
                    error!("Run {run_id}: step '{}' failed: {provider_error}", step.id());
                    return Err(ProvisionError::step_failed(step.id(), provider_error).into());
                }
                Err(_) => {
                    error!(
                        "Run {run_id}: step '{}' timed out after {}s",
                        step.id(),
                        self.step_timeout.as_secs()
                    );
                    return Err(WorkshopError::Provision(ProvisionError::StepTimeout {
                        step: step.id(),
                        limit_secs: self.step_timeout.as_secs(),
                    }));
                }
            }
        }

        let report = StatusReport {
            run_id,
            catalog: plan.catalog.clone(),
            started_at,
            finished_at: Utc::now(),
            steps,
        };

        info!("{report}");
        Ok(report)
    }

    /// Issues one step against the provider.
    async fn dispatch(&self, step: &ProvisionStep) -> ProviderResult<()> {
        match step {
            ProvisionStep::EnsureCatalog { name, comment } => {
                self.provider.create_catalog_if_absent(name, comment).await
            }
            ProvisionStep::SelectCatalog { name } => self.provider.use_catalog(name).await,
            ProvisionStep::EnsureSchema { catalog, name, comment } => {
                self.provider
                    .create_schema_if_absent(catalog, name, comment)
                    .await
            }
            ProvisionStep::SelectSchema { catalog, name } => {
                self.provider.use_schema(catalog, name).await
            }
            ProvisionStep::DropTable { table } => self.provider.drop_table_if_exists(table).await,
            ProvisionStep::DropSchema { catalog, name, cascade } => {
                self.provider
                    .drop_schema_if_exists(catalog, name, *cascade)
                    .await
            }
            ProvisionStep::DropCatalog { name, cascade } => {
                self.provider.drop_catalog_if_exists(name, *cascade).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MockCatalogProvider, TableRef};
    use crate::error::ProviderError;
    use crate::provision::plan::{CATALOG_COMMENT, SCHEMA_COMMENT};
    use mockall::Sequence;
    use mockall::predicate::eq;

    fn tables(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[tokio::test]
    async fn test_provision_issues_exactly_four_calls_in_order() {
        let mut provider = MockCatalogProvider::new();
        let mut seq = Sequence::new();

        provider
            .expect_create_catalog_if_absent()
            .with(eq("mcp_workshop"), eq(CATALOG_COMMENT))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        provider
            .expect_use_catalog()
            .with(eq("mcp_workshop"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        provider
            .expect_create_schema_if_absent()
            .with(eq("mcp_workshop"), eq("default"), eq(SCHEMA_COMMENT))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        provider
            .expect_use_schema()
            .with(eq("mcp_workshop"), eq("default"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let plan = ProvisionPlan::provision("mcp_workshop", "default");
        let report = StepRunner::new(&provider)
            .run(&plan)
            .await
            .expect("provision succeeds");

        assert_eq!(report.steps.len(), 4);
        assert_eq!(report.catalog, "mcp_workshop");
        assert_eq!(report.steps[0].step, "ensure-catalog:mcp_workshop");
        assert_eq!(report.steps[3].step, "select-schema:mcp_workshop.default");
    }

    #[tokio::test]
    async fn test_rerunning_provision_issues_the_same_calls() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_create_catalog_if_absent()
            .times(2)
            .returning(|_, _| Ok(()));
        provider.expect_use_catalog().times(2).returning(|_| Ok(()));
        provider
            .expect_create_schema_if_absent()
            .times(2)
            .returning(|_, _, _| Ok(()));
        provider.expect_use_schema().times(2).returning(|_, _| Ok(()));

        let plan = ProvisionPlan::provision("mcp_workshop", "default");
        let runner = StepRunner::new(&provider);

        runner.run(&plan).await.expect("first run succeeds");
        runner.run(&plan).await.expect("second run succeeds");
    }

    #[tokio::test]
    async fn test_teardown_drops_each_table_and_nothing_else() {
        let mut provider = MockCatalogProvider::new();
        let mut seq = Sequence::new();

        for name in ["sales", "customers", "products"] {
            provider
                .expect_drop_table_if_exists()
                .with(eq(TableRef::new("mcp_workshop", "default", name)))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
        }
        provider.expect_drop_schema_if_exists().never();
        provider.expect_drop_catalog_if_exists().never();

        let plan = ProvisionPlan::teardown(
            "mcp_workshop",
            "default",
            &tables(&["sales", "customers", "products"]),
            false,
        );
        let report = StepRunner::new(&provider)
            .run(&plan)
            .await
            .expect("teardown succeeds");

        assert_eq!(report.steps.len(), 3);
    }

    #[tokio::test]
    async fn test_cascade_teardown_ends_with_schema_then_catalog() {
        let mut provider = MockCatalogProvider::new();
        let mut seq = Sequence::new();

        provider
            .expect_drop_table_if_exists()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        provider
            .expect_drop_schema_if_exists()
            .with(eq("mcp_workshop"), eq("default"), eq(true))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        provider
            .expect_drop_catalog_if_exists()
            .with(eq("mcp_workshop"), eq(true))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let plan = ProvisionPlan::teardown("mcp_workshop", "default", &tables(&["sales"]), true);
        StepRunner::new(&provider)
            .run(&plan)
            .await
            .expect("cascade teardown succeeds");
    }

    #[tokio::test]
    async fn test_failure_aborts_run_and_names_the_step() {
        let mut provider = MockCatalogProvider::new();

        provider
            .expect_drop_table_if_exists()
            .with(eq(TableRef::new("mcp_workshop", "default", "sales")))
            .times(1)
            .returning(|_| Ok(()));
        provider
            .expect_drop_table_if_exists()
            .with(eq(TableRef::new("mcp_workshop", "default", "customers")))
            .times(1)
            .returning(|_| Err(ProviderError::api_error(500, "warehouse unavailable")));

        let plan = ProvisionPlan::teardown(
            "mcp_workshop",
            "default",
            &tables(&["sales", "customers", "products"]),
            false,
        );
        let err = StepRunner::new(&provider)
            .run(&plan)
            .await
            .expect_err("run aborts on failure");

        assert_eq!(err.failed_step(), Some("drop-table:mcp_workshop.default.customers"));
    }

    #[tokio::test]
    async fn test_cancellation_checked_before_first_step() {
        let provider = MockCatalogProvider::new();
        let cancel = CancelFlag::new();
        cancel.cancel();

        let plan = ProvisionPlan::provision("mcp_workshop", "default");
        let err = StepRunner::new(&provider)
            .with_cancel_flag(cancel)
            .run(&plan)
            .await
            .expect_err("cancelled run aborts");

        assert_eq!(err.failed_step(), Some("ensure-catalog:mcp_workshop"));
        assert!(matches!(
            err,
            WorkshopError::Provision(ProvisionError::Cancelled { .. })
        ));
    }

    /// Provider whose first operation hangs far beyond any step limit.
    struct StalledProvider;

    #[async_trait::async_trait]
    impl CatalogProvider for StalledProvider {
        async fn create_catalog_if_absent(&self, _name: &str, _comment: &str) -> ProviderResult<()> {
            tokio::time::sleep(Duration::from_secs(86_400)).await;
            Ok(())
        }

        async fn use_catalog(&self, _name: &str) -> ProviderResult<()> {
            Ok(())
        }

        async fn create_schema_if_absent(
            &self,
            _catalog: &str,
            _name: &str,
            _comment: &str,
        ) -> ProviderResult<()> {
            Ok(())
        }

        async fn use_schema(&self, _catalog: &str, _name: &str) -> ProviderResult<()> {
            Ok(())
        }

        async fn drop_table_if_exists(&self, _table: &TableRef) -> ProviderResult<()> {
            Ok(())
        }

        async fn drop_schema_if_exists(
            &self,
            _catalog: &str,
            _name: &str,
            _cascade: bool,
        ) -> ProviderResult<()> {
            Ok(())
        }

        async fn drop_catalog_if_exists(&self, _name: &str, _cascade: bool) -> ProviderResult<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_exceeding_limit_times_out() {
        let provider = StalledProvider;
        let plan = ProvisionPlan::provision("mcp_workshop", "default");

        let err = StepRunner::new(&provider)
            .with_step_timeout(30)
            .run(&plan)
            .await
            .expect_err("stalled step times out");

        match err {
            WorkshopError::Provision(ProvisionError::StepTimeout { step, limit_secs }) => {
                assert_eq!(step, "ensure-catalog:mcp_workshop");
                assert_eq!(limit_secs, 30);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_plan_produces_empty_report() {
        let provider = MockCatalogProvider::new();
        let plan = ProvisionPlan::teardown("mcp_workshop", "default", &[], false);

        let report = StepRunner::new(&provider)
            .run(&plan)
            .await
            .expect("empty plan succeeds");

        assert!(report.steps.is_empty());
    }
}
