use async_trait::async_trait;
use gregor_access_core::{AppError, AppResult};
use gregor_access_domain::{ManagedGroup, Workspace};
use tracing::{debug, info, warn};

use super::decision::{AuditBucket, Classified};
use super::results::AuditResult;
use crate::{AccessRemediationService, AuditScope, AuditTable};

/// One audit kind: which workspaces it covers and how it classifies a pair.
#[async_trait]
pub trait AccessAudit: Send + Sync {
    /// Workspace kind this audit covers.
    type Workspace: Clone + Send + Sync;

    /// Result kind this audit produces.
    type Result: AuditResult;

    /// Per-workspace state shared by every group of one workspace.
    type Snapshot: Send + Sync;

    /// Display name used in summaries and email subjects.
    fn name(&self) -> &'static str;

    /// Returns the base workspace of an audited record.
    fn base_workspace<'a>(&self, workspace: &'a Self::Workspace) -> &'a Workspace;

    /// Whether workspaces without an authorization domain are skipped.
    fn requires_auth_domain(&self) -> bool {
        false
    }

    /// Loads the workspaces in scope, failing if an id is of another kind.
    async fn load_workspaces(&self, scope: &AuditScope) -> AppResult<Vec<Self::Workspace>>;

    /// Loads every managed group.
    async fn list_groups(&self) -> AppResult<Vec<ManagedGroup>>;

    /// Loads the state every group of `workspace` is classified against,
    /// such as its lifecycle and authorization domain.
    async fn snapshot(&self, workspace: &Self::Workspace) -> AppResult<Self::Snapshot>;

    /// Classifies one pair against a snapshot of its workspace.
    ///
    /// Returns `None` for pairs the audit never reports.
    async fn classify_with(
        &self,
        workspace: &Self::Workspace,
        snapshot: &Self::Snapshot,
        managed_group: &ManagedGroup,
    ) -> AppResult<Option<Classified<Self::Result>>>;

    /// Classifies one pair, loading a fresh snapshot of its workspace.
    async fn classify(
        &self,
        workspace: &Self::Workspace,
        managed_group: &ManagedGroup,
    ) -> AppResult<Option<Classified<Self::Result>>> {
        let snapshot = self.snapshot(workspace).await?;
        self.classify_with(workspace, &snapshot, managed_group).await
    }
}

/// Single-use run of an [`AccessAudit`] over a scope, holding the three buckets.
pub struct AuditRun<A: AccessAudit> {
    audit: A,
    workspaces: Vec<A::Workspace>,
    verified: Vec<A::Result>,
    needs_action: Vec<A::Result>,
    errors: Vec<A::Result>,
    completed: bool,
}

impl<A: AccessAudit> AuditRun<A> {
    /// Resolves the scope and prepares an empty run.
    pub async fn new(audit: A, scope: AuditScope) -> AppResult<Self> {
        let workspaces = audit.load_workspaces(&scope).await?;

        Ok(Self {
            audit,
            workspaces,
            verified: Vec::new(),
            needs_action: Vec::new(),
            errors: Vec::new(),
            completed: false,
        })
    }

    /// Returns the audit being run.
    #[must_use]
    pub fn audit(&self) -> &A {
        &self.audit
    }

    /// Returns the workspaces in scope.
    #[must_use]
    pub fn workspaces(&self) -> &[A::Workspace] {
        &self.workspaces
    }

    /// Classifies every workspace in scope against every managed group.
    pub async fn run_audit(&mut self) -> AppResult<()> {
        if self.completed {
            return Err(AppError::Conflict(format!(
                "{} has already been run; create a new audit to run it again",
                self.audit.name()
            )));
        }

        let checkpoint = (
            self.verified.len(),
            self.needs_action.len(),
            self.errors.len(),
        );
        if let Err(error) = self.classify_all().await {
            // Drop partial results so a retry starts clean.
            self.verified.truncate(checkpoint.0);
            self.needs_action.truncate(checkpoint.1);
            self.errors.truncate(checkpoint.2);
            return Err(error);
        }

        self.completed = true;
        info!(
            audit = self.audit.name(),
            workspaces = self.workspaces.len(),
            verified = self.verified.len(),
            needs_action = self.needs_action.len(),
            errors = self.errors.len(),
            "audit completed"
        );

        Ok(())
    }

    async fn classify_all(&mut self) -> AppResult<()> {
        let groups = self.audit.list_groups().await?;
        let workspaces = self.workspaces.clone();
        for workspace in &workspaces {
            let base = self.audit.base_workspace(workspace);
            if self.audit.requires_auth_domain() && base.auth_domain_id().is_none() {
                warn!(
                    audit = self.audit.name(),
                    workspace = %base.full_name(),
                    "skipping workspace without an authorization domain"
                );
                continue;
            }

            let snapshot = self.audit.snapshot(workspace).await?;
            for group in &groups {
                let classified = self.audit.classify_with(workspace, &snapshot, group).await?;
                self.record(classified, group);
            }
        }

        Ok(())
    }

    /// Classifies one pair and appends the result to its bucket.
    ///
    /// Returns the bucket, or `None` when the pair is exempt.
    pub async fn audit_workspace_and_group(
        &mut self,
        workspace: &A::Workspace,
        managed_group: &ManagedGroup,
    ) -> AppResult<Option<AuditBucket>> {
        let classified = self.audit.classify(workspace, managed_group).await?;
        Ok(self.record(classified, managed_group))
    }

    fn record(
        &mut self,
        classified: Option<Classified<A::Result>>,
        managed_group: &ManagedGroup,
    ) -> Option<AuditBucket> {
        let Classified { bucket, result } = classified?;

        debug!(
            audit = self.audit.name(),
            workspace = %result.workspace().full_name(),
            managed_group = %managed_group.name(),
            bucket = bucket.as_str(),
            note = result.note_code(),
            action = result.action_label().unwrap_or("none"),
            "classified pair"
        );

        match bucket {
            AuditBucket::Verified => self.verified.push(result),
            AuditBucket::NeedsAction => self.needs_action.push(result),
            AuditBucket::Error => self.errors.push(result),
        }

        Some(bucket)
    }

    /// Returns whether [`AuditRun::run_audit`] has finished.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Results whose actual state matches the desired state.
    #[must_use]
    pub fn verified(&self) -> &[A::Result] {
        &self.verified
    }

    /// Results that need a normal workflow step.
    #[must_use]
    pub fn needs_action(&self) -> &[A::Result] {
        &self.needs_action
    }

    /// Results signalling an anomaly.
    #[must_use]
    pub fn errors(&self) -> &[A::Result] {
        &self.errors
    }

    /// Mutable access to the needs-action bucket.
    pub fn needs_action_mut(&mut self) -> &mut [A::Result] {
        &mut self.needs_action
    }

    /// Mutable access to the error bucket, for operator-driven remediation.
    pub fn errors_mut(&mut self) -> &mut [A::Result] {
        &mut self.errors
    }

    /// Verified, then needs-action, then error results.
    pub fn get_all_results(&self) -> AppResult<Vec<&A::Result>> {
        self.ensure_completed()?;

        Ok(self
            .verified
            .iter()
            .chain(&self.needs_action)
            .chain(&self.errors)
            .collect())
    }

    /// True when the run completed without needs-action or error results.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.completed && self.needs_action.is_empty() && self.errors.is_empty()
    }

    /// Projects the verified bucket.
    #[must_use]
    pub fn get_verified_table(&self) -> AuditTable {
        AuditTable::from_results(format!("{} - verified", self.audit.name()), &self.verified)
    }

    /// Projects the needs-action bucket.
    #[must_use]
    pub fn get_needs_action_table(&self) -> AuditTable {
        AuditTable::from_results(
            format!("{} - needs action", self.audit.name()),
            &self.needs_action,
        )
    }

    /// Projects the error bucket.
    #[must_use]
    pub fn get_errors_table(&self) -> AuditTable {
        AuditTable::from_results(format!("{} - errors", self.audit.name()), &self.errors)
    }

    /// Applies every unhandled needs-action result, one at a time.
    ///
    /// Stops at the first failure. Returns how many results were handled.
    pub async fn handle_needs_action(
        &mut self,
        remediation: &AccessRemediationService,
    ) -> AppResult<usize> {
        self.ensure_completed()?;

        let mut handled = 0;
        for result in self.needs_action.iter_mut() {
            if result.is_handled() {
                continue;
            }

            if let Err(error) = result.handle(remediation).await {
                warn!(
                    audit = self.audit.name(),
                    handled,
                    workspace = %result.workspace().full_name(),
                    managed_group = %result.managed_group().name(),
                    error = %error,
                    "stopping remediation after failure"
                );
                return Err(error);
            }
            handled += 1;
        }

        Ok(handled)
    }

    fn ensure_completed(&self) -> AppResult<()> {
        if self.completed {
            return Ok(());
        }

        Err(AppError::Conflict(
            "audit has not been completed; use run_audit() to run the audit".to_owned(),
        ))
    }
}
