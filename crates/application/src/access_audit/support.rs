use gregor_access_core::{AppError, AppResult, UploadCycleId};
use gregor_access_domain::{ManagedGroup, Workspace};

use crate::AccessStore;

/// Loads the authorization domain group of `workspace`, if it has one.
pub(crate) async fn find_auth_domain(
    store: &dyn AccessStore,
    workspace: &Workspace,
) -> AppResult<Option<ManagedGroup>> {
    let Some(auth_domain_id) = workspace.auth_domain_id() else {
        return Ok(None);
    };

    store
        .find_managed_group(auth_domain_id)
        .await?
        .map(Some)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "auth domain group '{auth_domain_id}' of workspace '{}' does not exist",
                workspace.full_name()
            ))
        })
}

/// Whether a complete combined workspace exists for the upload cycle.
pub(crate) async fn is_combined_ready(
    store: &dyn AccessStore,
    upload_cycle_id: UploadCycleId,
) -> AppResult<bool> {
    Ok(store
        .find_complete_combined_workspace(upload_cycle_id)
        .await?
        .is_some())
}
