use gregor_access_core::{AppError, AppResult};
use gregor_access_domain::{AccessLevel, GroupRole};
use serde::Serialize;

use crate::AuditResult;

/// Access state observed when a pair was audited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditRowState {
    /// Sharing audits: the grant, if any.
    Sharing {
        /// Access level, `None` when not shared.
        access: Option<AccessLevel>,
        /// Compute permission, `None` when not shared.
        can_compute: Option<bool>,
    },
    /// Auth domain audits: the role, if any.
    Membership {
        /// Role, `None` when not a member.
        role: Option<GroupRole>,
    },
}

impl AuditRowState {
    fn render(&self) -> String {
        match self {
            Self::Sharing {
                access: Some(access),
                can_compute,
            } => {
                if can_compute.unwrap_or(false) {
                    format!("{} + compute", access.as_str())
                } else {
                    access.as_str().to_owned()
                }
            }
            Self::Membership { role: Some(role) } => role.as_str().to_owned(),
            Self::Sharing { access: None, .. } | Self::Membership { role: None } => "-".to_owned(),
        }
    }
}

/// Flat projection of one audit result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditTableRow {
    /// `billing_project/name` of the workspace.
    pub workspace: String,
    /// Audited group name.
    pub managed_group: String,
    /// Authorization domain name, for auth domain audits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_domain: Option<String>,
    /// Observed state.
    pub current_state: AuditRowState,
    /// Note constant.
    pub note: String,
    /// Note explanation.
    pub note_message: String,
    /// Remediation label, `None` when verified.
    pub action: Option<String>,
}

/// Titled table of audit results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditTable {
    title: String,
    rows: Vec<AuditTableRow>,
}

impl AuditTable {
    /// Creates a table from prepared rows.
    #[must_use]
    pub fn new(title: impl Into<String>, rows: Vec<AuditTableRow>) -> Self {
        Self {
            title: title.into(),
            rows,
        }
    }

    /// Projects a bucket of results.
    #[must_use]
    pub fn from_results<R: AuditResult>(title: impl Into<String>, results: &[R]) -> Self {
        Self {
            title: title.into(),
            rows: results.iter().map(AuditResult::table_row).collect(),
        }
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the rows.
    #[must_use]
    pub fn rows(&self) -> &[AuditTableRow] {
        &self.rows
    }

    /// Returns whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders an aligned plain-text table.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut output = format!("{}\n", self.title);
        if self.rows.is_empty() {
            output.push_str("(no results)\n");
            return output;
        }

        let with_auth_domain = self.rows.iter().any(|row| row.auth_domain.is_some());
        let mut header = vec!["workspace", "managed_group"];
        if with_auth_domain {
            header.push("auth_domain");
        }
        header.extend(["current", "note", "action"]);

        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![row.workspace.clone(), row.managed_group.clone()];
                if with_auth_domain {
                    cells.push(row.auth_domain.clone().unwrap_or_else(|| "-".to_owned()));
                }
                cells.push(row.current_state.render());
                cells.push(row.note.clone());
                cells.push(row.action.clone().unwrap_or_else(|| "-".to_owned()));
                cells
            })
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|title| title.len()).collect();
        for cells in &body {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header: Vec<String> = header.iter().map(|title| (*title).to_owned()).collect();
        push_line(&mut output, &header, &widths);
        let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        push_line(&mut output, &rule, &widths);
        for cells in &body {
            push_line(&mut output, cells, &widths);
        }

        output
    }

    /// Serialises the table to pretty JSON.
    pub fn to_json(&self) -> AppResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|error| AppError::Internal(format!("failed to serialise audit table: {error}")))
    }
}

fn push_line(output: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    output.push_str(line.trim_end());
    output.push('\n');
}
