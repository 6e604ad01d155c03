//! The tracked project as seen by command-line operations.

use serde::Serialize;

/// Read-only projection of a row in the projects table.
///
/// `github_owner` and `github_repo` are empty strings when the project has no
/// GitHub linkage (the columns are nullable in the database).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub github_owner: String,
    pub github_repo: String,
}

impl Project {
    pub fn new(
        id: i64,
        title: impl Into<String>,
        github_owner: impl Into<String>,
        github_repo: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            github_owner: github_owner.into(),
            github_repo: github_repo.into(),
        }
    }

    /// Only projects linked to a GitHub owner/repository pair show up in the selection menu.
    pub fn is_selectable(&self) -> bool {
        !self.github_owner.is_empty() && !self.github_repo.is_empty()
    }

    /// `owner/repo`, or `None` without GitHub linkage.
    pub fn github_slug(&self) -> Option<String> {
        self.is_selectable()
            .then(|| format!("{}/{}", self.github_owner, self.github_repo))
    }
}

/// Raw row shape: (project_id, title, gh_user, gh_project).
pub type ProjectRow = (i64, String, Option<String>, Option<String>);

impl From<ProjectRow> for Project {
    fn from((id, title, gh_user, gh_project): ProjectRow) -> Self {
        Self {
            id,
            title,
            github_owner: gh_user.unwrap_or_default(),
            github_repo: gh_project.unwrap_or_default(),
        }
    }
}

/// Values for inserting a new project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub github_owner: Option<String>,
    pub github_repo: Option<String>,
}
