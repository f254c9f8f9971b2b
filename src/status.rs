//! Fixed project status registry.

use std::fmt;

use crate::sanitizer::{IntegerSanitizer, SanitizationError, SanitizationErrorKind, Sanitizer};
use crate::tainted::Tainted;
use crate::verified::Verified;

/// Lifecycle state of a project.
///
/// Stored on a project as its numeric id; rendered through its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProjectStatus {
    /// Just created
    New,
    /// Work started
    InProgress,
    /// Behind schedule
    Delayed,
    /// Finished
    Done,
}

impl ProjectStatus {
    /// Every status, in id order.
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::New,
        ProjectStatus::InProgress,
        ProjectStatus::Delayed,
        ProjectStatus::Done,
    ];

    /// Stable numeric identifier.
    pub fn id(self) -> i64 {
        match self {
            ProjectStatus::New => 1,
            ProjectStatus::InProgress => 2,
            ProjectStatus::Delayed => 3,
            ProjectStatus::Done => 4,
        }
    }

    /// Canonical display name.
    pub fn name(self) -> &'static str {
        match self {
            ProjectStatus::New => "New",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Delayed => "Delayed",
            ProjectStatus::Done => "Done",
        }
    }

    /// Looks a status up by id.
    ///
    /// ```
    /// use client_projects::ProjectStatus;
    ///
    /// assert_eq!(ProjectStatus::find(2), Some(ProjectStatus::InProgress));
    /// assert_eq!(ProjectStatus::find(9), None);
    /// ```
    pub fn find(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Promotes a raw `project_status_id` into a registered [`ProjectStatus`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusSanitizer;

impl StatusSanitizer {
    /// Message used when no status was supplied.
    pub fn blank_message(&self) -> String {
        "Project status can't be blank".to_string()
    }
}

impl Sanitizer<String, ProjectStatus> for StatusSanitizer {
    fn sanitize(
        &self,
        input: Tainted<String>,
    ) -> Result<Verified<ProjectStatus>, SanitizationError> {
        let raw = input.into_inner();
        if raw.trim().is_empty() {
            return Err(SanitizationError::new(
                SanitizationErrorKind::Empty,
                self.blank_message(),
            ));
        }

        let not_included = || {
            SanitizationError::new(
                SanitizationErrorKind::NotIncluded,
                "Project status is not included in the list",
            )
        };

        let id = IntegerSanitizer::new("Project status")
            .sanitize(Tainted::new(raw))
            .map_err(|_| not_included())?
            .into_inner();

        ProjectStatus::find(id)
            .map(Verified::new_unchecked)
            .ok_or_else(not_included)
    }
}
