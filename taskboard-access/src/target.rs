// SPDX-License-Identifier: MIT OR Apache-2.0

//! Items whose visibility is resolved: tasks, announcements and documentation items.
use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::principal::UserRef;
use crate::selector::SelectorList;

/// Milliseconds since the unix epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Current wall-clock time. Clocks before the unix epoch read as zero.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_millis() as u64)
            .unwrap_or_default();
        Self(millis)
    }

    pub fn add_millis(&self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    pub fn sub_millis(&self, millis: u64) -> Self {
        Self(self.0.saturating_sub(millis))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Workflow status of a task.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Routed to a domain lead, waiting to be handed out to members.
    #[default]
    Unassigned,
    Assigned,
    InProgress,
    Completed,
    /// Any other status string, kept verbatim.
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Unassigned => "Unassigned",
            TaskStatus::Assigned => "Assigned",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Other(status) => status,
        }
    }
}

impl From<&str> for TaskStatus {
    fn from(value: &str) -> Self {
        match value {
            "Unassigned" => TaskStatus::Unassigned,
            "Assigned" => TaskStatus::Assigned,
            "In Progress" => TaskStatus::InProgress,
            "Completed" => TaskStatus::Completed,
            other => TaskStatus::Other(other.to_string()),
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for TaskStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(TaskStatus::from(value.as_str()))
    }
}

/// A unit of work scoped to a single domain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default)]
    pub assignees: Vec<UserRef>,

    /// Lead the task was routed to before being handed out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_lead: Option<UserRef>,

    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    pub fn new(id: impl Into<String>, domain: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            id: id.into(),
            domain: Some(domain.into()),
            status,
            ..Default::default()
        }
    }

    pub fn with_assignee(mut self, assignee: UserRef) -> Self {
        self.assignees.push(assignee);
        self
    }

    pub fn with_lead(mut self, lead: UserRef) -> Self {
        self.assigned_to_lead = Some(lead);
        self
    }
}

/// Publication status of an announcement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementStatus {
    #[default]
    Draft,
    Published,
    Archived,
    /// Unrecognised status, never treated as published.
    #[serde(other)]
    Unknown,
}

impl AnnouncementStatus {
    pub fn is_published(&self) -> bool {
        matches!(self, AnnouncementStatus::Published)
    }
}

/// A message broadcast to the users matched by its targets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,

    #[serde(default)]
    pub targets: SelectorList,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<UserRef>,

    /// Scheduled publication time. Absent means "immediately".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_at: Option<Timestamp>,

    #[serde(default)]
    pub status: AnnouncementStatus,
}

impl Announcement {
    pub fn new(id: impl Into<String>, targets: SelectorList, status: AnnouncementStatus) -> Self {
        Self {
            id: id.into(),
            targets,
            status,
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: UserRef) -> Self {
        self.author = Some(author);
        self
    }

    pub fn with_publish_at(mut self, publish_at: Timestamp) -> Self {
        self.publish_at = Some(publish_at);
        self
    }

    /// Returns `true` if the announcement is published and its publication time has passed.
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.status.is_published()
            && self.publish_at.is_none_or(|publish_at| publish_at <= now)
    }
}

/// Whether a documentation item is a folder or a file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentationKind {
    Folder,
    #[default]
    File,
}

/// Node of the documentation library tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationItem {
    pub id: String,

    #[serde(default)]
    pub viewable_by: SelectorList,

    #[serde(default, rename = "type")]
    pub kind: DocumentationKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl DocumentationItem {
    pub fn folder(id: impl Into<String>, viewable_by: SelectorList) -> Self {
        Self {
            id: id.into(),
            viewable_by,
            kind: DocumentationKind::Folder,
            parent_id: None,
        }
    }

    pub fn file(id: impl Into<String>, viewable_by: SelectorList) -> Self {
        Self {
            id: id.into(),
            viewable_by,
            kind: DocumentationKind::File,
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn is_folder(&self) -> bool {
        self.kind == DocumentationKind::Folder
    }
}

/// Borrowed view of any item the resolver can decide on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target<'a> {
    Task(&'a Task),
    Announcement(&'a Announcement),
    Documentation(&'a DocumentationItem),
}

impl Target<'_> {
    pub fn id(&self) -> &str {
        match self {
            Target::Task(task) => &task.id,
            Target::Announcement(announcement) => &announcement.id,
            Target::Documentation(item) => &item.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Target::Task(_) => "task",
            Target::Announcement(_) => "announcement",
            Target::Documentation(_) => "documentation",
        }
    }
}

impl<'a> From<&'a Task> for Target<'a> {
    fn from(task: &'a Task) -> Self {
        Target::Task(task)
    }
}

impl<'a> From<&'a Announcement> for Target<'a> {
    fn from(announcement: &'a Announcement) -> Self {
        Target::Announcement(announcement)
    }
}

impl<'a> From<&'a DocumentationItem> for Target<'a> {
    fn from(item: &'a DocumentationItem) -> Self {
        Target::Documentation(item)
    }
}
