use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Active,
    Waiting,
    Completed,
    Backlog,
    Blocked,
    Notes,
}

impl SectionKind {
    /// Canonical document order.
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Active,
        SectionKind::Waiting,
        SectionKind::Completed,
        SectionKind::Backlog,
        SectionKind::Blocked,
        SectionKind::Notes,
    ];

    pub const TASK_SECTIONS: [SectionKind; 5] = [
        SectionKind::Active,
        SectionKind::Waiting,
        SectionKind::Completed,
        SectionKind::Backlog,
        SectionKind::Blocked,
    ];

    /// Full heading text that opens the section.
    pub fn heading(self) -> &'static str {
        match self {
            SectionKind::Active => "## 🔴 Active Tasks",
            SectionKind::Waiting => "## 🟡 Waiting for Owner Review",
            SectionKind::Completed => "## ✅ Completed (last 7 days)",
            SectionKind::Backlog => "## 📋 Backlog",
            SectionKind::Blocked => "## 🚫 Blocked",
            SectionKind::Notes => "## 📝 Notes & Decisions Log",
        }
    }

    /// Heading prefix that closes whatever section came before.
    pub fn marker(self) -> &'static str {
        match self {
            SectionKind::Active => "## 🔴",
            SectionKind::Waiting => "## 🟡",
            SectionKind::Completed => "## ✅",
            SectionKind::Backlog => "## 📋",
            SectionKind::Blocked => "## 🚫",
            SectionKind::Notes => "## 📝",
        }
    }

    /// Template placeholder written into an otherwise empty section.
    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            SectionKind::Active => Some("_(Tasks currently being worked on)_"),
            SectionKind::Waiting => Some("_(Completed work pending approval before use)_"),
            SectionKind::Completed => Some("_(Finished and approved items)_"),
            SectionKind::Backlog => Some("_(Queued work not yet started)_"),
            SectionKind::Blocked => {
                Some("_(Items waiting on external factors or owner decisions)_")
            }
            SectionKind::Notes => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Active => "Active Tasks",
            SectionKind::Waiting => "Waiting for Review",
            SectionKind::Completed => "Completed (Last 7 Days)",
            SectionKind::Backlog => "Backlog",
            SectionKind::Blocked => "Blocked",
            SectionKind::Notes => "Notes & Decisions",
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            SectionKind::Active => "No active tasks",
            SectionKind::Waiting => "Nothing waiting for review",
            SectionKind::Completed => "No completed tasks",
            SectionKind::Backlog => "No backlog items",
            SectionKind::Blocked => "Nothing blocked",
            SectionKind::Notes => "No notes",
        }
    }
}

/// Placeholders shared by every section.
pub const SHARED_PLACEHOLDERS: [&str; 2] = ["Nothing yet.", "Nothing blocked."];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            date: None,
        }
    }

    pub fn dated(text: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            date: Some(date.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub date: String,
    pub item: String,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub active: Vec<Task>,
    pub waiting: Vec<Task>,
    pub completed: Vec<Task>,
    pub backlog: Vec<Task>,
    pub blocked: Vec<Task>,
    pub notes: Vec<Note>,
    pub last_updated: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub active: usize,
    pub waiting: usize,
    pub completed: usize,
    pub backlog: usize,
    pub blocked: usize,
    pub notes: usize,
}

impl DashboardData {
    /// Tasks for a checklist section. `Notes` has none.
    pub fn tasks(&self, kind: SectionKind) -> &[Task] {
        match kind {
            SectionKind::Active => &self.active,
            SectionKind::Waiting => &self.waiting,
            SectionKind::Completed => &self.completed,
            SectionKind::Backlog => &self.backlog,
            SectionKind::Blocked => &self.blocked,
            SectionKind::Notes => &[],
        }
    }

    pub(crate) fn tasks_mut(&mut self, kind: SectionKind) -> Option<&mut Vec<Task>> {
        match kind {
            SectionKind::Active => Some(&mut self.active),
            SectionKind::Waiting => Some(&mut self.waiting),
            SectionKind::Completed => Some(&mut self.completed),
            SectionKind::Backlog => Some(&mut self.backlog),
            SectionKind::Blocked => Some(&mut self.blocked),
            SectionKind::Notes => None,
        }
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats {
            active: self.active.len(),
            waiting: self.waiting.len(),
            completed: self.completed.len(),
            backlog: self.backlog.len(),
            blocked: self.blocked.len(),
            notes: self.notes.len(),
        }
    }

    /// Last `limit` notes, newest (bottom of the table) first.
    pub fn recent_notes(&self, limit: usize) -> Vec<&Note> {
        self.notes.iter().rev().take(limit).collect()
    }

    pub fn is_empty(&self) -> bool {
        SectionKind::TASK_SECTIONS
            .iter()
            .all(|kind| self.tasks(*kind).is_empty())
            && self.notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{DashboardData, Note, SectionKind, Task};

    fn note(date: &str) -> Note {
        Note {
            date: date.to_string(),
            item: "item".to_string(),
            note: "note".to_string(),
        }
    }

    #[test]
    fn recent_notes_are_newest_first_and_capped() {
        let data = DashboardData {
            notes: vec![
                note("2024-01-01"),
                note("2024-01-02"),
                note("2024-01-03"),
            ],
            ..DashboardData::default()
        };

        let recent: Vec<&str> = data
            .recent_notes(2)
            .into_iter()
            .map(|n| n.date.as_str())
            .collect();
        assert_eq!(recent, vec!["2024-01-03", "2024-01-02"]);
        assert_eq!(data.recent_notes(10).len(), 3);
    }

    #[test]
    fn json_uses_camel_case_and_omits_missing_dates() {
        let data = DashboardData {
            active: vec![Task::new("Fix bug")],
            completed: vec![Task::dated("Deploy v2", "2024-01-15")],
            last_updated: "2024-01-16".to_string(),
            ..DashboardData::default()
        };

        let json = serde_json::to_value(&data).expect("serialize dashboard");
        assert_eq!(json["lastUpdated"], "2024-01-16");
        assert_eq!(json["active"][0], serde_json::json!({ "text": "Fix bug" }));
        assert_eq!(json["completed"][0]["date"], "2024-01-15");
    }

    #[test]
    fn notes_section_has_no_tasks_or_placeholder() {
        let data = DashboardData::default();
        assert!(data.tasks(SectionKind::Notes).is_empty());
        assert!(SectionKind::Notes.placeholder().is_none());
        assert!(data.is_empty());
    }

    #[test]
    fn markers_prefix_their_headings() {
        for kind in SectionKind::ALL {
            assert!(kind.heading().starts_with(kind.marker()));
        }
    }
}
