use anyhow::Context;
use regex::Regex;
use tracing::{debug, trace};

use crate::dashboard::{DashboardData, Note, SectionKind, SHARED_PLACEHOLDERS, Task};
use crate::sections::SectionMap;

const NOTES_HEADER: [&str; 3] = ["Date", "Item", "Decision/Note"];

/// How placeholder lines in an empty section are recognised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SentinelPolicy {
    /// Only the fixed placeholder strings of the authoring template.
    #[default]
    Exact,
    /// The fixed strings plus any line that is a whole `_(...)_` aside.
    ExactOrItalic,
}

#[derive(Debug, Clone)]
pub struct MissionControlParser {
    policy: SentinelPolicy,
    last_updated_re: Regex,
    task_re: Regex,
    completed_date_re: Regex,
    note_row_re: Regex,
}

impl MissionControlParser {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_policy(SentinelPolicy::default())
    }

    pub fn with_policy(policy: SentinelPolicy) -> anyhow::Result<Self> {
        Ok(Self {
            policy,
            last_updated_re: Regex::new(r"_Last updated: (.+)_")
                .context("internal regex compile failure: last updated")?,
            task_re: Regex::new(r"- \[.?\] (.+)")
                .context("internal regex compile failure: task line")?,
            completed_date_re: Regex::new(r"^\[([0-9]{4}-[0-9]{2}-[0-9]{2})\] (.+)$")
                .context("internal regex compile failure: completed date")?,
            note_row_re: Regex::new(r"\| (.+?) \| (.+?) \| (.+?) \|")
                .context("internal regex compile failure: notes row")?,
        })
    }

    pub fn policy(&self) -> SentinelPolicy {
        self.policy
    }

    /// Builds the dashboard from the full document text.
    ///
    /// Absent sections, a missing notes table or a missing last-updated
    /// line leave the matching field empty; nothing here fails.
    #[tracing::instrument(skip_all, fields(bytes = document.len()))]
    pub fn parse(&self, document: &str) -> DashboardData {
        let lines: Vec<&str> = document.lines().collect();
        let sections = SectionMap::scan(&lines);

        let mut data = DashboardData {
            last_updated: self.last_updated(&lines),
            ..DashboardData::default()
        };

        for kind in SectionKind::TASK_SECTIONS {
            let Some(span) = sections.get(kind) else {
                debug!(?kind, "section not present");
                continue;
            };
            let tasks = self.section_tasks(kind, span.body(&lines));
            if let Some(slot) = data.tasks_mut(kind) {
                *slot = tasks;
            }
        }

        if let Some(span) = sections.get(SectionKind::Notes) {
            data.notes = self.notes(&lines[span.heading + 1..]);
        }

        debug!(stats = ?data.stats(), "parsed mission control document");
        data
    }

    fn last_updated(&self, lines: &[&str]) -> String {
        lines
            .iter()
            .find_map(|line| self.last_updated_re.captures(line))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }

    fn section_tasks(&self, kind: SectionKind, body: &[&str]) -> Vec<Task> {
        let mut tasks = Vec::new();

        for line in body {
            let Some(caps) = self.task_re.captures(line) else {
                continue;
            };
            let Some(raw) = caps.get(1) else {
                continue;
            };
            let text = raw.as_str().trim();

            if kind == SectionKind::Completed
                && let Some(dated) = self.completed_date_re.captures(text)
                && let (Some(date), Some(rest)) = (dated.get(1), dated.get(2))
            {
                tasks.push(Task::dated(rest.as_str(), date.as_str()));
                continue;
            }

            if self.is_placeholder(text) {
                trace!(?kind, text, "skipping placeholder line");
                continue;
            }

            tasks.push(Task::new(text));
        }

        tasks
    }

    fn is_placeholder(&self, text: &str) -> bool {
        let exact = SectionKind::TASK_SECTIONS
            .iter()
            .filter_map(|kind| kind.placeholder())
            .chain(SHARED_PLACEHOLDERS)
            .any(|placeholder| placeholder == text);

        match self.policy {
            SentinelPolicy::Exact => exact,
            SentinelPolicy::ExactOrItalic => exact || is_italic_aside(text),
        }
    }

    /// `after_heading` starts on the line after the notes heading.
    fn notes(&self, after_heading: &[&str]) -> Vec<Note> {
        let Some(header_idx) = after_heading.iter().position(|line| is_notes_header(line)) else {
            debug!("notes section has no decision table");
            return Vec::new();
        };

        let mut notes = Vec::new();
        for line in &after_heading[header_idx + 1..] {
            if line.trim_start().starts_with("##") {
                break;
            }

            let Some(caps) = self.note_row_re.captures(line) else {
                continue;
            };
            let (Some(date), Some(item), Some(note)) = (caps.get(1), caps.get(2), caps.get(3))
            else {
                continue;
            };

            let date = date.as_str().trim();
            if is_separator_cell(date) {
                continue;
            }

            notes.push(Note {
                date: date.to_string(),
                item: item.as_str().trim().to_string(),
                note: note.as_str().trim().to_string(),
            });
        }

        notes
    }
}

fn is_notes_header(line: &str) -> bool {
    let trimmed = line.trim();
    let Some(inner) = trimmed
        .strip_prefix('|')
        .and_then(|rest| rest.strip_suffix('|'))
    else {
        return false;
    };

    let cells: Vec<&str> = inner.split('|').map(str::trim).collect();
    cells == NOTES_HEADER
}

fn is_separator_cell(cell: &str) -> bool {
    !cell.is_empty() && cell.chars().all(|c| c == '-' || c == ':')
}

fn is_italic_aside(text: &str) -> bool {
    text.len() > 4 && text.starts_with("_(") && text.ends_with(")_")
}
