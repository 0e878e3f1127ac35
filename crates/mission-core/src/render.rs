use std::io::{self, IsTerminal, Write};

use anyhow::{Context, anyhow};
use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::dashboard::{DashboardData, DashboardStats, SectionKind, Task};

const DEFAULT_RECENT_NOTES: usize = 5;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    title: String,
    recent_notes: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardExport<'a> {
    generated_at: String,
    stats: DashboardStats,
    dashboard: &'a DashboardData,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        let title = cfg
            .get("dashboard.title")
            .unwrap_or_else(|| "Mission Control".to_string());
        let recent_notes = cfg
            .get_usize("notes.recent")?
            .unwrap_or(DEFAULT_RECENT_NOTES);

        Ok(Self {
            color: color && io::stdout().is_terminal(),
            title,
            recent_notes,
        })
    }

    #[tracing::instrument(skip(self, data, now))]
    pub fn print_dashboard(
        &self,
        data: &DashboardData,
        format: OutputFormat,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        match format {
            OutputFormat::Text => {
                let today = now.with_timezone(&Local).date_naive();
                self.write_text(&mut out, data, today)
            }
            OutputFormat::Json => self.write_json(&mut out, data, now),
        }
    }

    pub fn write_text<W: Write>(
        &self,
        mut out: W,
        data: &DashboardData,
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        writeln!(out, "{}", self.paint(&self.title, "1"))?;
        let last_updated = if data.last_updated.is_empty() {
            "unknown"
        } else {
            data.last_updated.as_str()
        };
        writeln!(out, "Last updated: {last_updated}")?;
        writeln!(out)?;

        let stats = data.stats();
        write_table(
            &mut out,
            vec![
                "Active".to_string(),
                "Waiting".to_string(),
                "Completed".to_string(),
                "Backlog".to_string(),
            ],
            vec![vec![
                self.paint(&stats.active.to_string(), "31"),
                self.paint(&stats.waiting.to_string(), "33"),
                self.paint(&stats.completed.to_string(), "32"),
                self.paint(&stats.backlog.to_string(), "90"),
            ]],
        )?;

        for kind in SectionKind::ALL {
            writeln!(out)?;
            match kind {
                SectionKind::Notes => self.write_notes(&mut out, data)?,
                SectionKind::Completed => self.write_completed(&mut out, data, today)?,
                _ => self.write_task_panel(&mut out, kind, data.tasks(kind))?,
            }
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, out, data, now))]
    pub fn write_json<W: Write>(
        &self,
        mut out: W,
        data: &DashboardData,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let export = DashboardExport {
            generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            stats: data.stats(),
            dashboard: data,
        };
        serde_json::to_writer_pretty(&mut out, &export).context("failed to serialize dashboard")?;
        writeln!(out)?;
        Ok(())
    }

    fn write_heading<W: Write>(&self, out: &mut W, kind: SectionKind, count: usize) -> io::Result<()> {
        let code = match kind {
            SectionKind::Active | SectionKind::Blocked => "31",
            SectionKind::Waiting => "33",
            SectionKind::Completed => "32",
            SectionKind::Backlog => "90",
            SectionKind::Notes => "34",
        };
        let heading = format!("{} ({count})", kind.title());
        writeln!(out, "{}", self.paint(&heading, code))
    }

    fn write_task_panel<W: Write>(
        &self,
        out: &mut W,
        kind: SectionKind,
        tasks: &[Task],
    ) -> anyhow::Result<()> {
        self.write_heading(out, kind, tasks.len())?;
        if tasks.is_empty() {
            writeln!(out, "  {}", kind.empty_message())?;
            return Ok(());
        }

        for (idx, task) in tasks.iter().enumerate() {
            let bullet = match kind {
                SectionKind::Active => "*".to_string(),
                SectionKind::Waiting => "!".to_string(),
                SectionKind::Blocked => "x".to_string(),
                _ => format!("{}.", idx + 1),
            };
            writeln!(out, "  {bullet} {}", task.text)?;
        }
        Ok(())
    }

    fn write_completed<W: Write>(
        &self,
        out: &mut W,
        data: &DashboardData,
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        let kind = SectionKind::Completed;
        self.write_heading(out, kind, data.completed.len())?;
        if data.completed.is_empty() {
            writeln!(out, "  {}", kind.empty_message())?;
            return Ok(());
        }

        let rows = data
            .completed
            .iter()
            .map(|task| {
                let date = task.date.clone().unwrap_or_else(|| "-".to_string());
                let age = task
                    .date
                    .as_deref()
                    .and_then(|raw| describe_age(raw, today))
                    .unwrap_or_default();
                vec![date, self.paint(&age, "90"), task.text.clone()]
            })
            .collect();

        write_table(
            out,
            vec!["Date".to_string(), "Age".to_string(), "Task".to_string()],
            rows,
        )
    }

    fn write_notes<W: Write>(&self, out: &mut W, data: &DashboardData) -> anyhow::Result<()> {
        let kind = SectionKind::Notes;
        self.write_heading(out, kind, data.notes.len())?;
        if data.notes.is_empty() {
            writeln!(out, "  {}", kind.empty_message())?;
            return Ok(());
        }

        for note in data.recent_notes(self.recent_notes) {
            writeln!(
                out,
                "  {}",
                self.paint(&format!("{} — {}", note.date, note.item), "90")
            )?;
            writeln!(out, "    {}", note.note)?;
        }
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || text.is_empty() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

/// Human age of a completed date; `None` when the date does not parse.
fn describe_age(raw: &str, today: NaiveDate) -> Option<String> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let days = (today - date).num_days();
    Some(match days {
        0 => "today".to_string(),
        1 => "1d ago".to_string(),
        d if d > 1 => format!("{d}d ago"),
        d => format!("in {}d", -d),
    })
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    write!(writer, " ")?;
    for idx in 0..column_count {
        write!(writer, " {:width$}", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    write!(writer, " ")?;
    for width in &widths {
        write!(writer, " {:-<width$}", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        write!(writer, " ")?;
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, " {}{}", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
