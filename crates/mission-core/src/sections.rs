use tracing::{debug, trace};

use crate::dashboard::SectionKind;

/// Line range of one known section. `heading` is the heading line itself;
/// the body runs from `heading + 1` up to, not including, `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpan {
    pub kind: SectionKind,
    pub heading: usize,
    pub end: usize,
}

impl SectionSpan {
    pub fn body<'a>(&self, lines: &'a [&'a str]) -> &'a [&'a str] {
        let start = (self.heading + 1).min(lines.len());
        let end = self.end.clamp(start, lines.len());
        &lines[start..end]
    }
}

/// Ordered table of section boundaries, built in one forward pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    spans: Vec<SectionSpan>,
}

impl SectionMap {
    #[tracing::instrument(skip_all, fields(lines = lines.len()))]
    pub fn scan(lines: &[&str]) -> Self {
        let mut spans: Vec<SectionSpan> = Vec::new();
        let mut open: Option<(SectionKind, usize)> = None;

        for (idx, line) in lines.iter().enumerate() {
            let Some(marker) = marker_kind(line) else {
                continue;
            };

            // Any known marker closes the section in progress.
            if let Some((kind, heading)) = open.take() {
                spans.push(SectionSpan {
                    kind,
                    heading,
                    end: idx,
                });
            }

            match heading_kind(line) {
                Some(kind) if spans.iter().all(|span| span.kind != kind) => {
                    trace!(line = idx + 1, ?kind, "section heading");
                    open = Some((kind, idx));
                }
                Some(kind) => {
                    debug!(line = idx + 1, ?kind, "repeated section heading ignored");
                }
                None => {
                    debug!(
                        line = idx + 1,
                        ?marker,
                        "section marker without its full heading closes previous section"
                    );
                }
            }
        }

        if let Some((kind, heading)) = open {
            spans.push(SectionSpan {
                kind,
                heading,
                end: lines.len(),
            });
        }

        debug!(found = spans.len(), "scanned section boundaries");
        Self { spans }
    }

    pub fn get(&self, kind: SectionKind) -> Option<SectionSpan> {
        self.spans.iter().copied().find(|span| span.kind == kind)
    }

    pub fn spans(&self) -> &[SectionSpan] {
        &self.spans
    }
}

fn marker_kind(line: &str) -> Option<SectionKind> {
    SectionKind::ALL
        .into_iter()
        .find(|kind| line.contains(kind.marker()))
}

fn heading_kind(line: &str) -> Option<SectionKind> {
    SectionKind::ALL
        .into_iter()
        .find(|kind| line.contains(kind.heading()))
}
