//! Report document model and section assembly.
//!
//! A report is an ordered sequence of named sections, each holding Markdown
//! body text. Assembly order is fixed by section *kind* (executive summary
//! first, then the KPI table, then thematic sections in the order the caller
//! listed them) regardless of the order the selection flags were declared.
//! A report is built fresh on each generation and superseded wholesale by
//! the next one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of analysis backing a report section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionKind {
    ExecutiveSummary,
    KpiTable,
    Theme(String),
}

impl SectionKind {
    /// Heading text used for this section in the assembled Markdown.
    pub fn title(&self) -> &str {
        match self {
            SectionKind::ExecutiveSummary => "Executive Summary",
            SectionKind::KpiTable => "Key Metrics and KPIs",
            SectionKind::Theme(name) => name,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Which sections to include in a generated report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionSelection {
    pub include_summary: bool,
    pub include_kpis: bool,
    /// Thematic sections, in the order the user picked them.
    pub themes: Vec<String>,
}

impl SectionSelection {
    /// Every section kind selected. The whole default menu.
    pub fn all(themes: &[String]) -> Self {
        Self {
            include_summary: true,
            include_kpis: true,
            themes: themes.to_vec(),
        }
    }

    /// Expand the selection into the fixed assembly order:
    /// summary, KPIs, then themes in selection order.
    pub fn ordered_kinds(&self) -> Vec<SectionKind> {
        let mut kinds = Vec::with_capacity(2 + self.themes.len());
        if self.include_summary {
            kinds.push(SectionKind::ExecutiveSummary);
        }
        if self.include_kpis {
            kinds.push(SectionKind::KpiTable);
        }
        for theme in &self.themes {
            kinds.push(SectionKind::Theme(theme.clone()));
        }
        kinds
    }

    pub fn is_empty(&self) -> bool {
        !self.include_summary && !self.include_kpis && self.themes.is_empty()
    }
}

/// One named section of a report, with Markdown body text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub kind: SectionKind,
    pub body: String,
}

/// An ordered sequence of report sections, built fresh per generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportDocument {
    pub sections: Vec<ReportSection>,
}

impl ReportDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: SectionKind, body: String) {
        self.sections.push(ReportSection { kind, body });
    }

    /// Assemble the sections into one Markdown document with `##` headings.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            out.push_str("## ");
            out.push_str(section.kind.title());
            out.push('\n');
            out.push_str(&section.body);
            out.push_str("\n\n");
        }
        out
    }
}
