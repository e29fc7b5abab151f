//! Export of a ranked batch
//!
//! Three representations: plain text, a delimited table (CSV) and a
//! paginated document. Each carries a `SORTED BY:` banner naming the active
//! sort mode and, per case in ranked order, the TCID, duration, pass rate and
//! steps.

use crate::error::Result;
use crate::ranking::{RankedCase, RankingSession};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Separator between steps in a table cell
pub const STEP_SEPARATOR: &str = " | ";

/// Page break between pages of the paginated document
pub const PAGE_BREAK: char = '\u{0C}';

/// Default number of cases per page
pub const DEFAULT_CASES_PER_PAGE: usize = 5;

/// Output representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Text,
    Csv,
    Paginated,
}

impl ExportFormat {
    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Paginated => "pages.txt",
        }
    }
}

/// Unknown export format name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown export format {0:?} (expected text, csv or paginated)")]
pub struct UnknownExportFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownExportFormat;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "csv" => Ok(ExportFormat::Csv),
            "paginated" | "pdf" | "pages" => Ok(ExportFormat::Paginated),
            _ => Err(UnknownExportFormat(s.to_string())),
        }
    }
}

/// Renders a ranking session in one export format
#[derive(Debug, Clone)]
pub struct Exporter {
    format: ExportFormat,
    cases_per_page: usize,
    generated_at: Option<DateTime<Local>>,
}

impl Exporter {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            cases_per_page: DEFAULT_CASES_PER_PAGE,
            generated_at: None,
        }
    }

    /// Cases per page of the paginated document (minimum 1)
    pub fn with_cases_per_page(mut self, cases_per_page: usize) -> Self {
        self.cases_per_page = cases_per_page.max(1);
        self
    }

    /// Add a `Generated:` line under the banner
    pub fn with_timestamp(mut self, generated_at: DateTime<Local>) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    /// Render the whole document
    pub fn render(&self, session: &RankingSession) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_document(session, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
    }

    /// Render and write to `writer`
    pub fn write_to<W: Write>(&self, session: &RankingSession, writer: &mut W) -> Result<()> {
        self.write_document(session, writer)?;
        writer.flush()?;
        info!(
            format = ?self.format,
            cases = session.len(),
            sorted_by = %session.mode(),
            "Export written"
        );
        Ok(())
    }

    fn write_document<W: Write>(&self, session: &RankingSession, writer: &mut W) -> Result<()> {
        match self.format {
            ExportFormat::Text => self.write_text(session, writer)?,
            ExportFormat::Csv => self.write_csv(session, writer)?,
            ExportFormat::Paginated => self.write_paginated(session, writer)?,
        }
        Ok(())
    }

    fn banner(session: &RankingSession) -> String {
        format!("SORTED BY: {}", session.mode().label().to_uppercase())
    }

    fn generated_line(&self) -> Option<String> {
        self.generated_at
            .map(|t| format!("Generated: {}", t.format("%Y-%m-%d %H:%M:%S")))
    }

    fn write_header<W: Write>(&self, session: &RankingSession, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{}", Self::banner(session))?;
        if let Some(line) = self.generated_line() {
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }

    fn write_text<W: Write>(&self, session: &RankingSession, writer: &mut W) -> io::Result<()> {
        self.write_header(session, writer)?;
        writeln!(writer)?;
        for case in session.ranked() {
            write_case_block(writer, case)?;
        }
        Ok(())
    }

    fn write_csv<W: Write>(&self, session: &RankingSession, writer: &mut W) -> Result<()> {
        // Banner rows are single-field, so records vary in length
        let mut table = csv::WriterBuilder::new()
            .flexible(true)
            .terminator(csv::Terminator::CRLF)
            .from_writer(writer);

        table.write_record([Self::banner(session)])?;
        if let Some(line) = self.generated_line() {
            table.write_record([line])?;
        }
        table.write_record(["TCID", "Duration", "Pass Rate", "Steps"])?;
        for case in session.ranked() {
            let result = &case.result;
            table.write_record([
                result.case_id.clone(),
                format_duration(result.predicted_duration),
                format_pass_rate(result.predicted_pass_rate),
                result.steps.join(STEP_SEPARATOR),
            ])?;
        }
        table.flush()?;
        Ok(())
    }

    fn write_paginated<W: Write>(
        &self,
        session: &RankingSession,
        writer: &mut W,
    ) -> io::Result<()> {
        let cases: Vec<&RankedCase> = session.ranked().collect();
        let total_pages = page_count(cases.len(), self.cases_per_page).max(1);

        for (page_index, page) in cases.chunks(self.cases_per_page).enumerate() {
            if page_index > 0 {
                write!(writer, "{}", PAGE_BREAK)?;
            }
            self.write_header(session, writer)?;
            writeln!(writer, "Page {} of {}", page_index + 1, total_pages)?;
            writeln!(writer)?;
            for case in page {
                write_case_block(writer, case)?;
            }
        }
        Ok(())
    }
}

/// Number of pages needed for `total` items
pub fn page_count(total: usize, per_page: usize) -> usize {
    let per_page = per_page.max(1);
    (total + per_page - 1) / per_page
}

fn write_case_block<W: Write>(writer: &mut W, case: &RankedCase) -> io::Result<()> {
    let result = &case.result;
    writeln!(writer, "TCID: {}", result.case_id)?;
    writeln!(writer, "Duration: {}s", format_duration(result.predicted_duration))?;
    writeln!(writer, "Pass Rate: {}%", format_pass_rate(result.predicted_pass_rate))?;
    writeln!(writer, "Steps:")?;
    for step in &result.steps {
        writeln!(writer, "  - {}", step)?;
    }
    writeln!(writer)
}

pub fn format_duration(duration: f64) -> String {
    format!("{:.2}", duration)
}

pub fn format_pass_rate(pass_rate: f64) -> String {
    format!("{:.1}", pass_rate)
}
