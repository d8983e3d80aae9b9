//! Per-session document state and the single-slot processing cache.
//!
//! The session is an explicit object passed `&mut` into every handler;
//! there is no ambient global state. It holds exactly one processed document
//! at a time: the raw OCR text, the cleaned/structured text, and the identity
//! of the upload they came from. A new upload with the same identity reuses
//! the stored text; a different identity overwrites the slot wholesale.
//!
//! The session lives for the duration of one interactive run and is never
//! explicitly destroyed.

use serde::{Deserialize, Serialize};

/// Identity of an uploaded file, used as the cache key.
///
/// Name plus byte length is deliberately cheap: it avoids hashing multi-MB
/// uploads while still distinguishing every practical re-upload case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileId {
    pub name: String,
    pub size: u64,
}

impl FileId {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Built-in structured text installed by sample mode.
///
/// Mimics a cleaned financial report so every analysis kind has realistic
/// material to work with when no real upload is available.
pub const SAMPLE_STRUCTURED_TEXT: &str = "\
Financial Performance Overview

Revenue and Growth
Total revenue for fiscal year 2024 reached 45.2 million dollars, representing a 23 percent increase compared to the previous year. This growth was primarily driven by digital transformation initiatives which accounted for 67 percent of new revenue streams.

Expense Management
Operating expenses increased by 15 percent to 32.1 million dollars, demonstrating improved operational efficiency as revenue grew faster than costs. The company maintained strong cost discipline with a 71 percent gross margin.

Profitability Analysis
Net profit margin improved from 18 percent to 21 percent, with EBITDA reaching 12.4 million dollars. Return on equity increased to 24 percent, exceeding industry benchmarks of 18 to 20 percent.

Cash Flow Performance
Operating cash flow was 13.2 million dollars, representing a 28 percent increase year over year. Free cash flow reached 9.8 million dollars after capital expenditures of 3.4 million dollars.

Market Position and Trends
Market share in core segments grew from 12 percent to 15 percent. Customer acquisition costs decreased by 18 percent while customer lifetime value increased by 32 percent. Digital channels now represent 67 percent of total revenue.

Sustainability and ESG Initiatives
Sustainability investments totaled 3.2 million dollars, with measurable carbon reduction of 22 percent. ESG compliance costs for CBAM are estimated at 1.8 million dollars annually. Green revenue reached 8.4 million dollars, or 19 percent of total revenue.

Risk Factors and Challenges
Supply chain disruptions affected 12 percent of operations, resulting in 2.1 million dollars in additional costs. Currency fluctuations impacted margins by 2.3 percent. Regulatory compliance costs increased by 1.2 million dollars year over year.

Strategic Outlook
Management projects 18 to 22 percent revenue growth for 2025, driven by product expansion and market penetration. Capital expenditure plans include 5.5 million dollars for technology infrastructure and 2.8 million dollars for sustainability initiatives.";

/// Raw-text placeholder stored alongside the sample document.
pub const SAMPLE_RAW_TEXT: &str =
    "Sample OCR text before cleaning (with simulated artifacts)...";

/// One user's document state: raw OCR text, cleaned text, and the identity
/// of the upload they were derived from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentSession {
    /// Text as returned by the OCR service, before cleaning.
    pub raw_text: String,
    /// Cleaned and restructured text; the input to every analysis call.
    pub structured_text: String,
    /// Identity of the upload currently occupying the slot.
    pub file_id: Option<FileId>,
    /// When true, the built-in sample document is installed and the cache
    /// key check is bypassed entirely.
    pub sample_mode: bool,
}

impl DocumentSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a document (uploaded or sample) is available for analysis.
    pub fn has_document(&self) -> bool {
        !self.structured_text.is_empty()
    }

    /// Whether an upload with this identity must go through the full
    /// OCR → clean pipeline.
    ///
    /// Sample mode always answers `true` for real uploads: installing the
    /// sample overwrote whatever was cached before.
    pub fn needs_processing(&self, id: &FileId) -> bool {
        self.sample_mode || self.file_id.as_ref() != Some(id)
    }

    /// Overwrite the slot with a freshly processed upload.
    pub fn store(&mut self, id: FileId, raw_text: String, structured_text: String) {
        self.raw_text = raw_text;
        self.structured_text = structured_text;
        self.file_id = Some(id);
        self.sample_mode = false;
    }

    /// Install the built-in sample document, overriding any cached upload
    /// until sample mode is disabled.
    pub fn enable_sample_mode(&mut self) {
        self.raw_text = SAMPLE_RAW_TEXT.to_string();
        self.structured_text = SAMPLE_STRUCTURED_TEXT.to_string();
        self.file_id = None;
        self.sample_mode = true;
    }

    /// Leave sample mode. The sample text stays in place until the next
    /// upload overwrites it; analyses keep working meanwhile.
    pub fn disable_sample_mode(&mut self) {
        self.sample_mode = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_name_and_size_hits_cache() {
        let mut session = DocumentSession::new();
        session.store(
            FileId::new("report.pdf", 1024),
            "raw".into(),
            "clean".into(),
        );
        assert!(!session.needs_processing(&FileId::new("report.pdf", 1024)));
    }

    #[test]
    fn different_name_or_size_misses_cache() {
        let mut session = DocumentSession::new();
        session.store(
            FileId::new("report.pdf", 1024),
            "raw".into(),
            "clean".into(),
        );
        assert!(session.needs_processing(&FileId::new("other.pdf", 1024)));
        assert!(session.needs_processing(&FileId::new("report.pdf", 1025)));
    }

    #[test]
    fn sample_mode_bypasses_key_check() {
        let mut session = DocumentSession::new();
        session.store(
            FileId::new("report.pdf", 1024),
            "raw".into(),
            "clean".into(),
        );
        session.enable_sample_mode();
        assert_eq!(session.structured_text, SAMPLE_STRUCTURED_TEXT);
        assert!(session.file_id.is_none());
        // Re-uploading the previously cached file must reprocess it.
        assert!(session.needs_processing(&FileId::new("report.pdf", 1024)));
    }

    #[test]
    fn store_clears_sample_mode() {
        let mut session = DocumentSession::new();
        session.enable_sample_mode();
        session.store(FileId::new("q3.pdf", 99), "raw".into(), "clean".into());
        assert!(!session.sample_mode);
        assert!(!session.needs_processing(&FileId::new("q3.pdf", 99)));
    }

    #[test]
    fn empty_session_has_no_document() {
        assert!(!DocumentSession::new().has_document());
    }
}
