//! System prompts for the cleaning and analysis calls.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth**: changing how the model is instructed (e.g.
//!    tightening the KPI table format) requires editing exactly one place.
//!
//! 2. **Testability**: unit tests can inspect prompts directly without
//!    spinning up a real provider, making prompt regressions easy to catch.

/// System prompt for the OCR-cleanup call that turns raw extracted text into
/// readable, structured prose without losing content.
pub const CLEANING_SYSTEM_PROMPT: &str = "\
You are an assistant that cleans messy OCR text from PDFs. \
Your job is ONLY to rewrite the text in a clean, readable way, \
without losing any information.\n\n\
Rules:\n\
- Fix words where letters are split by line breaks \
  (e.g. 'm\\ni\\ll\\li\\on' -> 'million').\n\
- Fix numbers and ranges that are broken across lines.\n\
- For things that look like charts or distributions \
  (e.g. 'Organization revenue in US dollars'), \
  reconstruct them as a clear bullet list or short paragraph \
  describing the ranges and percentages.\n\
- Remove page numbers, repeated headings, and footers.\n\
- Preserve all content and meaning. Do NOT summarize or omit sections.\n";

/// System prompt for the executive-summary analysis.
pub const EXECUTIVE_SUMMARY_SYSTEM_PROMPT: &str = "\
You are a senior financial analyst. Create a concise, professional \
executive summary of the document. Focus on main themes, key findings, \
risks, and strategic insights. Avoid unnecessary detail. Write in clear \
business English for CFO-level readers.";

/// System prompt for KPI extraction. The output-format constraint ("ONLY a
/// Markdown table") is what makes the table detector in the renderer reliable.
pub const KPI_SYSTEM_PROMPT: &str = "\
You are a financial data analyst. From the text below, extract the most \
important quantitative insights as KPIs. Focus on percentages, ranges, \
counts, and other numeric facts.\n\n\
Return the result ONLY as a Markdown table with two columns: \
'KPI' and 'Value'. Do not add any commentary before or after the table.";

/// System prompt for a thematic summary.
pub const THEME_SYSTEM_PROMPT: &str = "\
You are a senior financial analyst. Extract only the content related to \
the selected financial theme. Provide a precise 6-10 sentence summary \
focused on performance indicators, risks, opportunities, and strategic \
insights. Maintain a CFO-level analytical tone. Do NOT include unrelated \
topics.";

/// Build the user content for a thematic-summary call.
pub fn theme_user_content(theme: &str, document: &str) -> String {
    format!("Theme: {theme}\n\nDocument:\n{document}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleaning_prompt_forbids_summarising() {
        assert!(CLEANING_SYSTEM_PROMPT.contains("Do NOT summarize"));
    }

    #[test]
    fn kpi_prompt_pins_table_columns() {
        assert!(KPI_SYSTEM_PROMPT.contains("'KPI' and 'Value'"));
    }

    #[test]
    fn theme_content_embeds_both_parts() {
        let content = theme_user_content("Revenue & Growth", "doc body");
        assert!(content.starts_with("Theme: Revenue & Growth"));
        assert!(content.ends_with("doc body"));
    }
}
