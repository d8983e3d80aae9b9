//! Pipeline stages for financial-report analysis.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. a different OCR backend) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ ocr ──▶ generate(clean) ──▶ session ──▶ generate(analyze) ──▶ normalize
//! (bytes)   (Azure)  (LLM cleanup)      (cache)      (LLM views)          (regex)
//! ```
//!
//! 1. [`ocr`]:       extract plain text from document bytes; the only stage
//!    talking to the Document Intelligence service
//! 2. [`generate`]:  drive LLM calls with a fixed per-call timeout; the only
//!    stage with provider I/O
//! 3. [`normalize`]: deterministic regex passes fixing number/unit spacing
//!    quirks in generated text

pub mod generate;
pub mod normalize;
pub mod ocr;
