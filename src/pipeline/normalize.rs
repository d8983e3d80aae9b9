//! Post-processing: deterministic cleanup of generated analysis text.
//!
//! ## Why is normalisation necessary?
//!
//! Models working over OCR'd financial prose have a known tendency to glue a
//! numeric value to its trailing unit or to the next capitalised word:
//! `$3.2million`, `22percent`, `FY2024Revenue`. The figures are right; the
//! spacing is not. These are cheap, deterministic regex fixes, so they live
//! here rather than in the prompt: the prompt stays focused on *what to
//! extract*, not on spacing edge-cases.
//!
//! ## Rule Order
//!
//! Passes run in a fixed sequence, each operating on the output of the
//! previous: the currency-scale and percent rules fire first so their word
//! boundaries are in place before the generic digit/letter catch-all sweeps
//! up everything else. The full sequence is idempotent: once a space exists
//! at a boundary, no pass can match there again.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all normalisation passes to freshly generated analysis text.
///
/// Passes (applied in order):
/// 1. Space between a currency amount and a following scale word
///    (`$3.2million` → `$3.2 million`)
/// 2. Space between a number and a literal `percent` (`22percent` → `22 percent`)
/// 3. Space between any digit and an immediately following letter
///    (`FY2024Revenue` → `FY2024 Revenue`)
pub fn normalize_text(input: &str) -> String {
    let s = space_currency_scale(input);
    let s = space_percent(&s);
    space_digit_letter(&s)
}

// ── Pass 1: currency amount + scale word ─────────────────────────────────────

static RE_CURRENCY_SCALE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\d+(?:\.\d+)?)(million|billion|thousand)").unwrap());

fn space_currency_scale(input: &str) -> String {
    RE_CURRENCY_SCALE
        .replace_all(input, "$$${1} ${2}")
        .to_string()
}

// ── Pass 2: number + literal "percent" ───────────────────────────────────────

static RE_PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)(percent)").unwrap());

fn space_percent(input: &str) -> String {
    RE_PERCENT.replace_all(input, "${1} ${2}").to_string()
}

// ── Pass 3: generic digit/letter catch-all ───────────────────────────────────

static RE_DIGIT_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)([A-Za-z])").unwrap());

fn space_digit_letter(input: &str) -> String {
    RE_DIGIT_LETTER.replace_all(input, "${1} ${2}").to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_scale_gets_space() {
        assert_eq!(normalize_text("$3.2million"), "$3.2 million");
        assert_eq!(normalize_text("$45billion in assets"), "$45 billion in assets");
        assert_eq!(normalize_text("$800thousand"), "$800 thousand");
    }

    #[test]
    fn percent_gets_space() {
        assert_eq!(normalize_text("22percent"), "22 percent");
        assert_eq!(normalize_text("up 5percent YoY"), "up 5 percent YoY");
    }

    #[test]
    fn digit_letter_boundary_gets_space() {
        let out = normalize_text("FY2024Revenue");
        assert!(out.contains(' '), "expected an inserted space, got: {out}");
        assert_eq!(out, "FY2024 Revenue");
    }

    #[test]
    fn already_spaced_text_unchanged() {
        let input = "$3.2 million grew 22 percent in FY2024 Revenue";
        assert_eq!(normalize_text(input), input);
    }

    #[test]
    fn idempotent_on_arbitrary_input() {
        let inputs = [
            "$3.2million and 22percent and FY2024Revenue",
            "Revenue of $1.5billion, margin 71percent.",
            "plain prose with no numbers",
            "4Q earnings rose 3x over 2023Actuals",
        ];
        for input in inputs {
            let once = normalize_text(input);
            let twice = normalize_text(&once);
            assert_eq!(once, twice, "not idempotent for: {input}");
        }
    }

    #[test]
    fn consecutive_boundaries_all_fixed() {
        assert_eq!(normalize_text("1a2b"), "1 a2 b");
    }

    #[test]
    fn empty_input_passthrough() {
        assert_eq!(normalize_text(""), "");
    }
}
