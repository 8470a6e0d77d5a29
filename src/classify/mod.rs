//! Heuristic metadata classification of extracted text.
//!
//! Pure functions of their inputs, no I/O. The document-type keyword table
//! and keyword-extraction rules are a compatibility contract with existing
//! archives; do not tune them.

mod patterns;

use regex::Regex;

use crate::models::ExtractedMetadata;
use crate::ocr::confidence;

/// Document-type rules in priority order. First match wins.
const TYPE_RULES: &[(&[&str], &str)] = &[
    (&["invoice", "bill"], "Invoice"),
    (
        &["contract", "agreement", "terms and conditions"],
        "Contract",
    ),
    (&["receipt", "payment", "total amount"], "Receipt"),
    (&["report", "summary", "analysis"], "Report"),
    (&["certificate", "certified"], "Certificate"),
    (&["dear", "sincerely", "yours truly"], "Letter"),
];

/// Derive metadata from extracted text and the scan filename.
pub fn classify(text: &str, filename: &str) -> ExtractedMetadata {
    ExtractedMetadata {
        document_type: detect_document_type(text, filename),
        keywords: extract_keywords(text),
        date_references: extract_dates(text),
        organization_references: extract_organizations(text),
        monetary_values: extract_monetary_values(text),
        confidence: confidence::score(text),
    }
}

/// Match the document-type rules case-insensitively against both the text
/// and the filename.
pub fn detect_document_type(text: &str, filename: &str) -> String {
    let haystack = format!("{} {}", text, filename).to_lowercase();

    for (needles, label) in TYPE_RULES {
        if needles.iter().any(|needle| haystack.contains(needle)) {
            return (*label).to_string();
        }
    }
    "General Document".to_string()
}

/// Top 10 distinct tokens ranked by frequency.
///
/// Tokens are lowercased, stripped of punctuation, and dropped when 3
/// characters or shorter. Ties keep first-seen order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    // First-seen order in the Vec makes the stable sort break ties correctly.
    let mut counts: Vec<(String, usize)> = Vec::new();

    for raw in text.to_lowercase().split_whitespace() {
        let token: String = raw.chars().filter(|c| c.is_alphanumeric()).collect();
        if token.chars().count() <= 3 {
            continue;
        }
        match counts.iter_mut().find(|(t, _)| *t == token) {
            Some((_, n)) => *n += 1,
            None => counts.push((token, 1)),
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(10).map(|(t, _)| t).collect()
}

/// Numeric and month-name date references, de-duplicated.
pub fn extract_dates(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    for pattern in patterns::NUMERIC_DATES.iter() {
        collect_matches(pattern, text, &mut found);
    }
    for pattern in patterns::MONTH_DATES.iter() {
        collect_matches(pattern, text, &mut found);
    }
    found
}

/// Corporate and government organization references, de-duplicated.
pub fn extract_organizations(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    collect_matches(&patterns::CORPORATE_NAMES, text, &mut found);
    for pattern in patterns::GOVERNMENT_BODIES.iter() {
        collect_matches(pattern, text, &mut found);
    }
    found
}

/// Currency-symbol and currency-word amounts, de-duplicated.
pub fn extract_monetary_values(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    collect_matches(&patterns::MONEY_SYMBOL, text, &mut found);
    collect_matches(&patterns::MONEY_WORD, text, &mut found);
    found
}

fn collect_matches(pattern: &Regex, text: &str, found: &mut Vec<String>) {
    for m in pattern.find_iter(text) {
        let value = m.as_str().to_string();
        if !found.contains(&value) {
            found.push(value);
        }
    }
}
