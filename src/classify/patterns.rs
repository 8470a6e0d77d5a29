//! Regex tables for date, organization, and monetary reference scans.

use std::sync::LazyLock;

use regex::Regex;

/// Numeric date formats: 2024-01-15, 15/01/2024, 01.15.24, 20240115.
pub static NUMERIC_DATES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\b\d{4}[-/.]\d{1,2}[-/.]\d{1,2}\b").unwrap(),
        Regex::new(r"\b\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}\b").unwrap(),
        Regex::new(r"\b\d{4}\d{2}\d{2}\b").unwrap(),
    ]
});

/// Month-name dates: "March 15, 2024", "Mar 15 2024", "15 March 2024".
pub static MONTH_DATES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let month = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:tember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";
    vec![
        Regex::new(&format!(
            r"(?i)\b{month}\.?\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}\b"
        ))
        .unwrap(),
        Regex::new(&format!(
            r"(?i)\b\d{{1,2}}(?:st|nd|rd|th)?\s+{month}\.?,?\s+\d{{4}}\b"
        ))
        .unwrap(),
    ]
});

/// Corporate names: "Acme Corp", "Globex Holdings Inc", "Initech LLC".
pub static CORPORATE_NAMES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][\w&-]*(?:\s+[A-Z][\w&-]*){0,4}\s+(?:Corp|Corporation|Inc|LLC|Ltd|Company)\b")
        .unwrap()
});

/// Government bodies: "Ministry of Finance", "Treasury Department".
pub static GOVERNMENT_BODIES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\b(?:Ministry|Department|Agency|Authority)\s+of(?:\s+[A-Z][A-Za-z]+)+")
            .unwrap(),
        Regex::new(r"\b[A-Z][A-Za-z]+(?:\s+[A-Z][A-Za-z]+)*\s+(?:Ministry|Department|Agency|Authority)\b")
            .unwrap(),
    ]
});

/// Currency-symbol amounts: $1,200.50, € 300, £99.
pub static MONEY_SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[$€£]\s?\d[\d,]*(?:\.\d{1,2})?").unwrap());

/// Currency-word amounts: "450.00 USD", "1,200 euros", "75 dollars".
pub static MONEY_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d[\d,]*(?:\.\d{1,2})?\s?(?:USD|EUR|GBP|dollars?|euros?|pounds?)\b").unwrap()
});
