//! Iranian mobile number extraction and validation.
//!
//! All numbers are normalized to the canonical `09XXXXXXXXX` (11-digit) form
//! before any comparison or dispatch.

use once_cell::sync::Lazy;
use regex::Regex;

/// Alternative spellings of an Iranian mobile number found in free text.
static PHONE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // 09XXXXXXXXX (11 digits starting with 09)
        Regex::new(r"\b09\d{9}\b").expect("static regex"),
        // +989XXXXXXXXX (with country code)
        Regex::new(r"\+989\d{9}\b").expect("static regex"),
        // 00989XXXXXXXXX (with international prefix)
        Regex::new(r"\b00989\d{9}\b").expect("static regex"),
        // 9XXXXXXXXX (without leading 0)
        Regex::new(r"\b9\d{9}\b").expect("static regex"),
    ]
});

static NON_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d+]").expect("static regex"));

/// Extracts all Iranian mobile numbers from free text.
///
/// Every match is normalized to `09XXXXXXXXX`; duplicates (after
/// normalization) are dropped while preserving first-seen order.
pub fn extract_phones(text: &str) -> Vec<String> {
    let mut phones = Vec::new();
    let clean = text.trim();

    for pattern in PHONE_PATTERNS.iter() {
        for m in pattern.find_iter(clean) {
            let normalized = normalize(m.as_str());
            if !normalized.is_empty() && !phones.contains(&normalized) {
                phones.push(normalized);
            }
        }
    }

    phones
}

/// Normalizes an Iranian mobile number to the `09XXXXXXXXX` form.
///
/// Returns an empty string for anything that does not match a known form.
pub fn normalize(phone: &str) -> String {
    let cleaned = NON_DIGIT.replace_all(phone, "").to_string();

    if let Some(rest) = cleaned.strip_prefix("+98") {
        if rest.starts_with('9') {
            return format!("0{}", rest);
        }
    } else if let Some(rest) = cleaned.strip_prefix("0098") {
        if rest.starts_with('9') {
            return format!("0{}", rest);
        }
    } else if cleaned.starts_with('9') && cleaned.len() == 10 {
        return format!("0{}", cleaned);
    } else if cleaned.starts_with("09") && cleaned.len() == 11 {
        return cleaned;
    }

    String::new()
}

/// Validates an Iranian mobile number.
///
/// Accepts any input form `normalize` understands; requires 11 digits, the
/// `09` prefix, and a mobile operator prefix in 091..099.
pub fn is_valid(phone: &str) -> bool {
    let normalized = normalize(phone);
    if normalized.len() != 11 || !normalized.starts_with("09") {
        return false;
    }

    // Third digit selects the mobile operator; 090 is not allocated.
    matches!(normalized.as_bytes()[2], b'1'..=b'9')
}
