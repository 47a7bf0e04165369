use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Institutional domain every harvested address must belong to.
pub const EMAIL_DOMAIN: &str = "ncut.edu.tw";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"[a-zA-Z0-9._%+-]+@{}", regex::escape(EMAIL_DOMAIN))).unwrap()
});

/// Scan raw page text for `@ncut.edu.tw` addresses.
///
/// This is a plain text scan, so addresses in headers, footers or scripts
/// are picked up too. The result is unique and sorted ascending.
pub fn extract_emails(text: &str) -> Vec<String> {
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
