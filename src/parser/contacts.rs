use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::emails::extract_emails;
use crate::db::Contact;

/// Placeholder for any field the page did not yield.
pub const UNKNOWN: &str = "unknown";

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div class="member_name">.*?<a[^>]*>(.*?)</a>"#).unwrap()
});

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<div class="member_info_title">.*?職稱.*?</div>\s*<div class="member_info_content">(.*?)</div>"#,
    )
    .unwrap()
});

/// Decides which email belongs to the `index`-th directory block.
pub trait EmailCorrelator: Send + Sync {
    fn email_for(&self, index: usize, block: &str, page_emails: &[String]) -> Option<String>;
}

/// The i-th block gets the i-th page email. Nothing checks that the two
/// sequences line up; a stray address elsewhere on the page shifts every
/// pairing after it.
pub struct Positional;

impl EmailCorrelator for Positional {
    fn email_for(&self, index: usize, _block: &str, page_emails: &[String]) -> Option<String> {
        page_emails.get(index).cloned()
    }
}

/// Uses the first address found inside the block's own markup.
pub struct InBlock;

impl EmailCorrelator for InBlock {
    fn email_for(&self, _index: usize, block: &str, _page_emails: &[String]) -> Option<String> {
        extract_emails(block).into_iter().next()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Correlation {
    #[default]
    Positional,
    InBlock,
}

impl Correlation {
    pub fn correlator(self) -> Box<dyn EmailCorrelator> {
        match self {
            Correlation::Positional => Box::new(Positional),
            Correlation::InBlock => Box::new(InBlock),
        }
    }
}

/// One contact per block, in block order.
pub fn build_contacts(
    blocks: &[&str],
    emails: &[String],
    correlator: &dyn EmailCorrelator,
) -> Vec<Contact> {
    blocks
        .iter()
        .enumerate()
        .map(|(i, block)| Contact {
            name: capture_trimmed(&NAME_RE, block),
            title: capture_trimmed(&TITLE_RE, block),
            email: correlator
                .email_for(i, block, emails)
                .unwrap_or_else(|| UNKNOWN.to_string()),
        })
        .collect()
}

fn capture_trimmed(re: &Regex, block: &str) -> String {
    re.captures(block)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
