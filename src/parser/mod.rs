pub mod blocks;
pub mod contacts;
pub mod emails;

use tracing::debug;

use crate::db::Contact;
use contacts::EmailCorrelator;

/// Two independent scans over the same page: emails, then directory blocks,
/// joined by the correlator.
pub fn process_page(html: &str, correlator: &dyn EmailCorrelator) -> Vec<Contact> {
    let emails = emails::extract_emails(html);
    let blocks = blocks::extract_blocks(html);
    debug!(emails = emails.len(), blocks = blocks.len(), "scanned page");
    if emails.len() != blocks.len() {
        debug!("email count differs from block count; pairings may be off");
    }
    contacts::build_contacts(&blocks, &emails, correlator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contacts::{Positional, UNKNOWN};

    #[test]
    fn empty_page() {
        assert!(process_page("", &Positional).is_empty());
        assert!(process_page("<html><body>nothing here</body></html>", &Positional).is_empty());
    }

    #[test]
    fn stray_address_shifts_pairing() {
        let html = std::fs::read_to_string("tests/fixtures/directory.html").unwrap();
        let html = html.replace("</body>", "<p>aaa-admin@ncut.edu.tw</p></body>");
        let contacts = process_page(&html, &Positional);
        assert_eq!(contacts.len(), 3);
        assert_eq!(contacts[0].email, "aaa-admin@ncut.edu.tw");
        assert_eq!(contacts[1].email, "chen@ncut.edu.tw");
        assert_eq!(contacts[2].email, "lin@ncut.edu.tw");
        assert!(contacts.iter().all(|c| c.email != UNKNOWN));
    }
}
