use thiserror::Error;
use tracing::{info, warn};

use crate::db::{Contact, SaveReport, Store};
use crate::fetch::{Fetch, FetchError};
use crate::parser;
use crate::parser::contacts::EmailCorrelator;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("please enter a URL")]
    EmptyAddress,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// Long-lived handles built once at startup and shared by every run.
pub struct AppContext {
    pub store: Store,
    pub fetcher: Box<dyn Fetch>,
    pub correlator: Box<dyn EmailCorrelator>,
}

pub struct RunOutcome {
    pub contacts: Vec<Contact>,
    pub report: SaveReport,
}

/// Fetch one directory page, extract its contacts and merge them into the
/// store. Nothing is written unless the fetch succeeds.
pub fn run(ctx: &AppContext, address: &str) -> Result<RunOutcome, PipelineError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(PipelineError::EmptyAddress);
    }

    let html = ctx
        .fetcher
        .fetch(address)
        .inspect_err(|e| warn!("Aborting run, store untouched: {}", e))?;

    let contacts = parser::process_page(&html, ctx.correlator.as_ref());
    info!("Extracted {} contacts from {}", contacts.len(), address);

    let report = ctx.store.save(&contacts)?;
    Ok(RunOutcome { contacts, report })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use reqwest::StatusCode;

    use super::*;
    use crate::parser::contacts::{Positional, UNKNOWN};

    struct StaticPage {
        body: String,
        requested: Rc<RefCell<Vec<String>>>,
    }

    impl StaticPage {
        fn new(body: impl Into<String>) -> Self {
            Self {
                body: body.into(),
                requested: Rc::default(),
            }
        }
    }

    impl Fetch for StaticPage {
        fn fetch(&self, address: &str) -> Result<String, FetchError> {
            self.requested.borrow_mut().push(address.to_string());
            Ok(self.body.clone())
        }
    }

    struct NotFound;

    impl Fetch for NotFound {
        fn fetch(&self, address: &str) -> Result<String, FetchError> {
            Err(FetchError::Status {
                url: address.to_string(),
                status: StatusCode::NOT_FOUND,
            })
        }
    }

    fn context(fetcher: Box<dyn Fetch>) -> AppContext {
        let store = Store::open_in_memory().unwrap();
        store.initialize().unwrap();
        AppContext {
            store,
            fetcher,
            correlator: Box::new(Positional),
        }
    }

    fn fixture_page() -> Box<dyn Fetch> {
        Box::new(StaticPage::new(
            std::fs::read_to_string("tests/fixtures/directory.html").unwrap(),
        ))
    }

    #[test]
    fn empty_address_fails_fast() {
        let ctx = context(fixture_page());
        assert!(matches!(run(&ctx, ""), Err(PipelineError::EmptyAddress)));
        assert!(matches!(run(&ctx, "   \t"), Err(PipelineError::EmptyAddress)));
        assert_eq!(ctx.store.stats().unwrap().total, 0);
    }

    #[test]
    fn fetch_failure_leaves_store_untouched() {
        let ctx = context(Box::new(NotFound));
        let err = run(&ctx, "https://www.ncut.edu.tw/missing").err().unwrap();
        assert!(matches!(err, PipelineError::Fetch(FetchError::Status { .. })));
        assert!(err.to_string().contains("404"));
        assert_eq!(ctx.store.stats().unwrap().total, 0);
    }

    #[test]
    fn run_extracts_and_stores() {
        let ctx = context(fixture_page());
        let outcome = run(&ctx, "https://www.ncut.edu.tw/teachers").unwrap();

        let emails: Vec<&str> = outcome.contacts.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(emails, vec!["chen@ncut.edu.tw", "lin@ncut.edu.tw", "wang@ncut.edu.tw"]);
        assert_eq!(outcome.report.inserted, 3);
        assert_eq!(ctx.store.contacts(None).unwrap(), outcome.contacts);
    }

    #[test]
    fn rerun_is_idempotent() {
        let ctx = context(fixture_page());
        let first = run(&ctx, "https://www.ncut.edu.tw/teachers").unwrap();
        let rows_after_first = ctx.store.stats().unwrap().total;

        let second = run(&ctx, "https://www.ncut.edu.tw/teachers").unwrap();
        assert_eq!(ctx.store.stats().unwrap().total, rows_after_first);
        assert_eq!(first.contacts, second.contacts);
        assert_eq!(second.report.inserted, 0);
        assert_eq!(second.report.ignored, first.contacts.len());
    }

    #[test]
    fn page_without_directory_stores_nothing() {
        let ctx = context(Box::new(StaticPage::new("<html><p>office@ncut.edu.tw</p></html>")));
        let outcome = run(&ctx, "https://www.ncut.edu.tw/").unwrap();
        assert!(outcome.contacts.is_empty());
        assert_eq!(outcome.report, SaveReport::default());
    }

    #[test]
    fn extra_blocks_get_unknown_email() {
        let html = std::fs::read_to_string("tests/fixtures/directory.html").unwrap();
        let html = html.replace("mailto:wang@ncut.edu.tw\">wang@ncut.edu.tw", "#\">-");
        let ctx = context(Box::new(StaticPage::new(html)));

        let outcome = run(&ctx, "https://www.ncut.edu.tw/teachers").unwrap();
        assert_eq!(outcome.contacts.len(), 3);
        assert_eq!(outcome.contacts[2].email, UNKNOWN);
        assert_eq!(outcome.report.inserted, 3);
    }

    #[test]
    fn address_is_trimmed_before_fetch() {
        let page = StaticPage::new("");
        let requested = Rc::clone(&page.requested);
        let ctx = context(Box::new(page));

        run(&ctx, "  https://www.ncut.edu.tw/  ").unwrap();
        run(&ctx, "\thttps://www.ncut.edu.tw/x\n").unwrap();
        assert_eq!(
            *requested.borrow(),
            vec!["https://www.ncut.edu.tw/", "https://www.ncut.edu.tw/x"]
        );
    }
}
