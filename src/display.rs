use std::io::Write;

use anyhow::Result;

use crate::db::{Contact, SaveReport};

const NAME_WIDTH: usize = 20;
const TITLE_WIDTH: usize = 24;
const EMAIL_WIDTH: usize = 36;

/// Render contacts as a fixed-width table, one row per contact.
pub fn table(contacts: &[Contact]) -> String {
    let mut out = format!(
        "{:>3} | {:<NAME_WIDTH$} | {:<TITLE_WIDTH$} | {:<EMAIL_WIDTH$}\n",
        "#", "Name", "Title", "Email"
    );
    out.push_str(&"-".repeat(3 + NAME_WIDTH + TITLE_WIDTH + EMAIL_WIDTH + 9));
    out.push('\n');
    for (i, c) in contacts.iter().enumerate() {
        out.push_str(&format!(
            "{:>3} | {:<NAME_WIDTH$} | {:<TITLE_WIDTH$} | {:<EMAIL_WIDTH$}\n",
            i + 1,
            truncate(&c.name, NAME_WIDTH),
            truncate(&c.title, TITLE_WIDTH),
            truncate(&c.email, EMAIL_WIDTH),
        ));
    }
    out
}

pub fn write_contacts(out: &mut impl Write, contacts: &[Contact], json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(contacts)?)?;
    } else if contacts.is_empty() {
        writeln!(out, "No contacts found.")?;
    } else {
        write!(out, "{}", table(contacts))?;
    }
    Ok(())
}

pub fn summary(report: &SaveReport) -> String {
    let mut line = format!(
        "Saved {} new {} ({} already stored)",
        report.inserted,
        if report.inserted == 1 { "contact" } else { "contacts" },
        report.ignored
    );
    if report.failed > 0 {
        line.push_str(&format!(", {} failed", report.failed));
    }
    line.push('.');
    line
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
