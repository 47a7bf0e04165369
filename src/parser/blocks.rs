use std::sync::LazyLock;

use regex::Regex;

// Shortest span from the container opening to the first `</div></div>` pair,
// so neighbouring entries never merge.
static TEACHER_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div class="teacher-list">.*?</div>\s*</div>"#).unwrap()
});

/// Split a directory page into one markup fragment per staff entry.
pub fn extract_blocks(html: &str) -> Vec<&str> {
    TEACHER_BLOCK_RE.find_iter(html).map(|m| m.as_str()).collect()
}
