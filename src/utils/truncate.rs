//! Truncation Utilities
//!
//! Bounds document text on UTF-8 boundaries: `truncate_text` keeps a head
//! and a tail around a marker, `preview` keeps the first N characters.

const APPROX_BYTES_PER_TOKEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationPolicy {
    Bytes(usize),
    Tokens(usize),
}

impl TruncationPolicy {
    pub fn byte_budget(&self) -> usize {
        match self {
            TruncationPolicy::Bytes(b) => *b,
            TruncationPolicy::Tokens(t) => t.saturating_mul(APPROX_BYTES_PER_TOKEN),
        }
    }
}

/// Largest char boundary `<= index`.
fn floor_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest char boundary `>= index`.
fn ceil_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Keep the start and end of `content` within the policy's byte budget.
pub fn truncate_text(content: &str, policy: TruncationPolicy) -> String {
    let max_bytes = policy.byte_budget();
    if content.len() <= max_bytes {
        return content.to_string();
    }

    let half = max_bytes / 2;
    let prefix_end = floor_boundary(content, half);
    let suffix_start = ceil_boundary(content, content.len() - half).max(prefix_end);

    let prefix = &content[..prefix_end];
    let suffix = &content[suffix_start..];
    let dropped = content.len() - prefix.len() - suffix.len();

    format!("{}\n... [{} bytes truncated] ...\n{}", prefix, dropped, suffix)
}

/// First `max_chars` characters of `content`.
pub fn preview(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}
