// Completion cleanup for buffered mode
// Author: kelexine (https://github.com/kelexine)

use regex::Regex;
use std::sync::OnceLock;

/// Lazily initialized regex for Markdown fence markers (with optional info string)
static FENCE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Lazily initialized regex for a trailing `Explanation:` section
static EXPLANATION_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_fence_regex() -> &'static Regex {
    FENCE_REGEX.get_or_init(|| {
        // Info strings cover tags like `c++`, `c#`, `objective-c`, `.rs`
        Regex::new(r"```[A-Za-z0-9_+#.\-]*").expect("Invalid regex pattern")
    })
}

fn get_explanation_regex() -> &'static Regex {
    EXPLANATION_REGEX.get_or_init(|| {
        // Either the very start of the text or a blank line, then the marker
        Regex::new(r"(?i)(?:\A|\r?\n[ \t]*\r?\n)\s*explanation:").expect("Invalid regex pattern")
    })
}

/// Strip code fences and a trailing explanation from a model completion.
///
/// Best effort and infallible: input without fences or an explanation comes
/// back trimmed. Applying it twice gives the same result as applying it once.
pub fn sanitize_completion(raw: &str) -> String {
    let unfenced = get_fence_regex().replace_all(raw, "");
    let unfenced = unfenced.trim();

    let kept = match get_explanation_regex().find(unfenced) {
        Some(m) => &unfenced[..m.start()],
        None => unfenced,
    };

    kept.trim().to_string()
}
