//! Annotation block lexer.
//!
//! Two pure stages: [`extract_blocks`] pulls raw payloads out of a file's
//! text by comment-delimiter matching, [`normalize_block`] strips comment
//! continuation markers so the payload can be parsed as YAML.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // `/*` or `/**`, optional whitespace or leading stars, the `@mcp` sentinel,
    // then everything up to the first closing `*/`.
    static ref ANNOTATION_BLOCK: Regex =
        Regex::new(r"(?s)/\*\*?[\s*]*@mcp\b(.*?)\*/").expect("Invalid annotation pattern");
}

/// Return the raw payload of every `@mcp` block in `content`, in file order.
pub fn extract_blocks(content: &str) -> Vec<&str> {
    ANNOTATION_BLOCK
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Strip block comment continuation markers from a payload.
///
/// A line whose first non-blank character is `*` loses the indentation, the
/// star and one following space. Other lines are kept, then the whole block
/// is dedented by the indentation its non-blank lines share.
pub fn normalize_block(payload: &str) -> String {
    let mut lines: Vec<&str> = payload
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let trimmed = line.trim_start();
            let stripped = match trimmed.strip_prefix('*') {
                Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
                // Text sharing the line with the sentinel has no meaningful indent
                None if i == 0 => trimmed,
                None => line,
            };
            if stripped.trim().is_empty() {
                ""
            } else {
                stripped
            }
        })
        .collect();

    let common_indent = lines
        .iter()
        .filter(|line| !line.is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    if common_indent > 0 {
        for line in lines.iter_mut().filter(|line| !line.is_empty()) {
            let full: &str = *line;
            *line = &full[common_indent..];
        }
    }

    lines.join("\n")
}
