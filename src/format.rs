//! Reply formatting: code-block delimiting and cleanup.
//!
//! The system prompt instructs the model to fence code with a literal
//! `---code---` marker before and after each code segment. Splitting on
//! that marker yields alternating plain/code segments.

/// Literal substring marking the start and end of a code block.
pub const CODE_DELIMITER: &str = "---code---";

/// System prompt establishing the delimiter convention.
pub const SYSTEM_PROMPT: &str = "When providing code in your response, please make sure to \
separate it from the text using the delimiter '---code---' before and after the code segment.";

/// Strip stray `User:` markers the model sometimes echoes and trim
/// surrounding whitespace.
pub fn clean_reply(reply: &str) -> String {
    reply.replace("User:", "").trim().to_string()
}

/// Format a reply for display.
///
/// The text is split on [`CODE_DELIMITER`]; even-indexed segments are
/// plain text, odd-indexed segments are code wrapped in
/// `<pre><code>…</code></pre>`, and the pieces are concatenated back
/// into one string. When the delimiter never occurred the whole reply
/// is wrapped in a single `<p>` element.
pub fn format_reply(reply: &str) -> String {
    let segments: Vec<&str> = reply.split(CODE_DELIMITER).collect();

    if segments.len() == 1 {
        return format!("<p>{}</p>", segments[0]);
    }

    let mut out = String::with_capacity(reply.len() + 32);
    for (i, segment) in segments.iter().enumerate() {
        if i % 2 == 1 {
            out.push_str("<pre><code>");
            out.push_str(segment);
            out.push_str("</code></pre>");
        } else {
            out.push_str(segment);
        }
    }
    out
}
