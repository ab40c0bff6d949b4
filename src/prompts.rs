//! Prompts for vision-model OCR.
//!
//! The vision engine is asked to transcribe, not to interpret: its output
//! goes through the same text parser as pasted input, so the prompt only has
//! to steer the model towards one `term - definition` per line.
//!
//! Callers can override the default via [`crate::config::DeckConfig::ocr_prompt`].

/// Default system prompt for transcribing a photographed vocabulary list.
pub const DEFAULT_OCR_PROMPT: &str = r#"You transcribe photographed or scanned vocabulary lists.

Follow these rules precisely:

1. TEXT PRESERVATION
   - Transcribe every term and every definition exactly as written
   - Keep the reading order of the page
   - Do not translate, summarise, or correct the content

2. ONE ENTRY PER LINE
   - Write each entry as: term - definition
   - Keep part-of-speech annotations in parentheses, e.g. abhor (v.) to hate
   - Join definitions that wrap onto several printed lines into one line
   - Drop list numbering and bullet symbols

3. WHAT TO IGNORE
   - Page numbers, headers, footers, and worksheet instructions
   - Decorative lines and boxes

4. OUTPUT FORMAT
   - Output ONLY the transcribed entries
   - Do NOT wrap the output in code fences
   - Do NOT add commentary or explanations"#;

/// Normalise a raw vision-model reply before it reaches the parser.
///
/// Models sometimes ignore rule 4 and fence their answer; the fence lines
/// would otherwise become term-only rows.
pub fn strip_reply_fences(reply: &str) -> String {
    let trimmed = reply.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let body = match body.find('\n') {
        Some(i) => &body[i + 1..],
        None => "",
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_asks_for_one_entry_per_line() {
        assert!(DEFAULT_OCR_PROMPT.contains("term - definition"));
    }

    #[test]
    fn strips_fenced_reply() {
        let reply = "```text\nmunch - to chew\nbellow - to shout\n```";
        assert_eq!(strip_reply_fences(reply), "munch - to chew\nbellow - to shout");
    }

    #[test]
    fn plain_reply_untouched() {
        assert_eq!(strip_reply_fences("  a - b \n"), "a - b");
    }
}
