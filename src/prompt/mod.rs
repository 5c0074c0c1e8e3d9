//! Prompt construction for translate requests.
//!
//! The prompt is a fixed instruction template with the two language names and
//! the source text interpolated verbatim. Building it never fails: empty
//! inputs are passed through and left for the relay to reject.
//!
//! Author: kelexine (<https://github.com/kelexine>)

/// Language label the UI uses for free-form prose instead of code.
pub const NATURAL_LANGUAGE: &str = "Natural Language";

pub fn is_natural_language(language: &str) -> bool {
    language.trim().eq_ignore_ascii_case(NATURAL_LANGUAGE)
}

/// Build the single user message sent upstream.
pub fn build_prompt(source_language: &str, target_language: &str, source_code: &str) -> String {
    if is_natural_language(source_language) && !is_natural_language(target_language) {
        format!(
            "You are an expert programmer in all programming languages. \
             Write {target_language} code that implements the following {source_language} description.\n\
             Respond with ONLY the {target_language} code. Do not include any explanation, \
             commentary or Markdown code fences.\n\n\
             {source_language}:\n{source_code}\n\n\
             {target_language} code:"
        )
    } else if is_natural_language(target_language) && !is_natural_language(source_language) {
        format!(
            "You are an expert programmer in all programming languages. \
             Translate the following {source_language} code into {target_language}: \
             explain what it does in plain, concise prose.\n\
             Respond with ONLY the explanation text. Do not repeat the code and do not use \
             Markdown code fences.\n\n\
             {source_language} code:\n{source_code}\n\n\
             {target_language}:"
        )
    } else {
        format!(
            "You are an expert programmer in all programming languages. \
             Translate the following {source_language} code to {target_language} code.\n\
             Preserve all identifier names and the program's behavior.\n\
             Respond with ONLY the translated {target_language} code. Do not include any \
             explanation, commentary or Markdown code fences.\n\n\
             {source_language} code:\n{source_code}\n\n\
             {target_language} code:"
        )
    }
}
