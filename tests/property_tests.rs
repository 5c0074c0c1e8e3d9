// Property tests for prompt construction and completion sanitizing
// Author: kelexine (https://github.com/kelexine)

use code_translator::prompt::build_prompt;
use code_translator::sanitize::sanitize_completion;
use proptest::prelude::*;

fn language() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("JavaScript".to_string()),
        Just("Python".to_string()),
        Just("Rust".to_string()),
        Just("C++".to_string()),
        Just("Natural Language".to_string()),
        "[A-Z][a-z]{2,10}",
    ]
}

/// Text built from fragments that tend to trip the sanitizer.
fn completion_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("```".to_string()),
            Just("```python\n".to_string()),
            Just("`".to_string()),
            Just("\n".to_string()),
            Just("\n\n".to_string()),
            Just(" ".to_string()),
            Just("Explanation:".to_string()),
            Just("explanation: ".to_string()),
            "[a-z(){};=]{1,8}",
        ],
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prompt_embeds_code_and_names_both_languages(
        (source, target) in (language(), language()).prop_filter("distinct", |(s, t)| s != t),
        code in "\\PC{0,200}",
    ) {
        let prompt = build_prompt(&source, &target, &code);
        prop_assert!(prompt.contains(&code));
        prop_assert!(prompt.contains(&source));
        prop_assert!(prompt.contains(&target));
    }

    #[test]
    fn sanitize_is_idempotent(text in completion_text()) {
        let once = sanitize_completion(&text);
        prop_assert_eq!(sanitize_completion(&once), once);
    }

    #[test]
    fn sanitize_removes_every_fence(text in completion_text()) {
        prop_assert!(!sanitize_completion(&text).contains("```"));
    }

    #[test]
    fn sanitize_never_panics(text in "\\PC*") {
        let _ = sanitize_completion(&text);
    }
}
