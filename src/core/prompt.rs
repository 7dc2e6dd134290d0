//! System prompt rendering
//!
//! The configured template uses brace placeholders (`{session_id}`,
//! `{current_time}`, ...). `{{` and `}}` render literal braces. The user turn
//! keeps an unresolved `{message}` that the caller fills right before dispatch.

use crate::consts::{MESSAGE_PLACEHOLDER, PROMPT_TIME_FORMAT};
use crate::error::TemplateError;
use crate::utils::parse_epoch;

use super::types::{Prompt, PromptSegment, Role};

/// Static inputs of the system prompt taken from configuration
#[derive(Debug, Clone)]
pub(crate) struct PromptSettings<'a> {
    pub(crate) template: &'a str,
    pub(crate) max_tokens: u32,
    pub(crate) ignore_inputs: &'a [String],
}

pub(crate) fn build_prompt(
    session_id: &str,
    timestamp: &str,
    settings: &PromptSettings<'_>,
) -> Result<Prompt, TemplateError> {
    let current_time = parse_epoch(timestamp)?
        .format(PROMPT_TIME_FORMAT)
        .to_string();
    let max_tokens = settings.max_tokens.to_string();
    let ignore_inputs = settings.ignore_inputs.join(", ");

    let vars: [(&str, &str); 6] = [
        ("session_id", session_id),
        ("timestamp", timestamp),
        ("current_time", &current_time),
        ("max_tokens", &max_tokens),
        ("ignore_inputs", &ignore_inputs),
        ("message", MESSAGE_PLACEHOLDER),
    ];
    let system = render(settings.template, &vars)?;
    tracing::debug!(
        session_id,
        length = system.len(),
        "generated system prompt: {}...",
        system.chars().take(100).collect::<String>()
    );

    Ok(Prompt {
        segments: [
            PromptSegment {
                role: Role::System,
                content: system,
            },
            PromptSegment {
                role: Role::User,
                content: MESSAGE_PLACEHOLDER.to_string(),
            },
        ],
    })
}

/// Substitute `{key}` placeholders from `vars`
pub(crate) fn render(template: &str, vars: &[(&str, &str)]) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => {
                            return Err(TemplateError::Malformed {
                                reason: "unclosed '{' in template",
                            });
                        }
                        Some(k) => key.push(k),
                    }
                }
                let value = vars
                    .iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, value)| *value)
                    .ok_or(TemplateError::UndefinedKey { key })?;
                out.push_str(value);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(TemplateError::Malformed {
                    reason: "single '}' encountered in template",
                });
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings<'a>(template: &'a str, ignore: &'a [String]) -> PromptSettings<'a> {
        PromptSettings {
            template,
            max_tokens: 150,
            ignore_inputs: ignore,
        }
    }

    #[test]
    fn renders_all_known_keys() {
        let ignore = vec!["hi".to_string(), "lol".to_string()];
        let template = "id={session_id} ts={timestamp} now={current_time} max={max_tokens} \
                        skip=[{ignore_inputs}] msg={message}";
        let prompt = build_prompt("abc", "1756916040", &settings(template, &ignore)).unwrap();

        assert_eq!(prompt.segments()[0].role, Role::System);
        assert_eq!(
            prompt.segments()[0].content,
            "id=abc ts=1756916040 now=2025-09-03 16:14:00 UTC max=150 skip=[hi, lol] msg={message}"
        );
        assert_eq!(prompt.segments()[1].role, Role::User);
        assert_eq!(prompt.segments()[1].content, "{message}");
    }

    #[test]
    fn doubled_braces_are_literal() {
        let out = render("{{json}} {a}", &[("a", "1")]).unwrap();
        assert_eq!(out, "{json} 1");
    }

    #[test]
    fn undefined_key_fails() {
        let err = build_prompt("abc", "1756916040", &settings("hello {nick}", &[])).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UndefinedKey {
                key: "nick".to_string()
            }
        );
    }

    #[test]
    fn bad_timestamp_fails() {
        let err = build_prompt("abc", "not-a-number", &settings("{message}", &[])).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidTimestamp { .. }));
    }

    #[test]
    fn unbalanced_braces_fail() {
        assert!(matches!(
            render("oops {message", &[("message", "x")]),
            Err(TemplateError::Malformed { .. })
        ));
        assert!(matches!(
            render("oops }", &[]),
            Err(TemplateError::Malformed { .. })
        ));
    }

    #[test]
    fn user_turn_filled_after_build() {
        let prompt = build_prompt("abc", "1756916040", &settings("{message}", &[]))
            .unwrap()
            .with_message("what's {up}");
        assert_eq!(prompt.segments()[1].content, "what's {up}");
    }
}
