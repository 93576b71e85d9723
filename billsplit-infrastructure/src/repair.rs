//! Clean-up of vision-model output before it reaches the JSON decoder.
//!
//! Models wrap JSON in Markdown fences, open with a sentence of prose, trail
//! off with commentary or leave trailing commas behind. Each of those habits
//! is one [`RepairStep`]; steps run in declaration order and the ones that
//! changed the text are reported so callers can log them.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStep {
    StripCodeFence,
    TrimLeadingProse,
    TrimTrailingArtifacts,
    RemoveTrailingCommas,
}

impl RepairStep {
    pub const ALL: [RepairStep; 4] = [
        RepairStep::StripCodeFence,
        RepairStep::TrimLeadingProse,
        RepairStep::TrimTrailingArtifacts,
        RepairStep::RemoveTrailingCommas,
    ];

    /// Returns the rewritten text, or `None` when the step does not apply.
    pub fn apply(self, text: &str) -> Option<String> {
        let rewritten = match self {
            RepairStep::StripCodeFence => strip_code_fence(text)?,
            RepairStep::TrimLeadingProse => {
                let start = text.find(['{', '['])?;
                text[start..].to_owned()
            }
            RepairStep::TrimTrailingArtifacts => {
                let end = text.rfind(['}', ']'])?;
                text[..=end].to_owned()
            }
            RepairStep::RemoveTrailingCommas => remove_trailing_commas(text),
        };
        (rewritten != text).then_some(rewritten)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repaired {
    pub text: String,
    pub applied: Vec<RepairStep>,
}

pub fn repair(raw: &str) -> Repaired {
    let mut text = raw.trim().to_owned();
    let mut applied = Vec::new();
    for step in RepairStep::ALL {
        if let Some(rewritten) = step.apply(&text) {
            text = rewritten.trim().to_owned();
            applied.push(step);
        }
    }
    Repaired { text, applied }
}

const FENCE: &str = "```";

fn strip_code_fence(text: &str) -> Option<String> {
    let open = text.find(FENCE)?;
    let after_open = &text[open + FENCE.len()..];
    // Skip the info string (`json`, `JSON`, ...).
    let body_start = after_open.find('\n').map_or(after_open.len(), |idx| idx + 1);
    let body = &after_open[body_start..];
    let body = match body.find(FENCE) {
        Some(close) => &body[..close],
        None => body,
    };
    Some(body.to_owned())
}

fn remove_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (idx, c) in chars.iter().copied().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[idx + 1..]
                    .iter()
                    .find(|next| !next.is_whitespace() && **next != ',');
                if !matches!(next, Some('}' | ']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::fenced_with_tag("```json\n{\"total\": 12.5}\n```", "{\"total\": 12.5}")]
    #[case::fenced_without_tag("```\n{\"a\": 1}\n```", "{\"a\": 1}")]
    #[case::unclosed_fence("```json\n{\"a\": 1}", "{\"a\": 1}")]
    fn strips_fences(#[case] raw: &str, #[case] expected: &str) {
        let repaired = repair(raw);
        assert_eq!(repaired.text, expected);
        assert_eq!(repaired.applied, vec![RepairStep::StripCodeFence]);
    }

    #[test]
    fn trims_prose_on_both_sides() {
        let repaired = repair("Here is the receipt:\n{\"merchant\": \"Cafe\"}\nLet me know!");
        assert_eq!(repaired.text, "{\"merchant\": \"Cafe\"}");
        assert_eq!(
            repaired.applied,
            vec![
                RepairStep::TrimLeadingProse,
                RepairStep::TrimTrailingArtifacts
            ]
        );
    }

    #[rstest]
    #[case::object("{\"a\": 1,}", "{\"a\": 1}")]
    #[case::array_with_space("[1, 2, ]", "[1, 2 ]")]
    #[case::nested("{\"items\": [{\"p\": 1},\n],}", "{\"items\": [{\"p\": 1}\n]}")]
    #[case::repeated("[1,, ,]", "[1 ]")]
    #[case::comma_inside_string("{\"label\": \"a,}\"}", "{\"label\": \"a,}\"}")]
    #[case::escaped_quote("{\"label\": \"say \\\",}\"}", "{\"label\": \"say \\\",}\"}")]
    fn trailing_commas(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(repair(raw).text, expected);
    }

    #[test]
    fn clean_json_is_untouched() {
        let repaired = repair(" {\"total\": null} ");
        assert_eq!(repaired.text, "{\"total\": null}");
        assert!(repaired.applied.is_empty());
    }

    #[test]
    fn everything_at_once() {
        let raw = "Sure!\n```json\n{\"items\": [{\"name\": \"Tea\", \"price\": 3},],}\n```\nThanks";
        let repaired = repair(raw);
        assert_eq!(
            repaired.text,
            "{\"items\": [{\"name\": \"Tea\", \"price\": 3}]}"
        );
        assert_eq!(
            repaired.applied,
            vec![RepairStep::StripCodeFence, RepairStep::RemoveTrailingCommas]
        );
    }
}
