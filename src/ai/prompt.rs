use std::fmt;

/// Rules sent with every request, whatever the action.
pub const BASE_RULES: &str = "You are a writing assistant embedded in a rich-text blog editor.\n\
Rules:\n\
- Preserve any existing HTML structure and formatting tags.\n\
- Do not use markdown syntax of any kind.\n\
- Respond with HTML only, without explanations, preambles or code fences.";

pub const EXPAND_INSTRUCTIONS: &str = "Task: expand the content below. Add depth, examples and \
supporting detail while keeping the author's voice, tone and structure.";

pub const SHORTEN_INSTRUCTIONS: &str = "Task: shorten the content below. Keep the key points and \
the author's voice, remove repetition and filler.";

pub const GRAMMAR_INSTRUCTIONS: &str = "Task: fix grammar, spelling and punctuation in the \
content below. Do not change its meaning, tone or structure.";

pub const GENERATE_INSTRUCTIONS: &str = "Task: write a well-structured blog post about the topic \
below using <h2>, <p>, <ul>/<li> and <strong> where appropriate.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistAction {
    Expand,
    Shorten,
    Grammar,
    Generate,
}

impl AssistAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action.trim().to_lowercase().as_str() {
            "expand" => Some(Self::Expand),
            "shorten" => Some(Self::Shorten),
            "grammar" | "fix-grammar" => Some(Self::Grammar),
            "generate" => Some(Self::Generate),
            _ => None,
        }
    }

    pub fn instructions(self) -> &'static str {
        match self {
            Self::Expand => EXPAND_INSTRUCTIONS,
            Self::Shorten => SHORTEN_INSTRUCTIONS,
            Self::Grammar => GRAMMAR_INSTRUCTIONS,
            Self::Generate => GENERATE_INSTRUCTIONS,
        }
    }
}

impl fmt::Display for AssistAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Expand => "expand",
            Self::Shorten => "shorten",
            Self::Grammar => "grammar",
            Self::Generate => "generate",
        };
        f.write_str(name)
    }
}

/// Compose the provider prompt. An unrecognised action contributes no
/// instruction block; rules and inputs are still included.
pub fn build_prompt(action: &str, content: Option<&str>, topic: Option<&str>) -> String {
    let mut prompt = String::from(BASE_RULES);

    if let Some(action) = AssistAction::parse(action) {
        prompt.push_str("\n\n");
        prompt.push_str(action.instructions());
    }
    if let Some(content) = content.filter(|c| !c.trim().is_empty()) {
        prompt.push_str("\n\nContent:\n");
        prompt.push_str(content);
    }
    if let Some(topic) = topic.filter(|t| !t.trim().is_empty()) {
        prompt.push_str("\n\nTopic:\n");
        prompt.push_str(topic);
    }

    prompt
}

/// Normalize provider output to bare HTML: trims and drops markdown fences or
/// a stray `html` label the model sometimes adds.
pub fn clean_output(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest.strip_prefix("html").unwrap_or(rest);
        text = rest.strip_suffix("```").unwrap_or(rest).trim();
    } else if let Some(rest) = text.strip_prefix("html\n") {
        text = rest.trim();
    }

    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_prompt_has_rules_instructions_and_content() {
        let prompt = build_prompt("expand", Some("X"), None);
        assert!(prompt.starts_with(BASE_RULES));
        assert!(prompt.contains(EXPAND_INSTRUCTIONS));
        assert!(prompt.ends_with("Content:\nX"));
    }

    #[test]
    fn unknown_action_keeps_rules_and_content_only() {
        let prompt = build_prompt("bogus", Some("X"), None);
        assert!(prompt.contains(BASE_RULES));
        assert!(prompt.contains("Content:\nX"));
        for block in [
            EXPAND_INSTRUCTIONS,
            SHORTEN_INSTRUCTIONS,
            GRAMMAR_INSTRUCTIONS,
            GENERATE_INSTRUCTIONS,
        ] {
            assert!(!prompt.contains(block));
        }
    }

    #[test]
    fn generate_prompt_carries_topic() {
        let prompt = build_prompt("generate", None, Some("Rust async runtimes"));
        assert!(prompt.contains(GENERATE_INSTRUCTIONS));
        assert!(prompt.contains("Topic:\nRust async runtimes"));
        assert!(!prompt.contains("Content:"));
    }

    #[test]
    fn parses_route_names() {
        assert_eq!(AssistAction::parse("fix-grammar"), Some(AssistAction::Grammar));
        assert_eq!(AssistAction::parse(" Expand "), Some(AssistAction::Expand));
        assert_eq!(AssistAction::parse("translate"), None);
    }

    #[test]
    fn clean_output_strips_fences() {
        assert_eq!(clean_output("```html\n<p>Hi</p>\n```"), "<p>Hi</p>");
        assert_eq!(clean_output("```\n<p>Hi</p>```"), "<p>Hi</p>");
        assert_eq!(clean_output("html\n<p>Hi</p>"), "<p>Hi</p>");
        assert_eq!(clean_output("  <p>Hi</p>  \n"), "<p>Hi</p>");
    }
}
