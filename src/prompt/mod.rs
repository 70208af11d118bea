//! Prompt construction for every pipeline role.
//!
//! Each [`Role`] owns a fixed system template. The user message is rendered
//! from a [`StageContext`]: the upstream diff excerpt or the previous stage's
//! output, trimmed to a byte budget so the earliest context and the most
//! recent hunks both survive.

pub mod templates;

use strum::{AsRefStr, Display, EnumString};

use crate::constants::DEFAULT_TRIM_LIMIT;

/// Marker inserted where [`trim`] cut the middle of a text.
pub const ELISION_MARKER: &str = "\n...\n";

/// A pipeline role. The string form is the key used in the agent config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Planner,
    Reviewer,
    TestDesigner,
    #[strum(to_string = "implementation_agent")]
    Implementation,
    #[strum(to_string = "review_agent")]
    Review,
    #[strum(to_string = "test_agent")]
    Test,
    #[strum(to_string = "doc_agent")]
    Doc,
}

impl Role {
    /// The system instructions for this role.
    pub fn system(self) -> &'static str {
        match self {
            Role::Planner => templates::PLANNER,
            Role::Reviewer => templates::REVIEWER,
            Role::TestDesigner => templates::TEST_DESIGNER,
            Role::Implementation => templates::IMPLEMENTATION,
            Role::Review => templates::REVIEW,
            Role::Test => templates::TEST,
            Role::Doc => templates::DOC,
        }
    }

    /// Short label used in logs and error messages.
    pub fn label(self) -> &'static str {
        match self {
            Role::Planner => "Planner",
            Role::Reviewer => "Reviewer",
            Role::TestDesigner => "TestDesigner",
            Role::Implementation => "Implementation",
            Role::Review => "Review",
            Role::Test => "Test",
            Role::Doc => "Doc",
        }
    }
}

/// Inputs available to a stage. Roles read the fields they need; anything
/// missing renders as `(none)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageContext<'a> {
    /// Unified diff excerpt.
    pub diff: Option<&'a str>,
    /// Output of the previous stage, raw or re-serialized.
    pub upstream: Option<&'a str>,
    /// Second upstream input (the Doc stage reads two).
    pub secondary: Option<&'a str>,
    /// Task description for the agent run.
    pub topic: Option<&'a str>,
}

impl<'a> StageContext<'a> {
    pub fn with_diff(diff: &'a str) -> Self {
        Self {
            diff: Some(diff),
            ..Self::default()
        }
    }

    pub fn with_upstream(upstream: &'a str) -> Self {
        Self {
            upstream: Some(upstream),
            ..Self::default()
        }
    }
}

/// System and user messages for one completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePrompt {
    pub system: String,
    pub user: String,
}

/// Renders role prompts with a byte budget on the user message.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    limit: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_TRIM_LIMIT)
    }
}

impl PromptBuilder {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Build the prompt for `role` from `ctx`.
    ///
    /// The fields the role reads share whatever the limit leaves after the
    /// template text, so the rendered user message stays within the limit.
    pub fn build(&self, role: Role, ctx: &StageContext<'_>) -> StagePrompt {
        let inputs = role.inputs();
        let values: Vec<&str> = inputs.iter().map(|input| input.read(ctx)).collect();
        let overhead = render(role, ctx.topic, &Fields::default()).len();
        let lens: Vec<usize> = values.iter().map(|v| v.len()).collect();
        let shares = share_budget(&lens, self.limit.saturating_sub(overhead));

        let mut fields = Fields::default();
        for ((input, value), share) in inputs.iter().zip(&values).zip(shares) {
            let text = trim(value, share);
            match input {
                Input::Diff => fields.diff = text,
                Input::Upstream => fields.upstream = text,
                Input::Secondary => fields.secondary = text,
            }
        }

        StagePrompt {
            system: role.system().to_string(),
            user: trim(&render(role, ctx.topic, &fields), self.limit),
        }
    }
}

/// Interpolated inputs of a [`StageContext`].
#[derive(Debug, Clone, Copy)]
enum Input {
    Diff,
    Upstream,
    Secondary,
}

impl Input {
    fn read<'a>(self, ctx: &StageContext<'a>) -> &'a str {
        let value = match self {
            Input::Diff => ctx.diff,
            Input::Upstream => ctx.upstream,
            Input::Secondary => ctx.secondary,
        };
        value.unwrap_or("(none)")
    }
}

impl Role {
    /// Inputs interpolated into this role's user message.
    fn inputs(self) -> &'static [Input] {
        match self {
            Role::Planner => &[Input::Diff],
            Role::Reviewer => &[Input::Upstream, Input::Diff],
            Role::Doc => &[Input::Upstream, Input::Secondary],
            Role::TestDesigner | Role::Implementation | Role::Review | Role::Test => {
                &[Input::Upstream]
            }
        }
    }
}

/// Field text after budgeting. Unread fields stay empty.
#[derive(Debug, Default)]
struct Fields {
    diff: String,
    upstream: String,
    secondary: String,
}

fn render(role: Role, topic: Option<&str>, fields: &Fields) -> String {
    let Fields {
        diff,
        upstream,
        secondary,
    } = fields;
    match role {
        Role::Planner => format!(
            "Below is the unified diff of the pull request. Build the map of review topics.\n\
             ```diff\n{diff}\n```"
        ),
        Role::Reviewer => format!(
            "These are the Planner's topics:\n---\n{upstream}\n---\n\
             Using the same diff, output only JSON that follows the schema.\n\
             ```diff\n{diff}\n```"
        ),
        Role::TestDesigner => format!(
            "This is the Reviewer's output (expected to be JSON):\n---\n{upstream}\n---\n\
             Output only JSON that follows the schema."
        ),
        Role::Implementation => format!(
            "[Implementation Agent]\nTask: {}\nReferenced files:\n{upstream}\n\
             Request: approach, impact and a minimal patch outline (3-7 items).",
            topic.unwrap_or("(no topic)")
        ),
        Role::Review => format!(
            "[Review Agent]\nTarget: the implementation proposal\n\
             Criteria: correctness/security/performance/accessibility/consistency\n\
             Output: findings with severity and patch key points\n---\n{upstream}"
        ),
        Role::Test => format!(
            "[Test Agent]\nGoal: minimal regression tests (Vitest/RTL)\n\
             Output: 3-5 test items with pseudo-code fragments\n---\n{upstream}"
        ),
        Role::Doc => format!(
            "[Doc Agent]\nDescribe the change for users: setup, steps and caveats.\n---\n{upstream}\n{secondary}"
        ),
    }
}

/// Split `budget` bytes across fields of the given lengths. Fields that fit
/// their fair share keep their full length and pass the rest on to the
/// longer ones.
fn share_budget(lens: &[usize], budget: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..lens.len()).collect();
    order.sort_by_key(|&i| lens[i]);

    let mut shares = vec![0; lens.len()];
    let mut remaining = budget;
    for (taken, &i) in order.iter().enumerate() {
        let fair = remaining / (lens.len() - taken);
        shares[i] = lens[i].min(fair);
        remaining -= shares[i];
    }
    shares
}

/// Trim `text` to at most `limit` bytes, keeping the first 80 % and the last
/// 20 % of the window joined by [`ELISION_MARKER`].
///
/// The marker counts against the limit and cuts land on UTF-8 boundaries, so
/// the result never exceeds `limit` bytes.
pub fn trim(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let budget = limit.saturating_sub(ELISION_MARKER.len());
    if budget == 0 {
        return text[..floor_char_boundary(text, limit)].to_string();
    }

    let head_len = budget * 4 / 5;
    let tail_len = budget - head_len;
    let head_end = floor_char_boundary(text, head_len);
    let tail_start = ceil_char_boundary(text, text.len() - tail_len);

    format!("{}{ELISION_MARKER}{}", &text[..head_end], &text[tail_start..])
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(s: &str, mut index: usize) -> usize {
    while index < s.len() && !s.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(trim("hello", 10), "hello");
        assert_eq!(trim("hello", 5), "hello");
    }

    #[test]
    fn long_text_keeps_head_and_tail() {
        let text: String = (0..1000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let trimmed = trim(&text, 105);
        assert!(trimmed.len() <= 105);
        assert!(trimmed.contains(ELISION_MARKER));
        // 100 budget bytes: 80 head, 20 tail.
        assert!(trimmed.starts_with(&text[..80]));
        assert!(trimmed.ends_with(&text[text.len() - 20..]));
    }

    #[test]
    fn trim_respects_utf8_boundaries() {
        let text = "日本語のテキスト".repeat(100);
        let trimmed = trim(&text, 50);
        assert!(trimmed.len() <= 50);
        assert!(trimmed.contains(ELISION_MARKER));
    }

    #[test]
    fn tiny_limit_truncates_without_marker() {
        assert_eq!(trim("abcdefgh", 3), "abc");
    }

    #[test]
    fn role_config_keys() {
        assert_eq!(Role::Planner.to_string(), "planner");
        assert_eq!(Role::TestDesigner.to_string(), "test_designer");
        assert_eq!(Role::Implementation.to_string(), "implementation_agent");
        assert_eq!("doc_agent".parse::<Role>(), Ok(Role::Doc));
        assert!("unknown_agent".parse::<Role>().is_err());
    }

    #[test]
    fn planner_prompt_embeds_diff() {
        let prompt = PromptBuilder::default().build(Role::Planner, &StageContext::with_diff("+added"));
        assert_eq!(prompt.system, templates::PLANNER);
        assert!(prompt.user.contains("```diff\n+added\n```"));
    }

    #[test]
    fn reviewer_prompt_embeds_notes_and_diff() {
        let ctx = StageContext {
            diff: Some("+x"),
            upstream: Some("topic map"),
            ..StageContext::default()
        };
        let prompt = PromptBuilder::default().build(Role::Reviewer, &ctx);
        assert!(prompt.user.contains("topic map"));
        assert!(prompt.user.contains("+x"));
        assert!(prompt.system.contains("overall_severity"));
    }

    #[test]
    fn missing_fields_render_as_none() {
        let prompt = PromptBuilder::default().build(Role::TestDesigner, &StageContext::default());
        assert!(prompt.user.contains("(none)"));
    }

    #[test]
    fn builder_trims_interpolated_content() {
        let diff = "x".repeat(500);
        let prompt = PromptBuilder::new(300).build(Role::Planner, &StageContext::with_diff(&diff));
        assert!(prompt.user.len() <= 300);
        assert!(prompt.user.contains(ELISION_MARKER));
        assert!(!prompt.user.contains(&diff));
        assert!(prompt.user.ends_with("\n```"));
    }

    #[test]
    fn reviewer_prompt_stays_within_limit() {
        let diff = "d".repeat(5000);
        let notes = "p".repeat(5000);
        let ctx = StageContext {
            diff: Some(&diff),
            upstream: Some(&notes),
            ..StageContext::default()
        };
        let prompt = PromptBuilder::new(1000).build(Role::Reviewer, &ctx);
        assert!(prompt.user.len() <= 1000, "user is {} bytes", prompt.user.len());
        assert!(prompt.user.len() > 950);
        assert_eq!(prompt.user.matches(ELISION_MARKER).count(), 2);
        assert!(prompt.user.starts_with("These are the Planner's topics:\n---\nppp"));
        assert!(prompt.user.contains("```diff\nddd"));
        assert!(prompt.user.ends_with("ddd\n```"));
    }

    #[test]
    fn short_field_leaves_budget_to_long_one() {
        assert_eq!(share_budget(&[10, 5000], 1000), vec![10, 990]);
        assert_eq!(share_budget(&[5000, 5000], 1000), vec![500, 500]);
        assert_eq!(share_budget(&[4, 6], 1000), vec![4, 6]);
        assert_eq!(share_budget(&[], 1000), Vec::<usize>::new());
    }

    #[test]
    fn doc_prompt_reads_both_inputs() {
        let ctx = StageContext {
            upstream: Some("impl notes"),
            secondary: Some("test plan"),
            ..StageContext::default()
        };
        let prompt = PromptBuilder::default().build(Role::Doc, &ctx);
        assert!(prompt.user.contains("impl notes"));
        assert!(prompt.user.contains("test plan"));
    }
}
