//! Prompt construction for the knowledge merge.
//!
//! [`PromptBuilder::build`] is a pure function of its inputs plus the
//! processing date it was created with: the same guidelines, knowledge base,
//! message and date always produce byte-identical text. Guidelines and
//! message content are embedded verbatim, never truncated.

use chrono::NaiveDate;

use crate::knowledge::table::{self, DATE_FORMAT, HEADER_ROW, SEPARATOR_ROW};
use crate::knowledge::{KnowledgeBase, SlackMessage};

/// System role sent alongside every knowledge-merge prompt.
pub const SYSTEM_PROMPT: &str =
    "You are a precise knowledge management assistant. Follow instructions exactly.";

/// Builds the single instruction payload sent to the LLM.
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder {
    today: NaiveDate,
}

impl PromptBuilder {
    /// `today` is the date the LLM stamps on facts it adds, changes or confirms.
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn build(
        &self,
        guidelines: &str,
        knowledge_base: &KnowledgeBase,
        message: &SlackMessage,
    ) -> String {
        let today = self.today.format(DATE_FORMAT);
        let channel = message.channel.as_deref().unwrap_or("Unknown");
        let user = message.user.as_deref().unwrap_or("Unknown");

        format!(
            "\
You maintain a fact-based knowledge base. Merge the new information from the \
message below into the current knowledge base, following the guidelines.

## CURRENT KNOWLEDGE BASE

{current}

## NEW MESSAGE

Channel: {channel}
User: {user}
Message:
{content}

## GUIDELINES

{guidelines}

## TASK

1. Update existing facts where the message carries newer data.
2. Add new facts for information the knowledge base does not cover yet.
3. Set the validation date to {today} on every fact you add, change or confirm.
4. Keep existing fact numbers. Never renumber; gaps left by removed facts stay.
   Give new facts numbers above the current highest number.
5. Return one row per fact number.

## OUTPUT FORMAT

Reply with the COMPLETE updated knowledge base, not only the changes, as a \
markdown heading followed by a table in exactly this layout:

# {title}

{header}
{separator}
| **1** | [fact description] | [YYYY-MM-DD] |

Do not add explanations or any text outside the heading and the table.",
            current = table::render_markdown(knowledge_base),
            content = message.content,
            title = knowledge_base.title,
            header = HEADER_ROW,
            separator = SEPARATOR_ROW,
        )
    }
}
