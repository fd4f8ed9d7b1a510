//! Built-in sample inputs: a project fact sheet with gapped numbering, a weekly
//! metrics message and the operator guidelines.

use chrono::NaiveDate;

use super::{InputSource, ProcessingInput};
use crate::knowledge::{Fact, KnowledgeBase, SlackMessage};

const GUIDELINES: &str = include_str!("guidelines.md");

const MESSAGE: &str = "\
Here's this week's Atlas update:
- 11,156 offers live (last: 11,287)
- Restaurant coverage: 62.0% (last: 62.7%)
- Card capture rate: 53.8% (last: 54.1%)
- ARR: $8.7M (last: $8.5M)

Additional context: some restaurants opted out temporarily over the holidays; \
we expect them back in the new year.";

const FACTS: &[(u32, &str, &str)] = &[
    (1, "Rewards Network (RN) is a network of ~18,000 local restaurants whose receipts earn a %-back reward and are ingested as regular offers.", "2025-04-15"),
    (2, "RN integration has ~11,287 live offers (scaled from an initial 140); location matching and card capture issues limited the rollout from the planned 14,400.", "2025-06-11"),
    (6, "Key results target $10.6M ARR by EOQ2 2025 and $11.6M revenue in FY25. ARR is $8.5M.", "2025-06-11"),
    (7, "Target is 90% of restaurants in-app by end of year. Coverage is 62.7%.", "2025-06-11"),
    (8, "Card-info capture goals are 65% of receipts in H1 and 80% in H2. Capture rate is 54.1%.", "2025-06-11"),
    (22, "Payment capture tooling code is complete but not yet released.", "2025-06-11"),
    (31, "Payment capture has two components: a rescan prompt (backend in review, mobile complete) and manual card input with cross-referencing validation (postponed).", "2025-06-11"),
    (51, "RN restaurant coverage is 62.7% with 11,287 active offers out of 18,000 restaurants in the network.", "2025-06-11"),
    (55, "Payment capture was approved in March 2025 after a stakeholder presentation covering feature-risk concerns.", "2025-06-11"),
    (57, "RN deactivates and activates offers daily based on restaurant participation. Offer reactivation is not implemented.", "2025-06-11"),
];

/// Serves the built-in sample data.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureSource;

impl FixtureSource {
    pub fn guidelines() -> &'static str {
        GUIDELINES
    }

    pub fn knowledge_base() -> KnowledgeBase {
        let facts = FACTS
            .iter()
            .filter_map(|(number, description, date)| {
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
                Some(Fact::new(*number, *description, date))
            })
            .collect();
        KnowledgeBase::new("Current RN Project Facts", facts)
    }

    pub fn message() -> SlackMessage {
        SlackMessage::new(MESSAGE)
            .with_channel("#atlas-updates")
            .with_user("project-manager")
    }
}

impl InputSource for FixtureSource {
    fn name(&self) -> &str {
        "fixture"
    }

    fn load(&self) -> anyhow::Result<ProcessingInput> {
        Ok(ProcessingInput {
            guidelines: Self::guidelines().to_string(),
            knowledge_base: Self::knowledge_base(),
            message: Self::message(),
        })
    }
}
