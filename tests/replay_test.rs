mod helpers;

use std::sync::Arc;

use factkeeper::config::SourceConfig;
use factkeeper::knowledge::{parse_knowledge_base, render_markdown, Fact, KnowledgeBase};
use factkeeper::llm::replay::ReplayClient;
use factkeeper::llm::GenerateOptions;
use factkeeper::pipeline::KnowledgeProcessor;
use factkeeper::source::create_source;
use helpers::{date, gapped_kb, today};
use tempfile::TempDir;

fn write_inputs(dir: &TempDir) -> SourceConfig {
    let guidelines = dir.path().join("guidelines.md");
    let kb = dir.path().join("facts.md");
    let message = dir.path().join("message.txt");
    std::fs::write(&guidelines, "Only keep verified numbers.").unwrap();
    std::fs::write(&kb, render_markdown(&gapped_kb())).unwrap();
    std::fs::write(&message, "Coverage is now 63.1%.").unwrap();

    SourceConfig {
        kind: "files".into(),
        guidelines_path: guidelines.to_string_lossy().into_owned(),
        knowledge_base_path: kb.to_string_lossy().into_owned(),
        message_path: message.to_string_lossy().into_owned(),
        message_channel: Some("#atlas-updates".into()),
        message_user: None,
    }
}

#[test]
fn rendered_table_parses_back_to_the_same_knowledge_base() {
    let kb = gapped_kb();
    let parsed = parse_knowledge_base(&render_markdown(&kb), "fallback").unwrap();
    assert_eq!(parsed.knowledge_base, kb);
    assert!(parsed.warnings.is_empty());
}

#[test]
fn descriptions_with_markup_survive_the_round_trip() {
    let kb = KnowledgeBase::new(
        "Edge cases",
        vec![
            Fact::new(1, "*Estimated* ARR is $8.5M*", date("2025-06-11")),
            Fact::new(2, "Status: **green**", date("2025-06-11")),
            Fact::new(3, "_draft_", date("2025-06-11")),
            Fact::new(4, "Line one<br>still line one", date("2025-06-11")),
            Fact::new(5, "Owner | backup\nsecond line", date("2025-06-11")),
            Fact::new(6, "`config.toml` holds \\ paths", date("2025-06-11")),
        ],
    );
    let parsed = parse_knowledge_base(&render_markdown(&kb), "fallback").unwrap();
    assert!(parsed.warnings.is_empty());
    assert_eq!(parsed.knowledge_base, kb);
}

#[tokio::test]
async fn files_and_saved_reply_run_end_to_end() {
    let tmp = TempDir::new().unwrap();
    let source = create_source(&write_inputs(&tmp)).unwrap();
    let input = source.load().unwrap();
    assert_eq!(input.knowledge_base, gapped_kb());
    assert_eq!(input.message.channel.as_deref(), Some("#atlas-updates"));

    let mut updated = gapped_kb();
    updated.facts[3].description = "Restaurant coverage is 63.1%.".into();
    updated.facts[3].last_validated = today();
    let reply_path = tmp.path().join("reply.md");
    std::fs::write(
        &reply_path,
        format!("Sure, here you go:\n\n{}\n", render_markdown(&updated)),
    )
    .unwrap();

    let processor = KnowledgeProcessor::new(
        Arc::new(ReplayClient::new(&reply_path)),
        GenerateOptions::probe("replay"),
    )
    .with_today(today());
    let result = processor
        .process(&input.guidelines, &input.knowledge_base, &input.message)
        .await;

    assert!(result.success, "log:\n{}", result.log.summary());
    assert_eq!(result.updated_knowledge_base, updated);
    assert_eq!(result.changes.updated.len(), 1);
    assert_eq!(result.changes.updated[0].number, 7);
}

#[tokio::test]
async fn missing_reply_file_is_reported_as_unavailable() {
    let tmp = TempDir::new().unwrap();
    let processor = KnowledgeProcessor::new(
        Arc::new(ReplayClient::new(tmp.path().join("absent.md"))),
        GenerateOptions::probe("replay"),
    );
    let kb = gapped_kb();
    let result = processor
        .process("g", &kb, &factkeeper::knowledge::SlackMessage::new("m"))
        .await;

    assert!(!result.success);
    assert_eq!(result.error.unwrap().kind, "LLMUnavailable");
    assert_eq!(result.updated_knowledge_base, kb);
}
