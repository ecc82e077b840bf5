//! 问诊全流程集成测试

use std::sync::Arc;

use aidoc::config::AppConfig;
use aidoc::history::{today_label, DayBucket, FileHistoryStore, Message};
use aidoc::orchestrator::MockOrchestrator;
use aidoc::DoctorService;

fn config_for(dir: &std::path::Path) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.storage.data_dir = dir.to_path_buf();
    cfg.orchestrator.poll_interval_ms = 1;
    cfg.orchestrator.max_poll_attempts = 20;
    cfg
}

#[tokio::test]
async fn full_flow_with_pending_polls() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config_for(tmp.path());
    let orch = Arc::new(MockOrchestrator::pending_then_replying(
        2,
        "Monitor your temperature and rest.",
    ));
    let service = DoctorService::new(&cfg, orch);

    let user = service.users().create("Integration Patient").unwrap();
    let reply = service.ask(&user.id, "I have a fever").await.unwrap();
    assert_eq!(reply, "Monitor your temperature and rest.");

    let doc = FileHistoryStore::new(tmp.path())
        .load_or_create(&user.id)
        .unwrap();
    assert_eq!(doc.days.len(), 1);
    assert_eq!(doc.days[0].messages.len(), 2);
    assert_eq!(doc.version, 1);
}

#[tokio::test]
async fn seeded_week_rotates_on_new_day() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config_for(tmp.path());
    let orch = Arc::new(MockOrchestrator::replying("ok"));
    let service = DoctorService::new(&cfg, orch);

    let user = service.users().create("Long Term Patient").unwrap();

    // 预置 7 个历史日桶（都早于今天）
    let store = FileHistoryStore::new(tmp.path());
    let mut doc = store.load_or_create(&user.id).unwrap();
    for i in 1..=7 {
        let mut bucket = DayBucket::new(format!("2020-01-{:02}", i));
        bucket.messages.push(Message::user(format!("old q{}", i)));
        doc.days.push(bucket);
    }
    store.save_if_version(&user.id, &mut doc).unwrap();

    service.ask(&user.id, "today's question").await.unwrap();

    let doc = store.load_or_create(&user.id).unwrap();
    assert_eq!(doc.days.len(), 7);
    // 最旧一桶被淘汰，今天的桶在末尾
    assert_eq!(doc.days[0].label, "2020-01-02");
    assert_eq!(doc.days[6].label, today_label());
    assert_eq!(doc.days[6].messages.len(), 2);
}

#[tokio::test]
async fn conversation_accumulates_into_transcript() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config_for(tmp.path());
    let orch = Arc::new(MockOrchestrator::replying("noted"));
    let service = DoctorService::new(&cfg, orch);

    let user = service.users().create("Chatty Patient").unwrap();
    for q in ["first", "second", "third"] {
        service.ask(&user.id, q).await.unwrap();
    }

    let doc = FileHistoryStore::new(tmp.path())
        .load_or_create(&user.id)
        .unwrap();
    assert_eq!(doc.message_count(), 6);
    // 每次请求各保存一次
    assert_eq!(doc.version, 3);

    let transcript = aidoc::history::compile_transcript(&doc, 0);
    assert!(transcript.starts_with("User: first\nAI: noted"));
    assert!(transcript.ends_with("AI:"));
}
