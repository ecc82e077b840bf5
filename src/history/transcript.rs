//! 转写：将分桶历史线性化为单段 prompt 文本
//!
//! 按桶序（最旧在前）与桶内插入顺序渲染为 "User: ..." / "AI: ..." 行，
//! 末尾追加 "AI:" 引导外部模型续写。max_messages 限制只取最近若干条，
//! 防止单日多轮对话把 prompt 撑到无界（0 表示不限）。

use crate::history::{HistoryDocument, Role};

/// 编译转写文本
pub fn compile_transcript(doc: &HistoryDocument, max_messages: usize) -> String {
    let all: Vec<&crate::history::Message> =
        doc.days.iter().flat_map(|d| d.messages.iter()).collect();

    let start = if max_messages > 0 && all.len() > max_messages {
        all.len() - max_messages
    } else {
        0
    };

    let mut lines: Vec<String> = all[start..]
        .iter()
        .map(|m| match m.role {
            Role::User => format!("User: {}", m.content),
            Role::Ai => format!("AI: {}", m.content),
        })
        .collect();
    lines.push("AI:".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{DayBucket, HistoryDocument, Message};

    #[test]
    fn single_message_renders_exactly() {
        let doc = HistoryDocument {
            version: 0,
            days: vec![DayBucket {
                label: "2024-01-01".to_string(),
                messages: vec![Message::user("hi")],
            }],
        };
        assert_eq!(compile_transcript(&doc, 0), "User: hi\nAI:");
    }

    #[test]
    fn multi_bucket_preserves_order() {
        let doc = HistoryDocument {
            version: 0,
            days: vec![
                DayBucket {
                    label: "2024-01-01".to_string(),
                    messages: vec![Message::user("q1"), Message::ai("a1")],
                },
                DayBucket {
                    label: "2024-01-02".to_string(),
                    messages: vec![Message::user("q2"), Message::ai("a2")],
                },
            ],
        };
        assert_eq!(
            compile_transcript(&doc, 0),
            "User: q1\nAI: a1\nUser: q2\nAI: a2\nAI:"
        );
    }

    #[test]
    fn empty_history_is_bare_sentinel() {
        let doc = HistoryDocument::default();
        assert_eq!(compile_transcript(&doc, 0), "AI:");
    }

    #[test]
    fn cap_drops_oldest_first() {
        let doc = HistoryDocument {
            version: 0,
            days: vec![DayBucket {
                label: "2024-01-01".to_string(),
                messages: vec![
                    Message::user("q1"),
                    Message::ai("a1"),
                    Message::user("q2"),
                    Message::ai("a2"),
                ],
            }],
        };
        assert_eq!(compile_transcript(&doc, 2), "User: q2\nAI: a2\nAI:");
        // 上限大于总数时不截断
        assert_eq!(
            compile_transcript(&doc, 100),
            "User: q1\nAI: a1\nUser: q2\nAI: a2\nAI:"
        );
    }
}
