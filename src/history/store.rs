//! 历史文档存取：每用户一个 JSON 文件 + 版本号条件保存
//!
//! 文件名即内部用户 id，等价于用户记录到历史文档的外链。保存走
//! compare-and-swap：磁盘版本与加载时版本不一致即拒绝，由上层重载重试，
//! 避免并发请求互相覆盖对方新增的消息（丢失更新）。

use std::path::{Path, PathBuf};

use crate::error::{DoctorError, DoctorResult};
use crate::history::HistoryDocument;

/// 基于文件的历史文档存储
#[derive(Clone, Debug)]
pub struct FileHistoryStore {
    dir: PathBuf,
}

impl FileHistoryStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().join("history"),
        }
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        let safe_id: String = user_id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe_id))
    }

    /// 加载用户的历史文档；不存在时返回空文档（version 0），首次保存即落盘
    pub fn load_or_create(&self, user_id: &str) -> DoctorResult<HistoryDocument> {
        let path = self.path_for(user_id);
        if !path.exists() {
            return Ok(HistoryDocument::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let doc: HistoryDocument = serde_json::from_str(&data)?;
        Ok(doc)
    }

    /// 条件保存：磁盘版本必须仍等于 doc 加载时的版本，否则报 ConcurrentModification
    ///
    /// 成功时递增版本并整体写回。一次请求周期内只在最后调用一次
    /// （用户消息与 AI 回复都追加之后）。
    pub fn save_if_version(&self, user_id: &str, doc: &mut HistoryDocument) -> DoctorResult<()> {
        let path = self.path_for(user_id);

        let disk_version = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            let on_disk: HistoryDocument = serde_json::from_str(&data)?;
            on_disk.version
        } else {
            0
        };
        if disk_version != doc.version {
            return Err(DoctorError::ConcurrentModification);
        }

        doc.version += 1;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, serde_json::to_string_pretty(doc)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Message;

    #[test]
    fn missing_document_loads_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(tmp.path());
        let doc = store.load_or_create("u1").unwrap();
        assert_eq!(doc.version, 0);
        assert!(doc.days.is_empty());
    }

    #[test]
    fn save_then_load_round_trips_and_bumps_version() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(tmp.path());

        let mut doc = store.load_or_create("u1").unwrap();
        doc.bucket_for("2024-01-01", 7)
            .messages
            .push(Message::user("hi"));
        store.save_if_version("u1", &mut doc).unwrap();
        assert_eq!(doc.version, 1);

        let loaded = store.load_or_create("u1").unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.days.len(), 1);
        assert_eq!(loaded.days[0].messages[0].content, "hi");
    }

    #[test]
    fn stale_version_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(tmp.path());

        // 两个并发请求加载同一版本
        let mut first = store.load_or_create("u1").unwrap();
        let mut second = store.load_or_create("u1").unwrap();

        first
            .bucket_for("2024-01-01", 7)
            .messages
            .push(Message::user("from first"));
        store.save_if_version("u1", &mut first).unwrap();

        second
            .bucket_for("2024-01-01", 7)
            .messages
            .push(Message::user("from second"));
        let err = store.save_if_version("u1", &mut second).unwrap_err();
        assert!(matches!(err, DoctorError::ConcurrentModification));

        // 重载后重试成功，且第一份的数据仍在
        let mut reloaded = store.load_or_create("u1").unwrap();
        reloaded
            .bucket_for("2024-01-01", 7)
            .messages
            .push(Message::user("from second"));
        store.save_if_version("u1", &mut reloaded).unwrap();
        let final_doc = store.load_or_create("u1").unwrap();
        assert_eq!(final_doc.days[0].messages.len(), 2);
    }
}
