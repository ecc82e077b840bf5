//! 用户记录存储
//!
//! 单文件 JSON（users.json），id -> UserRecord。只承载核心需要的协作面：
//! 按 id 查找、创建、保存（外部身份映射落在记录上）。认证、会话等不在本服务范围。

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DoctorResult;

/// 用户记录
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    /// 编排服务侧的患者身份 id；首次问诊时创建并持久化，之后复用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_patient_id: Option<String>,
    pub created_at: String,
}

/// 基于单文件 JSON 的用户存储
#[derive(Clone, Debug)]
pub struct FileUserStore {
    path: PathBuf,
}

impl FileUserStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("users.json"),
        }
    }

    fn load_all(&self) -> DoctorResult<HashMap<String, UserRecord>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let data = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn save_all(&self, users: &HashMap<String, UserRecord>) -> DoctorResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(users)?)?;
        Ok(())
    }

    /// 按 id 查找用户；未注册返回 None
    pub fn find(&self, user_id: &str) -> DoctorResult<Option<UserRecord>> {
        Ok(self.load_all()?.remove(user_id))
    }

    /// 创建用户并落盘，id 为 uuid v4
    pub fn create(&self, name: &str) -> DoctorResult<UserRecord> {
        let record = UserRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            external_patient_id: None,
            created_at: chrono::Local::now().to_rfc3339(),
        };
        let mut users = self.load_all()?;
        users.insert(record.id.clone(), record.clone());
        self.save_all(&users)?;
        Ok(record)
    }

    /// 覆盖保存单条记录（如写入外部身份映射）
    pub fn save(&self, record: &UserRecord) -> DoctorResult<()> {
        let mut users = self.load_all()?;
        users.insert(record.id.clone(), record.clone());
        self.save_all(&users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_find() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileUserStore::new(tmp.path());

        let created = store.create("Zhang San").unwrap();
        let found = store.find(&created.id).unwrap().unwrap();
        assert_eq!(found.name, "Zhang San");
        assert!(found.external_patient_id.is_none());
    }

    #[test]
    fn unknown_id_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileUserStore::new(tmp.path());
        assert!(store.find("nope").unwrap().is_none());
    }

    #[test]
    fn save_persists_external_identity() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileUserStore::new(tmp.path());

        let mut user = store.create("Li Si").unwrap();
        user.external_patient_id = Some("ext-42".to_string());
        store.save(&user).unwrap();

        let found = store.find(&user.id).unwrap().unwrap();
        assert_eq!(found.external_patient_id.as_deref(), Some("ext-42"));
    }
}
