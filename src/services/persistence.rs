//! 进度持久化服务 - 业务能力层
//!
//! 把整个会话（答题记录ID、位置、题目状态表、计时）按 用户+试卷 落盘，
//! 作为页面崩溃/刷新时的本地安全网。它不是服务端状态的替代品：
//! 显式恢复（服务端 resume）一旦成功，本地快照即被忽略。

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{Position, QuestionState};

/// 会话快照
///
/// 字段必须全部是确定性内容：同一状态连续两次快照要产生
/// 完全相同的负载（不含"落盘时刻"之类的易变字段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub attempt_id: String,
    pub user_id: String,
    pub test_id: String,
    pub position: Position,
    pub started: bool,
    pub start_time: DateTime<Utc>,
    /// 最后一次 tick 上报的剩余秒数（尽力而为；恢复时以服务端为准）
    pub remaining_secs: u64,
    /// 全量题目状态表，按题目顺序
    pub states: Vec<QuestionState>,
}

/// 快照存储
///
/// 写入带最小间隔防抖，避免每个事件都落盘
pub struct SnapshotStore {
    dir: PathBuf,
    min_interval: Duration,
    last_write: Option<Instant>,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>, min_interval: Duration) -> Self {
        Self {
            dir: dir.into(),
            min_interval,
            last_write: None,
        }
    }

    /// 快照文件路径，按 用户+试卷 作键
    fn file_path(&self, user_id: &str, test_id: &str) -> PathBuf {
        self.dir.join(format!("session_{}_{}.json", user_id, test_id))
    }

    /// 防抖写入，返回是否真正落盘
    ///
    /// 被节流丢弃的写入没有尾随补写：窗口内的变更要等下一个
    /// 状态事件（通常是 1 秒后的心跳）才会进磁盘
    pub fn save(&mut self, snapshot: &SessionSnapshot) -> AppResult<bool> {
        if let Some(last) = self.last_write {
            if last.elapsed() < self.min_interval {
                return Ok(false);
            }
        }
        self.save_forced(snapshot)?;
        Ok(true)
    }

    /// 绕过防抖立即落盘（关键事件：开考、切区、提交前）
    pub fn save_forced(&mut self, snapshot: &SessionSnapshot) -> AppResult<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| AppError::snapshot_write_failed(self.dir.display().to_string(), e))?;

        let path = self.file_path(&snapshot.user_id, &snapshot.test_id);
        let payload = serde_json::to_vec_pretty(snapshot)?;

        // 先写临时文件再改名，避免崩溃留下半截快照
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &payload)
            .map_err(|e| AppError::snapshot_write_failed(tmp.display().to_string(), e))?;
        fs::rename(&tmp, &path)
            .map_err(|e| AppError::snapshot_write_failed(path.display().to_string(), e))?;

        self.last_write = Some(Instant::now());
        debug!("💾 会话快照已落盘: {}", path.display());
        Ok(())
    }

    /// 读取快照，不存在时返回 None
    pub fn load(&self, user_id: &str, test_id: &str) -> AppResult<Option<SessionSnapshot>> {
        let path = self.file_path(user_id, test_id);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| read_failed(&path, e))?;
        let snapshot = serde_json::from_str(&content)
            .map_err(|e| AppError::corrupt_snapshot(path.display().to_string(), e))?;
        Ok(Some(snapshot))
    }

    /// 删除快照（提交完成后调用）
    pub fn clear(&self, user_id: &str, test_id: &str) -> AppResult<()> {
        let path = self.file_path(user_id, test_id);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                AppError::Storage(crate::error::StorageError::DeleteFailed {
                    path: path.display().to_string(),
                    source: Box::new(e),
                })
            })?;
            debug!("🗑️ 会话快照已删除: {}", path.display());
        }
        Ok(())
    }
}

fn read_failed(path: &Path, e: std::io::Error) -> AppError {
    AppError::Storage(crate::error::StorageError::ReadFailed {
        path: path.display().to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionStatus;
    use chrono::TimeZone;

    fn temp_store() -> SnapshotStore {
        let dir = std::env::temp_dir().join(format!(
            "take_test_snapshots_{}_{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        // 防抖间隔设为 0，测试里每次 save 都真正落盘
        SnapshotStore::new(dir, Duration::ZERO)
    }

    fn sample_snapshot() -> SessionSnapshot {
        let mut q1 = QuestionState::new("q1", "物理");
        q1.status = QuestionStatus::Attempted;
        q1.selected_ids = vec!["A".to_string()];
        let mut q2 = QuestionState::new("q2", "物理");
        q2.status = QuestionStatus::Current;

        SessionSnapshot {
            attempt_id: "a1".to_string(),
            user_id: "u1".to_string(),
            test_id: "t1".to_string(),
            position: Position::new(0, 1),
            started: true,
            start_time: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            remaining_secs: 3540,
            states: vec![q1, q2],
        }
    }

    #[test]
    fn snapshot_twice_is_byte_identical() {
        let mut store = temp_store();
        let snapshot = sample_snapshot();

        store.save_forced(&snapshot).unwrap();
        let first = fs::read(store.file_path("u1", "t1")).unwrap();

        store.save_forced(&snapshot).unwrap();
        let second = fs::read(store.file_path("u1", "t1")).unwrap();

        assert_eq!(first, second);
        store.clear("u1", "t1").unwrap();
    }

    #[test]
    fn restore_reproduces_the_state_exactly() {
        let mut store = temp_store();
        let snapshot = sample_snapshot();

        store.save_forced(&snapshot).unwrap();
        let restored = store.load("u1", "t1").unwrap().expect("快照应存在");

        assert_eq!(restored, snapshot);
        store.clear("u1", "t1").unwrap();
    }

    #[test]
    fn clear_removes_the_snapshot() {
        let mut store = temp_store();
        store.save_forced(&sample_snapshot()).unwrap();

        store.clear("u1", "t1").unwrap();
        assert!(store.load("u1", "t1").unwrap().is_none());
        // 再次删除不报错
        store.clear("u1", "t1").unwrap();
    }

    #[test]
    fn debounce_skips_rapid_writes() {
        let dir = std::env::temp_dir().join(format!(
            "take_test_snapshots_debounce_{}",
            std::process::id()
        ));
        let mut store = SnapshotStore::new(dir, Duration::from_secs(60));
        let snapshot = sample_snapshot();

        assert!(store.save(&snapshot).unwrap());
        assert!(!store.save(&snapshot).unwrap());
        store.clear("u1", "t1").unwrap();
    }
}
