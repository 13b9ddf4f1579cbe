use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::QuestionStatus;

/// 一次答题记录（服务端行）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub attempt_id: String,
    pub user_id: String,
    pub test_id: String,
    pub start_time: DateTime<Utc>,
    /// 切屏计数（服务端累计）
    #[serde(default)]
    pub tab_switches: u32,
    /// 服务端记录的"正在作答"题目ID，恢复时用来定位
    #[serde(default)]
    pub current_question_id: Option<String>,
}

/// 恢复接口返回的权威数据
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeData {
    pub attempt: Attempt,
    /// 之前已作答题目的答案与状态
    #[serde(default)]
    pub answers: Vec<ResumedAnswer>,
    pub remaining_secs: u64,
}

/// 恢复数据中的单条已作答记录
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumedAnswer {
    pub question_id: String,
    pub section: String,
    #[serde(default)]
    pub selected_ids: Vec<String>,
    pub status: QuestionStatus,
}

/// 保存/标记答案的请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnswerRequest {
    pub attempt_id: String,
    pub user_id: String,
    pub section: String,
    pub question_id: String,
    pub selected_ids: Vec<String>,
    pub status: QuestionStatus,
    /// 本题累计作答秒数（切题时归零）
    pub elapsed_secs: u64,
}
