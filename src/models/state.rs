use serde::{Deserialize, Serialize};

/// 题目在导航面板上的着色状态
///
/// 开考后全卷有且只有一道题处于 Current
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionStatus {
    NotVisited,
    Current,
    Attempted,
    MarkedForReview,
}

/// 单道题目的作答状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionState {
    pub question_id: String,
    /// 所属区域名
    pub section: String,
    pub status: QuestionStatus,
    /// 已选选项ID（有序去重）
    pub selected_ids: Vec<String>,
    /// 显式"标记待复查"后保持粘性，直到再次切换
    #[serde(default)]
    pub marked: bool,
}

impl QuestionState {
    pub fn new(question_id: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            section: section.into(),
            status: QuestionStatus::NotVisited,
            selected_ids: Vec::new(),
            marked: false,
        }
    }

    /// 离开 Current 时的归类规则：
    /// 标记待复查 > 有选择则已作答 > 否则回到未访问
    pub fn settled_status(&self) -> QuestionStatus {
        if self.marked {
            QuestionStatus::MarkedForReview
        } else if !self.selected_ids.is_empty() {
            QuestionStatus::Attempted
        } else {
            QuestionStatus::NotVisited
        }
    }
}

/// 当前作答位置（区域索引 + 区域内题目索引）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub section_index: usize,
    pub question_index: usize,
}

impl Position {
    pub fn new(section_index: usize, question_index: usize) -> Self {
        Self {
            section_index,
            question_index,
        }
    }
}
