use serde::{Deserialize, Serialize};

/// 考试成绩
///
/// 服务端在提交时产出的才是权威成绩；本地算出的同构数据
/// 只用于交卷确认弹窗的即时预览，服务端结果一到就丢弃
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultData {
    pub attempt_id: String,
    pub score: f64,
    pub max_marks: f64,
    pub correct: u32,
    pub wrong: u32,
    pub unattempted: u32,
    pub duration_secs: u64,
    /// 分区明细（可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<SectionResult>>,
}

/// 单个区域的成绩明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionResult {
    pub name: String,
    pub score: f64,
    pub max_marks: f64,
    pub correct: u32,
    pub wrong: u32,
    pub unattempted: u32,
}
