use serde::{Deserialize, Serialize};

/// 选项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: String,
    pub text: String,

    /// 正确答案标记
    ///
    /// 服务端通常不会在考前下发（防止泄题），此时本地只能放弃预估分。
    /// 该字段永远不会被序列化回传。
    #[serde(rename = "isCorrect", default, skip_serializing)]
    pub is_correct: Option<bool>,
}

/// 题目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub stem: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imgs: Option<Vec<String>>,

    #[serde(rename = "isMultipleAnswer", default)]
    pub is_multiple_answer: bool,

    #[serde(rename = "isSubjective", default)]
    pub is_subjective: bool,

    /// 主观题没有选项
    #[serde(default)]
    pub options: Option<Vec<ChoiceOption>>,
}

impl Question {
    /// 本地预估分需要的答案键是否齐全
    pub fn has_answer_key(&self) -> bool {
        match &self.options {
            Some(options) => options.iter().all(|o| o.is_correct.is_some()),
            None => false,
        }
    }

    /// 标记为正确的选项ID集合
    pub fn correct_option_ids(&self) -> Vec<String> {
        self.options
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|o| o.is_correct == Some(true))
            .map(|o| o.id.clone())
            .collect()
    }
}

/// 试卷区域
///
/// 开考后不可变，题库接口只拉取一次
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub questions: Vec<Question>,

    #[serde(rename = "pointsForCorrect")]
    pub points_for_correct: f64,

    /// 未开启倒扣分时为 0
    #[serde(rename = "negativeMarks", default)]
    pub negative_marks: f64,

    #[serde(rename = "durationMinutes")]
    pub duration_minutes: u64,
}

impl Section {
    pub fn duration_secs(&self) -> u64 {
        self.duration_minutes * 60
    }
}

/// 试卷元信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestMeta {
    pub name: String,

    /// true = 收集模式（全卷一个倒计时，区域之间自由切换）
    /// false = 顺序模式（每区独立倒计时，确认后单向推进）
    #[serde(rename = "sectionSwitchingAllowed")]
    pub section_switching_allowed: bool,
}

/// 全卷题目总数
pub fn total_questions(sections: &[Section]) -> usize {
    sections.iter().map(|s| s.questions.len()).sum()
}
