//! 本地预估评分 - 业务能力层
//!
//! 镜像服务端的评分规则，用于交卷确认弹窗的即时预览。
//! 服务端提交返回的成绩才是唯一真实结果，到达后立即取代本地值。
//!
//! 规则：选中集合与正确选项ID集合严格相等（同样大小、同样成员）记正确；
//! 其他非空选择记错误；空选择记未作答。
//! 区域得分 = 正确数 × 每题分值 − 错误数 × 倒扣分值。

use std::collections::{BTreeSet, HashMap};

use crate::models::{QuestionState, ResultData, Section, SectionResult};

/// 本地预估评分
///
/// # 参数
/// - `attempt_id`: 答题记录ID
/// - `sections`: 全卷区域
/// - `states`: 题目状态表（以题目ID为键）
/// - `duration_secs`: 已用时（秒）
///
/// # 返回
/// 任何一道客观题缺少答案键时返回 `None`（服务端未下发 isCorrect，
/// 本地放弃预估）；否则返回与服务端同构的预估成绩
pub fn score_locally(
    attempt_id: &str,
    sections: &[Section],
    states: &HashMap<String, QuestionState>,
    duration_secs: u64,
) -> Option<ResultData> {
    let mut section_results = Vec::with_capacity(sections.len());
    let mut total_score = 0.0;
    let mut total_max = 0.0;
    let mut total_correct = 0u32;
    let mut total_wrong = 0u32;
    let mut total_unattempted = 0u32;

    for section in sections {
        let mut correct = 0u32;
        let mut wrong = 0u32;
        let mut unattempted = 0u32;

        for question in &section.questions {
            let selected: BTreeSet<&str> = states
                .get(&question.id)
                .map(|s| s.selected_ids.iter().map(String::as_str).collect())
                .unwrap_or_default();

            // 主观题本地不评分，预估里按未作答处理
            if question.is_subjective {
                unattempted += 1;
                continue;
            }

            if !question.has_answer_key() {
                return None;
            }

            if selected.is_empty() {
                unattempted += 1;
                continue;
            }

            let correct_ids = question.correct_option_ids();
            let correct_set: BTreeSet<&str> = correct_ids.iter().map(String::as_str).collect();

            if selected == correct_set {
                correct += 1;
            } else {
                wrong += 1;
            }
        }

        let score = correct as f64 * section.points_for_correct
            - wrong as f64 * section.negative_marks;
        let max_marks = section.questions.len() as f64 * section.points_for_correct;

        total_score += score;
        total_max += max_marks;
        total_correct += correct;
        total_wrong += wrong;
        total_unattempted += unattempted;

        section_results.push(SectionResult {
            name: section.name.clone(),
            score,
            max_marks,
            correct,
            wrong,
            unattempted,
        });
    }

    Some(ResultData {
        attempt_id: attempt_id.to_string(),
        score: total_score,
        max_marks: total_max,
        correct: total_correct,
        wrong: total_wrong,
        unattempted: total_unattempted,
        duration_secs,
        sections: Some(section_results),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChoiceOption, Question, QuestionStatus};

    fn option(id: &str, correct: bool) -> ChoiceOption {
        ChoiceOption {
            id: id.to_string(),
            text: format!("选项{}", id),
            is_correct: Some(correct),
        }
    }

    fn question(id: &str, correct_ids: &[&str]) -> Question {
        Question {
            id: id.to_string(),
            stem: format!("题目{}", id),
            imgs: None,
            is_multiple_answer: correct_ids.len() > 1,
            is_subjective: false,
            options: Some(
                ["A", "B", "C", "D"]
                    .iter()
                    .map(|o| option(o, correct_ids.contains(o)))
                    .collect(),
            ),
        }
    }

    fn answered(id: &str, section: &str, selected: &[&str]) -> QuestionState {
        let mut state = QuestionState::new(id, section);
        state.status = QuestionStatus::Attempted;
        state.selected_ids = selected.iter().map(|s| s.to_string()).collect();
        state
    }

    #[test]
    fn one_correct_one_wrong_with_negative_marking() {
        // 2 题、每题 4 分、倒扣 1 分，作答 [对, 错] => 4 - 1 = 3
        let section = Section {
            name: "物理".to_string(),
            questions: vec![question("q1", &["A"]), question("q2", &["B"])],
            points_for_correct: 4.0,
            negative_marks: 1.0,
            duration_minutes: 30,
        };

        let mut states = HashMap::new();
        states.insert("q1".to_string(), answered("q1", "物理", &["A"]));
        states.insert("q2".to_string(), answered("q2", "物理", &["C"]));

        let result = score_locally("a1", &[section], &states, 100).unwrap();
        assert_eq!(result.score, 3.0);
        assert_eq!(result.correct, 1);
        assert_eq!(result.wrong, 1);
        assert_eq!(result.unattempted, 0);
        assert_eq!(result.max_marks, 8.0);
    }

    #[test]
    fn multi_select_requires_exact_set_equality() {
        let section = Section {
            name: "化学".to_string(),
            questions: vec![question("q1", &["A", "C"])],
            points_for_correct: 2.0,
            negative_marks: 0.0,
            duration_minutes: 10,
        };

        // 只选了部分正确项：算错误，不算部分分
        let mut states = HashMap::new();
        states.insert("q1".to_string(), answered("q1", "化学", &["A"]));
        let partial = score_locally("a1", &[section.clone()], &states, 10).unwrap();
        assert_eq!(partial.wrong, 1);

        // 选择顺序无关，集合相等即正确
        states.insert("q1".to_string(), answered("q1", "化学", &["C", "A"]));
        let exact = score_locally("a1", &[section], &states, 10).unwrap();
        assert_eq!(exact.correct, 1);
        assert_eq!(exact.score, 2.0);
    }

    #[test]
    fn empty_selection_counts_as_unattempted() {
        let section = Section {
            name: "数学".to_string(),
            questions: vec![question("q1", &["A"])],
            points_for_correct: 4.0,
            negative_marks: 1.0,
            duration_minutes: 10,
        };

        let result = score_locally("a1", &[section], &HashMap::new(), 5).unwrap();
        assert_eq!(result.unattempted, 1);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn missing_answer_key_disables_local_scoring() {
        let mut q = question("q1", &["A"]);
        // 服务端没有下发 isCorrect
        for option in q.options.as_mut().unwrap() {
            option.is_correct = None;
        }
        let section = Section {
            name: "数学".to_string(),
            questions: vec![q],
            points_for_correct: 4.0,
            negative_marks: 0.0,
            duration_minutes: 10,
        };

        assert!(score_locally("a1", &[section], &HashMap::new(), 5).is_none());
    }

    #[test]
    fn subjective_questions_are_not_auto_scored() {
        let subjective = Question {
            id: "q1".to_string(),
            stem: "论述题".to_string(),
            imgs: None,
            is_multiple_answer: false,
            is_subjective: true,
            options: None,
        };
        let section = Section {
            name: "语文".to_string(),
            questions: vec![subjective],
            points_for_correct: 10.0,
            negative_marks: 0.0,
            duration_minutes: 20,
        };

        let result = score_locally("a1", &[section], &HashMap::new(), 5).unwrap();
        assert_eq!(result.unattempted, 1);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.max_marks, 10.0);
    }
}
