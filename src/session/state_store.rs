//! 题目状态表 - 流程层
//!
//! 导航着色、统计、评分、持久化读取的唯一事实来源。
//! 所有状态变更都必须经过这里的单一更新路径：任何组件都不能
//! 只改状态不对账选择集合（反之亦然）。
//!
//! 不变量：
//! - 开考后全卷有且只有一道题处于 Current
//! - 已作答 + 未作答 + 未访问 + 标记 == 题目总数，任何观察点都成立
//! - 变更失败时状态表保持变更前的样子，不会半途而废

use std::collections::HashMap;

use crate::error::{AppResult, SessionError};
use crate::models::{QuestionState, QuestionStatus, ResumedAnswer, Section};

/// 聚合统计（导航图例用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub attempted: usize,
    pub unanswered: usize,
    pub not_visited: usize,
    pub marked: usize,
    pub total: usize,
}

/// 题目状态表
#[derive(Debug)]
pub struct StateStore {
    states: HashMap<String, QuestionState>,
    /// 全卷题目ID，按出卷顺序
    order: Vec<String>,
    current: Option<String>,
    /// 提交后冻结，拒绝一切变更
    frozen: bool,
}

impl StateStore {
    /// 按题库初始化：全部未访问，尚无当前题
    pub fn new(sections: &[Section]) -> Self {
        let mut states = HashMap::new();
        let mut order = Vec::new();

        for section in sections {
            for question in &section.questions {
                order.push(question.id.clone());
                states.insert(
                    question.id.clone(),
                    QuestionState::new(&question.id, &section.name),
                );
            }
        }

        Self {
            states,
            order,
            current: None,
            frozen: false,
        }
    }

    pub fn get(&self, question_id: &str) -> Option<&QuestionState> {
        self.states.get(question_id)
    }

    pub fn states(&self) -> &HashMap<String, QuestionState> {
        &self.states
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn ensure_mutable(&self) -> AppResult<()> {
        if self.frozen {
            return Err(SessionError::AlreadySubmitted.into());
        }
        Ok(())
    }

    fn ensure_known(&self, question_id: &str) -> AppResult<()> {
        if !self.states.contains_key(question_id) {
            return Err(SessionError::OutOfRange {
                section_index: usize::MAX,
                question_index: usize::MAX,
            }
            .into());
        }
        Ok(())
    }

    /// 单一更新路径：切换当前题
    ///
    /// 先校验目标存在，再归类旧的当前题（标记 > 已作答 > 未访问），
    /// 最后提升新题为 Current。校验失败时不产生任何变更。
    pub fn set_current(&mut self, question_id: &str) -> AppResult<()> {
        self.ensure_mutable()?;
        self.ensure_known(question_id)?;

        if let Some(old_id) = self.current.take() {
            if let Some(old) = self.states.get_mut(&old_id) {
                old.status = old.settled_status();
            }
        }

        let state = self
            .states
            .get_mut(question_id)
            .expect("目标存在性已校验");
        state.status = QuestionStatus::Current;
        self.current = Some(question_id.to_string());
        Ok(())
    }

    /// 记录当前题的选择（有序去重）
    ///
    /// Current 题的实时选择缓冲就在状态表里，统计读取的永远是
    /// 同一个一致快照，不存在落后于最新选择的"影子变量"
    pub fn record_selection(&mut self, question_id: &str, selected: Vec<String>) -> AppResult<()> {
        self.ensure_mutable()?;
        self.ensure_known(question_id)?;

        let mut deduped: Vec<String> = Vec::with_capacity(selected.len());
        for id in selected {
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }

        let state = self.states.get_mut(question_id).expect("存在性已校验");
        state.selected_ids = deduped;
        Ok(())
    }

    /// 设置/取消"标记待复查"
    pub fn set_marked(&mut self, question_id: &str, marked: bool) -> AppResult<()> {
        self.ensure_mutable()?;
        self.ensure_known(question_id)?;

        let state = self.states.get_mut(question_id).expect("存在性已校验");
        state.marked = marked;
        // 非当前题直接按归类规则落状态
        if state.status != QuestionStatus::Current {
            state.status = state.settled_status();
        }
        Ok(())
    }

    /// 从服务端恢复数据重建（本地快照此后被忽略）
    pub fn apply_resumed(&mut self, answers: &[ResumedAnswer]) -> AppResult<()> {
        self.ensure_mutable()?;

        for answer in answers {
            if let Some(state) = self.states.get_mut(&answer.question_id) {
                state.selected_ids = answer.selected_ids.clone();
                state.status = answer.status;
                state.marked = answer.status == QuestionStatus::MarkedForReview;
            }
        }
        Ok(())
    }

    /// 从本地快照整体重建
    pub fn restore(&mut self, states: Vec<QuestionState>) -> AppResult<()> {
        self.ensure_mutable()?;

        self.current = None;
        for restored in states {
            if restored.status == QuestionStatus::Current {
                self.current = Some(restored.question_id.clone());
            }
            self.states.insert(restored.question_id.clone(), restored);
        }
        Ok(())
    }

    /// 提交后冻结
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// 按出卷顺序导出全量状态（快照 / 渲染图例用）
    pub fn ordered_states(&self) -> Vec<QuestionState> {
        self.order
            .iter()
            .filter_map(|id| self.states.get(id).cloned())
            .collect()
    }

    /// 聚合统计
    ///
    /// Current 题按实时选择缓冲归入对应桶：
    /// 标记 → marked，有选择 → attempted，否则 → unanswered
    pub fn stats(&self) -> Stats {
        let mut stats = Stats {
            attempted: 0,
            unanswered: 0,
            not_visited: 0,
            marked: 0,
            total: self.order.len(),
        };

        for id in &self.order {
            let state = &self.states[id];
            match state.status {
                QuestionStatus::Attempted => stats.attempted += 1,
                QuestionStatus::MarkedForReview => stats.marked += 1,
                QuestionStatus::NotVisited => stats.not_visited += 1,
                QuestionStatus::Current => match state.settled_status() {
                    QuestionStatus::MarkedForReview => stats.marked += 1,
                    QuestionStatus::Attempted => stats.attempted += 1,
                    _ => stats.unanswered += 1,
                },
            }
        }

        stats
    }
}
