//! 导航控制器 - 流程层
//!
//! 执行单向推进规则：
//! - 区域内自由移动，跨区回退永远禁止
//! - 顺序模式（不允许切换）下，跨区前进要先走确认步骤，
//!   确认后较低索引的区域永久不可达（区域地板）
//! - 越过最后一个区域的最后一题触发交卷确认，而不是移动
//!
//! 控制器只做裁决，不产生副作用；位置变更由编排层落实。

use crate::error::SessionError;
use crate::models::{Position, Section};

/// 一次导航请求的裁决
#[derive(Debug, Clone, PartialEq)]
pub enum NavDecision {
    /// 直接移动到目标位置
    Move(Position),
    /// 需要确认的跨区前进（目标已暂存，等 confirm/cancel）
    ConfirmSection(Position),
    /// 已是最后一题，进入交卷确认
    ConfirmSubmit,
    /// 规则拒绝
    Rejected(SessionError),
}

/// 导航控制器
#[derive(Debug)]
pub struct NavigationController {
    switching_allowed: bool,
    /// 低于该索引的区域永久不可达（仅顺序模式会抬升）
    section_floor: usize,
    /// 暂存的待确认目标
    pending: Option<Position>,
}

impl NavigationController {
    pub fn new(switching_allowed: bool) -> Self {
        Self {
            switching_allowed,
            section_floor: 0,
            pending: None,
        }
    }

    /// 恢复会话时把地板直接抬到当前区域（顺序模式）
    pub fn restore(switching_allowed: bool, current_section: usize) -> Self {
        Self {
            switching_allowed,
            section_floor: if switching_allowed { 0 } else { current_section },
            pending: None,
        }
    }

    pub fn section_floor(&self) -> usize {
        self.section_floor
    }

    /// 下一题
    pub fn next(&mut self, current: Position, sections: &[Section]) -> NavDecision {
        let section = &sections[current.section_index];

        if current.question_index + 1 < section.questions.len() {
            return NavDecision::Move(Position::new(
                current.section_index,
                current.question_index + 1,
            ));
        }

        // 区域末尾
        if current.section_index + 1 >= sections.len() {
            return NavDecision::ConfirmSubmit;
        }

        let target = Position::new(current.section_index + 1, 0);
        if self.switching_allowed {
            NavDecision::Move(target)
        } else {
            self.pending = Some(target);
            NavDecision::ConfirmSection(target)
        }
    }

    /// 上一题（只允许区域内）
    pub fn previous(&mut self, current: Position) -> NavDecision {
        if current.question_index > 0 {
            return NavDecision::Move(Position::new(
                current.section_index,
                current.question_index - 1,
            ));
        }

        // 跨区回退与配置无关，一律拒绝
        if current.section_index == 0 {
            NavDecision::Rejected(SessionError::OutOfRange {
                section_index: 0,
                question_index: 0,
            })
        } else {
            NavDecision::Rejected(SessionError::SectionLocked {
                section_index: current.section_index - 1,
            })
        }
    }

    /// 跳转到任意位置（侧边导航面板）
    pub fn jump_to(
        &mut self,
        current: Position,
        target: Position,
        sections: &[Section],
    ) -> NavDecision {
        if target.section_index >= sections.len()
            || target.question_index >= sections[target.section_index].questions.len()
        {
            return NavDecision::Rejected(SessionError::OutOfRange {
                section_index: target.section_index,
                question_index: target.question_index,
            });
        }

        if target.section_index == current.section_index {
            return NavDecision::Move(target);
        }

        if self.switching_allowed {
            return NavDecision::Move(target);
        }

        if target.section_index < current.section_index || target.section_index < self.section_floor
        {
            return NavDecision::Rejected(SessionError::SectionLocked {
                section_index: target.section_index,
            });
        }

        self.pending = Some(target);
        NavDecision::ConfirmSection(target)
    }

    /// 确认暂存的跨区前进，抬升区域地板
    pub fn confirm_pending(&mut self) -> Option<Position> {
        let target = self.pending.take()?;
        if !self.switching_allowed {
            self.section_floor = target.section_index;
        }
        Some(target)
    }

    /// 取消暂存目标，位置不变、无任何副作用
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    /// 计时驱动的强制推进（顺序模式区域到时）
    ///
    /// 绕过确认步骤：是时间在推进，不是考生的选择。
    /// 地板同样抬升，过去的区域不可回头。
    pub fn force_advance(&mut self, current: Position, sections: &[Section]) -> Option<Position> {
        if current.section_index + 1 >= sections.len() {
            return None;
        }
        let target = Position::new(current.section_index + 1, 0);
        if !self.switching_allowed {
            self.section_floor = target.section_index;
        }
        self.pending = None;
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;

    fn sections() -> Vec<Section> {
        ["物理", "化学"]
            .iter()
            .map(|name| Section {
                name: name.to_string(),
                questions: (1..=2)
                    .map(|i| Question {
                        id: format!("{}_{}", name, i),
                        stem: String::new(),
                        imgs: None,
                        is_multiple_answer: false,
                        is_subjective: false,
                        options: None,
                    })
                    .collect(),
                points_for_correct: 4.0,
                negative_marks: 0.0,
                duration_minutes: 10,
            })
            .collect()
    }

    #[test]
    fn within_section_moves_are_unconditional() {
        let sections = sections();
        let mut nav = NavigationController::new(false);

        assert_eq!(
            nav.next(Position::new(0, 0), &sections),
            NavDecision::Move(Position::new(0, 1))
        );
        assert_eq!(
            nav.previous(Position::new(0, 1)),
            NavDecision::Move(Position::new(0, 0))
        );
        assert_eq!(
            nav.jump_to(Position::new(0, 0), Position::new(0, 1), &sections),
            NavDecision::Move(Position::new(0, 1))
        );
    }

    #[test]
    fn cross_section_forward_requires_confirmation_in_sequential_mode() {
        let sections = sections();
        let mut nav = NavigationController::new(false);

        let decision = nav.next(Position::new(0, 1), &sections);
        assert_eq!(decision, NavDecision::ConfirmSection(Position::new(1, 0)));

        // 取消后位置不动，可以重新发起
        nav.cancel_pending();
        assert!(nav.confirm_pending().is_none());

        let decision = nav.next(Position::new(0, 1), &sections);
        assert_eq!(decision, NavDecision::ConfirmSection(Position::new(1, 0)));
        assert_eq!(nav.confirm_pending(), Some(Position::new(1, 0)));
        assert_eq!(nav.section_floor(), 1);
    }

    #[test]
    fn cross_section_forward_is_immediate_when_switching_allowed() {
        let sections = sections();
        let mut nav = NavigationController::new(true);

        assert_eq!(
            nav.next(Position::new(0, 1), &sections),
            NavDecision::Move(Position::new(1, 0))
        );
        // 收集模式下跳回较低区域也允许
        assert_eq!(
            nav.jump_to(Position::new(1, 0), Position::new(0, 0), &sections),
            NavDecision::Move(Position::new(0, 0))
        );
    }

    #[test]
    fn confirmed_sections_become_permanently_unreachable() {
        let sections = sections();
        let mut nav = NavigationController::new(false);

        nav.next(Position::new(0, 1), &sections);
        nav.confirm_pending().unwrap();

        // jumpTo 与 goPrevious 都无法回到低区域
        assert!(matches!(
            nav.jump_to(Position::new(1, 0), Position::new(0, 1), &sections),
            NavDecision::Rejected(SessionError::SectionLocked { section_index: 0 })
        ));
        assert!(matches!(
            nav.previous(Position::new(1, 0)),
            NavDecision::Rejected(SessionError::SectionLocked { section_index: 0 })
        ));
    }

    #[test]
    fn backward_across_sections_is_never_allowed() {
        // 即使配置允许切换，goPrevious 也不能跨区
        let mut nav = NavigationController::new(true);
        assert!(matches!(
            nav.previous(Position::new(1, 0)),
            NavDecision::Rejected(SessionError::SectionLocked { section_index: 0 })
        ));
    }

    #[test]
    fn past_the_last_question_means_submit_confirmation() {
        let sections = sections();
        let mut nav = NavigationController::new(false);

        assert_eq!(
            nav.next(Position::new(1, 1), &sections),
            NavDecision::ConfirmSubmit
        );
    }

    #[test]
    fn force_advance_bypasses_confirmation_and_raises_floor() {
        let sections = sections();
        let mut nav = NavigationController::new(false);

        let target = nav.force_advance(Position::new(0, 1), &sections);
        assert_eq!(target, Some(Position::new(1, 0)));
        assert_eq!(nav.section_floor(), 1);

        // 最后一个区域到时没有可推进的目标
        assert_eq!(nav.force_advance(Position::new(1, 0), &sections), None);
    }

    #[test]
    fn out_of_range_jump_is_rejected() {
        let sections = sections();
        let mut nav = NavigationController::new(true);

        assert!(matches!(
            nav.jump_to(Position::new(0, 0), Position::new(5, 0), &sections),
            NavDecision::Rejected(SessionError::OutOfRange { .. })
        ));
    }
}
