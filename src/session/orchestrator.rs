//! 会话编排器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个引擎的"指挥中心"，持有考试生命周期的显式状态机，
//! 把各能力组件（倒计时、自动保存、完整性监控、快照、评分）串成
//! 开考 → 作答循环 → 提交 → 成绩 的完整流程。
//!
//! ## 生命周期
//!
//! ```text
//! NotStarted ──start/resume/restore──▶ Running
//! Running ──确认交卷 / 末区到时 / 违规达上限──▶ Submitting
//! Submitting ──服务端确认──▶ Completed
//! Submitting ──服务端失败──▶ Running（可重试，状态无损）
//! ```
//!
//! ## 设计要点
//!
//! - 状态表是唯一的可变共享数据，所有变更走 `StateStore` 的单一更新路径
//! - 显式保存先入队、后应用位置变更；本地更新乐观，保存失败不回滚
//! - 计时 tick 与在途网络调用互不阻塞；交卷重复触发由服务端拒绝兜底

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::clients::ExamApi;
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult, SessionError};
use crate::models::{
    Attempt, Position, Question, QuestionStatus, ResultData, SaveAnswerRequest, Section, TestMeta,
};
use crate::services::autosave::{spawn_dispatch_worker, AutosaveController, SavePayload, SaveRequest};
use crate::services::{
    Countdown, IntegrityAction, IntegrityEvent, IntegrityMonitor, ProctorHost, SessionSnapshot,
    SnapshotStore, TimerMode, TimerSignal,
};
use crate::session::navigation::{NavDecision, NavigationController};
use crate::session::state_store::{StateStore, Stats};

/// 会话生命周期阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Running,
    Submitting,
    Completed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::NotStarted => "未开始",
            Phase::Running => "进行中",
            Phase::Submitting => "提交中",
            Phase::Completed => "已完成",
        };
        write!(f, "{}", name)
    }
}

/// 一次导航请求对宿主界面的答复
#[derive(Debug)]
pub enum NavOutcome {
    /// 已移动到新位置
    Moved(Position),
    /// 跨区前进需要确认（等 confirm_section_change / cancel_section_change）
    SectionConfirmRequired(Position),
    /// 已到全卷末尾，进入交卷确认（等 confirm_submit / cancel_submit）
    SubmitConfirmRequired,
    /// 规则拒绝
    Rejected(AppError),
}

/// 一次 tick 的处理结果
#[derive(Debug)]
pub enum TickOutcome {
    /// 非进行中阶段，忽略
    Ignored,
    /// 正常倒数，携带剩余秒数
    Ticked(u64),
    /// 顺序模式区域到时，已自动进入下一区域
    SectionAdvanced(Position),
    /// 末区/全卷到时，已强制交卷
    Submitted(ResultData),
}

/// 暴露给宿主界面的观察快照
///
/// 渲染层只依赖这个结构，可以整体替换而不触碰引擎
#[derive(Debug, Clone)]
pub struct SessionView {
    pub phase: Phase,
    pub position: Position,
    pub section_name: String,
    pub question: Question,
    /// 全卷题目着色状态，按出卷顺序
    pub statuses: Vec<(String, QuestionStatus)>,
    pub stats: Stats,
    pub remaining_secs: u64,
    pub tab_switches: u32,
}

/// 考试会话编排器
pub struct ExamSession {
    config: Config,
    meta: TestMeta,
    sections: Vec<Section>,
    api: Arc<dyn ExamApi>,
    proctor: Arc<dyn ProctorHost>,

    store: StateStore,
    nav: NavigationController,
    timer: Countdown,
    timer_mode: TimerMode,
    integrity: IntegrityMonitor,
    snapshots: SnapshotStore,
    autosave: AutosaveController,
    /// 串行派发任务，随会话存活
    _dispatch: tokio::task::JoinHandle<()>,

    phase: Phase,
    attempt: Option<Attempt>,
    position: Position,
    /// 本题累计作答秒数，切题归零
    question_elapsed: u64,
    /// 开考以来的总秒数（预估成绩的用时）
    total_elapsed: u64,
    /// 交卷确认已展示，等待确认/取消
    pending_submit: bool,
    fullscreen_held: bool,
    result: Option<ResultData>,
}

impl ExamSession {
    /// 组装会话（尚未开考）
    pub fn new(
        config: Config,
        meta: TestMeta,
        sections: Vec<Section>,
        api: Arc<dyn ExamApi>,
        proctor: Arc<dyn ProctorHost>,
    ) -> Self {
        let (autosave, save_rx) =
            AutosaveController::new(Duration::from_millis(config.autosave_debounce_ms));
        let dispatch = spawn_dispatch_worker(api.clone(), save_rx);

        let timer_mode = if meta.section_switching_allowed {
            TimerMode::Collective
        } else {
            TimerMode::Sequential
        };

        Self {
            store: StateStore::new(&sections),
            nav: NavigationController::new(meta.section_switching_allowed),
            timer: Countdown::new(0),
            timer_mode,
            integrity: IntegrityMonitor::new(config.tab_switch_limit),
            snapshots: SnapshotStore::new(
                config.snapshot_dir.clone(),
                Duration::from_millis(config.snapshot_min_interval_ms),
            ),
            autosave,
            _dispatch: dispatch,
            phase: Phase::NotStarted,
            attempt: None,
            position: Position::new(0, 0),
            question_elapsed: 0,
            total_elapsed: 0,
            pending_submit: false,
            fullscreen_held: false,
            result: None,
            config,
            meta,
            sections,
            api,
            proctor,
        }
    }

    // ========== 只读访问 ==========

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn result(&self) -> Option<&ResultData> {
        self.result.as_ref()
    }

    pub fn attempt_id(&self) -> Option<&str> {
        self.attempt.as_ref().map(|a| a.attempt_id.as_str())
    }

    /// 观察快照（宿主界面的唯一读取入口）
    pub fn view(&self) -> SessionView {
        let section = &self.sections[self.position.section_index];
        SessionView {
            phase: self.phase,
            position: self.position,
            section_name: section.name.clone(),
            question: section.questions[self.position.question_index].clone(),
            statuses: self
                .store
                .ordered_states()
                .into_iter()
                .map(|s| (s.question_id, s.status))
                .collect(),
            stats: self.store.stats(),
            remaining_secs: self.timer.remaining_secs(),
            tab_switches: self.integrity.tab_switches(),
        }
    }

    // ========== 生命周期 ==========

    /// 全新开考
    pub async fn start(&mut self) -> AppResult<()> {
        self.ensure_phase(Phase::NotStarted)?;

        info!("📝 开始答题: {}", self.meta.name);
        let attempt_id = self
            .api
            .start_attempt(&self.config.user_id, &self.config.test_id)
            .await?;

        self.attempt = Some(Attempt {
            attempt_id,
            user_id: self.config.user_id.clone(),
            test_id: self.config.test_id.clone(),
            start_time: Utc::now(),
            tab_switches: 0,
            current_question_id: None,
        });

        self.enter_running(None)
    }

    /// 从服务端恢复中断的答题记录（权威路径）
    ///
    /// 状态表从服务端数据彻底重建，本地快照从此被忽略
    pub async fn resume(&mut self, attempt_id: &str) -> AppResult<()> {
        self.ensure_phase(Phase::NotStarted)?;

        info!("🔄 恢复答题记录: {}", attempt_id);
        // 服务端明确拒绝（已提交/记录不存在）归类为"不可恢复"；
        // 网络类故障原样上抛，由调用方决定是否重试
        let data = match self
            .api
            .resume_attempt(&self.config.user_id, attempt_id)
            .await
        {
            Ok(data) => data,
            Err(AppError::Api(
                ApiError::BadResponse { .. } | ApiError::EmptyResponse { .. },
            )) => {
                return Err(SessionError::NotResumable {
                    attempt_id: attempt_id.to_string(),
                }
                .into());
            }
            Err(e) => return Err(e),
        };

        self.store.apply_resumed(&data.answers)?;

        // 用服务端报告的"正在作答"题目定位，找不到就回到卷首
        self.position = data
            .attempt
            .current_question_id
            .as_deref()
            .and_then(|id| self.locate(id))
            .unwrap_or(Position::new(0, 0));

        self.nav = NavigationController::restore(
            self.meta.section_switching_allowed,
            self.position.section_index,
        );
        self.integrity =
            IntegrityMonitor::restore(self.config.tab_switch_limit, data.attempt.tab_switches);
        let remaining = data.remaining_secs;
        self.attempt = Some(data.attempt);

        self.enter_running(Some(remaining))
    }

    /// 恢复优先级：服务端 resume > 本地快照 restore > 全新开始
    ///
    /// 服务端恢复失败时回落到全新开始，并显式告警（绝不静默丢数据）
    pub async fn start_or_resume(&mut self, resume_id: Option<&str>) -> AppResult<()> {
        if let Some(attempt_id) = resume_id {
            match self.resume(attempt_id).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!("⚠️ 服务端恢复失败，回落到全新开始: {}", e);
                    return self.start().await;
                }
            }
        }

        // 没有显式恢复请求时才尝试本地快照
        match self
            .snapshots
            .load(&self.config.user_id, &self.config.test_id)
        {
            Ok(Some(snapshot)) if snapshot.started => {
                info!("📂 发现本地快照，直接恢复会话");
                self.restore_from_snapshot(snapshot)
            }
            Ok(_) => self.start().await,
            Err(e) => {
                warn!("⚠️ 本地快照不可用: {}", e);
                self.start().await
            }
        }
    }

    /// 从本地快照重建（页面崩溃/刷新后的安全网）
    fn restore_from_snapshot(&mut self, snapshot: SessionSnapshot) -> AppResult<()> {
        self.ensure_phase(Phase::NotStarted)?;

        self.store.restore(snapshot.states)?;
        self.position = snapshot.position;
        self.nav = NavigationController::restore(
            self.meta.section_switching_allowed,
            self.position.section_index,
        );
        self.attempt = Some(Attempt {
            attempt_id: snapshot.attempt_id,
            user_id: snapshot.user_id,
            test_id: snapshot.test_id,
            start_time: snapshot.start_time,
            tab_switches: 0,
            current_question_id: None,
        });

        self.enter_running(Some(snapshot.remaining_secs))
    }

    /// 进入 Running 的公共路径
    ///
    /// `remaining_override`: 恢复场景下服务端/快照给出的剩余秒数；
    /// 全新开考时按模式从区域时长推出
    fn enter_running(&mut self, remaining_override: Option<u64>) -> AppResult<()> {
        let current_id = self.question_id_at(self.position);
        self.store.set_current(&current_id)?;

        let remaining = match remaining_override {
            // 恢复场景：直接写入服务端/快照给出的剩余秒数
            Some(secs) => {
                self.timer.restore(secs);
                secs
            }
            None => {
                let secs = match self.timer_mode {
                    TimerMode::Collective => {
                        self.sections.iter().map(Section::duration_secs).sum()
                    }
                    TimerMode::Sequential => {
                        self.sections[self.position.section_index].duration_secs()
                    }
                };
                self.timer.reset(secs);
                secs
            }
        };

        // 全屏失败非致命，后续退出全屏事件会触发补锁
        self.fullscreen_held = self.proctor.request_fullscreen();
        if !self.fullscreen_held {
            warn!("⚠️ 全屏锁定失败（非致命），将择机重试");
        }
        self.proctor.set_leave_guard(true);

        self.phase = Phase::Running;
        self.question_elapsed = 0;
        self.persist(true);

        info!(
            "✓ 会话进入进行中: 区域 {} 题目 {} / 剩余 {} 秒",
            self.position.section_index, self.position.question_index, remaining
        );
        Ok(())
    }

    // ========== 作答 ==========

    /// 当前题选择变化
    ///
    /// 多选题走防抖自动保存；单选/主观题只改本地，等显式导航动作落盘
    pub fn select_answer(&mut self, selected: Vec<String>) -> AppResult<()> {
        self.ensure_phase(Phase::Running)?;

        let question_id = self.question_id_at(self.position);
        self.store.record_selection(&question_id, selected)?;

        if self.current_question().is_multiple_answer {
            let empty = self
                .store
                .get(&question_id)
                .map(|s| s.selected_ids.is_empty())
                .unwrap_or(true);
            let request = if empty {
                self.reset_request(&question_id)
            } else {
                self.save_request(&question_id, QuestionStatus::Attempted)
            };
            if let Some(request) = request {
                self.autosave.schedule(request);
            }
        }

        self.persist(false);
        Ok(())
    }

    /// 显式清除当前题作答（立即发重置调用）
    pub fn clear_response(&mut self) -> AppResult<()> {
        self.ensure_phase(Phase::Running)?;

        let question_id = self.question_id_at(self.position);
        self.store.record_selection(&question_id, Vec::new())?;
        self.store.set_marked(&question_id, false)?;

        if let Some(request) = self.reset_request(&question_id) {
            self.autosave.push_now(request);
        }
        self.persist(false);
        Ok(())
    }

    /// 标记当前题待复查并前进（"Mark for Review & Next"）
    pub fn mark_and_next(&mut self) -> NavOutcome {
        if let Err(e) = self.ensure_phase(Phase::Running) {
            return NavOutcome::Rejected(e);
        }
        let question_id = self.question_id_at(self.position);
        if let Err(e) = self.store.set_marked(&question_id, true) {
            return NavOutcome::Rejected(e);
        }
        self.next()
    }

    // ========== 导航 ==========

    pub fn next(&mut self) -> NavOutcome {
        if let Err(e) = self.ensure_phase(Phase::Running) {
            return NavOutcome::Rejected(e);
        }
        let decision = self.nav.next(self.position, &self.sections);
        self.apply_decision(decision)
    }

    pub fn previous(&mut self) -> NavOutcome {
        if let Err(e) = self.ensure_phase(Phase::Running) {
            return NavOutcome::Rejected(e);
        }
        let decision = self.nav.previous(self.position);
        self.apply_decision(decision)
    }

    pub fn jump_to(&mut self, target: Position) -> NavOutcome {
        if let Err(e) = self.ensure_phase(Phase::Running) {
            return NavOutcome::Rejected(e);
        }
        let decision = self.nav.jump_to(self.position, target, &self.sections);
        self.apply_decision(decision)
    }

    /// 确认暂存的跨区前进（确认后低区域永久锁定）
    pub fn confirm_section_change(&mut self) -> AppResult<Option<Position>> {
        self.ensure_phase(Phase::Running)?;
        match self.nav.confirm_pending() {
            Some(target) => {
                self.commit_move(target)?;
                Ok(Some(target))
            }
            None => Ok(None),
        }
    }

    /// 取消暂存的跨区前进，位置不变、无任何副作用
    pub fn cancel_section_change(&mut self) {
        self.nav.cancel_pending();
    }

    fn apply_decision(&mut self, decision: NavDecision) -> NavOutcome {
        match decision {
            NavDecision::Move(target) => match self.commit_move(target) {
                Ok(()) => NavOutcome::Moved(target),
                Err(e) => NavOutcome::Rejected(e),
            },
            NavDecision::ConfirmSection(target) => {
                info!(
                    "⏸️ 跨区前进需确认: 区域 {} → {}（确认后不可返回）",
                    self.position.section_index, target.section_index
                );
                NavOutcome::SectionConfirmRequired(target)
            }
            NavDecision::ConfirmSubmit => {
                self.pending_submit = true;
                NavOutcome::SubmitConfirmRequired
            }
            NavDecision::Rejected(e) => NavOutcome::Rejected(e.into()),
        }
    }

    /// 落实一次已获批准的移动
    ///
    /// 顺序：先把旧题的显式保存入队（请求先于副作用发出），
    /// 再切换状态表的当前题、更新位置、归零本题计时；
    /// 顺序模式下切区还会重建倒计时
    fn commit_move(&mut self, target: Position) -> AppResult<()> {
        let old_id = self.question_id_at(self.position);

        let settled = self
            .store
            .get(&old_id)
            .map(|s| s.settled_status())
            .unwrap_or(QuestionStatus::NotVisited);
        match settled {
            QuestionStatus::Attempted | QuestionStatus::MarkedForReview => {
                if let Some(request) = self.save_request(&old_id, settled) {
                    self.autosave.push_now(request);
                }
            }
            // 没有可保存的内容：只取消可能残留的防抖任务
            _ => self.autosave.cancel(&old_id),
        }

        let new_id = self.question_id_at(target);
        self.store.set_current(&new_id)?;

        let section_changed = target.section_index != self.position.section_index;
        self.position = target;
        self.question_elapsed = 0;

        if section_changed && self.timer_mode == TimerMode::Sequential {
            let duration = self.sections[target.section_index].duration_secs();
            self.timer.reset(duration);
            info!(
                "➡️ 进入区域 {}（{}），倒计时重置为 {} 秒",
                target.section_index, self.sections[target.section_index].name, duration
            );
        }

        self.persist(section_changed);
        Ok(())
    }

    // ========== 计时 ==========

    /// 每秒一次的心跳，由宿主驱动
    ///
    /// tick 独立于在途网络调用；到时与在途提交重叠时允许重复发起，
    /// 重复提交由服务端拒绝兜底
    pub async fn handle_tick(&mut self) -> AppResult<TickOutcome> {
        if self.phase != Phase::Running {
            return Ok(TickOutcome::Ignored);
        }

        self.question_elapsed += 1;
        self.total_elapsed += 1;

        match self.timer.tick() {
            TimerSignal::Idle => Ok(TickOutcome::Ignored),
            TimerSignal::Tick(remaining) => {
                // 剩余时间进快照（尽力而为；恢复时以服务端为权威）
                self.persist(false);
                Ok(TickOutcome::Ticked(remaining))
            }
            TimerSignal::Expired => {
                if self.timer_mode == TimerMode::Sequential {
                    if let Some(target) = self.nav.force_advance(self.position, &self.sections) {
                        info!("⏰ 区域时间到，自动进入下一区域（无需确认）");
                        self.commit_move(target)?;
                        return Ok(TickOutcome::SectionAdvanced(target));
                    }
                }

                info!("⏰ 时间到，强制交卷");
                self.pending_submit = true;
                let result = self.submit().await?;
                Ok(TickOutcome::Submitted(result))
            }
        }
    }

    // ========== 完整性 ==========

    /// 宿主上报完整性信号
    pub async fn on_integrity(&mut self, event: IntegrityEvent) -> AppResult<IntegrityAction> {
        if self.phase != Phase::Running {
            return Ok(IntegrityAction::None);
        }

        let action = self.integrity.on_event(event);
        match &action {
            IntegrityAction::ForceSubmit => {
                warn!("🚫 切屏达到上限，强制交卷");
                self.pending_submit = true;
                self.submit().await?;
            }
            IntegrityAction::RelockFullscreen => {
                self.fullscreen_held = self.proctor.request_fullscreen();
                warn!("⚠️ 已退出全屏，请保持全屏作答");
            }
            IntegrityAction::Warn { used, remaining } => {
                warn!("⚠️ 切屏警告: 已用 {} 次，还剩 {} 次机会", used, remaining);
            }
            IntegrityAction::None => {}
        }
        Ok(action)
    }

    // ========== 提交 ==========

    /// 交卷确认弹窗用的本地预估成绩
    ///
    /// 服务端未下发答案键时为 None；服务端结果一到立即取代
    pub fn provisional_result(&self) -> Option<ResultData> {
        let attempt = self.attempt.as_ref()?;
        crate::services::score_locally(
            &attempt.attempt_id,
            &self.sections,
            self.store.states(),
            self.total_elapsed,
        )
    }

    /// 用户在交卷确认弹窗点了确认
    ///
    /// 只有确认弹窗真正展示过（末题前进 / 强制交卷路径）才接受
    pub async fn confirm_submit(&mut self) -> AppResult<ResultData> {
        if !self.pending_submit {
            return Err(AppError::Other("没有待确认的交卷请求".to_string()));
        }
        self.pending_submit = false;
        self.submit().await
    }

    /// 取消交卷确认，继续作答
    pub fn cancel_submit(&mut self) {
        self.pending_submit = false;
    }

    /// 提交答题记录
    ///
    /// 失败回到 Running，本地状态无损，可重试
    pub async fn submit(&mut self) -> AppResult<ResultData> {
        match self.phase {
            Phase::Running => {}
            Phase::Completed => return Err(SessionError::AlreadySubmitted.into()),
            other => {
                return Err(SessionError::NotRunning {
                    phase: other.to_string(),
                }
                .into())
            }
        }

        let attempt = self
            .attempt
            .as_ref()
            .ok_or_else(|| AppError::Other("没有进行中的答题记录".to_string()))?;
        let attempt_id = attempt.attempt_id.clone();

        // 把当前题最后的作答冲入队列（先于提交请求）
        let current_id = self.question_id_at(self.position);
        let settled = self
            .store
            .get(&current_id)
            .map(|s| s.settled_status())
            .unwrap_or(QuestionStatus::NotVisited);
        if matches!(
            settled,
            QuestionStatus::Attempted | QuestionStatus::MarkedForReview
        ) {
            if let Some(request) = self.save_request(&current_id, settled) {
                self.autosave.push_now(request);
            }
        }

        self.phase = Phase::Submitting;
        info!("📤 正在提交答题记录 {} ...", attempt_id);

        match self
            .api
            .submit_attempt(&self.config.user_id, &attempt_id)
            .await
        {
            Ok(result) => {
                self.phase = Phase::Completed;
                self.pending_submit = false;
                self.timer.dispose();
                self.store.freeze();
                self.proctor.release_fullscreen();
                self.proctor.set_leave_guard(false);
                if let Err(e) = self
                    .snapshots
                    .clear(&self.config.user_id, &self.config.test_id)
                {
                    warn!("⚠️ 快照清理失败（忽略）: {}", e);
                }
                info!(
                    "✅ 提交成功: 得分 {}/{}",
                    result.score, result.max_marks
                );
                self.result = Some(result.clone());
                Ok(result)
            }
            Err(e) => {
                // 提交失败可重试，任何本地状态都不丢
                error!("❌ 提交失败（可重试）: {}", e);
                self.phase = Phase::Running;
                Err(e)
            }
        }
    }

    // ========== 内部工具 ==========

    fn ensure_phase(&self, expected: Phase) -> AppResult<()> {
        if self.phase != expected {
            return Err(SessionError::NotRunning {
                phase: self.phase.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn current_question(&self) -> &Question {
        &self.sections[self.position.section_index].questions[self.position.question_index]
    }

    fn question_id_at(&self, position: Position) -> String {
        self.sections[position.section_index].questions[position.question_index]
            .id
            .clone()
    }

    fn locate(&self, question_id: &str) -> Option<Position> {
        for (si, section) in self.sections.iter().enumerate() {
            for (qi, question) in section.questions.iter().enumerate() {
                if question.id == question_id {
                    return Some(Position::new(si, qi));
                }
            }
        }
        None
    }

    fn save_request(&self, question_id: &str, status: QuestionStatus) -> Option<SaveRequest> {
        let attempt = self.attempt.as_ref()?;
        let state = self.store.get(question_id)?;
        Some(SaveRequest {
            question_id: question_id.to_string(),
            payload: SavePayload::Save(SaveAnswerRequest {
                attempt_id: attempt.attempt_id.clone(),
                user_id: attempt.user_id.clone(),
                section: state.section.clone(),
                question_id: question_id.to_string(),
                selected_ids: state.selected_ids.clone(),
                status,
                elapsed_secs: self.question_elapsed,
            }),
        })
    }

    fn reset_request(&self, question_id: &str) -> Option<SaveRequest> {
        let attempt = self.attempt.as_ref()?;
        let state = self.store.get(question_id)?;
        Some(SaveRequest {
            question_id: question_id.to_string(),
            payload: SavePayload::Reset {
                user_id: attempt.user_id.clone(),
                attempt_id: attempt.attempt_id.clone(),
                section: state.section.clone(),
            },
        })
    }

    /// 快照落盘（尽力而为，失败只告警）
    fn persist(&mut self, force: bool) {
        let Some(attempt) = self.attempt.as_ref() else {
            return;
        };
        let snapshot = SessionSnapshot {
            attempt_id: attempt.attempt_id.clone(),
            user_id: attempt.user_id.clone(),
            test_id: attempt.test_id.clone(),
            position: self.position,
            started: self.phase != Phase::NotStarted,
            start_time: attempt.start_time,
            remaining_secs: self.timer.remaining_secs(),
            states: self.store.ordered_states(),
        };

        let outcome = if force {
            self.snapshots.save_forced(&snapshot).map(|_| true)
        } else {
            self.snapshots.save(&snapshot)
        };
        if let Err(e) = outcome {
            warn!("⚠️ 快照写入失败（忽略）: {}", e);
        }
    }
}
