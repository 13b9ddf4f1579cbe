//! 应用入口 - 编排顶层
//!
//! ## 职责
//!
//! - 组装 HTTP 客户端与会话编排器
//! - 并发拉取题库与试卷元数据
//! - 以 1 秒心跳 + 标准输入命令驱动会话（终端宿主）
//!
//! 渲染只依赖 `SessionView`，引擎本体对宿主形态无感知。

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use crate::clients::{ExamApi, ExamClient};
use crate::config::Config;
use crate::models::{total_questions, Position, QuestionStatus, Section, TestMeta};
use crate::services::{IntegrityEvent, NoopProctor};
use crate::session::{ExamSession, NavOutcome, Phase, SessionView, TickOutcome};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    session: ExamSession,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::log_startup(&config.test_id, &config.user_id);

        let api: Arc<dyn ExamApi> = Arc::new(ExamClient::new(&config)?);

        // 题库与元数据并发拉取
        let (sections, meta) = futures::future::try_join(
            api.fetch_question_bank(&config.user_id, &config.test_id),
            api.fetch_test_meta(&config.user_id, &config.test_id),
        )
        .await?;

        logging::log_paper_loaded(&meta.name, sections.len(), total_questions(&sections));
        log_sections(&sections, &meta);

        let session = ExamSession::new(config, meta, sections, api, Arc::new(NoopProctor));
        Ok(Self { session })
    }

    /// 运行应用主逻辑
    pub async fn run(&mut self) -> Result<()> {
        self.session.start_or_resume(None).await?;
        render(&self.session.view());
        print_help();

        let mut ticker = interval(Duration::from_secs(1));
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.session.handle_tick().await {
                        Ok(TickOutcome::SectionAdvanced(pos)) => {
                            info!("➡️ 已自动进入区域 {}", pos.section_index);
                            render(&self.session.view());
                        }
                        Ok(TickOutcome::Submitted(_)) => break,
                        Ok(_) => {}
                        Err(e) => warn!("⚠️ 到时提交失败，继续等待重试: {}", e),
                    }
                }
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if self.dispatch(line.trim()).await? {
                        break;
                    }
                }
            }

            if self.session.phase() == Phase::Completed {
                break;
            }
        }

        if let Some(result) = self.session.result() {
            logging::print_final_result(result);
        }
        Ok(())
    }

    /// 处理一条终端命令，返回 true 表示退出主循环
    async fn dispatch(&mut self, line: &str) -> Result<bool> {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");

        match command {
            "" => {}
            "v" | "view" => render(&self.session.view()),
            "a" | "answer" => {
                let selected: Vec<String> = parts.map(str::to_string).collect();
                if let Err(e) = self.session.select_answer(selected) {
                    warn!("⚠️ 作答失败: {}", e);
                }
            }
            "c" | "clear" => {
                if let Err(e) = self.session.clear_response() {
                    warn!("⚠️ 清除失败: {}", e);
                }
            }
            "n" | "next" => {
                let outcome = self.session.next();
                self.report_nav(outcome);
            }
            "p" | "prev" => {
                let outcome = self.session.previous();
                self.report_nav(outcome);
            }
            "m" | "mark" => {
                let outcome = self.session.mark_and_next();
                self.report_nav(outcome);
            }
            "g" | "goto" => {
                let section = parts.next().and_then(|s| s.parse().ok());
                let question = parts.next().and_then(|s| s.parse().ok());
                match (section, question) {
                    (Some(s), Some(q)) => {
                        let outcome = self.session.jump_to(Position::new(s, q));
                        self.report_nav(outcome);
                    }
                    _ => warn!("用法: goto <区域下标> <题目下标>"),
                }
            }
            "y" | "yes" => self.confirm().await?,
            "no" => {
                self.session.cancel_section_change();
                self.session.cancel_submit();
                info!("已取消，继续作答");
            }
            "submit" => {
                if let Some(estimate) = self.session.provisional_result() {
                    info!(
                        "📊 本地预估: {}/{}（以服务端判分为准）",
                        estimate.score, estimate.max_marks
                    );
                }
                match self.session.submit().await {
                    Ok(_) => return Ok(true),
                    Err(e) => warn!("⚠️ 提交失败，可重试: {}", e),
                }
            }
            // 以下三条模拟宿主上报的完整性信号
            "hide" => self.integrity(IntegrityEvent::VisibilityHidden).await?,
            "show" => self.integrity(IntegrityEvent::VisibilityVisible).await?,
            "fsexit" => self.integrity(IntegrityEvent::FullscreenExited).await?,
            "h" | "help" => print_help(),
            "q" | "quit" => {
                info!("退出终端（会话进度已在本地快照中）");
                return Ok(true);
            }
            other => warn!("未知命令: {}（输入 help 查看命令）", other),
        }

        Ok(self.session.phase() == Phase::Completed)
    }

    fn report_nav(&self, outcome: NavOutcome) {
        match outcome {
            NavOutcome::Moved(_) => render(&self.session.view()),
            NavOutcome::SectionConfirmRequired(target) => {
                info!(
                    "⏸️ 即将进入区域 {}，确认后无法返回当前区域。输入 yes 确认 / no 取消",
                    target.section_index
                );
            }
            NavOutcome::SubmitConfirmRequired => {
                if let Some(estimate) = self.session.provisional_result() {
                    info!(
                        "📊 本地预估: {}/{}（以服务端判分为准）",
                        estimate.score, estimate.max_marks
                    );
                }
                info!("⏸️ 已到全卷末尾。输入 yes 交卷 / no 继续作答");
            }
            NavOutcome::Rejected(e) => warn!("⚠️ 导航被拒绝: {}", e),
        }
    }

    async fn confirm(&mut self) -> Result<()> {
        // 先看跨区确认，再看交卷确认
        if self.session.confirm_section_change()?.is_some() {
            render(&self.session.view());
            return Ok(());
        }
        match self.session.confirm_submit().await {
            Ok(_) => {}
            Err(e) => warn!("⚠️ 确认无效或提交失败: {}", e),
        }
        Ok(())
    }

    async fn integrity(&mut self, event: IntegrityEvent) -> Result<()> {
        if let Err(e) = self.session.on_integrity(event).await {
            warn!("⚠️ 强制提交失败，可输入 submit 重试: {}", e);
        }
        Ok(())
    }
}

/// 渲染当前视图
fn render(view: &SessionView) {
    println!("\n{}", "=".repeat(60));
    println!(
        "  [{}] {} | 第 {} 题 | 剩余 {} 秒 | 切屏 {} 次",
        view.phase,
        view.section_name,
        view.position.question_index + 1,
        view.remaining_secs,
        view.tab_switches
    );
    println!("{}", "=".repeat(60));
    println!("  {}", logging::truncate_text(&view.question.stem, 120));
    if let Some(options) = &view.question.options {
        for option in options {
            println!(
                "    [{}] {}",
                option.id,
                logging::truncate_text(&option.text, 80)
            );
        }
    }
    println!(
        "  进度: 已答 {} / 待复查 {} / 未到达 {} / 共 {}",
        view.stats.attempted, view.stats.marked, view.stats.not_visited, view.stats.total
    );
    print!("  着色:");
    for (_, status) in &view.statuses {
        let glyph = match status {
            QuestionStatus::NotVisited => "·",
            QuestionStatus::Current => "●",
            QuestionStatus::Attempted => "✓",
            QuestionStatus::MarkedForReview => "◆",
        };
        print!(" {}", glyph);
    }
    println!("\n{}", "=".repeat(60));
}

fn log_sections(sections: &[Section], meta: &TestMeta) {
    for (index, section) in sections.iter().enumerate() {
        info!(
            "  区域 {}: {} | {} 题 | {} 分钟 | 对 +{} 错 -{}",
            index,
            section.name,
            section.questions.len(),
            section.duration_minutes,
            section.points_for_correct,
            section.negative_marks
        );
    }
    if meta.section_switching_allowed {
        info!("  模式: 自由切区（总时长统一倒计时）");
    } else {
        info!("  模式: 顺序闯关（每区独立倒计时，到时自动进区）");
    }
}

fn print_help() {
    println!("命令: a <选项>.. 作答 | c 清除 | n 下一题 | p 上一题 | m 标记并下一题");
    println!("      g <区> <题> 跳转 | yes/no 确认 | submit 交卷 | v 视图 | q 退出");
}
