//! # Take Test Engine
//!
//! 一个限时在线考试的答题会话引擎
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `clients/` - HTTP 客户端，唯一的网络出口
//! - `ExamApi` - 考试后端能力契约（开考 / 保存 / 提交）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，彼此独立
//! - `Countdown` - 倒计时能力（整卷 / 顺序两种模式）
//! - `AutosaveController` - 防抖自动保存能力
//! - `IntegrityMonitor` - 切屏 / 全屏完整性监控能力
//! - `SnapshotStore` - 本地快照持久化能力
//! - `score_locally` - 本地预估评分能力
//!
//! ### ③ 状态层（Session State）
//! - `session/state_store` - 题目状态表，单一更新路径
//! - `session/navigation` - 单向区域推进规则
//!
//! ### ④ 编排层（Orchestration）
//! - `session/orchestrator` - 会话状态机，串起开考到成绩的完整流程
//! - `app` - 终端宿主，心跳与命令驱动
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod utils;

// 重新导出常用类型
pub use app::App;
pub use clients::{ExamApi, ExamClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Position, Question, QuestionStatus, Section, TestMeta};
pub use session::{ExamSession, NavOutcome, Phase, SessionView, TickOutcome};
