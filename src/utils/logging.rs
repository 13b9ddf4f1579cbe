/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::ResultData;

/// 初始化全局日志
///
/// 默认 INFO 级别，可用 RUST_LOG 环境变量覆盖
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `test_id`: 试卷ID
/// - `user_id`: 用户ID
pub fn log_startup(test_id: &str, user_id: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 模拟考试答题会话");
    info!("📄 试卷: {}", test_id);
    info!("👤 用户: {}", user_id);
    info!("{}", "=".repeat(60));
}

/// 记录试卷加载信息
///
/// # 参数
/// - `name`: 试卷名称
/// - `sections`: 区域数量
/// - `questions`: 题目总数
pub fn log_paper_loaded(name: &str, sections: usize, questions: usize) {
    info!("✓ 试卷已加载: {}", name);
    info!("📋 共 {} 个区域 / {} 道题目\n", sections, questions);
}

/// 打印最终成绩
///
/// # 参数
/// - `result`: 服务端返回的权威成绩
pub fn print_final_result(result: &ResultData) {
    info!("\n{}", "=".repeat(60));
    info!("📊 考试结束 - 服务端成绩");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("🏆 得分: {}/{}", result.score, result.max_marks);
    info!("✅ 正确: {}", result.correct);
    info!("❌ 错误: {}", result.wrong);
    info!("⭕ 未作答: {}", result.unattempted);
    info!("⏱️ 用时: {} 秒", result.duration_secs);
    if let Some(sections) = &result.sections {
        for section in sections {
            info!(
                "  {} | {}/{} | 对 {} 错 {} 未答 {}",
                section.name,
                section.score,
                section.max_marks,
                section.correct,
                section.wrong,
                section.unattempted
            );
        }
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
