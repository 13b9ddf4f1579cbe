use serde::Deserialize;
use std::path::Path;

use crate::error::AppResult;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 考试服务端 API 地址
    pub api_base_url: String,
    /// 当前用户ID
    pub user_id: String,
    /// 要作答的试卷ID
    pub test_id: String,
    /// 网络请求超时（秒）
    pub request_timeout_secs: u64,
    /// 多选题自动保存的防抖窗口（毫秒）
    pub autosave_debounce_ms: u64,
    /// 快照写入的最小间隔（毫秒），避免频繁落盘
    pub snapshot_min_interval_ms: u64,
    /// 切屏（页面隐藏）次数上限，达到后强制交卷
    pub tab_switch_limit: u32,
    /// 本地快照存放目录
    pub snapshot_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://exam-api.example.cn".to_string(),
            user_id: String::new(),
            test_id: String::new(),
            request_timeout_secs: 20,
            autosave_debounce_ms: 500,
            snapshot_min_interval_ms: 1000,
            tab_switch_limit: 3,
            snapshot_dir: "session_snapshots".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("EXAM_API_BASE_URL").unwrap_or(default.api_base_url),
            user_id: std::env::var("EXAM_USER_ID").unwrap_or(default.user_id),
            test_id: std::env::var("EXAM_TEST_ID").unwrap_or(default.test_id),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            autosave_debounce_ms: std::env::var("AUTOSAVE_DEBOUNCE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.autosave_debounce_ms),
            snapshot_min_interval_ms: std::env::var("SNAPSHOT_MIN_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.snapshot_min_interval_ms),
            tab_switch_limit: std::env::var("TAB_SWITCH_LIMIT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.tab_switch_limit),
            snapshot_dir: std::env::var("SNAPSHOT_DIR").unwrap_or(default.snapshot_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 从 TOML 配置文件加载
    ///
    /// 缺省字段回落到默认值，环境变量不参与
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 优先读取 config.toml，不存在时回落到环境变量
    pub fn load() -> Self {
        if Path::new("config.toml").exists() {
            match Self::from_file("config.toml") {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("⚠️ config.toml 加载失败，回落到环境变量: {}", e);
                }
            }
        }
        Self::from_env()
    }
}
