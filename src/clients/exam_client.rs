/// 考试服务端 API 客户端
///
/// 封装所有与考试服务端相关的调用逻辑
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{ResultData, ResumeData, SaveAnswerRequest, Section, TestMeta};

/// 考试服务端操作契约
///
/// 会话引擎只依赖这个 trait，测试环境可以替换为录制调用的假实现
#[async_trait]
pub trait ExamApi: Send + Sync {
    /// 拉取题库（有序区域及题目/选项）
    async fn fetch_question_bank(&self, user_id: &str, test_id: &str) -> AppResult<Vec<Section>>;

    /// 拉取试卷元信息（区域时长、切换开关、名称）
    async fn fetch_test_meta(&self, user_id: &str, test_id: &str) -> AppResult<TestMeta>;

    /// 开始一次答题记录
    async fn start_attempt(&self, user_id: &str, test_id: &str) -> AppResult<String>;

    /// 恢复中断的答题记录（服务端数据为权威）
    async fn resume_attempt(&self, user_id: &str, attempt_id: &str) -> AppResult<ResumeData>;

    /// 保存/标记单题答案
    async fn save_answer(&self, request: &SaveAnswerRequest) -> AppResult<()>;

    /// 清除单题作答
    async fn reset_answer(
        &self,
        user_id: &str,
        attempt_id: &str,
        section: &str,
        question_id: &str,
    ) -> AppResult<()>;

    /// 提交答题记录，返回权威成绩
    async fn submit_attempt(&self, user_id: &str, attempt_id: &str) -> AppResult<ResultData>;
}

/// 考试服务端 API 客户端
pub struct ExamClient {
    http: reqwest::Client,
    base_url: String,
}

/// 服务端统一响应包装
#[derive(Debug, serde::Deserialize)]
struct ApiEnvelope<T> {
    code: u64,
    message: Option<String>,
    // Option 字段缺省时自然落成 None，这里不能用 serde(default)：
    // 那会给 T 强加 Default 约束
    data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// 检查 code == 200 并取出 data
    fn into_data(self, endpoint: &str) -> AppResult<T> {
        if self.code != 200 {
            return Err(AppError::bad_response(
                endpoint,
                Some(self.code),
                self.message,
            ));
        }
        self.data.ok_or_else(|| {
            AppError::Api(crate::error::ApiError::EmptyResponse {
                endpoint: endpoint.to_string(),
            })
        })
    }
}

impl ExamClient {
    /// 创建新的考试客户端
    ///
    /// 所有请求共用一个客户端级超时（见配置 `request_timeout_secs`）
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 统一的 POST + 解包
    async fn post<T: DeserializeOwned>(&self, endpoint: &str, body: Value) -> AppResult<T> {
        debug!("POST {} Payload: {}", endpoint, body);

        let envelope: ApiEnvelope<T> = self
            .http
            .post(format!("{}/{}", self.base_url, endpoint))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        envelope.into_data(endpoint)
    }

    /// 不关心 data 内容的调用（保存/清除这类只需 ack 的接口）
    async fn post_ack(&self, endpoint: &str, body: Value) -> AppResult<()> {
        debug!("POST {} Payload: {}", endpoint, body);

        let envelope: ApiEnvelope<Value> = self
            .http
            .post(format!("{}/{}", self.base_url, endpoint))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if envelope.code != 200 {
            return Err(AppError::bad_response(
                endpoint,
                Some(envelope.code),
                envelope.message,
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ExamApi for ExamClient {
    async fn fetch_question_bank(&self, user_id: &str, test_id: &str) -> AppResult<Vec<Section>> {
        self.post(
            "api/test/question-bank",
            json!({ "userId": user_id, "testId": test_id }),
        )
        .await
    }

    async fn fetch_test_meta(&self, user_id: &str, test_id: &str) -> AppResult<TestMeta> {
        self.post(
            "api/test/meta",
            json!({ "userId": user_id, "testId": test_id }),
        )
        .await
    }

    async fn start_attempt(&self, user_id: &str, test_id: &str) -> AppResult<String> {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct StartData {
            attempt_id: String,
        }

        let data: StartData = self
            .post(
                "api/attempt/start",
                json!({ "userId": user_id, "testId": test_id }),
            )
            .await?;

        Ok(data.attempt_id)
    }

    async fn resume_attempt(&self, user_id: &str, attempt_id: &str) -> AppResult<ResumeData> {
        self.post(
            "api/attempt/resume",
            json!({ "userId": user_id, "attemptId": attempt_id }),
        )
        .await
    }

    async fn save_answer(&self, request: &SaveAnswerRequest) -> AppResult<()> {
        self.post_ack("api/attempt/save-answer", serde_json::to_value(request)?)
            .await
    }

    async fn reset_answer(
        &self,
        user_id: &str,
        attempt_id: &str,
        section: &str,
        question_id: &str,
    ) -> AppResult<()> {
        self.post_ack(
            "api/attempt/reset-answer",
            json!({
                "userId": user_id,
                "attemptId": attempt_id,
                "section": section,
                "questionId": question_id,
            }),
        )
        .await
    }

    async fn submit_attempt(&self, user_id: &str, attempt_id: &str) -> AppResult<ResultData> {
        self.post(
            "api/attempt/submit",
            json!({ "userId": user_id, "attemptId": attempt_id }),
        )
        .await
    }
}
