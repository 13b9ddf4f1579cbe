//! 自动保存服务 - 业务能力层
//!
//! ## 职责
//!
//! 1. **多选题防抖**：选择变化后等待一个静默窗口（默认 500ms）再发保存；
//!    窗口内的新变化会取消并重排旧的待发调用
//! 2. **清空即重置**：多选集合被清空时改发显式的 reset 调用
//! 3. **串行派发**：所有保存请求进入同一个队列，由单个派发任务顺序执行，
//!    同一道题永远不会有两个保存在途
//! 4. **失败吞掉**：保存/重置失败只记日志，不阻塞导航；
//!    最终一致性由提交时的服务端对账兜底
//!
//! 单选题/主观题不走这里的防抖：它们只在显式导航动作里保存，
//! 编排层通过 `push_now` 直接入队。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::clients::ExamApi;
use crate::models::SaveAnswerRequest;

/// 一条待派发的保存请求
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub question_id: String,
    pub payload: SavePayload,
}

/// 保存请求的具体内容
#[derive(Debug, Clone)]
pub enum SavePayload {
    /// 保存当前选择集合（非空）
    Save(SaveAnswerRequest),
    /// 选择集合已清空，发显式重置
    Reset {
        user_id: String,
        attempt_id: String,
        section: String,
    },
}

/// 自动保存控制器
///
/// 只产出 `SaveRequest`，网络调用由 `spawn_dispatch_worker` 的派发任务完成
pub struct AutosaveController {
    tx: mpsc::UnboundedSender<SaveRequest>,
    debounce: Duration,
    /// 每题至多一个待发的防抖任务
    pending: HashMap<String, JoinHandle<()>>,
}

impl AutosaveController {
    /// 创建控制器，返回派发队列的接收端
    pub fn new(debounce: Duration) -> (Self, mpsc::UnboundedReceiver<SaveRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                debounce,
                pending: HashMap::new(),
            },
            rx,
        )
    }

    /// 多选题选择变化：防抖后入队
    ///
    /// 同一道题的新变化会取消旧的待发任务并重新计时
    pub fn schedule(&mut self, request: SaveRequest) {
        let question_id = request.question_id.clone();

        if let Some(handle) = self.pending.remove(&question_id) {
            handle.abort();
        }

        let tx = self.tx.clone();
        let debounce = self.debounce;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            // 接收端随会话一起存活，发送失败说明会话已结束
            if tx.send(request).is_err() {
                debug!("派发队列已关闭，丢弃防抖保存");
            }
        });

        self.pending.insert(question_id, handle);
    }

    /// 显式保存（导航/提交动作触发）：取消该题防抖任务，立即入队
    ///
    /// 入队发生在编排层应用位置变更之前，保证请求先于副作用发出
    pub fn push_now(&mut self, request: SaveRequest) {
        self.cancel(&request.question_id);
        if self.tx.send(request).is_err() {
            debug!("派发队列已关闭，丢弃显式保存");
        }
    }

    /// 取消某题的待发防抖任务（离开该题时调用）
    ///
    /// 已经派发在途的请求不受影响
    pub fn cancel(&mut self, question_id: &str) {
        if let Some(handle) = self.pending.remove(question_id) {
            handle.abort();
        }
    }
}

/// 启动串行派发任务
///
/// 单消费者顺序处理队列，天然保证同一道题的保存互不重叠；
/// 失败按瞬态故障处理：warn 日志 + 吞掉，本地状态不回滚
pub fn spawn_dispatch_worker(
    api: Arc<dyn ExamApi>,
    mut rx: mpsc::UnboundedReceiver<SaveRequest>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            let result = match &request.payload {
                SavePayload::Save(save) => api.save_answer(save).await,
                SavePayload::Reset {
                    user_id,
                    attempt_id,
                    section,
                } => {
                    api.reset_answer(user_id, attempt_id, section, &request.question_id)
                        .await
                }
            };

            match result {
                Ok(()) => debug!("✓ 题目 {} 已保存", request.question_id),
                Err(e) => {
                    warn!("⚠️ 题目 {} 保存失败（已忽略）: {}", request.question_id, e);
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionStatus;

    fn save_request(question_id: &str, selected: &[&str]) -> SaveRequest {
        SaveRequest {
            question_id: question_id.to_string(),
            payload: SavePayload::Save(SaveAnswerRequest {
                attempt_id: "a1".to_string(),
                user_id: "u1".to_string(),
                section: "物理".to_string(),
                question_id: question_id.to_string(),
                selected_ids: selected.iter().map(|s| s.to_string()).collect(),
                status: QuestionStatus::Attempted,
                elapsed_secs: 0,
            }),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_keeps_only_the_last_selection() {
        let (mut controller, mut rx) = AutosaveController::new(Duration::from_millis(500));

        // 防抖窗口内连续三次变化，只有最后一次应该落地
        controller.schedule(save_request("q1", &["A"]));
        tokio::time::sleep(Duration::from_millis(100)).await;
        controller.schedule(save_request("q1", &["A", "B"]));
        tokio::time::sleep(Duration::from_millis(100)).await;
        controller.schedule(save_request("q1", &["B", "C"]));

        let delivered = rx.recv().await.expect("应派发一条保存请求");
        match delivered.payload {
            SavePayload::Save(save) => assert_eq!(save.selected_ids, vec!["B", "C"]),
            other => panic!("期望 Save，实际: {:?}", other),
        }

        // 队列中不应再有第二条
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_the_pending_save() {
        let (mut controller, mut rx) = AutosaveController::new(Duration::from_millis(500));

        controller.schedule(save_request("q1", &["A"]));
        controller.cancel("q1");

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn push_now_bypasses_the_debounce_window() {
        let (mut controller, mut rx) = AutosaveController::new(Duration::from_millis(500));

        // 先排一个防抖保存，再显式保存同一道题：防抖版应被取消
        controller.schedule(save_request("q1", &["A"]));
        controller.push_now(save_request("q1", &["A", "B"]));

        let delivered = rx.recv().await.expect("应立即派发");
        match delivered.payload {
            SavePayload::Save(save) => assert_eq!(save.selected_ids, vec!["A", "B"]),
            other => panic!("期望 Save，实际: {:?}", other),
        }

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(rx.try_recv().is_err());
    }
}
