//! 考试完整性监控 - 业务能力层
//!
//! 观察两类宿主信号：页面可见性与全屏状态。
//! 切屏（页面隐藏）计入违规次数，达到上限强制交卷；
//! 退出全屏只触发重新锁定与提醒，不计入上限。
//!
//! 宿主能力（全屏锁、离开拦截）抽象成 `ProctorHost`，
//! 非浏览器环境（测试、终端）可以替换为假实现。

use tracing::{debug, warn};

/// 宿主能力接口
///
/// 浏览器宿主对应 fullscreen API 与 beforeunload 拦截
pub trait ProctorHost: Send + Sync {
    /// 请求进入全屏锁定，返回是否成功
    fn request_fullscreen(&self) -> bool;

    /// 释放全屏
    fn release_fullscreen(&self);

    /// 开关"离开页面前确认"拦截
    fn set_leave_guard(&self, enabled: bool);
}

/// 无操作宿主（终端运行 / 测试用）
pub struct NoopProctor;

impl ProctorHost for NoopProctor {
    fn request_fullscreen(&self) -> bool {
        debug!("请求全屏锁定（宿主无操作）");
        true
    }

    fn release_fullscreen(&self) {
        debug!("释放全屏（宿主无操作）");
    }

    fn set_leave_guard(&self, enabled: bool) {
        debug!("离开拦截: {}", enabled);
    }
}

/// 宿主上报的完整性信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityEvent {
    /// 页面转入隐藏（切屏/最小化）
    VisibilityHidden,
    /// 页面恢复可见
    VisibilityVisible,
    /// 退出了全屏
    FullscreenExited,
}

/// 监控器对一次信号的裁决
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityAction {
    /// 无需处理
    None,
    /// 可关闭的警告，提示还剩几次机会
    Warn { used: u32, remaining: u32 },
    /// 达到上限，强制交卷（每个会话只发一次）
    ForceSubmit,
    /// 重新请求全屏并给出非阻塞提醒
    RelockFullscreen,
}

/// 完整性监控器
///
/// 只做计数与裁决，不执行提交；强制交卷由编排层落实
#[derive(Debug)]
pub struct IntegrityMonitor {
    tab_switches: u32,
    limit: u32,
    /// 强制交卷只触发一次
    tripped: bool,
}

impl IntegrityMonitor {
    pub fn new(limit: u32) -> Self {
        Self {
            tab_switches: 0,
            limit,
            tripped: false,
        }
    }

    /// 恢复会话时带回服务端累计的切屏次数
    pub fn restore(limit: u32, tab_switches: u32) -> Self {
        Self {
            tab_switches,
            limit,
            tripped: tab_switches >= limit,
        }
    }

    /// 已累计的切屏次数
    pub fn tab_switches(&self) -> u32 {
        self.tab_switches
    }

    /// 处理一次宿主信号
    pub fn on_event(&mut self, event: IntegrityEvent) -> IntegrityAction {
        match event {
            IntegrityEvent::VisibilityHidden => {
                if self.tripped {
                    return IntegrityAction::None;
                }

                self.tab_switches += 1;
                warn!("⚠️ 检测到切屏，累计 {}/{}", self.tab_switches, self.limit);

                if self.tab_switches >= self.limit {
                    self.tripped = true;
                    IntegrityAction::ForceSubmit
                } else {
                    IntegrityAction::Warn {
                        used: self.tab_switches,
                        remaining: self.limit - self.tab_switches,
                    }
                }
            }
            IntegrityEvent::VisibilityVisible => IntegrityAction::None,
            IntegrityEvent::FullscreenExited => {
                if self.tripped {
                    IntegrityAction::None
                } else {
                    // 不计入切屏上限，只要求重新锁定
                    IntegrityAction::RelockFullscreen
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warns_below_the_limit() {
        let mut monitor = IntegrityMonitor::new(3);

        assert_eq!(
            monitor.on_event(IntegrityEvent::VisibilityHidden),
            IntegrityAction::Warn { used: 1, remaining: 2 }
        );
        assert_eq!(
            monitor.on_event(IntegrityEvent::VisibilityHidden),
            IntegrityAction::Warn { used: 2, remaining: 1 }
        );
    }

    #[test]
    fn third_hidden_forces_submit_exactly_once() {
        let mut monitor = IntegrityMonitor::new(3);

        monitor.on_event(IntegrityEvent::VisibilityHidden);
        monitor.on_event(IntegrityEvent::VisibilityHidden);
        assert_eq!(
            monitor.on_event(IntegrityEvent::VisibilityHidden),
            IntegrityAction::ForceSubmit
        );
        // 第 4 次不再触发第二次强制交卷
        assert_eq!(
            monitor.on_event(IntegrityEvent::VisibilityHidden),
            IntegrityAction::None
        );
    }

    #[test]
    fn fullscreen_exit_relocks_without_counting() {
        let mut monitor = IntegrityMonitor::new(3);

        assert_eq!(
            monitor.on_event(IntegrityEvent::FullscreenExited),
            IntegrityAction::RelockFullscreen
        );
        assert_eq!(monitor.tab_switches(), 0);
    }

    #[test]
    fn restored_counter_continues_from_server_value() {
        let mut monitor = IntegrityMonitor::restore(3, 2);

        assert_eq!(
            monitor.on_event(IntegrityEvent::VisibilityHidden),
            IntegrityAction::ForceSubmit
        );
    }
}
