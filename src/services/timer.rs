//! 倒计时服务 - 业务能力层
//!
//! 只负责"数秒"，不感知导航和提交流程。
//! 由编排层持有并显式 reset/dispose，不依赖任何界面生命周期。

/// 计时模式，开考时根据配置选定一次，考中不变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// 收集模式：全卷一个倒计时（各区时长之和），导航不重置
    Collective,
    /// 顺序模式：每次切区时重建为该区自身时长
    Sequential,
}

/// 一次 tick 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignal {
    /// 还在倒数，携带剩余秒数
    Tick(u64),
    /// 本周期归零（终态事件，每个周期只发一次）
    Expired,
    /// 计时器未激活
    Idle,
}

/// 倒计时对象
///
/// 编排层每秒调用一次 `tick()`；归零后保持非激活，
/// 直到下一次 `reset()`（顺序模式切区时）
#[derive(Debug)]
pub struct Countdown {
    remaining_secs: u64,
    active: bool,
}

impl Countdown {
    /// 创建并启动倒计时
    pub fn new(duration_secs: u64) -> Self {
        Self {
            remaining_secs: duration_secs,
            active: duration_secs > 0,
        }
    }

    /// 重置为新的时长并重新启动
    pub fn reset(&mut self, duration_secs: u64) {
        self.remaining_secs = duration_secs;
        self.active = duration_secs > 0;
    }

    /// 停止计时（提交后调用）
    pub fn dispose(&mut self) {
        self.active = false;
    }

    /// 剩余秒数（快照用）
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// 恢复会话时直接写入服务端给出的剩余秒数
    pub fn restore(&mut self, remaining_secs: u64) {
        self.remaining_secs = remaining_secs;
        self.active = remaining_secs > 0;
    }

    /// 前进一秒
    pub fn tick(&mut self) -> TimerSignal {
        if !self.active {
            return TimerSignal::Idle;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);

        if self.remaining_secs == 0 {
            self.active = false;
            TimerSignal::Expired
        } else {
            TimerSignal::Tick(self.remaining_secs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_counts_down_to_expiry() {
        let mut timer = Countdown::new(3);

        assert_eq!(timer.tick(), TimerSignal::Tick(2));
        assert_eq!(timer.tick(), TimerSignal::Tick(1));
        assert_eq!(timer.tick(), TimerSignal::Expired);
        // 归零后不再重复发终态事件
        assert_eq!(timer.tick(), TimerSignal::Idle);
    }

    #[test]
    fn reset_restarts_the_countdown() {
        let mut timer = Countdown::new(1);
        assert_eq!(timer.tick(), TimerSignal::Expired);

        timer.reset(120);
        assert_eq!(timer.remaining_secs(), 120);
        assert_eq!(timer.tick(), TimerSignal::Tick(119));
    }

    #[test]
    fn dispose_stops_ticking() {
        let mut timer = Countdown::new(60);
        timer.dispose();
        assert_eq!(timer.tick(), TimerSignal::Idle);
        assert_eq!(timer.remaining_secs(), 60);
    }
}
