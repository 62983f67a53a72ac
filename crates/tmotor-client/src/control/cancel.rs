//! 取消令牌
//!
//! 循环类控制流程每个周期检查一次令牌；被取消后写入安全停止命令并返回
//! `Cancelled` 结果。令牌可跨线程克隆（如交给 Ctrl-C 处理器）。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 取消令牌
///
/// 所有克隆共享同一个标志位。
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消（幂等）
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// 是否已请求取消
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = CancelToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());

        handle.cancel();
        assert!(token.is_cancelled());

        handle.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_cancel_from_other_thread() {
        let token = CancelToken::new();
        let handle = token.clone();
        std::thread::spawn(move || handle.cancel()).join().unwrap();
        assert!(token.is_cancelled());
    }
}
