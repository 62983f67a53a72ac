//! 会话建立
//!
//! 合并配置文件与命令行覆盖项，创建仿真执行器会话，并把 Ctrl-C 接到取消令牌上。

use std::path::PathBuf;

use anyhow::{Context, Result};
use tmotor_sdk::client::MotorConfigBuilder;
use tmotor_sdk::prelude::*;
use tracing::info;

/// 全局连接参数
#[derive(Debug, Clone, Default)]
pub struct ConnectionArgs {
    pub config: Option<PathBuf>,
    pub motor_id: Option<u8>,
    pub motor_type: Option<String>,
    pub interface: Option<String>,
}

impl ConnectionArgs {
    /// 解析最终配置（命令行参数优先于配置文件）
    pub fn resolve_config(&self) -> Result<MotorConfig> {
        let base = match &self.config {
            Some(path) => MotorConfig::from_toml_file(path)
                .with_context(|| format!("加载配置文件失败: {}", path.display()))?,
            None => MotorConfig::default(),
        };

        let mut builder = MotorConfigBuilder::from(base);
        if let Some(id) = self.motor_id {
            builder = builder.motor_id(id);
        }
        if let Some(motor_type) = &self.motor_type {
            builder = builder.motor_type(motor_type.clone());
        }
        if let Some(interface) = &self.interface {
            builder = builder.interface(interface.clone());
        }
        builder.build().context("配置无效")
    }

    /// 创建会话（未上电）
    pub fn open(&self) -> Result<ActuatorSession<SimulatedActuator>> {
        let config = self.resolve_config()?;
        info!(
            "Using simulated {} (id={}) in place of {}",
            config.motor_type(),
            config.motor_id(),
            config.interface()
        );
        println!(
            "🔌 {} id={} @ {}（仿真）",
            config.motor_type(),
            config.motor_id(),
            config.interface()
        );
        let driver = SimulatedActuator::for_model(config.motor_type());
        Ok(ActuatorSession::new(driver, config))
    }
}

/// 安装 Ctrl-C 处理器，返回对应的取消令牌
pub fn cancel_on_ctrlc() -> Result<CancelToken> {
    let token = CancelToken::new();
    let handle = token.clone();
    ctrlc::set_handler(move || {
        eprintln!("\n⚠️  收到 Ctrl-C，正在停止...");
        handle.cancel();
    })
    .context("无法安装 Ctrl-C 处理器")?;
    Ok(token)
}

/// 锁存命令后保持，直到 Ctrl-C
pub fn wait_for_cancel(
    session: &mut ActuatorSession<SimulatedActuator>,
    cancel: &CancelToken,
) -> Result<()> {
    println!("🔒 命令已锁存，按 Ctrl-C 停止");
    let period = session.config().control_period();
    while !cancel.is_cancelled() {
        session.update()?;
        spin_sleep::sleep(period);
    }
    Ok(())
}

/// 打印一行反馈
pub fn print_feedback(label: &str, session: &ActuatorSession<SimulatedActuator>) {
    let fb = session.feedback();
    println!(
        "{} pos={:+.4} rad  vel={:+.3} rad/s  tau={:+.3} Nm  temp={:.1}°C",
        label, fb.position, fb.velocity, fb.torque, fb.temperature
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = ConnectionArgs::default().resolve_config().unwrap();
        assert_eq!(config, MotorConfig::default());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "motor_id = 4\nmotor_type = \"AK70-10\"").unwrap();

        let args = ConnectionArgs {
            config: Some(file.path().to_path_buf()),
            motor_id: Some(7),
            ..Default::default()
        };
        let config = args.resolve_config().unwrap();
        assert_eq!(config.motor_id(), 7);
        assert_eq!(config.motor_type(), "AK70-10");
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = ConnectionArgs {
            motor_id: Some(40),
            ..Default::default()
        };
        assert!(args.resolve_config().is_err());

        let args = ConnectionArgs {
            interface: Some("eth0".to_string()),
            ..Default::default()
        };
        assert!(args.resolve_config().is_err());
    }
}
