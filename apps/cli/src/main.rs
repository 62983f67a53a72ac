//! # TMotor CLI
//!
//! Command-line interface for T-Motor MIT-mode actuator control.
//!
//! 没有链接硬件驱动时，所有命令运行在仿真执行器上（按 `--motor-type` 选择仿真参数）。
//!
//! ```bash
//! # 1 秒内用五次曲线转到 1.57 rad
//! tmotor-cli position --target 1.57 --duration 1.0
//!
//! # 以 2 rad/s 转 3 秒
//! tmotor-cli velocity --target 2.0 --duration 3.0
//!
//! # 曲柄助力/阻力循环，Ctrl-C 结束
//! tmotor-cli --config motor.toml crank --assist 15 --resist -5
//!
//! # 只打印轨迹采样表
//! tmotor-cli plan --start 0 --goal 1.57 --duration 2.0
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tmotor_sdk::MotorError;
use tracing::error;

mod commands;
mod connection;
mod validation;

use commands::{
    CrankCommand, ImpedanceCommand, PlanCommand, PositionCommand, TorqueCommand, VelocityCommand,
};
use connection::ConnectionArgs;

/// TMotor CLI - 执行器命令行工具
#[derive(Parser, Debug)]
#[command(name = "tmotor-cli")]
#[command(about = "Command-line interface for T-Motor MIT-mode actuator control", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML 配置文件
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 电机 ID（覆盖配置）
    #[arg(long, global = true)]
    motor_id: Option<u8>,

    /// 电机型号（覆盖配置）
    #[arg(long, global = true)]
    motor_type: Option<String>,

    /// CAN 接口（覆盖配置）
    #[arg(long, global = true)]
    interface: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 运动到目标位置（阶跃或轨迹跟踪）
    Position {
        #[command(flatten)]
        args: PositionCommand,
    },

    /// 速度控制
    Velocity {
        #[command(flatten)]
        args: VelocityCommand,
    },

    /// 力矩控制
    Torque {
        #[command(flatten)]
        args: TorqueCommand,
    },

    /// 阻抗控制（周期重复同一条 MIT 命令）
    Impedance {
        #[command(flatten)]
        args: ImpedanceCommand,
    },

    /// 曲柄周期力矩循环
    Crank {
        #[command(flatten)]
        args: CrankCommand,
    },

    /// 打印轨迹采样表（不连接执行器）
    Plan {
        #[command(flatten)]
        args: PlanCommand,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(LOG_DIRECTIVES)),
        )
        .init();

    let cli = Cli::parse();
    let connection = ConnectionArgs {
        config: cli.config,
        motor_id: cli.motor_id,
        motor_type: cli.motor_type,
        interface: cli.interface,
    };

    let result = match cli.command {
        Commands::Position { args } => args.execute(&connection),
        Commands::Velocity { args } => args.execute(&connection),
        Commands::Torque { args } => args.execute(&connection),
        Commands::Impedance { args } => args.execute(&connection),
        Commands::Crank { args } => args.execute(&connection),
        Commands::Plan { args } => args.execute(),
    };

    if let Some(e) = result.as_ref().err().filter(|e| is_fatal_failure(e)) {
        error!("Actuator fault: {:#}", e);
        eprintln!("❌ 执行器故障，请检查硬件并冷却后重新上电");
    }
    result
}

/// 错误链中是否包含致命的执行器错误
fn is_fatal_failure(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<MotorError>())
        .any(MotorError::is_fatal)
}

const LOG_DIRECTIVES: &str = "tmotor_cli=info,tmotor_client=info,tmotor_driver=info";

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tmotor-cli",
            "position",
            "--target",
            "1.0",
            "--motor-id",
            "3",
            "--motor-type",
            "AK80-9",
        ])
        .unwrap();
        assert_eq!(cli.motor_id, Some(3));
        assert_eq!(cli.motor_type.as_deref(), Some("AK80-9"));
        assert!(matches!(cli.command, Commands::Position { .. }));
    }

    #[test]
    fn test_fatal_failure_detection() {
        use tmotor_sdk::DriverError;

        let fatal = anyhow::Error::from(MotorError::from(DriverError::device("thermal cutoff")));
        assert!(is_fatal_failure(&fatal));
        assert!(is_fatal_failure(&fatal.context("position command failed")));

        let transient = anyhow::Error::from(MotorError::from(DriverError::Timeout));
        assert!(!is_fatal_failure(&transient));
        assert!(!is_fatal_failure(&anyhow::Error::from(MotorError::NotEnabled)));
        assert!(!is_fatal_failure(&anyhow::anyhow!("bad input")));
    }

    #[test]
    fn test_negative_values_parse() {
        let cli = Cli::try_parse_from(["tmotor-cli", "torque", "--target", "-2.5"]).unwrap();
        match cli.command {
            Commands::Torque { args } => assert_eq!(args.target, -2.5),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
