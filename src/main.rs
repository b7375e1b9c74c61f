//! 银行自助终端
//!
//! 入口：加载配置、初始化日志（写入文件，避免破坏 TUI）、创建终端控制器与 TUI，并运行主循环。

use anyhow::Context;
use bank_kiosk::{config::load_config, core::create_kiosk, observability, ui::run_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load configuration")?;

    let log_path =
        observability::init_file(&cfg.app.data_dir()).context("Failed to initialize logging")?;
    tracing::info!("Logging to {}", log_path.display());

    // 创建控制器：返回命令发送端、状态接收端
    let (cmd_tx, state_rx) = create_kiosk(&cfg);

    // 启动 TUI 主循环（消费 state，向 cmd_tx 发送用户指令）
    run_app(state_rx, cmd_tx).await.context("App run failed")?;

    tracing::info!("Kiosk exited");
    Ok(())
}
