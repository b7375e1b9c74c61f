//! 终端编排器：主控循环
//!
//! 负责：组装数据服务/登录态/查询层，建立 cmd/state 两条通道，并在后台任务中
//! 消费 UI 命令、后台任务结果与每秒一次的时钟，每次变更后发布新的 UiState。

use std::time::Duration;

use tokio::sync::{mpsc, watch};

use crate::config::AppConfig;
use crate::core::kiosk::{Command, Kiosk, KioskContext, Update};
use crate::core::UiState;

/// 用已组装好的依赖启动控制器，返回命令发送端与状态接收端
pub fn spawn_kiosk(
    cfg: &AppConfig,
    ctx: KioskContext,
    start_path: &str,
) -> (mpsc::UnboundedSender<Command>, watch::Receiver<UiState>) {
    // 两通道：UI -> Core 命令；Core -> UI 状态快照
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel::<Update>();

    let mut kiosk = Kiosk::new(cfg, ctx, update_tx);
    kiosk.navigate(start_path);
    let (state_tx, state_rx) = watch::channel(kiosk.snapshot());

    tokio::spawn(async move {
        let mut clock = tokio::time::interval(Duration::from_secs(1));
        clock.tick().await;
        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(cmd) => {
                            if !kiosk.handle(cmd) {
                                break;
                            }
                        }
                        None => break,  // cmd_tx 已关闭，退出循环
                    }
                }
                Some(update) = update_rx.recv() => kiosk.apply(update),
                _ = clock.tick() => kiosk.tick(),
            }
            let _ = state_tx.send(kiosk.snapshot());
        }
        tracing::info!("Kiosk controller stopped");
    });

    (cmd_tx, state_rx)
}

/// 按配置创建终端：本地登录态、数据服务、智能体通道、查询层
pub fn create_kiosk(cfg: &AppConfig) -> (mpsc::UnboundedSender<Command>, watch::Receiver<UiState>) {
    let ctx = KioskContext::from_config(cfg);
    tracing::info!(
        mock = ctx.service.is_mock(),
        agent_channel = ctx.service.emitter().channel_name(),
        authenticated = ctx.auth.is_authenticated(),
        "Starting {}",
        cfg.app.name
    );
    spawn_kiosk(cfg, ctx, "/")
}
