//! 推荐模拟（命令行）
//!
//! 向产品目录智能体发送一次固定业务画像的 Recommendation_Request，打印最佳匹配与推荐列表。
//! 启动: cargo run --bin bank-kiosk-simulate [config.toml]

use bank_kiosk::{
    agent::{create_channel_from_config, AgentEmitter, EmitRequest, EventName, PRODUCT_CATALOGUE_AGENT},
    config::load_config,
    core::kiosk::{simulation_payload, SIMULATION_EMPTY, SIMULATION_ERROR},
    observability,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    let cfg = load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load configuration, using defaults");
        Default::default()
    });

    let emitter = AgentEmitter::with_channel(create_channel_from_config(&cfg));
    println!(
        "Sending business profile to agent {} via {} channel",
        PRODUCT_CATALOGUE_AGENT.id,
        emitter.channel_name()
    );

    let request = EmitRequest::new(
        PRODUCT_CATALOGUE_AGENT.id,
        EventName::RecommendationRequest,
        simulation_payload(),
    );
    let result = emitter
        .emit(request)
        .await
        .and_then(|resp| resp.into_recommendation());

    match result {
        Ok(resp) if resp.recommendations.is_empty() => {
            println!("{}", SIMULATION_EMPTY);
        }
        Ok(resp) => {
            if let Some(best) = resp.best_match.as_deref() {
                println!("Best match: {}", best);
            }
            for (i, rec) in resp.recommendations.iter().enumerate() {
                println!("{}. {}", i + 1, rec.product_name);
                println!("   {}", rec.reason);
                for benefit in rec.benefits.iter().flatten() {
                    println!("   - {}", benefit);
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Recommendation request failed");
            println!("{}", SIMULATION_ERROR);
        }
    }
    Ok(())
}
