//! `dualchat serve`: Start the HTTP server with the chat UI.

use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("DualChat");
    println!("   Listening: http://{}:{}", config.gateway.host, config.gateway.port);
    println!(
        "   Panels:    {}",
        config
            .sessions
            .iter()
            .map(|s| s.title.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    if config.needs_knowledge_base() {
        println!("   Index:     {}", config.knowledge_base.path.display());
    }

    dualchat_gateway::start(config).await?;

    Ok(())
}
