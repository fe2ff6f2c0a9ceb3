//! Generate command handler

use crate::clients::build_http_client;
use crate::config::Config;
use crate::services::RecommendationGenerator;

pub async fn cmd_generate(config: &Config, topic: &str) -> anyhow::Result<()> {
    let http = build_http_client(config.general.request_timeout_seconds)?;
    let generator = RecommendationGenerator::from_config(config, http);

    if generator.is_demo() {
        eprintln!("OPENAI_API_KEY is not set, showing demo data.");
    }

    let response = generator.generate(Some(topic)).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
