use anyhow::{anyhow, Result};
use studio_tracker::{ClientConfig, HttpJobApi, JobApi};

use crate::cli::StoryArgs;

pub async fn run(config: ClientConfig, args: StoryArgs) -> Result<()> {
    let request = args.to_request()?;
    let api = HttpJobApi::with_timeout(config.api_url, config.http_timeout)?;

    tracing::debug!(model = %request.model, "Requesting story");
    let story = api
        .generate_story(&request)
        .await
        .map_err(|e| anyhow!("Failed to generate story: {}", e.user_message()))?;

    println!("{story}");
    Ok(())
}
