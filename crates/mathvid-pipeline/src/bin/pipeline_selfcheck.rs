use std::path::Path;

use mathvid_ai::{ElevenLabsConfig, GeminiConfig};
use mathvid_media::check_tool;
use mathvid_pipeline::PipelineConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = PipelineConfig::from_env();

    println!(
        "pipeline-selfcheck: starting with media_root={} output_dir={} scratch_dir={}",
        config.media_root.display(),
        config.output_dir.display(),
        config.scratch_dir.display()
    );

    for dir in config.writable_dirs() {
        ensure_writable(dir).await?;
    }
    for tool in [&config.manim_bin, &config.ffmpeg_bin, &config.ffprobe_bin] {
        let resolved = check_tool(tool).map_err(|e| anyhow::anyhow!("{}", e))?;
        println!("pipeline-selfcheck: {} -> {}", tool, resolved.display());
    }
    GeminiConfig::from_env()?;
    ElevenLabsConfig::from_env()?;

    println!("pipeline-selfcheck: ok");
    Ok(())
}

async fn ensure_writable(dir: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    let probe = dir.join(".selfcheck");
    tokio::fs::write(&probe, b"ok")
        .await
        .map_err(|e| anyhow::anyhow!("{} is not writable: {}", dir.display(), e))?;
    tokio::fs::remove_file(&probe).await?;
    Ok(())
}
