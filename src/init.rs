use anyhow::Result;
use std::path::Path;
use tokio::fs;

/// Creates the configured output directory if it does not exist yet.
/// The same directory the Veo adapter writes clips into.
pub async fn ensure_directories(output_dir: &str) -> Result<()> {
    if !Path::new(output_dir).exists() {
        fs::create_dir_all(output_dir).await?;
        eprintln!("[INFO] Created directory: {}", output_dir);
    }
    Ok(())
}
