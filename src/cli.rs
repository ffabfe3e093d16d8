use anyhow::Result;
use mystery_shorts::config::Config;
use mystery_shorts::init;
use mystery_shorts::pipeline::{build_pipeline, Step};

const DEFAULT_TOPIC: &str = "The deadly secret of the Fugu fish";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let topic = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let topic = if topic.is_empty() {
        DEFAULT_TOPIC.to_string()
    } else {
        topic
    };

    let cfg = Config::load("config.json").await?;
    init::ensure_directories(&cfg.output_dir).await?;
    let mut pipeline = build_pipeline(&cfg)?;

    pipeline.start_generation(&topic).await;

    let state = pipeline.state();
    eprintln!("[{}] {}", state.step.as_str(), state.message);

    if state.step != Step::Finished {
        std::process::exit(1);
    }

    if let Some(script) = pipeline.script() {
        println!("Title: {}", script.title);
        println!("Narration: {}", script.narration_text());
    }
    if let Some(path) = pipeline.video_path() {
        println!("Video: {}", path.display());
    }

    Ok(())
}
