use std::path::Path;
use tracing::warn;

/// Opens the run's configured output directory in the platform file
/// manager so the user can grab the rendered clip.
pub fn reveal_output_dir(dir: &Path) {
    if dir.as_os_str().is_empty() {
        return;
    }

    #[cfg(target_os = "windows")]
    let result = std::process::Command::new("explorer").arg(dir).spawn();

    #[cfg(target_os = "macos")]
    let result = std::process::Command::new("open").arg(dir).spawn();

    #[cfg(all(unix, not(target_os = "macos")))]
    let result = std::process::Command::new("xdg-open").arg(dir).spawn();

    if let Err(err) = result {
        warn!("failed to open {}: {}", dir.display(), err);
    }
}
