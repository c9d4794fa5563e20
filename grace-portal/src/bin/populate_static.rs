use std::path::PathBuf;

use clap::Parser;

use grace_portal::assets;
use grace_shared::middleware::LogFormat;

#[derive(Parser)]
#[command(name = "populate-static")]
#[command(about = "Copy images, videos and documents from the original site archive into static/")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Site archive to read
    #[arg(default_value = "Hotel.zip")]
    archive: PathBuf,

    /// Destination directory
    #[arg(short, long, default_value = "static")]
    static_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    grace_shared::middleware::init_tracing("populate-static", LogFormat::Pretty);
    let cli = Cli::parse();

    let report = assets::extract_media(&cli.archive, &cli.static_dir)?;
    println!(
        "Copied {} media files into {} ({} ignored, {} unsafe paths skipped)",
        report.copied,
        cli.static_dir.display(),
        report.ignored,
        report.unsafe_paths
    );
    Ok(())
}
