use crate::prelude::*;
use clap::Parser;

mod error;
mod llm;
mod ocr;
mod pipeline;
mod prelude;
mod raster;
mod render;
mod repair;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Extract structured fields from scanned property deeds and show where each was found"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "DEEDSCAN_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// OCR a deed, extract its fields and render the annotated pages
    Run(crate::pipeline::RunOptions),

    /// OCR a deed and print the recognized text
    Ocr(crate::ocr::OcrOptions),

    /// Repair a raw model response into canonical JSON
    Repair(crate::repair::RepairOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Run(options) => crate::pipeline::run(options, app.global).await,
        SubCommands::Ocr(options) => crate::ocr::run(options, app.global).await,
        SubCommands::Repair(options) => crate::repair::run(options, app.global).await,
    }
}
