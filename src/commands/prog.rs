//! Prog command implementation

use indicatif::{ProgressBar, ProgressStyle};
use pixiprog_core::image::ImageTable;
use pixiprog_core::loader::{self, LoadProgress, LoaderConfig};
use pixiprog_core::port::ConfigPort;
use pixiprog_core::transport::RegisterTransport;
use pixiprog_core::Result;
use std::path::Path;

/// Progress reporter using an indicatif progress bar
///
/// The bar is positioned from the decile events, so it advances in ten
/// steps; that is all the resolution the transfer reports.
#[derive(Default)]
struct IndicatifProgress {
    bar: Option<ProgressBar>,
}

impl LoadProgress for IndicatifProgress {
    fn begin(&mut self, total_bytes: usize) {
        let pb = ProgressBar::new(total_bytes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} Configuring",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        self.bar = Some(pb);
    }

    fn advance(&mut self, _percent: u32, bytes_sent: usize) {
        if let Some(pb) = &self.bar {
            pb.set_position(bytes_sent as u64);
        }
    }

    fn complete(&mut self) {
        if let Some(pb) = self.bar.take() {
            pb.finish_with_message("Configuration complete");
        }
    }
}

/// Run the loader and print the resulting device version
pub fn run(
    port: &mut dyn ConfigPort,
    transport: &mut dyn RegisterTransport,
    file: Option<&Path>,
) -> Result<()> {
    let images = match file {
        Some(path) => ImageTable::single(path),
        None => ImageTable::pixi_defaults(),
    };

    let mut progress = IndicatifProgress::default();
    let version = loader::run(
        port,
        transport,
        &images,
        &LoaderConfig::default(),
        &mut progress,
    )?;

    println!("FPGA version: {}", version);
    Ok(())
}
