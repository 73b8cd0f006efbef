// CLASSIFICATION: COMMUNITY
// Filename: espresso.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use log::info;

use espresso_kernel::config::{ConfigStorage, Settings};
use espresso_kernel::cpu::HostCpu;
use espresso_kernel::host::{offline_services, HostLoader, OfflineProcessManager};
use espresso_kernel::{logging, Kernel};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(name = "espresso", about = "Boot the emulated kernel on host threads", version = "0.1")]
struct Cli {
    /// Executable launched when no title is prepared
    executable: Option<String>,
    /// Settings file (defaults to $ESPRESSO_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
    /// TOML title info served as the prepared title
    #[arg(long)]
    title: Option<PathBuf>,
    /// Directory executables are resolved against
    #[arg(long, default_value = ".")]
    content_dir: PathBuf,
    #[arg(long)]
    branch_trace: bool,
    /// Stop the kernel after this many seconds at the latest
    #[arg(long)]
    run_for: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::load_active(),
    };
    settings.log.branch_trace |= cli.branch_trace;
    logging::init(&settings.log);

    let process_manager = match &cli.title {
        Some(path) => OfflineProcessManager::from_file(path)?,
        None => OfflineProcessManager::default(),
    };
    let services = offline_services(
        Arc::new(HostCpu::new()),
        process_manager,
        HostLoader::new(cli.content_dir.clone()),
    );
    let kernel = Kernel::new(services, ConfigStorage::new(settings))?;
    if let Some(executable) = cli.executable {
        kernel.set_executable_filename(executable);
    }

    kernel.start()?;
    let deadline = cli.run_for.map(|secs| Instant::now() + Duration::from_secs(secs));
    // Nothing hands out sub core contexts here, so an idle main core means
    // the run is over.
    while !kernel.has_exited()
        && !kernel.is_quiescent()
        && deadline.map_or(true, |deadline| Instant::now() < deadline)
    {
        thread::sleep(POLL_INTERVAL);
    }
    if kernel.is_quiescent() {
        info!("no guest is running, stopping");
    }
    kernel.stop();
    kernel.join();
    info!("kernel exited: {}", kernel.has_exited());
    Ok(())
}
