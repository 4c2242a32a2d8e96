use std::process::ExitCode;

use dotenvy::dotenv;
use tokio::runtime::{Builder, Runtime};
use tracing::{error, info};
use uuid::Uuid;

fn init_logging() {
    // .env before the subscriber so RUST_LOG and LOG_FORMAT apply
    dotenv().ok();
    common::utils::logging::init_logging_from_env();
}

/// Worker count from config.toml, else `TOKIO_WORKER_THREADS`, else tokio's default.
fn worker_threads() -> Option<usize> {
    match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg.server.worker_threads,
        Err(_) => std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse().ok()),
    }
}

fn build_runtime(workers: Option<usize>) -> std::io::Result<Runtime> {
    let mut builder = Builder::new_multi_thread();
    builder.enable_all();
    if let Some(n) = workers {
        builder.worker_threads(n);
    }
    builder.build()
}

fn install_panic_hook(instance_id: Uuid) {
    std::panic::set_hook(Box::new(move |panic| {
        error!(app = "payables", %instance_id, message = %panic, "unhandled panic");
    }));
}

fn main() -> ExitCode {
    init_logging();

    let instance_id = Uuid::new_v4();
    install_panic_hook(instance_id);

    let workers = worker_threads();
    let rt = match build_runtime(workers) {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        app = "payables",
        %instance_id,
        pid = std::process::id(),
        version = env!("CARGO_PKG_VERSION"),
        workers = ?workers,
        "starting"
    );

    // run() returns after Ctrl+C once in-flight requests have finished
    match rt.block_on(server::run()) {
        Ok(()) => {
            info!(app = "payables", %instance_id, "stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(app = "payables", %instance_id, error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}
