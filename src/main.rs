use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use log::error;
use tokio::net::TcpListener;

use httpfilterproxy::{listener, opts, stats::ProxyStats};

fn main() -> ExitCode {
    let Ok(proc_args) = opts::parse_args() else {
        return ExitCode::from(255);
    };

    env_logger::init();

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start Tokio runtime")
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("{e:?}");
            return ExitCode::from(1);
        }
    };

    match rt.block_on(run(proc_args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:?}");
            ExitCode::from(1)
        }
    }
}

async fn run(proc_args: opts::ProcArgs) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", proc_args.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("listening on {addr}");

    let stats = Arc::new(ProxyStats::new());
    listener::run(listener, stats, listener::shutdown_signal()).await;
    Ok(())
}
