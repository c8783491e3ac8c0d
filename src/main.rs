use std::{future::Future, process::Stdio};

use config::Config;
use daemon::Daemon;
use error::NiriStatusError;
use publish::{Eww, FileSink, Publisher};
use tokio::{
    io::BufReader,
    process::{Child, Command},
    signal::unix::{signal, SignalKind},
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod daemon;
mod error;
mod event;
mod objects;
mod publish;
mod state;

#[tokio::main]
async fn main() -> Result<(), NiriStatusError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .without_time()
        .init();

    let config = Config::from_env()?;
    debug!(?config, "Configuration");

    let file_sink = FileSink::new(&config.status_path);
    info!(path = %file_sink.path().display(), "Publishing status");
    let mut publisher = Publisher::new().with_sink(file_sink);
    if let Some(var) = &config.eww_var {
        // This checks if it can find an eww instance in your path
        let eww = Eww::new(var.clone())?;
        debug!("Eww executable: {}", eww.binary);
        publisher = publisher.with_sink(eww);
    }

    let mut child = spawn_source(&config)?;
    let stdout = child.stdout.take().ok_or(NiriStatusError::NoStdout)?;

    let mut daemon = Daemon::new(publisher);

    tokio::select! {
        res = daemon.run(BufReader::new(stdout)) => {
            if let Err(e) = res {
                error!("Error in event loop: {e}");
                return Err(e.into());
            }
            match child.wait().await {
                Ok(status) => info!(%status, "Event source exited"),
                Err(e) => warn!("Could not collect event source exit status: {e}"),
            }
        }
        _ = shutdown_signal() => {
            info!("Termination signal received. Shutting down");
            if let Err(e) = child.start_kill() {
                warn!("Could not stop event source: {e}");
            }
        }
    }

    Ok(())
}

#[tracing::instrument(skip_all, fields(program = %config.source_program))]
fn spawn_source(config: &Config) -> Result<Child, NiriStatusError> {
    let child = Command::new(&config.source_program)
        .args(&config.source_args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| NiriStatusError::Spawn {
            program: config.source_program.clone(),
            source,
        })?;

    info!(args = ?config.source_args, "Spawned event source");
    Ok(child)
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("Could not listen for SIGTERM: {e}");
            None
        }
    };

    let sigterm = async {
        match terminate.as_mut() {
            Some(s) => {
                s.recv().await;
            }
            None => std::future::pending::<()>().await,
        }
    };

    first_signal(tokio::signal::ctrl_c(), sigterm).await;
}

/// Resolves once either signal fires. A SIGINT listener that failed to register never resolves.
async fn first_signal(
    sigint: impl Future<Output = std::io::Result<()>>,
    sigterm: impl Future<Output = ()>,
) {
    let sigint = async {
        if let Err(e) = sigint.await {
            warn!("Could not listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = sigint => {}
        _ = sigterm => {}
    }
}
