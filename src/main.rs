use clap::Parser;
use spaceballz::amqp::blower::blow;
use spaceballz::amqp::commands::{Cli, Invocation};
use spaceballz::amqp::error::SpaceballzResult;
use spaceballz::amqp::sucker::suck;
use spaceballz::util::go_style_flags;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Resolves on SIGINT, SIGQUIT or SIGTERM.
#[cfg(unix)]
async fn wait_for_signal() -> SpaceballzResult<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut quit = signal(SignalKind::quit())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let received = tokio::select! {
        _ = interrupt.recv() => "interrupt",
        _ = quit.recv() => "quit",
        _ = terminate.recv() => "terminated",
    };
    info!("{}", received);
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> SpaceballzResult<()> {
    tokio::signal::ctrl_c().await?;
    info!("interrupt");
    Ok(())
}

async fn run(invocation: Invocation) -> SpaceballzResult<()> {
    info!("Going to {}", invocation.action());
    match invocation {
        Invocation::Suck { uri, queue } => suck(&uri, &queue, wait_for_signal()).await,
        Invocation::Blow { uri, queue, files } => {
            blow(&uri, &queue, &files, wait_for_signal()).await?;
            Ok(())
        }
    }
}

async fn try_main() -> SpaceballzResult<()> {
    let cli = Cli::parse_from(go_style_flags(std::env::args()));
    run(Invocation::try_from(cli)?).await
}

#[tokio::main]
async fn main() {
    // stdout is reserved for message bodies
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    try_main().await.unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(1);
    });
}
