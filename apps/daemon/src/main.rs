use anyhow::Context;
use clap::Parser;
use ptf::domain::config::FrameworkConfig;
use ptf::kernel::config::load_config;
use ptf::logger::Logger;
use ptf_daemon::Daemon;
use ptf_daemon::args::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg: FrameworkConfig = load_config(cli.config.as_deref()).context("Critical: Configuration is malformed")?;

    let _log = Logger::from_config(&cfg.logging)?;
    tracing::info!(features = ?ptf::features::ENABLED, "Daemon starting");

    let summary = Daemon::builder()
        .config(cfg)
        .events(cli.events.into_iter().map(|arg| arg.0))
        .activity(cli.activity)
        .build()
        .run()?;

    tracing::info!(
        executed = summary.executed,
        policy_events = summary.policy_events,
        activity = summary.activity.len(),
        "Daemon finished"
    );
    Ok(())
}
