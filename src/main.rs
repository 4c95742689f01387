use std::sync::Arc;

use channel_reaper::config::SweepConfig;
use channel_reaper::error::Result;
use channel_reaper::scheduler;
use channel_reaper::slack::SlackClient;
use channel_reaper::sweep::Sweeper;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Config errors are fatal: the schedule must not be registered at all
    // with a broken configuration.
    let config = SweepConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    eprintln!("🧹 Channel Reaper v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Lookback: {} days of silence before retirement",
        config.days_since_last_interaction
    );
    eprintln!("   Schedule: {} ({})", config.schedule, channel_reaper::config::SCHEDULE_TIMEZONE);

    let client = Arc::new(SlackClient::new(&config));

    // The classifier needs the bot's own identity to tell its messages from
    // human ones.
    let bot_user_id = client.bot_user_id().await?;
    eprintln!("   Bot user: {bot_user_id}\n");

    let sweeper = Arc::new(Sweeper::new(
        client,
        bot_user_id,
        config.days_since_last_interaction,
    ));

    let handle = scheduler::spawn_scheduler(sweeper, config.schedule.clone());

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    eprintln!("Shutting down");
    handle.abort();

    Ok(())
}
