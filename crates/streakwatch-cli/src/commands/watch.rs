use std::sync::Arc;

use streakwatch_core::{CheckSchedule, Config, ScheduledReport, Scheduler, SystemClock};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{build_service, CliResult};

pub async fn run() -> CliResult {
    let config = Config::load()?;
    let service = Arc::new(build_service(&config)?);
    let schedule = CheckSchedule::from_config(&config.schedule)?;

    println!(
        "Monitoring {} -- checks at {}",
        config.username.trim(),
        config.schedule.check_times.join(", ")
    );

    let shutdown = CancellationToken::new();
    let (tx, mut rx) = mpsc::channel::<ScheduledReport>(16);

    let scheduler = Scheduler::new(schedule, Arc::new(SystemClock::new(config.github.day_zone)));
    let loop_handle = tokio::spawn(scheduler.run(service, shutdown.clone(), tx));

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received");
            ctrl_c.cancel();
        }
    });

    while let Some(report) = rx.recv().await {
        print_report(&report);
    }

    loop_handle.await?;
    println!("Monitoring stopped");
    Ok(())
}

fn print_report(report: &ScheduledReport) {
    let stamp = report.at.format("%H:%M:%S");
    match &report.result {
        Ok(check) => println!("[{stamp}] {}", check.summary()),
        Err(e) => eprintln!("[{stamp}] failed to save streak: {e}"),
    }
}
