use streakwatch_core::{CheckReport, Config};

use super::{build_service, CliResult};

/// Exit code for a check that could not reach GitHub.
const EXIT_CONNECTION_ERROR: i32 = 2;

pub async fn run(json: bool) -> CliResult {
    let config = Config::load()?;
    let service = build_service(&config)?;

    let report = service.check_now().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary());
    }

    if report == CheckReport::ConnectionError {
        std::process::exit(EXIT_CONNECTION_ERROR);
    }
    Ok(())
}
