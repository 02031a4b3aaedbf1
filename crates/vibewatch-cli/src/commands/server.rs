use std::sync::Arc;

use vibewatch_core::{CollectionController, Result, SimulatedAcquisition, SimulatedSensor};

pub fn run(
    host: &str,
    port: u16,
    config_path: Option<&str>,
    level: Option<&str>,
    interval: Option<&str>,
    autostart: bool,
) -> Result<()> {
    let config = super::load_config(config_path, level, interval)?;
    let table = config.range_table();
    let controller = Arc::new(CollectionController::from_config(
        &config,
        Box::new(SimulatedSensor::new(&table)),
        Box::new(SimulatedAcquisition::new()),
    ));

    let base = format!("http://{host}:{port}");
    println!("📳 vibewatch server v{}", vibewatch_core::VERSION);
    println!("   {base}");
    println!(
        "   speed level {}, polling every {}ms",
        config.speed_level, config.poll_interval_ms
    );
    println!();
    println!("   Endpoints:");
    println!("     GET  /                API index (try: curl {base})");
    println!("     GET  /status          Live window, classification, counts");
    println!("     GET  /ranges          Active threshold table");
    println!("     GET  /verdict         Verdict of the last stopped session");
    println!("     GET  /classify        Classify one reading (x, y, z)");
    println!("     POST /session/start   Begin collecting");
    println!("     POST /session/stop    Stop and return the session report");
    println!();
    println!("   Examples:");
    println!("     curl -X POST {base}/session/start");
    println!("     curl {base}/status");
    println!("     curl '{base}/classify?x=6.1&y=-4.2&z=19.9'");
    println!();
    println!("   Ctrl+C stops any running session and shuts down.");
    println!();

    if autostart {
        controller.start()?;
    }

    let rt = tokio::runtime::Runtime::new()?;
    let report = match rt.block_on(vibewatch_server::run_server(
        Arc::clone(&controller),
        host,
        port,
    )) {
        Ok(report) => report,
        Err(e) => {
            // Bind failures return before the server could stop an autostarted session.
            controller.stop();
            return Err(e.into());
        }
    };
    if let Some(report) = report {
        println!();
        println!(
            "Session {} stopped on shutdown: {} (risk index {:.2}, {} samples)",
            report.session_id, report.verdict.tier, report.verdict.risk_index, report.recorded
        );
    }
    Ok(())
}
