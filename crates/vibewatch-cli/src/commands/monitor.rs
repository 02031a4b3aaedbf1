use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use vibewatch_core::{
    ClassificationResult, CollectionController, MonitorConfig, ReplaySensor, Result, Sample,
    Schedule, SensorSource, SessionReport, SimulatedSensor, TickOutcome, classify,
};

pub struct MonitorCommandConfig<'a> {
    pub config_path: Option<&'a str>,
    pub level: Option<&'a str>,
    pub interval: Option<&'a str>,
    pub duration: Option<&'a str>,
    pub ticks: Option<u64>,
    pub replay_path: Option<&'a str>,
    pub seed: Option<u64>,
    pub anomaly_rate: f64,
    pub attach_model: bool,
    pub output_path: Option<&'a str>,
}

fn make_sensor(
    cfg: &MonitorCommandConfig<'_>,
    config: &MonitorConfig,
) -> Result<Box<dyn SensorSource>> {
    if let Some(path) = cfg.replay_path {
        return Ok(Box::new(ReplaySensor::from_json_file(std::path::Path::new(path))?));
    }
    let table = config.range_table();
    let sensor = match cfg.seed {
        Some(seed) => SimulatedSensor::seeded(&table, seed),
        None => SimulatedSensor::new(&table),
    };
    Ok(Box::new(sensor.with_anomaly_probability(cfg.anomaly_rate)))
}

pub fn run(cfg: MonitorCommandConfig<'_>) -> Result<()> {
    let config = super::load_config(cfg.config_path, cfg.level, cfg.interval)?;
    let max_duration = cfg.duration.map(super::parse_duration).transpose()?;
    let schedule = if cfg.ticks.is_some() {
        Schedule::Manual
    } else {
        Schedule::Periodic(config.poll_interval())
    };

    let controller = CollectionController::new(
        config.speed_level,
        config.range_table(),
        make_sensor(&cfg, &config)?,
        super::make_acquisition(cfg.attach_model, cfg.seed),
        schedule,
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        log::warn!("could not install Ctrl+C handler: {e}");
    }

    println!("Monitoring session");
    println!("  Speed level: {}", config.speed_level);
    println!(
        "  Source:      {}",
        if cfg.replay_path.is_some() { "replay" } else { "simulated" }
    );
    match (cfg.ticks, max_duration) {
        (Some(n), _) => println!("  Ticks:       {n}"),
        (None, Some(d)) => println!("  Duration:    {}s", d.as_secs_f64()),
        (None, None) => println!("  Duration:    until Ctrl+C"),
    }
    if cfg.ticks.is_none() {
        println!("  Interval:    {}ms", config.poll_interval_ms);
    }
    println!(
        "  Model:       {}",
        if cfg.attach_model { "simulated" } else { "none" }
    );
    println!();

    controller.start()?;
    let start = Instant::now();

    match cfg.ticks {
        Some(n) => {
            for _ in 0..n {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                match controller.tick() {
                    TickOutcome::Recorded(result) => {
                        if let Some(sample) = controller.snapshot().window.last() {
                            print_sample(sample, &result);
                        }
                    }
                    TickOutcome::Skipped(e) => println!("  skipped: {e}"),
                    TickOutcome::Inactive => break,
                }
            }
        }
        None => {
            let mut seen = (0u64, 0u64);
            while running.load(Ordering::SeqCst) {
                if max_duration.is_some_and(|max| start.elapsed() >= max) {
                    break;
                }
                let snap = controller.snapshot();
                let (fresh, missed) = unseen(&snap.window, snap.recorded.saturating_sub(seen.0));
                if missed > 0 {
                    println!("  ... {missed} earlier sample(s) already left the window");
                }
                for sample in fresh {
                    print_sample(sample, &classify(sample, controller.table()));
                }
                if snap.skipped > seen.1 {
                    println!("  skipped {} tick(s)", snap.skipped - seen.1);
                }
                seen = (snap.recorded, snap.skipped);
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }

    let Some(report) = controller.stop() else {
        return Ok(());
    };
    println!();
    print_report(&report);

    if let Some(path) = cfg.output_path {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!();
        println!("Report written to {path}");
    }
    Ok(())
}

/// The last `new` samples of `window`, and how many of them were already
/// evicted.
fn unseen(window: &[Sample], new: u64) -> (&[Sample], u64) {
    let shown = usize::try_from(new).map_or(window.len(), |n| n.min(window.len()));
    (&window[window.len() - shown..], new - shown as u64)
}

fn print_sample(sample: &Sample, result: &ClassificationResult) {
    let trigger = result
        .axis_triggered
        .map(|a| format!(" ({a})"))
        .unwrap_or_default();
    println!(
        "  {}  x {:>7.2}  y {:>7.2}  z {:>7.2}  {} {}{trigger}",
        sample.timestamp_iso(),
        sample.accel_x,
        sample.accel_y,
        sample.accel_z,
        super::severity_icon(result.severity),
        result.severity,
    );
}

fn print_report(report: &SessionReport) {
    let v = &report.verdict;
    println!("Session {}", report.session_id);
    println!("  Started:     {}", report.started_at);
    println!("  Ended:       {}", report.ended_at);
    println!("  Duration:    {:.1}s", report.duration_ms as f64 / 1000.0);
    println!(
        "  Samples:     {} recorded, {} skipped",
        report.recorded, report.skipped
    );
    println!(
        "  Counts:      {} normal, {} alert, {} failure",
        v.counts.normal, v.counts.alert, v.counts.failure
    );
    println!("  Risk index:  {:.2}", v.risk_index);
    if let Some(p) = &report.prediction {
        println!(
            "  Model:       {} ({:.0}% confidence)",
            p.predicted_status,
            p.predicted_confidence() * 100.0
        );
    }
    println!();
    println!("Verdict: {}", v.tier);
    println!("  {}", v.recommendation);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(n: u64) -> Vec<Sample> {
        (0..n).map(|i| Sample::new(i, 0.0, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_unseen_returns_every_new_sample() {
        let w = window(5);
        let (fresh, missed) = unseen(&w, 3);
        let ts: Vec<u64> = fresh.iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(ts, vec![2, 3, 4]);
        assert_eq!(missed, 0);
    }

    #[test]
    fn test_unseen_nothing_new() {
        let w = window(5);
        let (fresh, missed) = unseen(&w, 0);
        assert!(fresh.is_empty());
        assert_eq!(missed, 0);
    }

    #[test]
    fn test_unseen_counts_evicted_samples() {
        let w = window(20);
        let (fresh, missed) = unseen(&w, 23);
        assert_eq!(fresh.len(), 20);
        assert_eq!(missed, 3);
    }
}
