use vibewatch_core::{Axis, MonitorError, Result, Sample, classify};

pub fn run(x: f64, y: f64, z: f64, config_path: Option<&str>, level: Option<&str>) -> Result<()> {
    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return Err(MonitorError::InvalidConfig(
            "x, y and z must be finite".to_string(),
        ));
    }
    let config = super::load_config(config_path, level, None)?;
    let table = config.range_table();
    let sample = Sample::new(0, x, y, z);
    let result = classify(&sample, &table);

    println!("Reading ({x:.2}, {y:.2}, {z:.2}) at speed level {}\n", config.speed_level);
    for axis in Axis::ALL {
        let severity = result.axis_severity(axis);
        println!(
            "  {axis}  {:>8.2}  {} {severity}",
            sample.axis(axis),
            super::severity_icon(severity)
        );
    }
    println!();
    match result.axis_triggered {
        Some(axis) => println!(
            "{} {} (triggered by {axis})",
            super::severity_icon(result.severity),
            result.severity
        ),
        None => println!("{} {}", super::severity_icon(result.severity), result.severity),
    }
    println!("   {}", result.severity.description(config.speed_level));
    println!("   {}", result.severity.recommendation());
    Ok(())
}
