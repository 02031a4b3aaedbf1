use vibewatch_core::{Axis, Result, Tier};

pub fn run(config_path: Option<&str>, level: Option<&str>, json: bool) -> Result<()> {
    let config = super::load_config(config_path, level, None)?;
    let table = config.range_table();

    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    let origin = if config.ranges.is_some() {
        "from config"
    } else {
        "built-in"
    };
    println!(
        "Speed level {} thresholds ({origin}), m/s²\n",
        config.speed_level
    );
    println!(
        "{:<10} {:>18} {:>18} {:>18}",
        "Tier", "x", "y", "z"
    );
    println!("{}", "-".repeat(67));
    for tier in Tier::ALL {
        let cells: Vec<String> = Axis::ALL
            .iter()
            .map(|&axis| table.range(tier, axis).to_string())
            .collect();
        println!(
            "{:<10} {:>18} {:>18} {:>18}",
            tier.to_string(),
            cells[0],
            cells[1],
            cells[2]
        );
    }
    println!();
    println!("Readings outside every range classify as normal.");
    Ok(())
}
