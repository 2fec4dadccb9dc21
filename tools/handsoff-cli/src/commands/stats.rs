//! Show daily trigger statistics.

use std::path::PathBuf;

use chrono::Duration;
use handsoff_common::config::AppConfig;
use handsoff_monitor::DailyStatsStore;

pub fn run(config: &AppConfig, week: i32, stats_file: Option<PathBuf>) -> anyhow::Result<()> {
    let path = stats_file.unwrap_or_else(|| config.output.stats_file.clone());
    let store = DailyStatsStore::open(&path)?;

    let today = store.today();
    println!("Today ({}): {} triggers", today.date, today.trigger_count);

    let view = store.week(week)?;
    println!(
        "\n{} ({} .. {})",
        view.week_label, view.week_start, view.week_end
    );
    for (offset, day) in view.days.iter().enumerate() {
        let date = view.week_start + Duration::days(offset as i64);
        match day {
            Some(stats) => println!("  {}  {:>4}", date.format("%a %Y-%m-%d"), stats.trigger_count),
            None => println!("  {}     -", date.format("%a %Y-%m-%d")),
        }
    }

    let mut nav = Vec::new();
    if view.can_go_prev {
        nav.push(format!("--week {}", week - 1));
    }
    if view.can_go_next {
        nav.push(format!("--week {}", week + 1));
    }
    if !nav.is_empty() {
        println!("\nMore: {}", nav.join(", "));
    }
    Ok(())
}
