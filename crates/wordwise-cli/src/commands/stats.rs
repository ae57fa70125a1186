//! The `wordwise stats` command.

use anyhow::Result;
use comfy_table::Table;

use super::Context;

pub fn execute(ctx: &Context) -> Result<()> {
    let stats = ctx.scheduler.get_stats(ctx.now)?;

    if ctx.json {
        return ctx.print_json(&stats);
    }

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Words".to_string(), stats.total_items.to_string()]);
    table.add_row(vec!["Studied".to_string(), stats.items_with_memory.to_string()]);
    table.add_row(vec!["Due now".to_string(), stats.due_count.to_string()]);
    table.add_row(vec!["Due within 24h".to_string(), stats.due_within_day.to_string()]);
    table.add_row(vec!["Reviewed today".to_string(), stats.reviewed_today.to_string()]);
    table.add_row(vec![
        "Avg stability".to_string(),
        format!("{:.2} days", stats.avg_stability),
    ]);
    table.add_row(vec!["Avg difficulty".to_string(), format!("{:.2}", stats.avg_difficulty)]);
    table.add_row(vec![
        "Memorization".to_string(),
        format!("{:.1}%", stats.memorization_rate * 100.0),
    ]);

    println!("{table}");
    Ok(())
}
