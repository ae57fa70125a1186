//! The `wordwise show` command.

use anyhow::Result;
use comfy_table::Table;
use serde_json::json;
use wordwise_core::WordwiseError;

use super::{format_time, or_dash, Context};

pub fn execute(ctx: &Context, key: &str) -> Result<()> {
    let item = ctx
        .scheduler
        .get_item(key)?
        .ok_or_else(|| WordwiseError::item_not_found(key))?;
    let state = ctx.scheduler.memory_state(key)?;
    let retrievability = ctx.scheduler.retrievability(key, ctx.now)?;

    if ctx.json {
        return ctx.print_json(&json!({
            "item": item,
            "memory_state": state,
            "retrievability": retrievability,
        }));
    }

    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["word", item.word.as_str()]);
    table.add_row(vec!["meaning", or_dash(item.meaning.as_deref())]);
    table.add_row(vec!["deck", or_dash(item.deck.as_deref())]);
    table.add_row(vec!["phonetic", or_dash(item.phonetic.as_deref())]);

    match &state {
        Some(state) => {
            let last = state.last_review_at.map(format_time).unwrap_or_else(|| "-".into());
            let next = state.next_review_at.map(format_time).unwrap_or_else(|| "-".into());
            table.add_row(vec!["stability".to_string(), format!("{:.2} days", state.stability)]);
            table.add_row(vec!["difficulty".to_string(), format!("{:.2}", state.difficulty)]);
            table.add_row(vec!["last review".to_string(), last]);
            table.add_row(vec!["next review".to_string(), next]);
            table.add_row(vec!["reviews".to_string(), state.review_count.to_string()]);
            table.add_row(vec!["streak".to_string(), state.consecutive_correct.to_string()]);
        }
        None => {
            table.add_row(vec!["status", "new"]);
        }
    }
    if let Some(r) = retrievability {
        table.add_row(vec!["recall probability".to_string(), format!("{:.1}%", r * 100.0)]);
    }

    println!("{table}");
    Ok(())
}
