//! The `wordwise due` and `wordwise by-difficulty` commands.

use anyhow::Result;

use super::{item_table, Context};

pub fn execute(ctx: &Context, limit: usize) -> Result<()> {
    let items = ctx.scheduler.get_due_items(ctx.now, limit)?;

    if ctx.json {
        return ctx.print_json(&items);
    }
    if items.is_empty() {
        println!("No words due.");
        return Ok(());
    }

    let total = ctx.scheduler.due_count(ctx.now)?;
    println!("{}", item_table(&items));
    println!("{} of {} due word(s) shown", items.len(), total);
    Ok(())
}

pub fn by_difficulty(ctx: &Context, min: f64, max: f64, limit: usize) -> Result<()> {
    let items = ctx.scheduler.get_items_by_difficulty(min, max, limit)?;

    if ctx.json {
        return ctx.print_json(&items);
    }
    if items.is_empty() {
        println!("No reviewed words with difficulty between {min} and {max}.");
        return Ok(());
    }
    println!("{}", item_table(&items));
    Ok(())
}
