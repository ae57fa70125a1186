//! The `wordwise remove` command.

use anyhow::Result;
use serde_json::json;

use super::Context;

pub fn execute(ctx: &Context, key: &str) -> Result<()> {
    let removed = ctx.scheduler.remove_item(key)?;

    if ctx.json {
        return ctx.print_json(&json!({ "key": key, "removed": removed }));
    }
    if removed {
        println!("Removed {key}");
    } else {
        println!("No word with key '{key}'");
    }
    Ok(())
}
