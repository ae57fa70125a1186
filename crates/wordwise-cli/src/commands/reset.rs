//! The `wordwise reset` command.

use anyhow::Result;
use serde_json::json;

use super::Context;

pub fn execute(ctx: &Context, key: &str) -> Result<()> {
    let reset = ctx.scheduler.reset_memory(key)?;

    if ctx.json {
        return ctx.print_json(&json!({ "key": key, "reset": reset }));
    }
    if reset {
        println!("Reset {key}; it will be studied as a new word");
    } else {
        println!("{key} has no review history");
    }
    Ok(())
}
