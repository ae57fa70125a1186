//! The `wordwise next` command.

use anyhow::Result;

use super::{format_time, or_dash, Context};

pub fn execute(ctx: &Context) -> Result<()> {
    let selection = ctx.scheduler.select_next(ctx.now)?;

    if ctx.json {
        return ctx.print_json(&selection);
    }

    let Some(selection) = selection else {
        println!("Nothing to study. Add words with `wordwise add`.");
        return Ok(());
    };

    let item = &selection.item;
    println!("{} [{}]", item.word, selection.reason);
    if let Some(phonetic) = &item.phonetic {
        println!("  {phonetic}");
    }
    println!("  meaning: {}", or_dash(item.meaning.as_deref()));
    if let Some(example) = &item.example_sentence {
        println!("  example: {example}");
    }
    if let Some(due) = ctx
        .scheduler
        .memory_state(&item.key)?
        .and_then(|state| state.next_review_at)
    {
        println!("  due: {}", format_time(due));
    }
    Ok(())
}
