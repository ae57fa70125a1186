//! The `wordwise add` command.

use anyhow::Result;
use wordwise_core::Item;

use super::Context;

pub fn execute(
    ctx: &Context,
    word: String,
    key: Option<String>,
    meaning: Option<String>,
    deck: Option<String>,
    phonetic: Option<String>,
    example: Option<String>,
) -> Result<()> {
    let key = key.unwrap_or_else(|| word.trim().to_string());
    let item = Item {
        key,
        word,
        meaning,
        deck,
        phonetic,
        example_sentence: example,
    };

    ctx.scheduler.add_item(&item)?;

    if ctx.json {
        return ctx.print_json(&item);
    }
    println!("Added {} ({})", item.key, item.word);
    Ok(())
}
