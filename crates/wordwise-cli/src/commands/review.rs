//! The `wordwise review` and `wordwise practice` commands.

use std::time::Duration;

use anyhow::Result;
use wordwise_core::{answers_match, Rating, ReviewOutcome, WordwiseError};

use super::{format_time, Context};

pub fn execute(ctx: &Context, key: &str, rating: &str) -> Result<()> {
    let rating = Rating::from_input(rating)?;
    let outcome = ctx.scheduler.submit_rating(key, rating, ctx.now)?;
    print_outcome(ctx, &outcome)
}

pub fn practice(ctx: &Context, key: &str, answer: &str, response_ms: u64) -> Result<()> {
    let item = ctx
        .scheduler
        .get_item(key)?
        .ok_or_else(|| WordwiseError::item_not_found(key))?;

    let correct = answers_match(&item.word, answer);
    let rating = Rating::from_answer(correct, Duration::from_millis(response_ms));
    let outcome = ctx.scheduler.submit_rating(key, rating, ctx.now)?;

    if !ctx.json {
        if correct {
            println!("Correct!");
        } else {
            println!("Incorrect. The answer is '{}'.", item.word);
        }
    }
    print_outcome(ctx, &outcome)
}

fn print_outcome(ctx: &Context, outcome: &ReviewOutcome) -> Result<()> {
    if ctx.json {
        return ctx.print_json(outcome);
    }

    println!(
        "Reviewed {} ({}): stability {:.2}, difficulty {:.2}, next review {} (in {:.1} days)",
        outcome.state.item_key,
        outcome.rating,
        outcome.stability(),
        outcome.difficulty(),
        format_time(outcome.next_review_at),
        outcome.interval_days,
    );
    Ok(())
}
