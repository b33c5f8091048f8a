use anyhow::{Context, Result};
use std::io::BufRead;

/// Interprets one line of user input as a yes/no answer.
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Prints `message` and asks the user to type 'y' or 'n', repeating until an
/// answer is recognised. EOF on stdin counts as a refusal.
///
/// This is the only cancellation point of a job; it runs strictly before any
/// replication starts.
pub fn confirm(message: &str) -> Result<bool> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        println!("{message}");
        println!("Please type 'y' or 'n': ");
        let Some(line) = lines.next() else {
            return Ok(false);
        };
        let line = line.context("failed reading from stdin")?;
        match parse_answer(&line) {
            Some(answer) => return Ok(answer),
            None => println!("Unrecognised input {line:?}, please try again."),
        }
    }
}
