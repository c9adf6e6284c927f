//! Terminal rendering of conversation turns.

use colored::Colorize;
use copilot_core::result::StructuredResult;
use copilot_core::session::{ConversationTurn, MessageContent};

pub fn print_turn(turn: &ConversationTurn) {
    match &turn.content {
        MessageContent::Text(text) if turn.error => {
            for line in text.lines() {
                println!("{}", line.red());
            }
        }
        MessageContent::Text(text) => {
            for line in text.lines() {
                println!("{}", line.bright_blue());
            }
        }
        MessageContent::Structured(result) => print_structured(result),
    }
    println!();
}

fn print_structured(result: &StructuredResult) {
    print_section("Python", &result.python_code);
    print_section("Node.js", &result.node_code);
    print_section("Sample Data", &result.sample_data_pretty());
    if !result.next_steps.trim().is_empty() {
        print_section("Next Steps", &result.next_steps);
    }
}

fn print_section(title: &str, body: &str) {
    println!("{}", format!("── {title} ──").bright_magenta().bold());
    for line in body.lines() {
        println!("{line}");
    }
    println!();
}

/// Masks all but the last four characters of a secret field value.
pub fn mask_secret(value: &str) -> String {
    let count = value.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = value.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(count - 4))
}
