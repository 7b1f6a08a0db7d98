//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the agentflow CLI.

use crate::types::Author;
use crate::workflows::engine::WorkflowEvent;
use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  {}", title);
            println!("  {}", "=".repeat(title.len()));
        }
    }

    /// Print a hint/tip
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "hint:".dimmed(), message.dimmed());
        } else {
            println!("  hint: {}", message);
        }
    }

    /// One executed workflow step: who spoke, where control goes next, and
    /// what was said.
    pub fn node_event(&self, event: &WorkflowEvent) {
        let author = event.message.author;
        if self.colored {
            let label = format!("[{}]", author);
            let label = match author {
                Author::Supervisor | Author::Validator => label.magenta().bold().to_string(),
                Author::Enhancer => label.cyan().bold().to_string(),
                Author::Researcher => label.blue().bold().to_string(),
                Author::Coder => label.green().bold().to_string(),
                Author::User => label.bold().to_string(),
            };
            println!(
                "\n  {} {} {}",
                label,
                "->".dimmed(),
                event.next.to_string().dimmed()
            );
        } else {
            println!("\n  [{}] -> {}", author, event.next);
        }
        for line in event.message.content.lines() {
            println!("    {}", line);
        }
    }

    /// The final answer of a run
    pub fn answer(&self, text: &str) {
        if self.colored {
            println!("{}", "Answer:".green().bold());
        } else {
            println!("Answer:");
        }
        println!("{}", text.trim_end());
    }

    /// Interactive prompt, without a trailing newline
    pub fn prompt(&self) {
        if self.colored {
            print!("\n{} ", ">".bright_cyan().bold());
        } else {
            print!("\n> ");
        }
        io::stdout().flush().ok();
    }

    /// Print a blank line
    pub fn newline(&self) {
        println!();
    }
}
