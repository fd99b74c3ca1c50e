//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use lista_core::{List, PendingChange};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is in JSON mode
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print an informational message (human mode only)
    pub fn message(&self, message: &str) {
        if matches!(self.format, OutputFormat::Human) {
            println!("{}", message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if matches!(self.format, OutputFormat::Human) {
            println!("✓ {}", message);
        }
    }

    /// Print the locally queued changes
    pub fn print_pending(&self, entries: &[(String, PendingChange)]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("No queued changes.");
                    return;
                }
                for (list_id, change) in entries {
                    println!(
                        "{} | {} | {} byte(s)",
                        list_id,
                        change.saved_at.format("%Y-%m-%d %H:%M:%S"),
                        change.markdown.len()
                    );
                }
                println!("\n{} queued change(s)", entries.len());
            }
            OutputFormat::Json => {
                let json_entries: Vec<_> = entries
                    .iter()
                    .map(|(list_id, change)| {
                        serde_json::json!({
                            "list_id": list_id,
                            "saved_at": change.saved_at,
                            "bytes": change.markdown.len()
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json_entries).unwrap_or_default()
                );
            }
            OutputFormat::Quiet => {
                for (list_id, _) in entries {
                    println!("{}", list_id);
                }
            }
        }
    }

    /// Print a single list
    pub fn print_list(&self, list: &List) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", list.id);
                println!("Title:    {}", list.title);
                if list.is_template {
                    println!("Kind:     template");
                } else {
                    println!("Kind:     list ({:?})", list.status);
                }
                println!(
                    "Updated:  {}",
                    list.updated_at.format("%Y-%m-%d %H:%M")
                );
                if !list.markdown.is_empty() {
                    println!();
                    println!("{}", truncate(&list.markdown, 200));
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(list).unwrap_or_default()
                );
            }
            OutputFormat::Quiet => {
                println!("{}", list.id);
            }
        }
    }
}

/// Truncate a string, appending an ellipsis when shortened
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}…", truncated)
    }
}
