//! Terminal output.
//!
//! Results go to standard output, one per line, with nothing else mixed in,
//! so scripts can capture them directly. Everything meant for people goes to
//! standard error.

use console::style;

/// Print one result line to standard output.
pub fn print_line(line: &str) {
    println!("{}", line);
}

/// Print an error message to standard error.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("error:").red().bold().for_stderr(), message);
}
