//! Terminal hold for double-click launches

use std::io::BufRead;

/// Block until the operator presses Enter.
///
/// Only called when `--pause` was given, so scripted runs never wait.
/// Keeps the console window open when the binary is launched from a
/// desktop shortcut rather than a shell.
pub fn wait_for_enter() {
    println!();
    println!("Press Enter to close...");
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}
