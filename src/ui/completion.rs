//! Shell completion generation for linkscout

use clap::{Command, CommandFactory};
use clap_complete::{Generator, Shell, generate};
use std::io::Write;

use crate::ui::cli::Cli;

/// Write completions for `generator` to `out`.
pub fn write_completions<G: Generator, W: Write>(generator: G, app: &mut Command, out: &mut W) {
    let name = app.get_name().to_string();
    generate(generator, app, name, out);
}

/// Generate shell completions for the given shell on stdout
pub fn print_completions(shell: Shell) {
    let mut app = Cli::command();
    write_completions(shell, &mut app, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script_for(shell: Shell) -> String {
        let mut buf = Vec::new();
        write_completions(shell, &mut Cli::command(), &mut buf);
        String::from_utf8(buf).expect("completion script is not UTF-8")
    }

    #[test]
    fn test_bash_completion_mentions_selectors() {
        let script = script_for(Shell::Bash);
        assert!(script.contains("--file"));
        assert!(script.contains("--list"));
        assert!(script.contains("completion-generate"));
    }

    #[test]
    fn test_every_shell_generates_something() {
        for shell in [
            Shell::Bash,
            Shell::Zsh,
            Shell::Fish,
            Shell::PowerShell,
            Shell::Elvish,
        ] {
            assert!(!script_for(shell).is_empty(), "{shell} produced no script");
        }
    }
}
