//! Completions command - print a shell completion script.
//!
//! ```bash
//! eval "$(easymount completions bash)"                                   # ~/.bashrc
//! eval "$(easymount completions zsh)"                                    # ~/.zshrc
//! easymount completions fish > ~/.config/fish/completions/easymount.fish
//! easymount completions powershell | Out-String | Invoke-Expression      # pwsh profile
//! ```

use std::io;

use anyhow::Result;
use clap::{Args as ClapArgs, CommandFactory};
use clap_complete::{generate, Shell};

use crate::Cli;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn execute(args: &Args) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(args.shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    #[test]
    fn test_every_clap_complete_shell_is_offered() {
        let names: Vec<String> = Shell::value_variants()
            .iter()
            .filter_map(|s| s.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        for expected in ["bash", "zsh", "fish", "powershell", "elvish"] {
            assert!(names.iter().any(|n| n == expected), "{expected}");
        }
    }
}
