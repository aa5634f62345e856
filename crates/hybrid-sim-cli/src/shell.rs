//! Line-oriented interactive loop. Optimizer chunks can be interleaved with
//! any other command.

use crate::app::{Action, App, OptAction};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};

#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    Action(Action),
    /// Drive the chunked optimizer session
    Opt {
        #[command(subcommand)]
        action: OptAction,
    },
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnterminatedQuote;

/// Split on whitespace, keeping single- or double-quoted runs together.
pub fn tokenize(line: &str) -> Result<Vec<String>, UnterminatedQuote> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if quote.is_some() {
        return Err(UnterminatedQuote);
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

pub fn run(app: &mut App) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    println!("hybrid-sim shell; `help` lists commands, `quit` leaves");
    loop {
        print!("> ");
        stdout.flush()?;
        let mut buf = String::new();
        if stdin.lock().read_line(&mut buf)? == 0 {
            break;
        }
        let tokens = match tokenize(&buf) {
            Ok(t) if t.is_empty() => continue,
            Ok(t) => t,
            Err(UnterminatedQuote) => {
                eprintln!("error: unterminated quote");
                continue;
            }
        };
        let line = match Line::try_parse_from(tokens) {
            Ok(line) => line,
            Err(err) => {
                let _ = err.print();
                continue;
            }
        };
        let result = match line.command {
            ShellCommand::Quit => break,
            ShellCommand::Action(action) => app.run(action),
            ShellCommand::Opt { action } => app.optimizer(action),
        };
        match result {
            Ok(text) => print!("{text}"),
            Err(err) => eprintln!("error: {err:#}"),
        }
        if let Err(err) = app.save() {
            eprintln!("error: {err:#}");
        }
    }
    app.save()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_group_words() {
        assert_eq!(
            tokenize(r#"breed "Ember Wing" 'old  horse'"#),
            Ok(vec![
                "breed".to_string(),
                "Ember Wing".to_string(),
                "old  horse".to_string()
            ])
        );
        assert_eq!(tokenize(r#"show """#), Ok(vec!["show".to_string(), String::new()]));
        assert_eq!(tokenize("   "), Ok(Vec::new()));
        assert_eq!(tokenize("show \"open"), Err(UnterminatedQuote));
    }

    #[test]
    fn shell_lines_parse_into_commands() {
        let line = Line::try_parse_from(["opt", "step", "3"]).expect("opt step");
        assert!(matches!(
            line.command,
            ShellCommand::Opt {
                action: OptAction::Step {
                    generations: Some(3)
                }
            }
        ));
        let line = Line::try_parse_from(["check", "strength", ">=", "10"]).expect("check");
        assert!(matches!(
            line.command,
            ShellCommand::Action(Action::Check { population: false, .. })
        ));
        let line =
            Line::try_parse_from(["optimize", "-g", "5", "-o", "-Size", "-s", "fish,bird"])
                .expect("optimize");
        match line.command {
            ShellCommand::Action(Action::Optimize { params, .. }) => {
                assert_eq!(params.generations, 5);
                assert_eq!(params.objective, vec!["-Size".to_string()]);
                assert_eq!(params.species, vec!["fish".to_string(), "bird".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(Line::try_parse_from(["exit"]).is_ok());
    }
}
