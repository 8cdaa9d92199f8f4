//! Stdin/stdout host: reads commands typed as players and prints what they would see.

use std::{
    collections::HashMap,
    io::{BufRead, Write},
    sync::Mutex,
};

use anyhow::Result;
use log::{debug, error, info, warn};
use toplist_core::types::{PlayerId, Recipient};

use crate::{
    dispatch::{CommandRegistry, TriggerHandler},
    present::ChatPrinter,
};

/// Player name standing for the server console itself
const SERVER_CONSOLE: &str = "-";

/// Prints chat lines as `[player] text`.
pub struct ConsoleChat<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> ConsoleChat<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send> ChatPrinter for ConsoleChat<W> {
    fn print_line(&self, recipient: &Recipient, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(out, "[{}] {text}", recipient.name) {
            warn!("Could not print to {recipient}: {e}");
        }
    }
}

struct Command {
    description: String,
    handler: TriggerHandler,
}

#[derive(Default)]
pub struct CommandTable {
    commands: HashMap<String, Command>,
}

impl CommandTable {
    /// Runs the command `name`. Returns false when no such command exists.
    pub fn invoke(&self, name: &str, invoker: Option<&Recipient>) -> bool {
        let Some(command) = self.commands.get(name) else {
            return false;
        };
        (command.handler)(invoker);
        true
    }

    /// Names and descriptions, sorted by name.
    pub fn commands(&self) -> Vec<(&str, &str)> {
        let mut commands: Vec<_> = self
            .commands
            .iter()
            .map(|(name, c)| (name.as_str(), c.description.as_str()))
            .collect();
        commands.sort();
        commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl CommandRegistry for CommandTable {
    fn add_command(&mut self, name: &str, description: &str, handler: TriggerHandler) {
        self.commands.insert(
            name.to_string(),
            Command {
                description: description.to_string(),
                handler,
            },
        );
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Empty,
    Help,
    Quit,
    Reload,
    Trigger {
        /// None for the server console
        player: Option<String>,
        command: String,
    },
    Invalid(String),
}

/// Parses `<player> <command>`, the command may be prefixed by `!` or `/`.
pub fn parse_line(line: &str) -> Input {
    let line = line.trim();
    match line {
        "" => return Input::Empty,
        ":help" => return Input::Help,
        ":quit" => return Input::Quit,
        ":reload" => return Input::Reload,
        _ => {}
    }

    let mut words = line.split_whitespace();
    let (Some(player), Some(command), None) = (words.next(), words.next(), words.next()) else {
        return Input::Invalid(line.to_string());
    };

    let command = command.trim_start_matches(['!', '/']);
    if command.is_empty() {
        return Input::Invalid(line.to_string());
    }

    Input::Trigger {
        player: (player != SERVER_CONSOLE).then(|| player.to_string()),
        command: command.to_string(),
    }
}

#[derive(Default)]
pub struct Console {
    table: CommandTable,
    players: HashMap<String, PlayerId>,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_mut(&mut self) -> &mut CommandTable {
        &mut self.table
    }

    /// Reads lines until `:quit` or end of input.
    pub fn run(
        &mut self,
        input: impl BufRead,
        mut on_reload: impl FnMut(&mut CommandTable) -> Result<()>,
    ) -> Result<()> {
        info!("Type `<player> !<command>`, `:help`, `:reload` or `:quit`");
        info!("`:reload` applies limit, mode, menu attribution and new commands only");

        for line in input.lines() {
            match parse_line(&line?) {
                Input::Empty => {}
                Input::Help => self.help(),
                Input::Quit => break,
                Input::Reload => {
                    if let Err(e) = on_reload(&mut self.table) {
                        error!("Reload failed, keeping previous config: {e:#}");
                    }
                }
                Input::Trigger { player, command } => {
                    let recipient = player.map(|name| self.recipient(name));
                    debug!("{recipient:?} invoked {command}");
                    if !self.table.invoke(&command, recipient.as_ref()) {
                        warn!("Unknown command {command}");
                    }
                }
                Input::Invalid(line) => warn!("Could not understand `{line}`"),
            }
        }

        Ok(())
    }

    fn help(&self) {
        if self.table.is_empty() {
            info!("No commands registered");
            return;
        }
        info!("{} command(s):", self.table.len());
        for (name, description) in self.table.commands() {
            info!("  !{name}  {description}");
        }
    }

    fn recipient(&mut self, name: String) -> Recipient {
        let next_id = self.players.len() as PlayerId + 1;
        let id = *self.players.entry(name.clone()).or_insert(next_id);
        Recipient::new(id, name)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[test]
    fn parses_player_commands() {
        assert_eq!(
            parse_line("alice !top"),
            Input::Trigger {
                player: Some("alice".into()),
                command: "top".into()
            }
        );
        assert_eq!(
            parse_line("  bob /toplist "),
            Input::Trigger {
                player: Some("bob".into()),
                command: "toplist".into()
            }
        );
        assert_eq!(
            parse_line("carol top"),
            Input::Trigger {
                player: Some("carol".into()),
                command: "top".into()
            }
        );
    }

    #[test]
    fn console_player_has_no_recipient() {
        assert_eq!(
            parse_line("- top"),
            Input::Trigger {
                player: None,
                command: "top".into()
            }
        );
    }

    #[test]
    fn parses_control_lines() {
        assert_eq!(parse_line(""), Input::Empty);
        assert_eq!(parse_line(":help"), Input::Help);
        assert_eq!(parse_line(":quit"), Input::Quit);
        assert_eq!(parse_line(":reload"), Input::Reload);
        assert!(matches!(parse_line("alice"), Input::Invalid(_)));
        assert!(matches!(parse_line("alice !"), Input::Invalid(_)));
        assert!(matches!(parse_line("alice top extra"), Input::Invalid(_)));
    }

    #[test]
    fn chat_lines_name_the_recipient() {
        let chat = ConsoleChat::new(Vec::new());
        chat.print_line(&Recipient::new(1, "alice"), "1. Bob — 80");
        chat.print_line(&Recipient::new(2, "bob"), "hello");

        let out = String::from_utf8(chat.into_inner()).unwrap();
        assert_eq!(out, "[alice] 1. Bob — 80\n[bob] hello\n");
    }

    #[test]
    fn run_routes_lines_to_commands() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut console = Console::new();
        {
            let seen = seen.clone();
            console.table_mut().add_command(
                "top",
                "test",
                Arc::new(move |r: Option<&Recipient>| {
                    seen.lock().unwrap().push(r.cloned());
                }),
            );
        }
        let reloads = AtomicUsize::new(0);

        let input = "alice !top\n- top\nalice !nope\n:reload\nbob top\nalice /top\n:quit\nbob top\n";
        console
            .run(input.as_bytes(), |_| {
                reloads.fetch_add(1, Ordering::Relaxed);
                Ok(())
            })
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                Some(Recipient::new(1, "alice")),
                None,
                Some(Recipient::new(2, "bob")),
                Some(Recipient::new(1, "alice")),
            ]
        );
        assert_eq!(reloads.load(Ordering::Relaxed), 1);
        assert_eq!(console.table_mut().commands(), vec![("top", "test")]);
    }

    #[test]
    fn failed_reload_keeps_running() {
        let mut console = Console::new();
        let result = console.run(":reload\n".as_bytes(), |_| anyhow::bail!("broken config"));
        assert!(result.is_ok());
    }
}
