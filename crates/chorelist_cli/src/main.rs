//! Terminal front end for the chore checklist.
//!
//! # Responsibility
//! - Run one checklist turn per invocation against the configured files.
//! - Print the grouped checklist, totals, notices and surprise events.
//!
//! # Usage
//! - `chorelist_cli [show]`
//! - `chorelist_cli toggle <task-key> <on|off>`
//! - `chorelist_cli reset`
//! - `chorelist_cli ping`

use chorelist_core::{
    init_logging, open_file_session, ChecklistConfig, ChecklistView, SurpriseEvent, SystemClock,
};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Show,
    Toggle { key: String, checked: bool },
    Reset,
    Ping,
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_command(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("usage: chorelist_cli [show | toggle <task-key> <on|off> | reset | ping]");
            return ExitCode::from(2);
        }
    };

    if command == Command::Ping {
        println!("chorelist_core ping={}", chorelist_core::ping());
        println!("chorelist_core version={}", chorelist_core::core_version());
        return ExitCode::SUCCESS;
    }

    let config = ChecklistConfig::from_env();
    if let Some(log_dir) = config.log_dir.to_str() {
        if let Err(err) = init_logging(config.log_level.as_str(), log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let mut session = open_file_session(&config, Arc::new(SystemClock));
    match command {
        Command::Toggle { key, checked } => {
            if let Err(err) = session.toggle(key.as_str(), checked) {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        }
        Command::Reset => session.reset_all(),
        Command::Show | Command::Ping => {}
    }

    print_view(&session.view());
    for surprise in session.take_surprises() {
        println!("{}", surprise_line(&surprise));
    }
    ExitCode::SUCCESS
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["show"] => Ok(Command::Show),
        ["reset"] => Ok(Command::Reset),
        ["ping"] => Ok(Command::Ping),
        ["toggle", key, state] => {
            let checked = match *state {
                "on" | "true" | "done" => true,
                "off" | "false" | "undone" => false,
                other => return Err(format!("unknown toggle state `{other}`")),
            };
            Ok(Command::Toggle {
                key: (*key).to_string(),
                checked,
            })
        }
        other => Err(format!("unknown command `{}`", other.join(" "))),
    }
}

fn print_view(view: &ChecklistView) {
    for notice in &view.notices {
        println!("! {}", notice.message);
    }

    for group in &view.groups {
        println!("\n== {} ==", group.cadence.heading());
        if group.tasks.is_empty() {
            println!("No tasks in this category.");
        }
        for task in &group.tasks {
            let mark = if task.checked { "x" } else { " " };
            println!("[{mark}] {}  <{}>", task.label, task.key);
        }
    }

    println!("\nTotal earned: £{}", view.earned_total);
    if !view.potential_total.is_zero() {
        println!("Potential total: £{}", view.potential_total);
    }
    if view.total_count > 0 {
        println!(
            "{} of {} tasks completed ({:.0}%).",
            view.completed_count,
            view.total_count,
            view.progress_ratio() * 100.0
        );
    }
}

fn surprise_line(event: &SurpriseEvent) -> String {
    match event {
        SurpriseEvent::PaidTask(name) => format!("*** Cha-ching! `{name}` done. ***"),
        SurpriseEvent::DailyTask(name) => format!("*** Nice one! `{name}` done for today. ***"),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_command, Command};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn no_arguments_show_the_checklist() {
        assert_eq!(parse_command(&[]), Ok(Command::Show));
    }

    #[test]
    fn toggle_parses_key_and_state() {
        assert_eq!(
            parse_command(&args(&["toggle", "daily_Feed cat", "on"])),
            Ok(Command::Toggle {
                key: "daily_Feed cat".to_string(),
                checked: true
            })
        );
        assert!(parse_command(&args(&["toggle", "daily_Feed cat", "maybe"])).is_err());
    }

    #[test]
    fn unknown_commands_are_rejected() {
        assert!(parse_command(&args(&["explode"])).is_err());
    }
}
