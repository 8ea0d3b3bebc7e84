#[macro_use]
extern crate serde_derive;
extern crate slog;
#[macro_use]
extern crate slog_scope;

mod client_command;
mod controller;
mod doctor;
mod editor_transport;
mod error;
mod markup;
mod table;
mod types;
mod util;
mod window;

use crate::types::*;
use crate::window::{ClientWindow, KakouneWindow};
use clap::{crate_version, value_parser, Arg, ArgAction, ArgMatches, Command};
use sloggers::file::FileLoggerBuilder;
use sloggers::terminal::{Destination, TerminalLoggerBuilder};
use sloggers::types::Severity;
use sloggers::Build;
use std::borrow::Cow;
use std::fs;
use std::io::{stdin, Read};
use std::path::PathBuf;
use std::process;

fn main() {
    let matches = Command::new("metals-kak")
        .version(crate_version!())
        .about("Runs Metals client commands in Kakoune")
        .long_about(
            "Reads a metals/executeClientCommand notification from stdin and runs it in Kakoune.",
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Read config from FILE"),
        )
        .arg(
            Arg::new("session")
                .short('s')
                .long("session")
                .value_name("SESSION")
                .help("Send commands to Kakoune SESSION instead of printing them"),
        )
        .arg(
            Arg::new("client")
                .long("client")
                .value_name("CLIENT")
                .help("Evaluate commands in CLIENT"),
        )
        .arg(
            Arg::new("html-dir")
                .long("html-dir")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Also write reports as HTML pages into DIR"),
        )
        .arg(
            Arg::new("v")
                .short('v')
                .action(ArgAction::Count)
                .help("Sets the level of verbosity"),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .value_name("PATH")
                .help("File to write the log into instead of stderr"),
        )
        .get_matches();

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let code = match setup_logger(&config, &matches) {
        Ok(_guard) => run(&config, &matches),
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    };
    process::exit(code);
}

fn load_config(matches: &ArgMatches) -> Result<Config, String> {
    let mut config = Cow::from(include_str!("../metals-kak.toml"));

    let config_path = matches.get_one::<PathBuf>("config").cloned().or_else(|| {
        dirs::config_dir()
            .map(|config_dir| config_dir.join("metals-kak/metals-kak.toml"))
            .filter(|path| path.exists())
    });

    if let Some(config_path) = config_path {
        config = Cow::from(fs::read_to_string(&config_path).map_err(|e| {
            format!("Failed to read config {}: {}", config_path.display(), e)
        })?);
    }

    let mut config: Config =
        toml::from_str(&config).map_err(|e| format!("Failed to parse config file: {}", e))?;

    if let Some(html_dir) = matches.get_one::<PathBuf>("html-dir") {
        config.report.html_dir = Some(html_dir.clone());
    }

    Ok(config)
}

fn run(config: &Config, matches: &ArgMatches) -> i32 {
    let mut input = String::new();
    if let Err(e) = stdin().read_to_string(&mut input) {
        error!("Failed to read stdin: {}", e);
        return 1;
    }
    debug!("From language server: {}", input);

    let notification = match controller::parse_notification(&input) {
        Ok(notification) => notification,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    let mut window = KakouneWindow::new(config);
    let mut code = 0;
    if let Err(e) = controller::dispatch_server_notification(notification, &mut window) {
        error!("{}", e);
        window.report_status(&format!("metals: {}", e));
        code = 1;
    }

    let command = match window.into_command() {
        Some(command) => command,
        None => return code,
    };
    let response = EditorResponse {
        meta: EditorMeta {
            session: matches.get_one::<String>("session").cloned(),
            client: matches.get_one::<String>("client").cloned(),
        },
        command: Cow::from(command),
    };
    if let Err(e) = editor_transport::send_command_to_editor(response) {
        error!("Failed to send command to editor: {}", e);
        return 1;
    }
    code
}

fn setup_logger(
    config: &Config,
    matches: &ArgMatches,
) -> Result<slog_scope::GlobalLoggerGuard, String> {
    let mut verbosity = matches.get_count("v");

    if verbosity == 0 {
        verbosity = config.verbosity
    }

    let level = match verbosity {
        0 => Severity::Error,
        1 => Severity::Warning,
        2 => Severity::Info,
        3 => Severity::Debug,
        _ => Severity::Trace,
    };

    let logger = if let Some(log_path) = matches.get_one::<String>("log") {
        let mut builder = FileLoggerBuilder::new(log_path);
        builder.level(level);
        builder.build()
    } else {
        let mut builder = TerminalLoggerBuilder::new();
        builder.level(level);
        builder.destination(Destination::Stderr);
        builder.build()
    };
    let logger = logger.map_err(|e| format!("Failed to set up logger: {}", e))?;

    Ok(slog_scope::set_global_logger(logger))
}
