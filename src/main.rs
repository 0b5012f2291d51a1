//! rpager - an interactive less-style terminal pager.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use rpager::app::{AppConfig, Application};
use rpager::text::TabStops;
use rpager::view::Flags;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let matches = Command::new("rpager")
        .version(rpager::VERSION)
        .about("An interactive less-style pager with regex search and filtering")
        .arg(
            Arg::new("quit-at-eof")
                .short('e')
                .long("quit-at-eof")
                .action(ArgAction::SetTrue)
                .help("Exit the second time end-of-stream is reached"),
        )
        .arg(
            Arg::new("QUIT-AT-EOF")
                .short('E')
                .long("QUIT-AT-EOF")
                .action(ArgAction::SetTrue)
                .help("Exit the first time end-of-stream is reached"),
        )
        .arg(
            Arg::new("quit-if-one-screen")
                .short('F')
                .long("quit-if-one-screen")
                .action(ArgAction::SetTrue)
                .help("Print and exit if the single source fits on one screen"),
        )
        .arg(
            Arg::new("LINE-NUMBERS")
                .short('N')
                .long("LINE-NUMBERS")
                .action(ArgAction::SetTrue)
                .help("Display a line number gutter"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .alias("silent")
                .action(ArgAction::SetTrue)
                .help("Never ring the bell at end or beginning of stream"),
        )
        .arg(
            Arg::new("QUIET")
                .short('Q')
                .long("QUIET")
                .alias("SILENT")
                .action(ArgAction::SetTrue)
                .help("Never ring the bell at all"),
        )
        .arg(
            Arg::new("chop-long-lines")
                .short('S')
                .long("chop-long-lines")
                .action(ArgAction::SetTrue)
                .help("Truncate long lines instead of wrapping them"),
        )
        .arg(
            Arg::new("ignore-case")
                .short('i')
                .long("ignore-case")
                .action(ArgAction::SetTrue)
                .help("Ignore case in patterns without uppercase characters"),
        )
        .arg(
            Arg::new("IGNORE-CASE")
                .short('I')
                .long("IGNORE-CASE")
                .action(ArgAction::SetTrue)
                .help("Ignore case in all patterns"),
        )
        .arg(
            Arg::new("tabs")
                .long("tabs")
                .value_name("LIST")
                .help("Comma-separated tab stop columns (a single value repeats)"),
        )
        .arg(
            Arg::new("files")
                .value_name("FILE")
                .num_args(1..)
                .required(true)
                .help("Files to view, in order"),
        )
        .get_matches();

    let flags = Flags {
        quit_at_second_eof: matches.get_flag("quit-at-eof"),
        quit_at_first_eof: matches.get_flag("QUIT-AT-EOF"),
        quit_if_one_screen: matches.get_flag("quit-if-one-screen"),
        print_line_numbers: matches.get_flag("LINE-NUMBERS"),
        quiet: matches.get_flag("quiet"),
        very_quiet: matches.get_flag("QUIET"),
        chop_long_lines: matches.get_flag("chop-long-lines"),
        ignore_case_cond: matches.get_flag("ignore-case"),
        ignore_case_always: matches.get_flag("IGNORE-CASE"),
    };

    let tabs = match matches.get_one::<String>("tabs") {
        Some(spec) => parse_tabs(spec)?,
        None => TabStops::default(),
    };

    let files: Vec<String> = matches
        .get_many::<String>("files")
        .into_iter()
        .flatten()
        .cloned()
        .collect();

    let app = Application::new(AppConfig { files, flags, tabs });
    app.run().await?;
    Ok(())
}

fn parse_tabs(spec: &str) -> Result<TabStops> {
    let stops = spec
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .with_context(|| format!("invalid tab stop {part:?}"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(TabStops::new(stops))
}
