mod config;
mod layout;
mod names;
mod prompt;
mod render;
mod session;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, value_parser};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::prompt::TerminalPrompter;
use crate::render::CertificateRenderer;

fn cli() -> Command {
    Command::new("certify")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Batch-generates participation certificates from a template image")
        .subcommand(
            Command::new("generate")
                .about("Render one certificate per attendee (default)")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_name("PATH")
                        .help("Config file, created interactively if missing")
                        .default_value(config::DEFAULT_CONFIG_PATH)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("names")
                        .long("names")
                        .value_name("PATH")
                        .help("Attendee list, one name per line")
                        .default_value(session::DEFAULT_NAMES_PATH)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("extract")
                .about("Extract unique team member names from a registration CSV")
                .arg(
                    Arg::new("input")
                        .value_name("INPUT")
                        .help("CSV with 'Team Member N Name' columns")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_name("PATH")
                        .help("Name list to write (default: lower-cased input name with .txt)")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("members")
                        .long("members")
                        .value_name("N")
                        .help("Number of team member columns to read")
                        .default_value("4")
                        .value_parser(value_parser!(usize)),
                ),
        )
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("extract", sub)) => run_extract(sub),
        Some(("generate", sub)) => {
            // Both args carry defaults.
            let config_path = sub.get_one::<PathBuf>("config").context("Missing --config")?;
            let names_path = sub.get_one::<PathBuf>("names").context("Missing --names")?;
            run_generate(config_path, names_path)
        }
        _ => run_generate(
            Path::new(config::DEFAULT_CONFIG_PATH),
            Path::new(session::DEFAULT_NAMES_PATH),
        ),
    }
}

fn run_generate(config_path: &Path, names_path: &Path) -> Result<()> {
    let mut prompter = TerminalPrompter;
    let config =
        config::load_or_initialize(config_path, &config::default_options(), &mut prompter)
            .context("Failed to load configuration")?;
    let renderer = CertificateRenderer::new(&config).context("Failed to load certificate assets")?;

    let summary = session::run(&mut prompter, &renderer, names_path)?;
    println!(
        "Generated {} certificate(s) in {}",
        summary.rendered,
        config.out.display()
    );
    Ok(())
}

fn run_extract(args: &ArgMatches) -> Result<()> {
    let input = args.get_one::<PathBuf>("input").context("Missing INPUT")?;
    let output = args.get_one::<PathBuf>("output").map(PathBuf::as_path);
    let members = *args.get_one::<usize>("members").context("Missing --members")?;

    let written = names::extract(input, output, members)?;
    info!(input = %input.display(), "extraction finished");
    println!("Wrote {}", written.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn test_generate_defaults() {
        let matches = cli().get_matches_from(["certify", "generate"]);
        let sub = matches.subcommand_matches("generate").unwrap();
        assert_eq!(
            sub.get_one::<PathBuf>("config").unwrap(),
            &PathBuf::from("config.json")
        );
        assert_eq!(
            sub.get_one::<PathBuf>("names").unwrap(),
            &PathBuf::from("random_names.txt")
        );
    }

    #[test]
    fn test_extract_args() {
        let matches =
            cli().get_matches_from(["certify", "extract", "Teams.csv", "-o", "random_names.txt", "--members", "3"]);
        let sub = matches.subcommand_matches("extract").unwrap();
        assert_eq!(sub.get_one::<PathBuf>("input").unwrap(), &PathBuf::from("Teams.csv"));
        assert_eq!(sub.get_one::<usize>("members"), Some(&3));
    }
}
