//! CLI entry point for the movievote core.
//!
//! # Responsibility
//! - Map command-line verbs onto core use-cases through a fixed table.
//! - Keep output deterministic (JSON for listings, key=value for votes).
//!
//! # Invariants
//! - Command names resolve against the enumerated `COMMAND_TABLE` only;
//!   unknown names are rejected with usage text, never dispatched
//!   dynamically.

use movievote_core::db::{open_db, Connection};
use movievote_core::{
    MovieDraft, MoviePageRequest, MovieService, Opinion, SqliteMovieRepository,
    SqliteVoteRepository, VoteService,
};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

const USAGE: &str = "usage: movievote_cli [--db PATH] [--log-dir DIR] <command> [args]

commands:
  add <title> <owner> [description]     submit a movie
  vote <movie-id> <caster> <like|hate>  cast or flip a vote
  list [--owner NAME] [--sort KEY]      list movies (sort: likes|hates|publication_date)
  ballots <caster>                      list one caster's ballots
  version                               print core version";

const DEFAULT_DB_PATH: &str = "movievote.db";

/// Enumerated command set. User input is resolved against `COMMAND_TABLE`;
/// nothing outside this set is ever invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Add,
    Vote,
    List,
    Ballots,
    Version,
}

const COMMAND_TABLE: &[(&str, Command)] = &[
    ("add", Command::Add),
    ("vote", Command::Vote),
    ("list", Command::List),
    ("ballots", Command::Ballots),
    ("version", Command::Version),
];

fn resolve_command(name: &str) -> Option<Command> {
    COMMAND_TABLE
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, command)| *command)
}

fn main() -> ExitCode {
    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let mut db_path = DEFAULT_DB_PATH.to_string();
    let mut log_dir: Option<String> = None;
    let mut rest = args.into_iter();

    let mut command_name = None;
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--db" => db_path = rest.next().ok_or("--db requires a path")?,
            "--log-dir" => {
                log_dir = Some(rest.next().ok_or("--log-dir requires a directory")?);
            }
            _ => {
                command_name = Some(arg);
                break;
            }
        }
    }

    let name = command_name.ok_or(USAGE)?;
    let command = resolve_command(&name)
        .ok_or_else(|| format!("unknown command `{name}`\n\n{USAGE}"))?;
    let args: Vec<String> = rest.collect();

    if let Some(dir) = log_dir {
        movievote_core::init_logging(movievote_core::default_log_level(), &dir)?;
    }

    if command == Command::Version {
        println!("movievote_core version={}", movievote_core::core_version());
        return Ok(());
    }

    let conn = open_db(&db_path).map_err(|err| format!("failed to open `{db_path}`: {err}"))?;

    match command {
        Command::Add => cmd_add(&conn, &args),
        Command::Vote => cmd_vote(&conn, &args),
        Command::List => cmd_list(&conn, &args),
        Command::Ballots => cmd_ballots(&conn, &args),
        Command::Version => unreachable!("handled before opening the database"),
    }
}

type CatalogService<'conn> =
    MovieService<SqliteMovieRepository<'conn>, SqliteVoteRepository<'conn>>;

fn catalog(conn: &Connection) -> CatalogService<'_> {
    MovieService::new(
        SqliteMovieRepository::new(conn),
        SqliteVoteRepository::new(conn),
    )
}

fn cmd_add(conn: &Connection, args: &[String]) -> Result<(), String> {
    let [title, owner, description @ ..] = args else {
        return Err(format!("add needs <title> <owner> [description]\n\n{USAGE}"));
    };

    let draft = MovieDraft {
        title: title.clone(),
        description: description.join(" "),
        owner: owner.clone(),
        publication_date: now_epoch_ms(),
    };

    let movie = catalog(conn).add_movie(&draft).map_err(|err| err.to_string())?;
    let rendered = serde_json::to_string_pretty(&movie).map_err(|err| err.to_string())?;
    println!("{rendered}");
    Ok(())
}

fn cmd_vote(conn: &Connection, args: &[String]) -> Result<(), String> {
    let [movie_id, caster, opinion] = args else {
        return Err(format!("vote needs <movie-id> <caster> <like|hate>\n\n{USAGE}"));
    };

    let movie_id: i64 = movie_id
        .parse()
        .map_err(|_| format!("invalid movie id `{movie_id}`"))?;
    let opinion: Opinion = opinion.parse().map_err(|err| format!("{err}"))?;

    let outcome = VoteService::new(conn)
        .cast_vote(movie_id, caster, opinion)
        .map_err(|err| err.to_string())?;

    println!(
        "movie_id={} opinion={} like_delta={} hate_delta={} likes={} hates={}",
        outcome.movie_id,
        outcome.opinion,
        outcome.like_delta,
        outcome.hate_delta,
        outcome.likes,
        outcome.hates
    );
    Ok(())
}

fn cmd_list(conn: &Connection, args: &[String]) -> Result<(), String> {
    let mut request = MoviePageRequest::default();
    let mut rest = args.iter();

    while let Some(flag) = rest.next() {
        match flag.as_str() {
            "--owner" => {
                request.owner = Some(rest.next().ok_or("--owner requires a name")?.clone());
            }
            "--sort" => {
                request.sort = Some(rest.next().ok_or("--sort requires a key")?.clone());
            }
            other => return Err(format!("unknown list flag `{other}`\n\n{USAGE}")),
        }
    }

    let movies = catalog(conn)
        .movie_page(&request)
        .map_err(|err| err.to_string())?;
    let rendered = serde_json::to_string_pretty(&movies).map_err(|err| err.to_string())?;
    println!("{rendered}");
    Ok(())
}

fn cmd_ballots(conn: &Connection, args: &[String]) -> Result<(), String> {
    let [caster] = args else {
        return Err(format!("ballots needs <caster>\n\n{USAGE}"));
    };

    let ballots = catalog(conn)
        .caster_ballots(caster)
        .map_err(|err| err.to_string())?;
    let rendered = serde_json::to_string_pretty(&ballots).map_err(|err| err.to_string())?;
    println!("{rendered}");
    Ok(())
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
