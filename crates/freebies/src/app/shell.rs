//! Line-oriented shell for inspecting and editing a session by hand.

use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::app::session::Session;
use crate::domain::{CompanyId, DevId, FreebieId};
use crate::error::{AppError, ModelError};
use crate::infra::db::FreebieStore;

const PROMPT: &str = "freebies> ";

const HELP: &str = "\
Commands:
  companies                          list companies
  devs                               list devs
  freebies                           list freebies
  company <id>                       show a company with its freebies and devs
  dev <id>                           show a dev with its freebies and companies
  oldest                             show the oldest company
  received <dev> <item>              check whether a dev owns an item
  give <company> <dev> <value> <item>
                                     stage a new freebie
  give-away <from> <to> <freebie>    hand a freebie to another dev
  delete company|dev|freebie <id>    delete a record and its freebies
  commit                             write pending changes
  rollback                           discard pending changes
  quit                               leave the shell";

/// A parsed shell line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ShellCommand {
    Commit,
    Companies,
    Company(CompanyId),
    Delete(DeleteTarget),
    Dev(DevId),
    Devs,
    Freebies,
    Give {
        company: CompanyId,
        dev: DevId,
        item_name: String,
        value: i64,
    },
    GiveAway {
        freebie: FreebieId,
        from: DevId,
        to: DevId,
    },
    Help,
    Oldest,
    Quit,
    Received {
        dev: DevId,
        item_name: String,
    },
    Rollback,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeleteTarget {
    Company(CompanyId),
    Dev(DevId),
    Freebie(FreebieId),
}

impl FromStr for ShellCommand {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Err(AppError::Command("empty command".to_string()));
        };

        let command = match keyword {
            "commit" => Self::Commit,
            "companies" => Self::Companies,
            "company" => Self::Company(CompanyId(parse_id(words.next(), "company id")?)),
            "delete" => {
                let kind = words.next();
                let id = parse_id(words.next(), "id")?;
                let target = match kind {
                    Some("company") => DeleteTarget::Company(CompanyId(id)),
                    Some("dev") => DeleteTarget::Dev(DevId(id)),
                    Some("freebie") => DeleteTarget::Freebie(FreebieId(id)),
                    _ => {
                        return Err(AppError::Command(
                            "usage: delete company|dev|freebie <id>".to_string(),
                        ));
                    }
                };

                Self::Delete(target)
            }
            "dev" => Self::Dev(DevId(parse_id(words.next(), "dev id")?)),
            "devs" => Self::Devs,
            "freebies" => Self::Freebies,
            "give" => {
                let company = CompanyId(parse_id(words.next(), "company id")?);
                let dev = DevId(parse_id(words.next(), "dev id")?);
                let value = parse_id(words.next(), "value")?;
                let item_name = rest(words, "item name")?;

                Self::Give {
                    company,
                    dev,
                    item_name,
                    value,
                }
            }
            "give-away" => Self::GiveAway {
                from: DevId(parse_id(words.next(), "source dev id")?),
                to: DevId(parse_id(words.next(), "target dev id")?),
                freebie: FreebieId(parse_id(words.next(), "freebie id")?),
            },
            "help" => Self::Help,
            "oldest" => Self::Oldest,
            "quit" | "exit" => Self::Quit,
            "received" => {
                let dev = DevId(parse_id(words.next(), "dev id")?);
                let item_name = rest(words, "item name")?;

                Self::Received { dev, item_name }
            }
            "rollback" => Self::Rollback,
            unknown => {
                return Err(AppError::Command(format!(
                    "unknown command `{unknown}`; type `help`"
                )));
            }
        };

        Ok(command)
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Reads commands from `input` until `quit` or end of input.
///
/// Malformed commands and references to missing records are reported on
/// `output` and the shell keeps going.
///
/// # Errors
/// Returns an error if reading input, writing output or talking to the
/// store fails.
pub fn run<S, R, W>(session: &mut Session<S>, mut input: R, output: &mut W) -> Result<(), AppError>
where
    S: FreebieStore,
    R: BufRead,
    W: Write,
{
    writeln!(output, "Type `help` for a list of commands.")?;
    let mut line = String::new();

    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let flow = line
            .parse::<ShellCommand>()
            .and_then(|command| execute(session, command, output));
        match flow {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(AppError::Command(message)) => writeln!(output, "error: {message}")?,
            Err(AppError::Model(err)) => writeln!(output, "error: {err}")?,
            Err(err) => return Err(err),
        }
    }

    if session.has_pending_changes() {
        writeln!(output, "Uncommitted changes discarded.")?;
    }

    Ok(())
}

fn execute<S, W>(
    session: &mut Session<S>,
    command: ShellCommand,
    output: &mut W,
) -> Result<Flow, AppError>
where
    S: FreebieStore,
    W: Write,
{
    match command {
        ShellCommand::Help => writeln!(output, "{HELP}")?,
        ShellCommand::Companies => {
            for company in session.graph().companies() {
                writeln!(
                    output,
                    "{}: {company} founded {}",
                    company.id, company.founding_year
                )?;
            }
        }
        ShellCommand::Devs => {
            for dev in session.graph().devs() {
                writeln!(output, "{}: {dev}", dev.id)?;
            }
        }
        ShellCommand::Freebies => {
            let graph = session.graph();
            for freebie in graph.freebies() {
                let details = graph.freebie_details(freebie.id).unwrap_or_default();
                writeln!(output, "{}: {freebie} {details}", freebie.id)?;
            }
        }
        ShellCommand::Company(id) => {
            let graph = session.graph();
            let company = graph.company(id).ok_or(ModelError::CompanyNotFound(id))?;
            writeln!(output, "{company} founded {}", company.founding_year)?;
            writeln!(output, "  freebies:")?;
            for freebie in graph.company_freebies(id) {
                writeln!(output, "    {}: {freebie}", freebie.id)?;
            }
            writeln!(output, "  devs:")?;
            for dev in graph.company_devs(id) {
                writeln!(output, "    {}: {dev}", dev.id)?;
            }
        }
        ShellCommand::Dev(id) => {
            let graph = session.graph();
            let dev = graph.dev(id).ok_or(ModelError::DevNotFound(id))?;
            writeln!(output, "{dev}")?;
            writeln!(output, "  freebies:")?;
            for freebie in graph.dev_freebies(id) {
                writeln!(output, "    {}: {freebie}", freebie.id)?;
            }
            writeln!(output, "  companies:")?;
            for company in graph.dev_companies(id) {
                writeln!(output, "    {}: {company}", company.id)?;
            }
        }
        ShellCommand::Oldest => match session.graph().oldest_company() {
            Some(company) => writeln!(
                output,
                "{}: {company} founded {}",
                company.id, company.founding_year
            )?,
            None => writeln!(output, "no companies")?,
        },
        ShellCommand::Received { dev, item_name } => {
            let received = session.graph().received_one(dev, &item_name);
            writeln!(output, "{received}")?;
        }
        ShellCommand::Give {
            company,
            dev,
            item_name,
            value,
        } => {
            let graph = session.graph();
            let issuer = graph.company(company).ok_or(ModelError::CompanyNotFound(company))?;
            let recipient = graph.dev(dev).ok_or(ModelError::DevNotFound(dev))?;
            let freebie = issuer.give_freebie(recipient, item_name, value);

            let id = session.modify(|graph| graph.add_freebie(freebie))?;
            let details = session.graph().freebie_details(id).unwrap_or_default();
            writeln!(output, "staged freebie {id}: {details}")?;
        }
        ShellCommand::GiveAway { freebie, from, to } => {
            if session.give_away(from, to, freebie)? {
                let details = session.graph().freebie_details(freebie).unwrap_or_default();
                writeln!(output, "transferred freebie {freebie}: {details}")?;
            } else {
                writeln!(
                    output,
                    "freebie {freebie} is not owned by dev {from}; nothing changed"
                )?;
            }
        }
        ShellCommand::Delete(target) => match target {
            DeleteTarget::Company(id) => {
                let removed = session.modify(|graph| graph.delete_company(id))?;
                writeln!(output, "deleted company {id} and {} freebies", removed.len())?;
            }
            DeleteTarget::Dev(id) => {
                let removed = session.modify(|graph| graph.delete_dev(id))?;
                writeln!(output, "deleted dev {id} and {} freebies", removed.len())?;
            }
            DeleteTarget::Freebie(id) => {
                let removed = session.modify(|graph| graph.delete_freebie(id))?;
                writeln!(output, "deleted freebie {id}: {removed}")?;
            }
        },
        ShellCommand::Commit => {
            session.commit()?;
            writeln!(output, "committed")?;
        }
        ShellCommand::Rollback => {
            session.rollback()?;
            writeln!(output, "rolled back")?;
        }
        ShellCommand::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
}

fn parse_id(word: Option<&str>, what: &str) -> Result<i64, AppError> {
    let word = word.ok_or_else(|| AppError::Command(format!("missing {what}")))?;

    word.parse::<i64>()
        .map_err(|_| AppError::Command(format!("invalid {what} `{word}`")))
}

fn rest<'a>(words: impl Iterator<Item = &'a str>, what: &str) -> Result<String, AppError> {
    let joined = words.collect::<Vec<_>>().join(" ");
    if joined.is_empty() {
        return Err(AppError::Command(format!("missing {what}")));
    }

    Ok(joined)
}
