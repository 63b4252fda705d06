//! Parsing for the `materna` terminal commands.

use anyhow::{Context, Result};
use forms::{ChannelSearch, FundingSearch, OutreachProfile};
use render::SortKey;

pub const HELP: &str = "\
Commands:
  recommend <profile.json>                 maternal care recommendations
  channels <district> [| profile [| context]]
  funding [focus [| program [| type]]]
  expand <n> | expand all                  toggle card details
  expand hospitals|schemes|ngos <n>
  sort relevance|name
  filter type <t> | filter priority <p> | filter clear
  show                                     print the current result again
  ask <question>                           chat about the current result
  help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Hospitals,
    Schemes,
    Ngos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expand {
    All,
    /// Zero-based card index.
    Card(usize),
    Section(Section, usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    /// `None` clears that filter.
    Type(Option<String>),
    Priority(Option<String>),
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Empty,
    Help,
    Recommend { path: String },
    Channels(ChannelSearch),
    Funding(FundingSearch),
    Expand(Expand),
    Sort(SortKey),
    Filter(FilterChange),
    Show,
    Ask(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        Ok(match command {
            "" => Command::Empty,
            "help" => Command::Help,
            "recommend" => {
                anyhow::ensure!(!rest.is_empty(), "usage: recommend <profile.json>");
                Command::Recommend {
                    path: rest.to_string(),
                }
            }
            "channels" => Command::Channels(parse_channels(rest)?),
            "funding" => Command::Funding(parse_funding(rest)),
            "expand" => Command::Expand(parse_expand(rest)?),
            "sort" => Command::Sort(parse_sort(rest)?),
            "filter" => Command::Filter(parse_filter(rest)?),
            "show" => Command::Show,
            "ask" | "chat" => Command::Ask(rest.to_string()),
            other => anyhow::bail!("unknown command '{}', try 'help'", other),
        })
    }
}

/// `<district> [| profile [| context]]`
fn parse_channels(args: &str) -> Result<ChannelSearch> {
    let mut parts = args.split('|').map(str::trim);
    let district = parts.next().unwrap_or_default();
    let profile = match parts.next().filter(|p| !p.is_empty()) {
        Some(p) => p.parse::<OutreachProfile>()?,
        None => OutreachProfile::default(),
    };
    let search = ChannelSearch {
        district: district.to_string(),
        profile,
        additional_context: parts.next().unwrap_or_default().to_string(),
    };
    search.validate()?;
    Ok(search)
}

/// `[focus [| program [| type]]]`; blanks are left for the engine's defaults.
fn parse_funding(args: &str) -> FundingSearch {
    let mut parts = args.split('|').map(str::trim);
    let mut next = || parts.next().filter(|p| !p.is_empty()).map(str::to_string);
    FundingSearch {
        focus_area: next(),
        program_description: next(),
        funding_type: next(),
    }
}

fn parse_expand(args: &str) -> Result<Expand> {
    let words: Vec<&str> = args.split_whitespace().collect();
    Ok(match words.as_slice() {
        ["all"] => Expand::All,
        [n] => Expand::Card(card_index(n)?),
        [section, n] => {
            let section = match *section {
                "hospitals" => Section::Hospitals,
                "schemes" => Section::Schemes,
                "ngos" => Section::Ngos,
                other => anyhow::bail!("unknown section '{}'", other),
            };
            Expand::Section(section, card_index(n)?)
        }
        _ => anyhow::bail!("usage: expand <n> | expand all | expand <section> <n>"),
    })
}

fn parse_sort(key: &str) -> Result<SortKey> {
    Ok(match key {
        "relevance" | "confidence" => SortKey::Relevance,
        "name" => SortKey::Name,
        other => anyhow::bail!("unknown sort '{}', use relevance or name", other),
    })
}

fn parse_filter(args: &str) -> Result<FilterChange> {
    let (field, value) = args.split_once(' ').unwrap_or((args, ""));
    let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
    Ok(match field {
        "type" => FilterChange::Type(value),
        "priority" => FilterChange::Priority(value),
        "clear" => FilterChange::Clear,
        other => anyhow::bail!("unknown filter '{}', use type, priority or clear", other),
    })
}

/// Cards are numbered from 1 on screen.
fn card_index(n: &str) -> Result<usize> {
    let n: usize = n.parse().with_context(|| format!("'{}' is not a card number", n))?;
    anyhow::ensure!(n > 0, "cards are numbered from 1");
    Ok(n - 1)
}
