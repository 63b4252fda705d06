use anyhow::{Context, Result};
use client::command::{Command, Expand, FilterChange, HELP, Section};
use client::{
    ChatSession, FunctionsClient, HttpChatTransport, ResultContext, SendPolicy, sync_profile,
};
use extract::{Channel, ChannelResult, Funder, FundingResult, Outcome};
use forms::{ChannelSearch, FundingSearch, Profile};
use render::{Filter, RecommendationView, ResultView, SortKey};
use std::sync::Arc;
use store::{Stores, UserProfileRecord};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const RECOMMEND_PAGE: &str = "/recommend";
const INTELLIGENCE_PAGE: &str = "/intelligence";

/// What is on screen right now.
enum Screen {
    Empty,
    Recommendation(RecommendationView),
    Channels(ChannelResult, ResultView<Channel>),
    Funding(FundingResult, ResultView<Funder>),
}

struct App {
    functions: FunctionsClient,
    chat: ChatSession,
    screen: Screen,
    context: ResultContext,
    page: &'static str,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let functions = FunctionsClient::from_env()?;
    let stores = Stores::from_env();

    let transport = Arc::new(HttpChatTransport::new(functions.base_url())?);
    let mut chat = ChatSession::new(transport, SendPolicy::Queue);

    if let Ok(user_id) = dotenv::var("MATERNA_USER_ID") {
        let mut record = UserProfileRecord::new(&user_id);
        record.email = dotenv::var("MATERNA_USER_EMAIL").ok();
        record.display_name = dotenv::var("MATERNA_USER_NAME").ok();
        if !sync_profile(&stores, &record).await {
            tracing::debug!(user_id = %user_id, "profile not synced");
        }
        chat = chat.with_history_store(stores.chat_history, user_id);
        let restored = chat.restore().await;
        if restored > 0 {
            println!("Restored {} chat messages.", restored);
        }
    }

    let mut app = App {
        functions,
        chat,
        screen: Screen::Empty,
        context: ResultContext::Absent,
        page: "/",
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        app.execute(&args.join(" ")).await?;
        return Ok(());
    }

    println!("=== Materna ===\n");
    println!("{}\n", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let line = line.trim();
        if line == "quit" || line == "exit" {
            break;
        }
        if let Err(e) = app.execute(line).await {
            println!("! {:#}", e);
        }
    }

    Ok(())
}

impl App {
    async fn execute(&mut self, line: &str) -> Result<()> {
        match Command::parse(line)? {
            Command::Empty => {}
            Command::Help => println!("{}", HELP),
            Command::Recommend { path } => self.recommend(&path).await?,
            Command::Channels(search) => self.channels(&search).await,
            Command::Funding(search) => self.funding(&search).await,
            Command::Expand(target) => self.expand(target)?,
            Command::Sort(key) => self.sort(key)?,
            Command::Filter(change) => self.filter(change)?,
            Command::Show => self.show(),
            Command::Ask(question) => self.ask(&question).await,
        }
        Ok(())
    }

    async fn recommend(&mut self, path: &str) -> Result<()> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path))?;
        let profile: Profile = serde_json::from_str(&text)
            .with_context(|| format!("Invalid profile in {}", path))?;
        profile.validate()?;

        self.page = RECOMMEND_PAGE;
        match self.functions.recommend(&profile).await {
            Outcome::Ok(result) => {
                self.context = ResultContext::Recommendation(result.clone());
                self.screen = Screen::Recommendation(RecommendationView::new(result));
                self.show();
            }
            other => self.show_unstructured(&other),
        }
        Ok(())
    }

    async fn channels(&mut self, search: &ChannelSearch) {
        self.page = INTELLIGENCE_PAGE;
        match self.functions.find_channels(search).await {
            Outcome::Ok(result) => {
                self.context = ResultContext::Channels(result.clone());
                let view = ResultView::new(result.channels.clone());
                self.screen = Screen::Channels(result, view);
                self.show();
            }
            other => self.show_unstructured(&other),
        }
    }

    async fn funding(&mut self, search: &FundingSearch) {
        self.page = INTELLIGENCE_PAGE;
        match self.functions.scout_funding(search).await {
            Outcome::Ok(result) => {
                self.context = ResultContext::Funding(result.clone());
                let view = ResultView::new(result.funders.clone());
                self.screen = Screen::Funding(result, view);
                self.show();
            }
            other => self.show_unstructured(&other),
        }
    }

    fn expand(&mut self, target: Expand) -> Result<()> {
        match (&mut self.screen, target) {
            (Screen::Empty, _) => anyhow::bail!("nothing to expand yet"),
            (Screen::Recommendation(view), Expand::All) => view.expand_all(),
            (Screen::Channels(_, view), Expand::All) => view.expand_all(),
            (Screen::Funding(_, view), Expand::All) => view.expand_all(),
            (Screen::Recommendation(view), Expand::Section(section, index)) => {
                match section {
                    Section::Hospitals => view.hospitals.toggle(index),
                    Section::Schemes => view.schemes.toggle(index),
                    Section::Ngos => view.ngos.toggle(index),
                };
            }
            (Screen::Channels(_, view), Expand::Card(index)) => {
                view.toggle(index);
            }
            (Screen::Funding(_, view), Expand::Card(index)) => {
                view.toggle(index);
            }
            (Screen::Recommendation(_), Expand::Card(_)) => {
                anyhow::bail!("name a section: expand hospitals|schemes|ngos <n>")
            }
            (_, Expand::Section(..)) => anyhow::bail!("sections only apply to recommendations"),
        }
        self.show();
        Ok(())
    }

    fn sort(&mut self, key: SortKey) -> Result<()> {
        match &mut self.screen {
            Screen::Recommendation(view) => {
                view.hospitals.set_sort(key);
                view.schemes.set_sort(key);
                view.ngos.set_sort(key);
            }
            Screen::Channels(_, view) => view.set_sort(key),
            Screen::Funding(_, view) => view.set_sort(key),
            Screen::Empty => anyhow::bail!("nothing to sort yet"),
        }
        self.show();
        Ok(())
    }

    fn filter(&mut self, change: FilterChange) -> Result<()> {
        let apply = |current: &Filter| {
            let mut next = current.clone();
            match &change {
                FilterChange::Type(kind) => next.kind = kind.clone(),
                FilterChange::Priority(priority) => next.priority = priority.clone(),
                FilterChange::Clear => next = Filter::default(),
            }
            next
        };

        match &mut self.screen {
            Screen::Channels(_, view) => {
                let next = apply(view.filter());
                view.set_filter(next);
            }
            Screen::Funding(_, view) => {
                let next = apply(view.filter());
                view.set_filter(next);
            }
            Screen::Recommendation(_) => anyhow::bail!("recommendations have no filters"),
            Screen::Empty => anyhow::bail!("nothing to filter yet"),
        }
        self.show();
        Ok(())
    }

    fn show(&self) {
        match &self.screen {
            Screen::Empty => println!("No results yet."),
            Screen::Recommendation(view) => println!("{}", view.render()),
            Screen::Channels(result, view) => println!("{}", render::render_channels(result, view)),
            Screen::Funding(result, view) => println!("{}", render::render_funding(result, view)),
        }
    }

    /// Error panels and raw text replace whatever was shown before.
    fn show_unstructured<T>(&mut self, outcome: &Outcome<T>) {
        self.screen = Screen::Empty;
        self.context = ResultContext::Absent;
        println!("{}", render::render_outcome(outcome, |_| String::new()));
    }

    async fn ask(&mut self, question: &str) {
        match self.chat.send(question, self.page, &self.context).await {
            Ok(reply) => println!("\nMaterna AI:\n{}\n", reply.text),
            Err(e) => println!("! {}", e),
        }
    }
}
