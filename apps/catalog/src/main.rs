use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    AggregateFetcher, HttpTransport, JsonTransport, QueryController, QuerySnapshot, SwapiPage,
};
use futures::future::join_all;
use shared::{domain::RecordId, protocol::Person};
use storage::{Favourites, Storage};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod browse;
mod config;
mod render;

use browse::BrowseCommand;
use config::{load_settings, normalize_database_url, Settings};

type PeopleQuery = QueryController<SwapiPage<Person>>;

#[derive(Parser, Debug)]
#[command(name = "catalog", version, about = "Browse the Star Wars API from the terminal")]
struct Args {
    /// Config file to read instead of ./catalog.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Favourites database, overriding configuration.
    #[arg(long, global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of people.
    List {
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long)]
        search: Option<String>,
        /// Also resolve each person's homeworld.
        #[arg(long)]
        homeworlds: bool,
    },
    /// Print a person with homeworld, films and starships.
    Show { id: String },
    /// Add or remove a favourite.
    Favourite { id: String },
    /// Print favourites, optionally removing one first.
    Favourites {
        #[arg(long)]
        remove: Option<String>,
    },
    /// Page and search interactively.
    Browse {
        #[arg(long)]
        search: Option<String>,
    },
}

struct App {
    settings: Settings,
    transport: Arc<HttpTransport>,
    fetcher: AggregateFetcher<Arc<HttpTransport>>,
    favourites: Favourites<Storage>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = %format!("{err:#}"), "catalog failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<ExitCode> {
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = args.database_url {
        settings.database_url = normalize_database_url(&url);
    }
    info!(api = %settings.api_base_url, database = %settings.database_url, "starting catalog");

    let app = App::new(settings).await?;
    match args.command {
        Command::List {
            page,
            search,
            homeworlds,
        } => app.list(page, search, homeworlds).await,
        Command::Show { id } => app.show(RecordId::new(id)).await,
        Command::Favourite { id } => app.toggle_favourite(RecordId::new(id)).await,
        Command::Favourites { remove } => app.show_favourites(remove.map(RecordId::new)).await,
        Command::Browse { search } => app.browse(search).await,
    }
}

impl App {
    async fn new(settings: Settings) -> Result<Self> {
        let transport = Arc::new(
            HttpTransport::with_timeout(settings.request_timeout())
                .context("failed to build http client")?,
        );
        let fetcher = AggregateFetcher::new(transport.clone(), settings.api_base_url.clone());
        let storage = Storage::new(&settings.database_url).await?;
        let favourites = Favourites::load(storage).await?;

        Ok(Self {
            settings,
            transport,
            fetcher,
            favourites,
        })
    }

    fn people_query(&self) -> PeopleQuery {
        let transport: Arc<dyn JsonTransport> = self.transport.clone();
        QueryController::start(self.settings.people_query(), SwapiPage::new(), transport)
    }

    async fn list(&self, page: i64, search: Option<String>, homeworlds: bool) -> Result<ExitCode> {
        let query = self.people_query();
        if let Some(term) = search {
            query.set_search_term(term);
        }
        let mut snapshot = wait_settled(&query).await?;
        if page != 1 {
            query.set_page(page);
            snapshot = wait_settled(&query).await?;
        }

        self.print_page(&snapshot, homeworlds).await;
        Ok(if snapshot.error.is_some() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        })
    }

    async fn show(&self, id: RecordId) -> Result<ExitCode> {
        match self.fetcher.fetch_aggregate(&id).await {
            Ok(record) => {
                let favourite = self.favourites.contains(&id).await;
                println!("{}", render::detail(&id, &record, favourite));
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                println!("{}", render::failure(&err));
                Ok(ExitCode::FAILURE)
            }
        }
    }

    async fn toggle_favourite(&self, id: RecordId) -> Result<ExitCode> {
        if self.favourites.toggle(&id).await? {
            println!("Added {id} to favourites");
        } else {
            println!("Removed {id} from favourites");
        }
        Ok(ExitCode::SUCCESS)
    }

    async fn show_favourites(&self, remove: Option<RecordId>) -> Result<ExitCode> {
        if let Some(id) = remove {
            if !self.favourites.remove(&id).await? {
                warn!(%id, "not a favourite");
            }
        }

        let ids = self.favourites.ids().await;
        match self.fetcher.fetch_records(&ids).await {
            Ok(people) => {
                println!("{}", render::favourites(&people));
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                warn!(error = %err, "favourites fetch failed");
                println!("{}", render::LIST_FAILED);
                Ok(ExitCode::FAILURE)
            }
        }
    }

    async fn browse(&self, search: Option<String>) -> Result<ExitCode> {
        let query = self.people_query();
        if let Some(term) = search {
            query.set_search_term(term);
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();
        loop {
            let snapshot = wait_settled(&query).await?;
            self.print_page(&snapshot, false).await;

            stdout.write_all(b"> ").await?;
            stdout.flush().await?;
            let Some(line) = lines.next_line().await? else {
                break;
            };

            match browse::parse(&line) {
                Some(BrowseCommand::Next) => query.next_page(),
                Some(BrowseCommand::Previous) => query.previous_page(),
                Some(BrowseCommand::Page(n)) => query.set_page(n),
                Some(BrowseCommand::Search(term)) => query.set_search_term(term),
                Some(BrowseCommand::Help) => println!("{}", browse::HELP),
                Some(BrowseCommand::Quit) => break,
                None => println!("unknown command, {}", browse::HELP),
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    async fn print_page(&self, snapshot: &QuerySnapshot<Person>, with_homeworlds: bool) {
        let favourites = self.favourites.ids().await;
        let homeworlds = if with_homeworlds {
            self.homeworld_names(&snapshot.items).await
        } else {
            Vec::new()
        };
        println!("{}", render::list_page(snapshot, &favourites, &homeworlds));
    }

    /// Homeworld per card; a card whose homeworld cannot be fetched shows `unknown`.
    async fn homeworld_names(&self, people: &[Person]) -> Vec<String> {
        join_all(people.iter().map(|person| self.fetcher.fetch_homeworld(person)))
            .await
            .into_iter()
            .map(|planet| planet.map(|p| p.name).unwrap_or_else(|_| "unknown".into()))
            .collect()
    }
}

async fn wait_settled(query: &PeopleQuery) -> Result<QuerySnapshot<Person>> {
    let mut updates = query.subscribe();
    let snapshot = updates
        .wait_for(QuerySnapshot::is_settled)
        .await
        .context("list query stopped")?
        .clone();
    Ok(snapshot)
}
