use anyhow::{anyhow, Result};
use briefing::build::build_site;
use briefing::config::Config;
use briefing::content::ContentStore;
use briefing::router::{MemoryHistory, Route};
use briefing::session::{Event, PageSizes, Session, SignupForm};
use briefing::subscribe::{
    FormDispatcher, HttpTransport, RecordingTransport, SubscriptionService, DEFAULT_ENDPOINT,
};
use briefing::view::{render, SiteInfo};
use chrono::Datelike;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use url::Url;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = app().get_matches();

    match matches.subcommand() {
        ("build", Some(args)) => build(args),
        ("search", Some(args)) => search(args),
        ("browse", Some(args)) => browse(args),
        _ => Err(anyhow!("Unknown subcommand")),
    }
}

fn app() -> App<'static, 'static> {
    let project_arg = Arg::with_name("PROJECT_DIR")
        .help("The project directory (or a directory beneath it)")
        .default_value(".");

    App::new("briefing")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds and browses the Responsible AI & Beyond newsletter site")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Renders the site to static HTML")
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .default_value("_output")
                        .help("The directory the site is written to"),
                )
                .arg(project_arg.clone()),
        )
        .subcommand(
            SubCommand::with_name("search")
                .about("Searches newsletters and resources")
                .arg(Arg::with_name("QUERY").required(true))
                .arg(project_arg.clone()),
        )
        .subcommand(
            SubCommand::with_name("browse")
                .about("Starts an interactive session driven by commands on stdin")
                .arg(
                    Arg::with_name("dry-run")
                        .long("dry-run")
                        .help("Record subscriptions instead of posting them"),
                )
                .arg(
                    Arg::with_name("fragment")
                        .long("fragment")
                        .takes_value(true)
                        .help("The URL fragment the session starts from (e.g. `#resources`)"),
                )
                .arg(project_arg),
        )
}

fn project_dir(args: &ArgMatches) -> PathBuf {
    PathBuf::from(args.value_of("PROJECT_DIR").unwrap_or("."))
}

fn build(args: &ArgMatches) -> Result<()> {
    let output = PathBuf::from(args.value_of("output").unwrap_or("_output"));
    let config = Config::from_directory(&project_dir(args), &output)?;
    build_site(config)?;
    Ok(())
}

/// Everything a session needs, from the project when there is one and from
/// the built-in defaults otherwise.
struct Setup {
    content: ContentStore,
    page_sizes: PageSizes,
    site: SiteInfo,
    subscribe_url: Url,
}

fn setup(dir: &Path) -> Result<Setup> {
    let year = chrono::Local::now().year();
    match Config::from_directory(dir, &dir.join("_output")) {
        Ok(config) => Ok(Setup {
            content: config.content()?,
            page_sizes: config.page_sizes,
            site: config.site_info(year),
            subscribe_url: config.subscribe_url,
        }),
        Err(err) => {
            tracing::info!(error = %err, "no project found; using built-in content");
            let content = ContentStore::builtin();
            let title = content.home().headline.clone();
            Ok(Setup {
                content,
                page_sizes: PageSizes::default(),
                site: SiteInfo {
                    title,
                    tagline: String::new(),
                    site_root: "http://localhost/".to_owned(),
                    subscribe_url: DEFAULT_ENDPOINT.to_owned(),
                    year,
                },
                subscribe_url: Url::parse(DEFAULT_ENDPOINT)?,
            })
        }
    }
}

fn search(args: &ArgMatches) -> Result<()> {
    let setup = setup(&project_dir(args))?;
    let state = briefing::session::SessionState {
        route: Route::Search,
        query: args.value_of("QUERY").unwrap_or_default().to_owned(),
        ..Default::default()
    };
    print!("{}", render(&state, &setup.content, setup.page_sizes, &setup.site));
    Ok(())
}

fn browse(args: &ArgMatches) -> Result<()> {
    let setup = setup(&project_dir(args))?;
    let endpoint = setup.subscribe_url.clone();
    let fragment = args.value_of("fragment").unwrap_or_default();
    if args.is_present("dry-run") {
        run_session(
            &setup,
            fragment,
            FormDispatcher::new(endpoint, RecordingTransport::default()),
        )
    } else {
        run_session(
            &setup,
            fragment,
            FormDispatcher::new(endpoint, HttpTransport::new()?),
        )
    }
}

/// A line typed into the interactive session.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Event(Event),
    Back,
    Forward,
    State,
    Help,
    Quit,
}

const HELP: &str = "commands: home | content | resources | search | back | forward | \
query <text> | page <n> | menu | email <footer|cta> <address> | submit <footer|cta> | \
state | help | quit";

fn parse_form(s: &str) -> Result<SignupForm> {
    match s {
        "footer" => Ok(SignupForm::Footer),
        "cta" => Ok(SignupForm::Cta),
        _ => Err(anyhow!("Unknown form `{}`; expected `footer` or `cta`", s)),
    }
}

fn parse_command(line: &str, current: Route) -> Result<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(' ') {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    Ok(match word {
        "home" | "content" | "resources" | "search" => {
            Command::Event(Event::Navigate(Route::from_fragment(word)))
        }
        "back" => Command::Back,
        "forward" => Command::Forward,
        "query" => Command::Event(Event::QueryChanged(rest.to_owned())),
        "page" => Command::Event(Event::PageSelected(current, rest.parse()?)),
        "menu" => Command::Event(Event::ToggleMenu),
        "email" => {
            let (form, address) = rest.split_once(' ').unwrap_or((rest, ""));
            Command::Event(Event::EmailChanged(parse_form(form)?, address.trim().to_owned()))
        }
        "submit" => Command::Event(Event::Submit(parse_form(rest)?)),
        "state" => Command::State,
        "help" | "" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Err(anyhow!("Unknown command `{}`", word)),
    })
}

fn show<S: SubscriptionService>(session: &Session<MemoryHistory, S>, site: &SiteInfo) {
    println!(
        "{}",
        render(session.state(), session.content(), session.page_sizes(), site)
    );
}

fn run_session<S: SubscriptionService>(
    setup: &Setup,
    fragment: &str,
    subscriptions: S,
) -> Result<()> {
    let mut session = Session::new(
        &setup.content,
        MemoryHistory::new(fragment),
        subscriptions,
        setup.page_sizes,
        &setup.site.site_root,
    );
    session.subscribe(|state| tracing::debug!(route = %state.route, query = %state.query, "state changed"));

    show(&session, &setup.site);
    println!("{}", HELP);

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let command = match parse_command(&line, session.state().route) {
            Ok(command) => command,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };
        match command {
            Command::Event(event) => session.apply(event),
            Command::Back => {
                if session.router_mut().history_mut().back() {
                    session.apply(Event::HistoryChanged);
                }
            }
            Command::Forward => {
                if session.router_mut().history_mut().forward() {
                    session.apply(Event::HistoryChanged);
                }
            }
            Command::State => {
                println!("{}", serde_json::to_string_pretty(session.state())?);
                continue;
            }
            Command::Help => {
                println!("{}", HELP);
                continue;
            }
            Command::Quit => break,
        }
        show(&session, &setup.site);
    }
    Ok(())
}
