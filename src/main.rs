mod prompt;

use crate::prompt::{Report, TerminalConfirmer};
use anyhow::Context;
use chrono::NaiveDate;
use clap::{ArgGroup, Parser};
use rmtweet::config::{self, parse_date, Credentials, Options, Settings};
use rmtweet::twitter::{self, Catalog, Client, OAuthTransport};
use rmtweet::Destroyer;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[clap(version, about = "Destroys your tweets or favorites in bulk")]
#[clap(group(ArgGroup::new("target").args(&["tweets", "favorites"])))]
struct Args {
    /// Path to a JSON config file; command line and environment take precedence
    #[clap(short, long, env = "RMTWEET_CONFIG")]
    config: Option<PathBuf>,
    /// Twitter consumer key
    #[clap(long, env = "RMTWEET_TWITTER_CONSUMER", hide_env_values = true)]
    consumer: Option<String>,
    /// Twitter consumer secret
    #[clap(long, env = "RMTWEET_TWITTER_CONSUMER_SECRET", hide_env_values = true)]
    consumer_secret: Option<String>,
    /// Twitter access token
    #[clap(long, env = "RMTWEET_TWITTER_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Twitter access token secret
    #[clap(long, env = "RMTWEET_TWITTER_TOKEN_SECRET", hide_env_values = true)]
    token_secret: Option<String>,
    /// Work with tweets
    #[clap(long, env = "RMTWEET_TWEETS")]
    tweets: bool,
    /// Work with favorites
    #[clap(long, env = "RMTWEET_FAVORITES")]
    favorites: bool,
    /// Skip items older than this date (DD.MM.YYYY)
    #[clap(long, env = "RMTWEET_MIN_DATE", parse(try_from_str = parse_date))]
    min_date: Option<NaiveDate>,
    /// Skip items newer than this date (DD.MM.YYYY)
    #[clap(long, env = "RMTWEET_MAX_DATE", parse(try_from_str = parse_date))]
    max_date: Option<NaiveDate>,
    /// Only destroy replies
    #[clap(long, env = "RMTWEET_REPLIES")]
    replies: bool,
    /// Only destroy replies to this user
    #[clap(long, env = "RMTWEET_REPLIES_TO")]
    replies_to: Option<String>,
    /// Do not ask before destroying each item
    #[clap(long, env = "RMTWEET_FORCE")]
    force: bool,
    /// Be verbose
    #[clap(short, long, env = "RMTWEET_VERBOSE")]
    verbose: bool,
    /// Number of items to request per page [default: 200]
    #[clap(long, env = "RMTWEET_COUNT")]
    count: Option<u64>,
}

impl Args {
    fn options(self) -> (Option<PathBuf>, Options) {
        let options = Options {
            twitter: Credentials {
                consumer: self.consumer,
                consumer_secret: self.consumer_secret,
                token: self.token,
                token_secret: self.token_secret,
            },
            tweets: self.tweets,
            favorites: self.favorites,
            min_date: self.min_date,
            max_date: self.max_date,
            replies: self.replies,
            replies_to: self.replies_to,
            force: self.force,
            verbose: self.verbose,
            count: self.count,
        };
        (self.config, options)
    }
}

#[tokio::main]
async fn main() {
    let (path, options) = Args::parse().options();
    let settings = match config::resolve(path.as_deref(), options).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    };
    let level = if settings.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = main2(settings).await {
        if let Some(twitter::Error::Cancelled) = e.downcast_ref::<twitter::Error>() {
            log::warn!("Interrupted");
            std::process::exit(130);
        }
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn main2(settings: Settings) -> anyhow::Result<()> {
    let catalog = Catalog::new().context("Invalid endpoint URL")?;
    let (get, del) = settings.target.resources(&catalog);
    let transport = OAuthTransport::new(&settings.auth).context("Unable to create HTTP client")?;
    let cancel = CancellationToken::new();

    let report = Report::new(settings.verbose && settings.force);
    let mut destroyer = Destroyer::new(Client::new(transport), get, del, settings.criteria)
        .page_size(settings.count)
        .notifier(report.clone());
    if !settings.force {
        destroyer = destroyer.confirmer(TerminalConfirmer::new(cancel.clone()));
    }

    tokio::spawn(watch_interrupts(cancel.clone()));

    let result = destroyer.destroy(&cancel).await;
    log::info!("Destroyed {} items", report.count());
    result?;
    Ok(())
}

/// First Ctrl-C stops the run, the second one exits right away.
async fn watch_interrupts(cancel: CancellationToken) {
    let mut caught = 0;
    while tokio::signal::ctrl_c().await.is_ok() {
        log::warn!("Caught interrupt");
        if caught > 0 {
            std::process::exit(2);
        }
        caught += 1;
        cancel.cancel();
    }
}
