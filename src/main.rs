use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pagefeed::config::Config;
use pagefeed::feed::FeedLink;
use pagefeed::pipeline::{discover_feeds, generate_feed};
use pagefeed::request::FeedForm;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Get the default config file path (~/.config/pagefeed/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("pagefeed")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(
    name = "pagefeed",
    version,
    about = "Find the feeds a web page advertises, or build one from its markup"
)]
struct Cli {
    /// Config file to use instead of ~/.config/pagefeed/config.toml
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the RSS/Atom feeds a page links to
    Discover {
        /// Page address
        url: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scrape a page into an RSS 2.0 feed written to stdout
    Generate {
        /// Read parameters from a query string; flags given alongside override it
        #[arg(long, value_name = "QUERY")]
        query: Option<String>,

        #[command(flatten)]
        form: FormArgs,
    },

    /// Print the query string for a set of generator parameters
    Query {
        #[command(flatten)]
        form: FormArgs,
    },
}

#[derive(clap::Args, Debug, Default)]
struct FormArgs {
    /// Page to scrape
    #[arg(long)]
    url: Option<String>,

    /// Selector for each article container
    #[arg(long = "article", value_name = "SELECTOR")]
    article_selector: Option<String>,

    /// Selector for the title inside an article
    #[arg(long = "title", value_name = "SELECTOR")]
    title_selector: Option<String>,

    /// Selector for the element whose href is the article link
    #[arg(long = "link", value_name = "SELECTOR")]
    link_selector: Option<String>,

    /// Selector for the article summary
    #[arg(long = "description", value_name = "SELECTOR")]
    description_selector: Option<String>,

    /// Selector for the publication date
    #[arg(long = "pub-date", value_name = "SELECTOR")]
    pub_date_selector: Option<String>,

    /// Title of the generated channel
    #[arg(long)]
    channel_title: Option<String>,

    /// Link of the generated channel (defaults to --url)
    #[arg(long)]
    channel_link: Option<String>,

    /// Description of the generated channel
    #[arg(long)]
    channel_description: Option<String>,
}

impl FormArgs {
    /// Applies every flag that was given on top of `form`.
    fn overlay(self, mut form: FeedForm) -> FeedForm {
        let fields = [
            (self.url, &mut form.url),
            (self.article_selector, &mut form.article_selector),
            (self.title_selector, &mut form.title_selector),
            (self.link_selector, &mut form.link_selector),
            (self.description_selector, &mut form.description_selector),
            (self.pub_date_selector, &mut form.pub_date_selector),
            (self.channel_title, &mut form.channel_title),
            (self.channel_link, &mut form.channel_link),
            (self.channel_description, &mut form.channel_description),
        ];
        for (flag, slot) in fields {
            if flag.is_some() {
                *slot = flag;
            }
        }
        form
    }
}

fn print_links(links: &[FeedLink], json: bool) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, links).context("Failed to encode feed links")?;
        writeln!(stdout)?;
    } else if links.is_empty() {
        eprintln!("No feeds found");
    } else {
        for link in links {
            writeln!(stdout, "{}\t{}", link.href, link.mime_type)?;
        }
    }
    Ok(())
}

/// Loads the config file named on the command line, or the default one.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };
    Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Discover { url, json } => {
            let fetcher = load_config(cli.config.as_deref())?.http_fetcher()?;
            let links = discover_feeds(&fetcher, &url)
                .await
                .with_context(|| format!("Feed discovery failed for {url}"))?;
            print_links(&links, json)?;
        }
        Command::Generate { query, form } => {
            let base = query.as_deref().map(FeedForm::from_query).unwrap_or_default();
            let request = form.overlay(base).validate()?;

            let fetcher = load_config(cli.config.as_deref())?.http_fetcher()?;
            let rss = generate_feed(&fetcher, &request)
                .await
                .with_context(|| format!("Feed generation failed for {}", request.url))?;

            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rss.as_bytes())?;
            writeln!(stdout)?;
        }
        // Offline: never reads the config file
        Command::Query { form } => {
            println!("{}", form.overlay(FeedForm::default()).to_query());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only feed output
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_flags_override_query() {
        let cli = Cli::try_parse_from([
            "pagefeed",
            "generate",
            "--query",
            "url=https%3A%2F%2Fexample.com&articleSelector=article&channelTitle=Old",
            "--link",
            "a",
            "--channel-title",
            "New",
        ])
        .unwrap();

        let Command::Generate { query, form } = cli.command else {
            panic!("expected generate");
        };
        let form = form.overlay(FeedForm::from_query(query.as_deref().unwrap()));
        assert_eq!(form.url.as_deref(), Some("https://example.com"));
        assert_eq!(form.link_selector.as_deref(), Some("a"));
        assert_eq!(form.channel_title.as_deref(), Some("New"));
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_query_subcommand_form() {
        let cli = Cli::try_parse_from([
            "pagefeed",
            "query",
            "--url",
            "https://example.com/blog",
            "--article",
            "div.post",
        ])
        .unwrap();

        let Command::Query { form } = cli.command else {
            panic!("expected query");
        };
        assert_eq!(
            form.overlay(FeedForm::default()).to_query(),
            "url=https%3A%2F%2Fexample.com%2Fblog&articleSelector=div.post"
        );
    }

    #[test]
    fn test_discover_requires_url() {
        assert!(Cli::try_parse_from(["pagefeed", "discover"]).is_err());
    }

    fn broken_config(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pagefeed_cli_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();
        path
    }

    #[tokio::test]
    async fn test_query_ignores_broken_config() {
        let path = broken_config("query");
        let cli = Cli::try_parse_from([
            "pagefeed",
            "--config",
            path.to_str().unwrap(),
            "query",
            "--url",
            "https://example.com/blog",
        ])
        .unwrap();

        assert!(run(cli).await.is_ok());
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_discover_reports_broken_config() {
        let path = broken_config("discover");
        let cli = Cli::try_parse_from([
            "pagefeed",
            "--config",
            path.to_str().unwrap(),
            "discover",
            "https://example.com/blog",
        ])
        .unwrap();

        let err = run(cli).await.unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
