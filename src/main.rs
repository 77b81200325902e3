// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use note_sync::utils::logging::{format_success, format_warning};
use note_sync::{
    ArticleScaffold, ArticleScanner, Config, ContentFetcher, Credentials, DialectChecker,
    FrontmatterParser, GithubContentsWriter, GithubRawFetcher, HtmlToMarkdown, LocalFetcher,
    LocalWriter, MarkdownToHtml, NoteClient, PullOptions, PushOptions, RepositoryWriter,
    SyncOrchestrator,
};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "note_sync")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Sync articles between a GitHub repository and note.com drafts", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    /// Draw a progress bar while syncing (only on a terminal)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    progress: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ArticleSelection {
    /// Article slugs (directory names under the articles root)
    slugs: Vec<String>,

    /// Every article found in the local checkout
    #[arg(long, conflicts_with = "slugs")]
    all: bool,

    /// Read and write a local checkout instead of GitHub
    #[arg(long, value_name = "DIR")]
    local: Option<PathBuf>,

    #[arg(long)]
    dry_run: bool,

    /// Push over a recent note hand-off, or pull over local edits
    #[arg(long)]
    force: bool,
}

/// How sync runs report on the terminal.
#[derive(Clone, Copy)]
struct TerminalOutput {
    color: bool,
    progress: bool,
}

#[derive(clap::Args)]
struct PlatformLogin {
    #[arg(long, env = "NOTE_EMAIL", hide_env_values = true)]
    email: String,

    #[arg(long, env = "NOTE_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Html,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Render repository articles and update their note drafts
    Push {
        #[command(flatten)]
        selection: ArticleSelection,

        #[command(flatten)]
        login: PlatformLogin,

        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        github_token: Option<String>,
    },

    /// Convert note drafts back to markdown and commit them
    Pull {
        #[command(flatten)]
        selection: ArticleSelection,

        #[command(flatten)]
        login: PlatformLogin,

        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        github_token: Option<String>,
    },

    /// Convert a single document offline
    Convert {
        #[arg(long, value_enum)]
        to: Target,

        /// Input file; stdin when omitted
        input: Option<PathBuf>,
    },

    /// Report markdown the converter does not support
    Check {
        /// Articles directory; defaults to the configured local checkout
        dir: Option<PathBuf>,
    },

    /// Scaffold a new article directory
    New {
        title: String,

        #[arg(long)]
        note_id: String,

        #[arg(long)]
        slug: Option<String>,

        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    colored::control::set_override(cli.color);
    note_sync::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::default_config()
    };

    let output = TerminalOutput {
        color: cli.color,
        progress: cli.progress && std::io::stderr().is_terminal(),
    };

    match cli.command {
        Commands::Push {
            selection,
            login,
            github_token,
        } => {
            cmd_push(config, selection, login, github_token, output).await?;
        }
        Commands::Pull {
            selection,
            login,
            github_token,
        } => {
            cmd_pull(config, selection, login, github_token, output).await?;
        }
        Commands::Convert { to, input } => {
            cmd_convert(to, input.as_deref())?;
        }
        Commands::Check { dir } => {
            cmd_check(&config, dir)?;
        }
        Commands::New {
            title,
            note_id,
            slug,
            dir,
        } => {
            cmd_new(&config, &title, &note_id, slug.as_deref(), dir)?;
        }
    }

    Ok(())
}

fn articles_dir(config: &Config, checkout: Option<&Path>) -> PathBuf {
    let root = checkout
        .map(Path::to_path_buf)
        .or_else(|| config.repository.local_path.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    root.join(&config.repository.articles_root)
}

fn resolve_slugs(config: &Config, selection: &ArticleSelection, checkout: Option<&Path>) -> Result<Vec<String>> {
    if !selection.all {
        if selection.slugs.is_empty() {
            bail!("Name at least one article slug or pass --all");
        }
        return Ok(selection.slugs.clone());
    }

    let Some(checkout) = checkout else {
        bail!("--all needs a local checkout (--local or repository.local_path)");
    };

    ArticleScanner::new(articles_dir(config, Some(checkout)))
        .slugs()
        .context("Failed to list articles")
}

async fn cmd_push(
    mut config: Config,
    selection: ArticleSelection,
    login: PlatformLogin,
    github_token: Option<String>,
    output: TerminalOutput,
) -> Result<()> {
    let checkout = selection.local.clone().or_else(|| config.repository.local_path.clone());
    let slugs = resolve_slugs(&config, &selection, checkout.as_deref())?;
    let options = PushOptions {
        dry_run: selection.dry_run || config.sync.dry_run,
        force: selection.force,
    };
    config.sync.dry_run = options.dry_run;

    let credentials = Credentials::new(login.email, login.password);
    let platform = NoteClient::new(&config.platform.base_url, config.request_timeout());

    info!(
        "Pushing {} article(s){}",
        slugs.len(),
        if options.dry_run { " [dry run]" } else { "" }
    );

    match checkout {
        Some(root) => {
            let fetcher = LocalFetcher::new(&root);
            let writer = LocalWriter::new(&root);
            let run = PushRun { credentials: &credentials, slugs: &slugs, options, output };
            run_push(fetcher, platform, Some(&writer), config, run).await
        }
        None => {
            let fetcher = GithubRawFetcher::new(
                &config.repository.raw_base_url,
                config.coordinate(),
                github_token.clone(),
                config.request_timeout(),
            )?;
            let writer = match github_token {
                Some(token) => Some(GithubContentsWriter::new(
                    &config.repository.api_base_url,
                    config.coordinate(),
                    token,
                    config.request_timeout(),
                )?),
                None => {
                    if config.sync.record_state {
                        warn!("GITHUB_TOKEN is not set; meta.json sync state will not be updated");
                    }
                    None
                }
            };
            let run = PushRun { credentials: &credentials, slugs: &slugs, options, output };
            run_push(fetcher, platform, writer.as_ref(), config, run).await
        }
    }
}

struct PushRun<'a> {
    credentials: &'a Credentials,
    slugs: &'a [String],
    options: PushOptions,
    output: TerminalOutput,
}

async fn run_push<F: ContentFetcher, W: RepositoryWriter>(
    fetcher: F,
    platform: NoteClient,
    state: Option<&W>,
    config: Config,
    run: PushRun<'_>,
) -> Result<()> {
    let stats = SyncOrchestrator::new(fetcher, platform, config)
        .with_progress(run.output.progress)
        .with_color(run.output.color)
        .push_all(state, run.credentials, run.slugs, run.options)
        .await
        .context("Push failed")?;

    println!(
        "{}",
        format_success(&format!("{} article(s) pushed", stats.articles_synced))
    );
    Ok(())
}

async fn cmd_pull(
    mut config: Config,
    selection: ArticleSelection,
    login: PlatformLogin,
    github_token: Option<String>,
    output: TerminalOutput,
) -> Result<()> {
    let checkout = selection.local.clone().or_else(|| config.repository.local_path.clone());
    let slugs = resolve_slugs(&config, &selection, checkout.as_deref())?;
    let options = PullOptions {
        dry_run: selection.dry_run || config.sync.dry_run,
        force: selection.force,
    };
    config.sync.dry_run = options.dry_run;

    let credentials = Credentials::new(login.email, login.password);
    let platform = NoteClient::new(&config.platform.base_url, config.request_timeout());

    info!(
        "Pulling {} article(s){}",
        slugs.len(),
        if options.dry_run { " [dry run]" } else { "" }
    );

    let run = PullRun { credentials: &credentials, slugs: &slugs, options, output };

    match checkout {
        Some(root) => {
            let fetcher = LocalFetcher::new(&root);
            let writer = LocalWriter::new(&root);
            run_pull(fetcher, platform, &writer, config, run).await
        }
        None => {
            let Some(token) = github_token else {
                bail!("GITHUB_TOKEN is required to commit to {}", config.repository.repo);
            };
            let fetcher = GithubRawFetcher::new(
                &config.repository.raw_base_url,
                config.coordinate(),
                Some(token.clone()),
                config.request_timeout(),
            )?;
            let writer = GithubContentsWriter::new(
                &config.repository.api_base_url,
                config.coordinate(),
                token,
                config.request_timeout(),
            )?;
            run_pull(fetcher, platform, &writer, config, run).await
        }
    }
}

struct PullRun<'a> {
    credentials: &'a Credentials,
    slugs: &'a [String],
    options: PullOptions,
    output: TerminalOutput,
}

async fn run_pull<F: ContentFetcher, W: RepositoryWriter>(
    fetcher: F,
    platform: NoteClient,
    writer: &W,
    config: Config,
    run: PullRun<'_>,
) -> Result<()> {
    let stats = SyncOrchestrator::new(fetcher, platform, config)
        .with_progress(run.output.progress)
        .with_color(run.output.color)
        .pull_all(writer, run.credentials, run.slugs, run.options)
        .await
        .context("Pull failed")?;

    println!(
        "{}",
        format_success(&format!(
            "{} article(s) pulled, {} unchanged",
            stats.articles_synced, stats.articles_unchanged
        ))
    );
    Ok(())
}

fn cmd_convert(to: Target, input: Option<&Path>) -> Result<()> {
    let source = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    let output = match to {
        Target::Html => {
            let (_, body) = FrontmatterParser::new()
                .split(&source)
                .context("Invalid frontmatter")?;
            MarkdownToHtml::new().render(&body)
        }
        Target::Markdown => HtmlToMarkdown::new().render(&source),
    };

    println!("{}", output);
    Ok(())
}

fn cmd_check(config: &Config, dir: Option<PathBuf>) -> Result<()> {
    let dir = dir.unwrap_or_else(|| articles_dir(config, None));
    let articles = ArticleScanner::new(&dir)
        .scan()
        .with_context(|| format!("Failed to scan {}", dir.display()))?;

    let checker = DialectChecker::new();
    let parser = FrontmatterParser::new();
    let mut problems = 0usize;

    for article in &articles {
        let content = std::fs::read_to_string(&article.markdown_path)
            .with_context(|| format!("Failed to read {}", article.markdown_path.display()))?;

        if !article.has_descriptor {
            problems += 1;
            println!("{}", format_warning(&format!("{}: missing meta.json", article.slug)));
        }

        let body = match parser.split(&content) {
            Ok((_, body)) => body,
            Err(e) => {
                problems += 1;
                println!("{}", format_warning(&format!("{}: {}", article.slug, e)));
                continue;
            }
        };

        for warning in checker.check(&body) {
            problems += 1;
            println!("{}", format_warning(&format!("{}: {}", article.slug, warning)));
        }
    }

    if problems > 0 {
        bail!("{} problem(s) in {} article(s)", problems, articles.len());
    }

    println!(
        "{}",
        format_success(&format!("{} article(s) use only supported markdown", articles.len()))
    );
    Ok(())
}

fn cmd_new(
    config: &Config,
    title: &str,
    note_id: &str,
    slug: Option<&str>,
    dir: Option<PathBuf>,
) -> Result<()> {
    let dir = dir.unwrap_or_else(|| articles_dir(config, None));
    let article = ArticleScaffold::new(&dir)
        .create(title, note_id, slug)
        .context("Failed to create article")?;

    println!(
        "{}",
        format_success(&format!("Created {}", article.directory.display()))
    );
    Ok(())
}
