use anyhow::{Context, Result};
use clap::Parser;
use devread::api::Endpoint;
use devread::html::decorate;
use devread::models::{Article, FullArticle, StateFilter};
use devread::state::{FetchOutcome, PageRequest};
use devread::{Config, Session};
use std::path::PathBuf;

/// Get the default config file path (~/.config/devread/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("devread")
        .join("config.toml"))
}

/// Split `handle/slug` as it appears in article URLs.
fn parse_article_path(s: &str) -> Result<(String, String), String> {
    let trimmed = s.trim_matches('/');
    match trimmed.split_once('/') {
        Some((handle, slug)) if !handle.is_empty() && !slug.is_empty() && !slug.contains('/') => {
            Ok((handle.to_string(), slug.to_string()))
        }
        _ => Err(format!("expected HANDLE/SLUG, got '{s}'")),
    }
}

#[derive(Parser, Debug)]
#[command(name = "devread", about = "Browse dev.to articles from the terminal")]
struct Args {
    /// Config file (defaults to ~/.config/devread/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listing endpoint: articles, latest, or a path under the API base
    #[arg(long, default_value = "articles")]
    endpoint: Endpoint,

    /// Server-side tag filter (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// Server-side state filter: fresh, rising or all
    #[arg(long)]
    state: Option<StateFilter>,

    /// Number of pages to load
    #[arg(long, default_value_t = 1)]
    pages: usize,

    /// Client-side tag filter over loaded articles (repeatable, OR)
    #[arg(long = "filter-tag", value_name = "TAG")]
    filter_tags: Vec<String>,

    /// Client-side text search over title and description
    #[arg(long)]
    search: Option<String>,

    /// Open a single article addressed as HANDLE/SLUG
    #[arg(long, value_name = "HANDLE/SLUG", value_parser = parse_article_path)]
    open: Option<(String, String)>,

    /// With --open, print decorated HTML instead of markdown
    #[arg(long, requires = "open")]
    html: bool,

    /// Print popular tags
    #[arg(long)]
    tags_list: bool,

    /// Print top discussion threads
    #[arg(long)]
    discuss: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?
        .with_env_overrides()
        .context("Invalid API base URL override")?;

    let session = Session::new(&config).context("Failed to create session")?;

    if let Some((handle, slug)) = &args.open {
        return open_article(&session, handle, slug, args.html).await;
    }

    if args.tags_list {
        session.listing.fetch_popular_tags().await;
        session.listing.with_state(|state| {
            for tag in state.popular_tags() {
                println!("#{}", tag.name);
            }
        });
        return Ok(());
    }

    if args.discuss {
        session.listing.fetch_discussions().await;
        session.listing.with_state(|state| {
            for article in state.discussions() {
                print_article(article);
            }
        });
        return Ok(());
    }

    load_listing(&session, &args).await?;

    if !args.filter_tags.is_empty() {
        session.search.set_selected_tags(args.filter_tags.clone());
    }
    if let Some(query) = &args.search {
        session.search.set_search_query(query.as_str());
    }

    let view = session.filtered_articles();
    for article in &view {
        print_article(article);
    }

    let loaded = session.listing.with_state(|s| s.articles().len());
    println!();
    println!(
        "{} of {} loaded articles shown{}",
        view.len(),
        loaded,
        if session.listing.has_more() {
            " (more available)"
        } else {
            ""
        }
    );
    Ok(())
}

async fn load_listing(session: &Session, args: &Args) -> Result<()> {
    let request = PageRequest::fresh(args.endpoint.clone())
        .with_tags(args.tags.clone())
        .with_state(args.state);

    let outcome = match session.listing.fetch_page(request).await {
        FetchOutcome::Failed {
            message,
            retry_scheduled: true,
        } => {
            eprintln!("Warning: {message}, retrying...");
            session
                .listing
                .wait_for_retry()
                .await
                .unwrap_or(FetchOutcome::Skipped)
        }
        other => other,
    };
    if let Some(error) = session.listing.error() {
        anyhow::bail!("Failed to load articles: {error}");
    }
    tracing::debug!(?outcome, "First page loaded");

    for _ in 1..args.pages.max(1) {
        match session
            .listing
            .load_more(Some(args.endpoint.clone()), None, None)
            .await
        {
            FetchOutcome::Loaded { has_more: true, .. } => continue,
            FetchOutcome::Loaded { .. } | FetchOutcome::Skipped => break,
            FetchOutcome::Failed { message, .. } => {
                eprintln!("Warning: stopped paging: {message}");
                break;
            }
        }
    }
    Ok(())
}

async fn open_article(session: &Session, handle: &str, slug: &str, html: bool) -> Result<()> {
    let Some(article) = session.open_article(handle, slug).await else {
        anyhow::bail!("Article not found: {handle}/{slug}");
    };
    print_full_article(&article, html);
    Ok(())
}

fn print_article(article: &Article) {
    let date = article
        .published_at
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string());
    println!("{date}  {}", article.title);
    println!(
        "            by {} (@{})  {}/{}  [{}]",
        article.author,
        article.username,
        article.username,
        article.slug,
        article.tags.join(", ")
    );
}

fn print_full_article(article: &FullArticle, html: bool) {
    println!("{}", article.title);
    println!(
        "by {}  ·  {} min read  ·  {} reactions  ·  {} comments",
        article.user.name, article.reading_time, article.reactions_count, article.comments_count
    );
    if !article.tags.is_empty() {
        println!("[{}]", article.tags.join(", "));
    }
    println!("{}", article.url);
    println!();
    if html {
        println!("{}", decorate(&article.body_html));
    } else {
        println!("{}", article.body_markdown);
    }
}
