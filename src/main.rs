use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use snapflow::entities::{Id, NewComment, NewPost};
use snapflow::{Config, Fixtures, Services};

#[derive(Parser)]
#[command(name = "snapflow")]
#[command(version)]
#[command(about = "Inspect and edit a snapflow store")]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Directory of the persistent store. An in-memory store is used when unset.
    #[arg(long, env = "SNAPFLOW_STORE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Posts, newest first
    Feed,
    /// Active stories grouped by author
    Stories,
    Users,
    /// Users and posts matching a query; the query is remembered
    Search { query: String },
    Hashtag { tag: String },
    /// Publish a post as the current user
    Post {
        caption: String,
        #[arg(long, default_value = "")]
        image: String,
    },
    Like { id: Id },
    Save { id: Id },
    Comments { post_id: Id },
    /// Comment on a post as the current user
    Comment { post_id: Id, text: String },
    /// Recent searches, most recent first
    Recent,
    /// Remove everything in the namespace
    Reset,
}

#[derive(Serialize)]
struct SearchResults<T, U> {
    users: T,
    posts: U,
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn current_username(services: &Services) -> Result<String> {
    match services.users.current().await? {
        Some(u) => Ok(u.username),
        None => Err(anyhow!("no current user; the user collection is empty")),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env();
    let fixtures = Fixtures::bundled()?;

    let services = match &cli.store {
        Some(dir) => snapflow::on_disk(dir, &config, fixtures).await?,
        None => snapflow::in_memory(&config, fixtures),
    };

    match cli.command {
        Commands::Feed => print_json(&services.posts.get_all().await?),
        Commands::Stories => print_json(&services.stories.get_active_user_stories().await?),
        Commands::Users => print_json(&services.users.get_all().await?),
        Commands::Search { query } => {
            services.searches.record(&query).await?;

            print_json(&SearchResults {
                users: services.users.search(&query).await?,
                posts: services.posts.search(&query).await?,
            })
        },
        Commands::Hashtag { tag } => print_json(&services.posts.get_by_hashtag(&tag).await?),
        Commands::Post { caption, image } => {
            let author = current_username(&services).await?;
            let post = services
                .posts
                .create(NewPost::from_caption(author, image, caption))
                .await?;

            print_json(&post)
        },
        Commands::Like { id } => match services.posts.toggle_like(id).await? {
            Some(p) => print_json(&p),
            None => Err(anyhow!("post {} not found", id)),
        },
        Commands::Save { id } => match services.posts.toggle_save(id).await? {
            Some(p) => print_json(&p),
            None => Err(anyhow!("post {} not found", id)),
        },
        Commands::Comments { post_id } => print_json(&services.comments.get_by_post(post_id).await?),
        Commands::Comment { post_id, text } => {
            let author = current_username(&services).await?;
            let comment = services
                .comments
                .create(NewComment {
                    post_id,
                    user_id: author,
                    text,
                })
                .await?;

            print_json(&comment)
        },
        Commands::Recent => print_json(&services.searches.recent().await?),
        Commands::Reset => {
            services.clear_all().await?;
            eprintln!("cleared namespace `{}`", services.namespace());
            Ok(())
        },
    }
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name_fn(|| {
            static NUM: AtomicUsize = AtomicUsize::new(0);
            format!("snapflow-worker-{}", NUM.fetch_add(1, Ordering::SeqCst))
        })
        .build()
    {
        Ok(r) => r,
        Err(e) => {
            eprintln!("cannot build runtime: {}", e);
            std::process::exit(1);
        },
    };

    if let Err(e) = rt.block_on(run(cli)) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
