//! CLI entry point for eleventy-rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eleventy_rs::Eleventy;

#[derive(Parser)]
#[command(name = "eleventy-rs")]
#[command(version)]
#[command(about = "A static blog generator with a date-sorted posts collection", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Include draft posts in the posts collection
    #[arg(long, global = true)]
    drafts: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post (an undated draft unless --publish is given)
    New {
        /// Title of the new post
        title: String,

        /// Date the post now instead of marking it as a draft
        #[arg(short, long)]
        publish: bool,
    },

    /// Build the site into the output directory
    #[command(alias = "b")]
    Build {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Remove the output directory
    Clean,

    /// List site content
    List {
        /// Type of content to list (posts, drafts, pages)
        #[arg(default_value = "posts")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "eleventy_rs=debug,info"
    } else {
        "eleventy_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    // The draft flag is resolved once here and carried by the site
    let load_site = || -> Result<Eleventy> {
        let site = Eleventy::new(&base_dir)?;
        let allow_drafts = cli.drafts || site.config.posts.drafts_from_env();
        if allow_drafts {
            tracing::info!("Drafts are included in the posts collection");
        }
        Ok(site.with_drafts(allow_drafts))
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            eleventy_rs::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New { title, publish } => {
            let site = load_site()?;
            let path = site.new_post(&title, publish)?;
            println!("Created {}", path.display());
        }

        Commands::Build { watch } => {
            let site = load_site()?;
            tracing::info!("Building site...");

            site.build()?;
            println!("Built successfully!");

            if watch {
                eleventy_rs::commands::build::watch(&site).await?;
            }
        }

        Commands::Serve {
            port,
            ip,
            open,
            r#static,
        } => {
            let site = load_site()?;

            // Build first
            tracing::info!("Building site...");
            site.build()?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            eleventy_rs::server::start(&site, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let site = load_site()?;
            tracing::info!("Cleaning output folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = load_site()?;
            eleventy_rs::commands::list::run(&site, &r#type)?;
        }

        Commands::Version => {
            println!("eleventy-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
