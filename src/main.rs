use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use imgcache::application::{ImageCacheManager, format_bytes};
use imgcache::domain::ImageResponse;
use imgcache::infrastructure::{AppConfig, CliArgs, Command, StorageManager};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = match &args.config {
        Some(path) => StorageManager::with_dir(
            path.parent()
                .map(std::path::Path::to_path_buf)
                .unwrap_or_default(),
        ),
        None => StorageManager::new()?,
    };
    let mut config = storage
        .load_config(args.config.as_deref())
        .wrap_err("Failed to load configuration")?;
    config.merge_with_args(args);
    Ok(config)
}

fn print_response(response: &ImageResponse) {
    match response {
        ImageResponse::Cached { entry, source } => {
            println!("{}", entry.storage_path.display());
            println!(
                "source={source} size={} valid_till={}",
                format_bytes(entry.content_length),
                entry.valid_till.to_rfc3339()
            );
        }
        ImageResponse::Transient(image) => {
            println!(
                "not cached: served {} of {} in memory (transcoded={})",
                format_bytes(image.bytes.len() as u64),
                image.content_type.as_deref().unwrap_or("unknown type"),
                image.transcoded
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    init_logging(&config)?;

    info!(version = imgcache::VERSION, "Starting imgcache");

    let manager = ImageCacheManager::open(
        config.effective_cache_dir(),
        config.trusted_hosts(),
        &config.user_agent,
    )
    .await?;

    match args.command {
        Command::Fetch { url, headers } => {
            let response = manager.get_image_with_headers(&url, &headers).await?;
            print_response(&response);
        }
        Command::Lookup { url } => match manager.lookup(&url).await {
            Some(entry) => println!("{}", entry.storage_path.display()),
            None => println!("not cached"),
        },
        Command::Prefetch { urls } => {
            let total = urls.len();
            let loaded = manager.prefetch(&urls).await;
            println!("{loaded}/{total} images cached");
        }
        Command::Evict { url } => {
            if manager.evict(&url).await {
                println!("evicted");
            } else {
                println!("not cached");
            }
        }
        Command::Size { bytes } => {
            if bytes {
                println!("{}", manager.get_cache_size_bytes().await);
            } else {
                println!("{}", manager.get_formatted_cache_size().await);
            }
        }
        Command::Clear => {
            manager.clear_cache().await;
            println!("cache cleared");
        }
    }

    Ok(())
}
