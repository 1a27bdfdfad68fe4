use app_state::load_app_settings;
use cdn_client::{CdnStorage, HttpPostStore, medium_url};
use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{Report, eyre};
use common_types::{AspectRatio, CarouselPayload, Principal};
use media_pipeline::{
    PostComposer, SelectedFile, compression_ratio, format_file_size,
};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(version, about = "Compose and publish a post with staged media", long_about = None)]
struct Args {
    /// Image files to attach, in display order.
    files: Vec<PathBuf>,

    /// Post text.
    #[clap(long, short)]
    caption: String,

    /// Id of the posting user.
    #[clap(long)]
    author: String,

    /// Display name of the posting user.
    #[clap(long, default_value = "")]
    author_name: String,

    /// Aspect ratio applied to every staged slide (1:1, 16:9 or 9:16).
    #[clap(long, default_value = "1:1")]
    ratio: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let settings = load_app_settings()?;

    let level = Level::from_str(&settings.logging.level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let ratio: AspectRatio = args.ratio.parse().map_err(|e: String| eyre!(e))?;

    let http_client = reqwest::Client::new();
    let storage = CdnStorage::new(
        http_client.clone(),
        settings.cdn.clone(),
        settings.media.upload.clone(),
    );
    let posts = HttpPostStore::new(http_client, settings.posts.clone());
    let mut composer = PostComposer::new(settings.media.clone(), storage, posts);
    composer.set_default_ratio(ratio);

    let mut selections = Vec::new();
    for file in &args.files {
        if !settings.media.upload.is_image_file(file) {
            warn!("Skipping {}: not an image file", file.display());
            continue;
        }
        let bytes = tokio::fs::read(file).await?;
        let mime = mime_guess::from_path(file)
            .first_or_octet_stream()
            .to_string();
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("media")
            .to_owned();
        selections.push(SelectedFile {
            file_name,
            mime,
            bytes,
        });
    }

    if let Err(e) = composer.stage_files(selections).await {
        let message = e.user_message();
        return Err(Report::new(e).wrap_err(message));
    }

    for item in composer.staging().items() {
        info!(
            "Staged {} as {}: {} -> {} ({})",
            item.file_name(),
            item.aspect_ratio(),
            format_file_size(item.original_byte_size()),
            format_file_size(item.compressed_byte_size()),
            compression_ratio(item.original_byte_size(), item.compressed_byte_size()),
        );
    }

    let principal = Principal::new(args.author, args.author_name);
    match composer.submit(&principal, &args.caption).await {
        Ok(post) => {
            info!("Created post {}", post.id);
            if let Some(media_url) = post.media_url {
                if let Some(carousel) = CarouselPayload::decode(&media_url) {
                    info!("Published a {}-slide carousel", carousel.len());
                    for url in &carousel.urls {
                        info!("Slide: {}", medium_url(url));
                    }
                } else {
                    info!("Media: {}", medium_url(&media_url));
                }
            }
            Ok(())
        }
        Err(e) => {
            let message = e.user_message();
            Err(Report::new(e).wrap_err(message))
        }
    }
}
