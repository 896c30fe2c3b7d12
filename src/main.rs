use clap::Parser;
use std::path::PathBuf;
use vocabcard::{logger, CardConfig, CardInput, CardRenderer};

/// Render one vocabulary card and its metadata record.
#[derive(Debug, Parser)]
#[command(name = "vocabcard", version)]
struct Args {
    /// DashScope API key; falls back to DASHSCOPE_API_KEY.
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long)]
    word: String,
    #[arg(long)]
    index: u32,
    #[arg(long)]
    concept: String,
    #[arg(long)]
    meaning: String,
    #[arg(long)]
    example: String,
    #[arg(long)]
    outdir: PathBuf,
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"], default_values_t = [512, 512])]
    input_size: Vec<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    logger::init_with_config(logger::LoggerConfig::from_env())?;
    if !dotenv_loaded {
        log::debug!("No .env file found, using process environment");
    }

    let args = Args::parse();

    let mut config = CardConfig::from_env();
    if let Some(key) = args.api_key.clone() {
        config.dashscope = config.dashscope.with_api_key(key);
    }
    logger::log_config_info(&config);

    let (width, height) = match args.input_size.as_slice() {
        [w, h] => (*w, *h),
        _ => (512, 512),
    };
    let input = CardInput::new(
        args.word,
        args.index,
        args.concept,
        args.meaning,
        args.example,
    )
    .with_canvas(width, height);

    let renderer = match CardRenderer::new(config) {
        Ok(renderer) => renderer,
        Err(e) => {
            log::error!("❌ Failed to initialize renderer: {}", e);
            return Err(e.into());
        }
    };

    let card = renderer.render(&input).await?;
    let saved = card.save(&input, &args.outdir)?;

    println!(
        "✅ saved: {} | legibility={}",
        saved.image_path.display(),
        card.score
    );
    Ok(())
}
