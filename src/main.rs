use log::error;
use recipe_extract::{ExtractorConfig, RecipePipeline};
use std::env;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    // recipe-extract [--text] <url>
    let args: Vec<String> = env::args().skip(1).collect();
    let as_text = args.iter().any(|arg| arg == "--text");
    let Some(url) = args.iter().find(|arg| !arg.starts_with("--")) else {
        eprintln!("Usage: recipe-extract [--text] <url>");
        return ExitCode::FAILURE;
    };

    match run(url, as_text).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(url: &str, as_text: bool) -> Result<String, Box<dyn std::error::Error>> {
    let config = ExtractorConfig::load()?;
    let pipeline = RecipePipeline::new(&config)?;
    let recipe = pipeline.extract(url).await?;

    if as_text {
        Ok(recipe.to_text())
    } else {
        Ok(serde_json::to_string_pretty(&recipe)?)
    }
}
