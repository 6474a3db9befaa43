use super::DEFAULT_PAGES_FILE;
use anyhow::Result;
use canvas_engine::{EngineConfig, JsonFileStore, PageRegistry, PageStore, DEFAULT_CONFIG_NAME};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Force overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);
    let pages_path = cwd.join(DEFAULT_PAGES_FILE);

    if (config_path.exists() || pages_path.exists()) && !args.force {
        println!(
            "{} {} or {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white(),
            DEFAULT_PAGES_FILE.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing canvas project...".bright_blue().bold());

    let config = serde_json::to_string_pretty(&EngineConfig::default())?;
    fs::write(&config_path, config)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    JsonFileStore::new(&pages_path).save(&PageRegistry::new().snapshot())?;
    println!("  {} Created {}", "✓".green(), DEFAULT_PAGES_FILE);

    println!();
    println!("{}", "✨ Ready!".green().bold());
    println!(
        "Run {} to try a scripted session",
        "canvas replay <script.json>".bright_white()
    );

    Ok(())
}
