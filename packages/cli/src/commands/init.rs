use anyhow::Result;
use campaign_common::{BuilderConfig, DEFAULT_CONFIG_NAME};
use campaign_editor::{BlockType, Document, EditorSession, Intent, SessionConfig};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Id of the new campaign document
    #[arg(short, long, default_value = "campaign")]
    pub id: String,

    /// Start from a Hero and a Footer block instead of an empty page
    #[arg(long)]
    pub starter: bool,

    /// Force overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = BuilderConfig::path_in(cwd);
    let document_path = PathBuf::from(cwd).join(format!("{}.json", args.id));

    if (config_path.exists() || document_path.exists()) && !args.force {
        println!(
            "{} {} already initialized",
            "⚠️".yellow(),
            cwd.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing campaign project...".bright_blue().bold());

    let config = BuilderConfig::default();
    config.save(cwd)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let document = starter_document(&args, &config)?;
    fs::write(&document_path, document.to_json()?)?;
    println!(
        "  {} Created {} ({} blocks)",
        "✓".green(),
        document_path.display(),
        document.len()
    );

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Write an edit script (JSON array of intents)");
    println!("  2. Run: campaign apply {}.json script.json", args.id);
    println!("  3. Run: campaign inspect {}.json", args.id);

    Ok(())
}

fn starter_document(args: &InitArgs, config: &BuilderConfig) -> Result<Document> {
    let mut session = EditorSession::new(Document::new(&args.id), SessionConfig::from(config))?;

    if args.starter {
        for block_type in [BlockType::Hero, BlockType::Footer] {
            session.dispatch(Intent::AddBlock {
                block_type,
                at_index: None,
            });
        }
    }

    Ok(session.document().as_ref().clone())
}
