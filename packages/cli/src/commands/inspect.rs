use super::{read_document, resolve};
use anyhow::Result;
use campaign_editor::{Block, Document};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Campaign document (JSON)
    pub document: PathBuf,

    /// Print the document as JSON instead of an outline
    #[arg(long)]
    pub json: bool,
}

pub fn inspect(args: InspectArgs, cwd: &str) -> Result<()> {
    let path = resolve(cwd, &args.document);
    let document = read_document(&path)?;

    if args.json {
        println!("{}", document.to_json()?);
        return Ok(());
    }

    println!("📄 {} {}", document.id.bright_white().bold(), path.display());
    for (key, value) in &document.metadata {
        println!("   {}: {}", key.dimmed(), value);
    }
    println!();

    for line in outline(&document) {
        println!("   {}", line);
    }
    if document.is_empty() {
        println!("   {}", "(no blocks)".dimmed());
    }

    println!();
    match document.check_invariants() {
        Ok(()) => println!("   {} {} blocks", "✓".green(), document.len()),
        Err(violation) => println!("   {} {}", "✗".red(), violation),
    }
    Ok(())
}

/// One line per block: position, type, id and headline
pub fn outline(document: &Document) -> Vec<String> {
    document
        .blocks
        .iter()
        .enumerate()
        .map(|(i, block)| {
            format!(
                "{:>2}. {:<12} {}{}",
                i,
                block.block_type.as_str(),
                block.id,
                headline(block)
            )
        })
        .collect()
}

fn headline(block: &Block) -> String {
    ["title", "heading", "text"]
        .iter()
        .find_map(|name| block.props.get(*name).and_then(|v| v.as_text()))
        .map(|text| format!("  \"{}\"", text))
        .unwrap_or_default()
}
