use super::{read_document, resolve};
use anyhow::{Context, Result};
use campaign_common::BuilderConfig;
use campaign_editor::{EditorSession, Intent, JsonFilePersist, Outcome, SessionConfig};
use clap::Args;
use colored::Colorize;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Campaign document (JSON)
    pub document: PathBuf,

    /// Edit script: JSON array of intents and history steps
    pub script: PathBuf,

    /// Write the result here instead of overwriting the document
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Run the script without saving
    #[arg(long)]
    pub dry_run: bool,
}

/// One entry of an edit script
///
/// ```json
/// [
///   { "op": "addBlock", "blockType": "Hero" },
///   { "op": "updateBlockProp", "blockId": "a1b2-1", "name": "title", "value": "Hi" },
///   { "history": "undo" }
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Intent(Intent),
    History { history: HistoryStep },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HistoryStep {
    Undo,
    Redo,
    Boundary,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScriptReport {
    pub applied: usize,
    pub ignored: usize,
    pub history: usize,
}

pub fn parse_script(json: &str) -> Result<Vec<Step>> {
    let steps = serde_json::from_str(json)?;
    Ok(steps)
}

/// Run every step against `session`, printing one line per step
pub fn run_script(session: &mut EditorSession, steps: Vec<Step>) -> ScriptReport {
    let mut report = ScriptReport::default();

    for (i, step) in steps.into_iter().enumerate() {
        let n = i + 1;
        match step {
            Step::Intent(intent) => {
                let name = intent.name();
                match session.dispatch(intent) {
                    Outcome::Applied { block_id } => {
                        report.applied += 1;
                        println!(
                            "  {} {:>3} {} {}",
                            "✓".green(),
                            n,
                            name,
                            block_id.as_str().dimmed()
                        );
                    }
                    Outcome::SelectionChanged => {
                        report.applied += 1;
                        println!("  {} {:>3} {}", "✓".green(), n, name);
                    }
                    Outcome::Ignored(reason) => {
                        report.ignored += 1;
                        println!("  {} {:>3} {} ({})", "–".yellow(), n, name, reason);
                    }
                }
            }
            Step::History { history } => {
                report.history += 1;
                let changed = match history {
                    HistoryStep::Undo => session.undo(),
                    HistoryStep::Redo => session.redo(),
                    HistoryStep::Boundary => {
                        session.commit_boundary();
                        true
                    }
                };
                let mark = if changed { "↺".cyan() } else { "–".yellow() };
                println!("  {} {:>3} {:?}", mark, n, history);
            }
        }
    }

    report
}

pub async fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let document_path = resolve(cwd, &args.document);
    let script_path = resolve(cwd, &args.script);

    let config = BuilderConfig::load(cwd)?;
    let document = read_document(&document_path)?;
    let script = std::fs::read_to_string(&script_path)
        .with_context(|| format!("Cannot read {}", script_path.display()))?;
    let steps = parse_script(&script)
        .with_context(|| format!("Invalid edit script {}", script_path.display()))?;
    tracing::debug!(steps = steps.len(), document_id = %document.id, "Edit script parsed");

    println!("✏️  {} {}", "Applying".green().bold(), script_path.display());
    println!("   Document: {} ({} blocks)", document.id, document.len());
    println!();

    let mut session = EditorSession::new(document, SessionConfig::from(&config))?;
    let report = run_script(&mut session, steps);

    println!();
    println!(
        "   Applied: {}  Ignored: {}  History steps: {}",
        report.applied, report.ignored, report.history
    );
    println!("   Result: {} blocks", session.document().len());

    if args.dry_run {
        println!("   {}", "Dry run, nothing saved".yellow());
        return Ok(());
    }

    let output = args
        .output
        .map(|path| resolve(cwd, &path))
        .unwrap_or(document_path);
    session.save(&JsonFilePersist::new(&output)).await?;

    println!();
    println!("✨ {} Saved {}", "Done".green().bold(), output.display());
    Ok(())
}
