//! Prompts-related command implementations

use anyhow::Result;
use wimpi_core::prompts::{default_prompts_dir, PromptId, PromptLibrary};

fn library() -> PromptLibrary {
    match default_prompts_dir() {
        Some(dir) => PromptLibrary::with_override_dir(dir),
        None => PromptLibrary::embedded_only(),
    }
}

/// List all available prompts and their override status
pub fn cmd_prompts_list() -> Result<()> {
    let mut library = library();
    let prompts = library.list();

    println!("Available Prompts:\n");

    println!(
        "{:<20} {:>7}  {:<10}  {}",
        "ID", "VERSION", "OVERRIDE", "PURPOSE"
    );
    println!("{}", "-".repeat(80));

    for info in prompts {
        let override_status = if info.has_override {
            "✓ Custom"
        } else {
            "Default"
        };

        println!(
            "{:<20} {:>7}  {:<10}  {}",
            info.id, info.version, override_status, info.purpose
        );
    }

    println!();
    println!(
        "Override directory: {}",
        default_prompts_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not available)".to_string())
    );

    println!();
    println!("To customize a prompt:");
    println!("  1. Copy the default (wimpi prompts show <id>) to <override dir>/<id>.md");
    println!("  2. Edit the file, keeping the frontmatter");
    println!("  3. Run the next wimpi command; overrides are read on every start");

    Ok(())
}

/// Show the content of a specific prompt
pub fn cmd_prompts_show(prompt_id: &str) -> Result<()> {
    let mut library = library();

    let id: PromptId = match prompt_id.parse() {
        Ok(id) => id,
        Err(_) => {
            eprintln!("Unknown prompt ID: {}", prompt_id);
            eprintln!();
            eprintln!("Available prompts:");
            for id in PromptId::all() {
                eprintln!("  - {}", id.as_str());
            }
            return Ok(());
        }
    };

    let prompt = library.get(id)?;

    println!("Prompt: {}", prompt.metadata.id);
    println!("Version: {}", prompt.metadata.version);
    println!("Purpose: {}", prompt.metadata.purpose);
    println!(
        "Source: {}",
        if prompt.is_override {
            "Override"
        } else {
            "Default"
        }
    );

    if let Some(ref path) = prompt.override_path {
        println!("Override Path: {}", path.display());
    }

    println!();
    println!("--- Content ---");
    println!("{}", prompt.content);

    Ok(())
}

/// Show the path where prompt overrides should be placed
pub fn cmd_prompts_path() -> Result<()> {
    match default_prompts_dir() {
        Some(path) => {
            println!("{}", path.display());

            if !path.exists() {
                eprintln!();
                eprintln!("Note: This directory does not exist yet.");
                eprintln!("Create it to start adding custom prompts.");
            }
        }
        None => {
            eprintln!("Could not determine prompts directory.");
            eprintln!("The data directory is not available on this system.");
        }
    }

    Ok(())
}
