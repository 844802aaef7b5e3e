use clap::Parser;
use shared_types::*;
use std::fs;
use std::path::{Path, PathBuf};
use ts_rs::TS;

#[derive(Parser, Debug)]
#[command(about = "Write the API wire types as TypeScript", long_about = None)]
struct Args {
    /// Output file; parent directories are created
    #[arg(long, default_value = "bindings/types.ts")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    write_types(&args.output)?;
    println!("Generated TypeScript types in {}", args.output.display());

    Ok(())
}

fn write_types(output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Generate TypeScript definitions for API types
    let mut types = Vec::new();

    // Contact types
    types.push(clean_type(Contact::export_to_string()?));
    types.push(clean_type(CreateContactRequest::export_to_string()?));
    types.push(clean_type(UpdateContactRequest::export_to_string()?));
    types.push(clean_type(PaginationMeta::export_to_string()?));
    types.push(clean_type(ContactsResponse::export_to_string()?));
    types.push(clean_type(MessageResponse::export_to_string()?));

    // Error and health types
    types.push(clean_type(FieldError::export_to_string()?));
    types.push(clean_type(ErrorResponse::export_to_string()?));
    types.push(clean_type(HealthResponse::export_to_string()?));

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(output, types.join("\n\n"))?;
    Ok(())
}

/// Strips the per-type banner and the cross-type imports; everything lands
/// in one file so the imports would be self-referential.
fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    let filtered: Vec<&str> = type_def
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("import type")
                && !trimmed.starts_with("// This file was generated")
                && !trimmed.starts_with("/* This file was generated")
        })
        .collect();

    let result = filtered.join("\n").trim().to_string();
    if result.is_empty() {
        result
    } else {
        format!("{}\n", result)
    }
}
