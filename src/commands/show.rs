use super::CommandContext;
use crate::core::{error::Result, format_hash, print_field, print_section_header};
use colored::*;

pub fn execute_show(ctx: &CommandContext, hash: &str) -> Result<()> {
    let content = ctx.service.snapshot_content(ctx.dir(), hash)?;

    print_section_header(&format!("Snapshot {}", format_hash(&content.short_hash)));
    for (key, value) in &content.metadata {
        if !value.is_empty() {
            print_field(key, value);
        }
    }

    println!();
    for (path, file) in &content.files {
        println!(
            "  {} {}",
            path.white(),
            format!("{} bytes", file.size).bright_black()
        );
    }
    println!();
    Ok(())
}
