use super::CommandContext;
use crate::core::{error::Result, format_hash, print_info, print_section_header};
use colored::*;

pub fn execute_log(ctx: &CommandContext, limit: Option<usize>) -> Result<()> {
    let snapshots = ctx.service.list_snapshots(ctx.dir(), limit)?;
    if snapshots.is_empty() {
        print_info("No snapshots yet");
        return Ok(());
    }

    print_section_header("Snapshots");
    for snapshot in &snapshots {
        println!(
            "  {} {} {} {}",
            format_hash(&snapshot.short_hash),
            snapshot.date.bright_black(),
            snapshot.label().white(),
            format!("({} files)", snapshot.file_count).bright_black()
        );
    }
    println!();
    Ok(())
}
