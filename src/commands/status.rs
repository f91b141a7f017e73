use super::CommandContext;
use crate::core::{error::Result, print_field, print_info, print_section_header, short_hash};
use colored::*;

pub fn execute_status(ctx: &CommandContext) -> Result<()> {
    let status = ctx.service.repository_status(ctx.dir())?;

    print_section_header("Repository");
    print_field(
        "Branch",
        status.current_branch.as_deref().unwrap_or("(detached)"),
    );
    print_field(
        "Head",
        status.head.as_deref().map(short_hash).unwrap_or("(none)"),
    );
    print_field("Snapshots", &status.commit_count.to_string());

    if !status.has_changes() {
        print_info("Working copy clean");
        return Ok(());
    }

    print_section_header("Changes");
    for change in &status.changes {
        let code = format!("{:>2}", change.status.as_str());
        let code = if change.staged { code.green() } else { code.red() };
        println!("  {} {}", code, change.path.white());
    }
    println!();
    Ok(())
}
