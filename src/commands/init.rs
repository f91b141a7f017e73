use super::CommandContext;
use crate::core::{error::Result, print_field, print_success, short_hash};

pub fn execute_init(ctx: &CommandContext, force: bool) -> Result<()> {
    let report = ctx.service.init_repository(ctx.dir(), force)?;

    if report.already_existed {
        print_success("Repository already initialized");
        return Ok(());
    }

    print_success("Repository initialized");
    if let Some(backup) = &report.backup_dir {
        print_field("Previous repository moved to", &backup.display().to_string());
    }
    match &report.initial_commit {
        Some(hash) => print_field("Initial commit", short_hash(hash)),
        None => print_field("Initial commit", "none (no trackable files yet)"),
    }
    println!();
    Ok(())
}
