use super::CommandContext;
use crate::core::{error::Result, print_field, print_success, short_hash};
use std::path::PathBuf;

pub fn execute_export(ctx: &CommandContext, dest: Option<PathBuf>) -> Result<()> {
    // relative to where the user ran the command, not the project
    let dest = match dest {
        Some(dest) if dest.is_relative() => Some(std::env::current_dir()?.join(dest)),
        other => other,
    };
    let report = ctx.service.export_repository(ctx.dir(), dest.as_deref())?;

    print_success("Repository exported");
    print_field("Path", &report.export_path.display().to_string());
    match &report.head {
        Some(head) => print_field("Head", short_hash(head)),
        None => print_field("Head", "none (no snapshots yet)"),
    }
    if report.is_temp {
        print_field("Location", "temporary directory");
    }
    print_field(
        "Clone with",
        &format!("git clone {}", report.export_path.display()),
    );
    println!();
    Ok(())
}
