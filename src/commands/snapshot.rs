use super::CommandContext;
use crate::core::{error::Result, format_hash, print_field, print_info, print_success, SnapshotOutcome};

pub fn execute_snapshot(ctx: &CommandContext, message: &str, user: Option<&str>) -> Result<()> {
    match ctx.service.create_snapshot(ctx.dir(), message, user)? {
        SnapshotOutcome::Created(snapshot) => {
            print_success(&format!(
                "Snapshot {} created",
                format_hash(&snapshot.short_hash)
            ));
            print_field("Description", &snapshot.description);
            print_field("Files", &snapshot.files_count.to_string());
            println!();
        }
        SnapshotOutcome::NoChanges => print_info("Nothing to snapshot: no file changes"),
    }
    Ok(())
}
