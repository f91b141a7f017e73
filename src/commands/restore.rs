use super::CommandContext;
use crate::core::{
    error::{Result, SnapshotError},
    format_hash, print_field, print_success, print_warning,
};

pub fn execute_restore(ctx: &CommandContext, hash: &str, yes: bool, no_backup: bool) -> Result<()> {
    if !yes {
        return Err(SnapshotError::confirmation_required("restore"));
    }

    let backup = ctx.service.config().backup_before_restore && !no_backup;
    if !backup {
        print_warning("Restoring without a backup snapshot");
    }

    let outcome = ctx.service.restore_snapshot(ctx.dir(), hash, backup)?;
    print_success(&format!(
        "Restored snapshot {}",
        format_hash(&outcome.report.short_hash)
    ));
    if let Some(created) = &outcome.backup {
        print_field("Backup snapshot", &created.short_hash);
    }
    if let Some(name) = outcome.manifest.as_ref().and_then(|m| m.name.as_deref()) {
        print_field("Project", name);
    }
    println!();
    Ok(())
}
