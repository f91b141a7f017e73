use super::CommandContext;
use crate::core::{
    error::{Result, SnapshotError},
    print_field, print_success, print_warning,
};

pub fn execute_recover(ctx: &CommandContext, yes: bool) -> Result<()> {
    if !yes {
        return Err(SnapshotError::confirmation_required("recover"));
    }

    let recovery = ctx.service.force_recover(ctx.dir())?;
    match &recovery.checked_out {
        Some(branch) => print_success(&format!("Recovered onto {branch}")),
        None => print_warning("No branch could be checked out; view record cleared anyway"),
    }
    print_field("View record cleared", if recovery.record_cleared { "yes" } else { "no" });
    println!();
    Ok(())
}
