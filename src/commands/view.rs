use super::CommandContext;
use crate::core::{
    error::Result, format_hash, print_error_with_hint, print_field, print_info, print_success,
    short_hash,
};

pub fn execute_view(ctx: &CommandContext, hash: &str) -> Result<()> {
    let entered = ctx.service.enter_view(ctx.dir(), hash)?;
    print_success(&format!(
        "Viewing snapshot {} (read-only)",
        format_hash(&entered.short_hash)
    ));
    print_field("Message", &entered.message);
    print_field("Date", &entered.date);
    if entered.original_state.has_uncommitted_changes {
        print_field("Note", "uncommitted changes were carried into the view");
    }
    println!();
    Ok(())
}

pub fn execute_exit_view(ctx: &CommandContext) -> Result<()> {
    let outcome = ctx.service.exit_view(ctx.dir())?;
    print_success(&format!(
        "Left snapshot view of {}",
        format_hash(short_hash(&outcome.exited.hash))
    ));
    if let Some(name) = outcome.manifest.as_ref().and_then(|m| m.name.as_deref()) {
        print_field("Project", name);
    }
    println!();
    Ok(())
}

pub fn execute_view_status(ctx: &CommandContext) -> Result<()> {
    let status = ctx.service.view_status(ctx.dir())?;

    if !status.record_present {
        print_info("Not in snapshot view");
        return Ok(());
    }

    let hash = status.short_hash.as_deref().unwrap_or_default();
    if status.in_view {
        print_success(&format!("Viewing snapshot {}", format_hash(hash)));
    } else {
        print_error_with_hint(
            &format!("View record for {hash} does not match the working copy"),
            "Run `deck-snapshot recover --yes` to clear it",
        );
    }
    if let Some(original) = &status.original_state {
        if let Some(reference) = &original.reference {
            print_field("Return to", reference);
        }
    }
    if let Some(switched_at) = &status.switched_at {
        print_field("Since", &switched_at.to_rfc3339());
    }
    println!();
    Ok(())
}
