use super::CommandContext;
use crate::core::{error::Result, print_field, print_info, print_success};

pub fn execute_cleanup(ctx: &CommandContext) -> Result<()> {
    let report = ctx.service.cleanup(ctx.dir())?;
    if !report.was_repo {
        print_info("No repository; nothing to clean up");
        return Ok(());
    }

    print_success("Repository cleaned up");
    if report.left_view {
        print_field("Snapshot view", "exited");
    }
    if !report.failed_steps.is_empty() {
        print_field("Skipped", &report.failed_steps.join(", "));
    }
    if !report.terminated_processes.is_empty() {
        print_field(
            "Terminated processes",
            &report.terminated_processes.len().to_string(),
        );
    }
    println!();
    Ok(())
}
