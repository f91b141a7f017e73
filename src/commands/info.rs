use super::CommandContext;
use crate::core::{error::Result, print_field, print_section_header};

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

pub fn execute_info(ctx: &CommandContext) -> Result<()> {
    let info = ctx.service.repository_info(ctx.dir())?;

    print_section_header("Repository info");
    print_field("Project", &info.project_dir.display().to_string());
    print_field("Repository", yes_no(info.control_dir_exists));
    print_field("Ignore list", yes_no(info.ignore_list_exists));
    print_field("Tracked files", &info.tracked_files_count.to_string());
    print_field("git available", yes_no(info.git_available));
    print_field("Busy", yes_no(info.is_operating));
    if let Some(last_error) = &info.last_error {
        print_field("Last error", last_error);
    }
    println!();
    Ok(())
}
