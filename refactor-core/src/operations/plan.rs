use super::{Project, ProjectOptions};
use crate::batch::{BatchOptions, BatchRunner};
use crate::output::PlanResult;
use crate::planner::RenameMapping;
use crate::preview::{render_steps, should_use_color, Preview};
use anyhow::{Context, Result};

/// Plan operation - orders a mapping set into execution steps without touching files
pub fn plan_operation(
    mappings: Vec<RenameMapping>,
    preview: Preview,
    options: &ProjectOptions,
) -> Result<(PlanResult, Option<String>)> {
    let project = Project::open(options)?;
    let batch_options = BatchOptions {
        roots: project.roots(&options.paths),
        filter: project.filter.clone(),
        dry_run: true,
    };

    let plan = BatchRunner::new(project.source.as_ref())
        .plan(&mappings, &batch_options)
        .context("Failed to plan batch")?;

    let use_color = should_use_color(options.use_color.or(project.config.defaults.use_color));
    let preview_content = match preview {
        Preview::None => None,
        Preview::Table | Preview::Diff => Some(render_steps(&plan, &mappings, use_color)),
    };

    Ok((PlanResult { mappings, plan }, preview_content))
}
