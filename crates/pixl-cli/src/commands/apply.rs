//! Apply command

use crate::ApplyArgs;
use anyhow::{Context, Result};
use pixl_ops::Recipe;
use tracing::info;

pub fn run(args: ApplyArgs, verbose: bool) -> Result<()> {
    let recipe = Recipe::from_file(&args.recipe)
        .with_context(|| format!("Failed to load recipe: {}", args.recipe.display()))?;
    let image = super::load_raw(&args.raw)?;

    if verbose {
        println!(
            "Applying {} step(s) to {}",
            recipe.steps.len(),
            super::describe(&image)
        );
    }

    if let Some(path) = &args.dump_recipe {
        std::fs::write(path, recipe.to_yaml_string()?)
            .with_context(|| format!("Failed to write: {}", path.display()))?;
    }

    let result = recipe.apply(&image)?;
    super::save_raw(&args.output, &result)?;

    info!(
        output = %args.output.display(),
        result = %super::describe(&result),
        "recipe applied"
    );
    if verbose {
        println!("Wrote {} to {}", super::describe(&result), args.output.display());
    }

    Ok(())
}
