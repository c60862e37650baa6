//! Blend command

use crate::{BlendArgs, Equalize, RawArgs};
use anyhow::Result;
use pixl_ops::{BlendParams, EqualizeMode, blend, blend_equalized};

pub fn run(args: BlendArgs, verbose: bool) -> Result<()> {
    let a = super::load_raw(&args.raw)?;
    let b = super::load_raw(&RawArgs {
        input: args.other.clone(),
        width: args.other_width,
        height: args.other_height,
        channels: args.other_channels.unwrap_or(args.raw.channels),
        depth: args.raw.depth,
    })?;

    if verbose {
        println!(
            "Blending {} with {} (alpha {}, equalize {:?})",
            super::describe(&a),
            super::describe(&b),
            args.alpha,
            args.equalize
        );
    }

    let params = BlendParams::new(args.alpha)?;
    let result = match args.equalize {
        Equalize::None => blend(&a, &b, params)?,
        Equalize::PerChannel => blend_equalized(&a, &b, params, EqualizeMode::PerChannel)?,
        Equalize::Luminance => blend_equalized(&a, &b, params, EqualizeMode::Luminance)?,
    };

    super::save_raw(&args.output, &result)?;
    if verbose {
        println!("Wrote {} to {}", super::describe(&result), args.output.display());
    }

    Ok(())
}
