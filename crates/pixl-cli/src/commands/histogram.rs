//! Histogram command

use crate::HistogramArgs;
use anyhow::Result;
use pixl_ops::{ChannelHistograms, Histogram};

pub fn run(args: HistogramArgs, verbose: bool) -> Result<()> {
    let image = super::load_raw(&args.raw)?;
    if verbose {
        println!("{}: {}", args.raw.input.display(), super::describe(&image));
    }

    let hists = ChannelHistograms::compute(&image)?;
    for (label, hist) in hists.labeled() {
        println!("{}", summary(label, hist));
        if args.bins {
            let counts: Vec<String> = hist.bins().iter().map(u64::to_string).collect();
            println!("  {}", counts.join(","));
        }
    }

    Ok(())
}

/// `label: min..max mean=.. samples=..`
fn summary(label: &str, hist: &Histogram) -> String {
    let total = hist.total();
    let Some((lo, hi)) = hist.range() else {
        return format!("{label:>5}: empty");
    };
    let weighted: u64 = hist
        .bins()
        .iter()
        .enumerate()
        .map(|(level, &count)| level as u64 * count)
        .sum();
    let mean = weighted as f64 / total as f64;
    format!("{label:>5}: {lo:>3}..{hi:>3} mean={mean:.2} samples={total}")
}
