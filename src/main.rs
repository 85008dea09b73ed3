mod args_parser;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;

use elastic_fields::{logger, system::System};

use crate::args_parser::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logger::init(level).context("Failed to install the logger")?;

    let mut system = System::new(args.infile.clone());
    let summaries = system
        .read()?
        .contextualize()?
        .run()
        .with_context(|| format!("Analysis described by '{}' failed", args.infile))?;

    println!("step defined interpolated sxx syy szz syz sxz sxy mean_sed");
    for summary in summaries {
        let s = &summary.total_stress;
        println!(
            "{} {} {} {} {} {} {} {} {} {}",
            summary.step,
            summary.n_defined,
            summary.n_interpolated,
            s[0],
            s[1],
            s[2],
            s[3],
            s[4],
            s[5],
            summary
                .mean_energy_density
                .map_or_else(|| "-".to_string(), |e| e.to_string())
        );
    }
    Ok(())
}
