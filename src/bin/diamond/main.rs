use anyhow::Context;
use clap::Parser;
use nalgebra::{Matrix3, Vector6};

use elastic_fields::{
    atoms::lattice::diamond_cubic, elasticity::voigt::strain_matrix, writers::data_file::write_data,
};

/// Generates a diamond-cubic supercell data file, optionally under homogeneous strain.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Lattice constant in Å
    #[arg(short, long, default_value_t = 5.43)]
    a: f64,

    #[arg(long, default_value_t = 4)]
    nx: usize,

    #[arg(long, default_value_t = 4)]
    ny: usize,

    #[arg(long, default_value_t = 4)]
    nz: usize,

    /// Atomic number of the atoms
    #[arg(short, long, default_value_t = 14)]
    species: u32,

    /// Engineering strain exx eyy ezz eyz exz exy applied as F = I + ε
    #[arg(long, num_args = 6, allow_negative_numbers = true)]
    strain: Option<Vec<f64>>,

    #[arg(short, long, default_value_t = String::from("diamond.data"))]
    output: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut atoms = diamond_cubic(args.a, args.nx, args.ny, args.nz, args.species)
        .context("Building the supercell failed")?;

    if let Some(strain) = &args.strain {
        let deformation = Matrix3::identity() + strain_matrix(&Vector6::from_column_slice(strain));
        atoms
            .apply_deformation(&deformation)
            .context("Straining the supercell failed")?;
    }

    write_data(&atoms, &args.output)
        .with_context(|| format!("Generating '{}' led to an error", args.output))?;
    Ok(())
}
