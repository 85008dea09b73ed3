//! The pivotal struct to read the input file and run the analysis can be found here
use std::{
    fs::File,
    io::{BufRead, BufReader},
};

use na::{Matrix3, Vector6};

use crate::{
    elasticity::{voigt::stress_vector, ElasticFieldCalculator, ElasticFieldOptions, LatticeSpec},
    errors::{ElasticError, Result},
    readers::{
        analysis_context::AnalysisContext, data_reader::DataReader,
        input_file::commands::Command,
    },
    writers::dump_traj::DumpTraj,
};

/// Tolerance of the symmetry check on the elastic constants in the input file (GPa)
const SYMMETRY_CHECK_TOL: f64 = 1e-6;

/// Aggregates of one analysed configuration.
#[derive(Debug, Clone)]
pub struct FrameSummary {
    pub step: usize,
    pub path: String,
    pub n_atoms: usize,
    pub n_defined: usize,
    pub n_interpolated: usize,
    /// Sum of the per-atom stresses, zero without elastic constants
    pub total_stress: Vector6<f64>,
    /// Mean strain energy density over the atoms that carry a stress
    pub mean_energy_density: Option<f64>,
}

/// [`System`] is the basic API for running the elastic field analysis.
///
/// [`System::new`] takes the path to the input file. [`System::read`] collects the commands,
/// [`System::contextualize`] validates them and builds the field options, and
/// [`System::run`] processes the reference configuration followed by every frame.
///
/// # Examples
///
/// ```no_run
/// use elastic_fields::system::System;
///
/// let mut system = System::new("input.efs".to_string());
/// let summaries = system.read()?.contextualize()?.run()?;
/// # Ok::<(), elastic_fields::errors::ElasticError>(())
/// ```
pub struct System {
    /// the path to the input file holding the commands of the analysis
    infile: String,
    ctx: AnalysisContext,
}

impl System {
    pub fn new(infile: String) -> Self {
        let ctx = AnalysisContext::default();
        Self { infile, ctx }
    }

    pub fn context(&self) -> &AnalysisContext {
        &self.ctx
    }

    /// Reads the input file and collects all the arguments provided by the input file.
    pub fn read(&mut self) -> Result<&mut Self> {
        let file = File::open(&self.infile).map_err(|e| ElasticError::InputFileError {
            path: self.infile.clone(),
            source: e,
        })?;
        let reader = BufReader::new(file);

        for (line_num, line) in reader.lines().enumerate() {
            let line_num = line_num + 1;
            let line = line.map_err(|e| ElasticError::DataFileError {
                path: self.infile.clone(),
                line: line_num,
                source: e,
            })?;
            // Considering only the part of the line that is before the commented part.
            let uncommented = line
                .split_once('#')
                .map(|(before, _)| before)
                .unwrap_or(line.as_str())
                .trim();

            if uncommented.is_empty() {
                continue;
            }

            let line_split: Vec<&str> = uncommented.split_whitespace().collect();
            let command = line_split[0];
            let args = &line_split[1..];

            match Command::from_str(command) {
                Some(cmd) => {
                    if args.is_empty() {
                        return Err(ElasticError::MissingArgument { line: line_num });
                    }
                    cmd.run(args, line_num, &mut self.ctx)?
                }
                None => {
                    return Err(ElasticError::UnknownCommand {
                        command: command.to_string(),
                        line: line_num,
                    })
                }
            }
        }
        Ok(self)
    }

    /// Validates the collected arguments and builds the options of the field calculator.
    pub fn contextualize(&mut self) -> Result<&mut Self> {
        let ctx = &mut self.ctx;
        if ctx.frames.is_empty() {
            return Err(ElasticError::NoFramesDefined);
        }

        let lattice = LatticeSpec::resolve(ctx.lattice_constant, ctx.bond_length)?;
        let mut options = ElasticFieldOptions::new(lattice).with_system(ctx.system);
        options.c = ctx.c;
        options.c_vector = ctx.c_vector;
        options.cutoff_factor = ctx.cutoff_factor;
        options.interpolate = ctx.interpolate;
        options.interpolate_species = ctx.interpolate_species;

        if let Some(elastic_constants) = &ctx.elastic_constants {
            if let Some(symmetry) = elastic_constants.symmetry {
                symmetry.check(&elastic_constants.cij, SYMMETRY_CHECK_TOL)?;
                log::info!("Elastic constants follow the {} pattern", symmetry);
            }
            options.cij = Some(elastic_constants.cij);
        } else {
            log::warn!("No elastic constants given, only strains will be computed");
        }

        // fails early for an anatase system without c
        let geometry = options.geometry()?;
        log::debug!("Frame geometry: {:?}", geometry);

        ctx.options = Some(options);
        Ok(self)
    }

    /// Runs the analysis: the reference configuration first if one is given, then every frame.
    pub fn run(&mut self) -> Result<Vec<FrameSummary>> {
        let options = self
            .ctx
            .options
            .clone()
            .ok_or_else(|| ElasticError::InvalidArgument("System run before contextualize".to_string()))?;
        let mut calculator = ElasticFieldCalculator::new(options);

        if let Some(reference) = &self.ctx.reference {
            let atoms = DataReader::new(reference.clone()).read()?;
            calculator.options_mut().save_reference = true;
            calculator.compute_with_cell_list(&atoms)?;
            calculator.options_mut().save_reference = false;
            calculator.options_mut().use_reference = true;
            log::info!(
                "Reference '{}': {} primitive sites stored",
                reference,
                calculator.reference().len()
            );
        }

        let mut dump = match &self.ctx.dump {
            Some(path) => Some(DumpTraj::new(path)?),
            None => None,
        };

        let mut summaries = Vec::with_capacity(self.ctx.frames.len());
        for (step, path) in self.ctx.frames.iter().enumerate() {
            let atoms = DataReader::new(path.clone()).read()?;
            let fields = calculator.compute_with_cell_list(&atoms)?;

            if let Some(dump) = dump.as_mut() {
                dump.write_step(&atoms, &fields, step)?;
            }

            let total: Matrix3<f64> = fields.stress_matrices().iter().sum();
            let densities: Vec<f64> = fields
                .iter()
                .flatten()
                .filter_map(|state| state.stress.as_ref())
                .map(|stress| stress.strain_energy_density)
                .collect();
            let mean_energy_density = if densities.is_empty() {
                None
            } else {
                Some(densities.iter().sum::<f64>() / densities.len() as f64)
            };

            let summary = FrameSummary {
                step,
                path: path.clone(),
                n_atoms: atoms.n_atoms,
                n_defined: fields.n_defined(),
                n_interpolated: fields.n_interpolated(),
                total_stress: stress_vector(&total),
                mean_energy_density,
            };
            log::info!(
                "Frame {} '{}': {} of {} atoms defined ({} interpolated)",
                step,
                path,
                summary.n_defined,
                summary.n_atoms,
                summary.n_interpolated
            );
            summaries.push(summary);
        }
        Ok(summaries)
    }
}
