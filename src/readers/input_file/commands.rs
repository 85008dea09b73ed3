//! Parsers for the individual commands of the input file
use std::str::FromStr;

use na::{Matrix6, Vector3};

use crate::{
    elasticity::{frame::CoordinationSystem, symmetry::cubic, symmetry::CrystalSymmetry},
    errors::{ElasticError, Result},
    extensions::ArgsExt,
    readers::analysis_context::{AnalysisContext, ElasticConstantsArgs},
};

/// Every keyword the input file understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ReadData,
    Reference,
    LatticeConstant,
    BondLength,
    LatticeC,
    CVector,
    System,
    ElasticConstants,
    CutoffFactor,
    Interpolate,
    Dump,
}

impl Command {
    pub fn from_str(command: &str) -> Option<Self> {
        match command {
            "read_data" => Some(Self::ReadData),
            "reference" => Some(Self::Reference),
            "lattice_constant" => Some(Self::LatticeConstant),
            "bond_length" => Some(Self::BondLength),
            "lattice_c" => Some(Self::LatticeC),
            "c_vector" => Some(Self::CVector),
            "system" => Some(Self::System),
            "elastic_constants" => Some(Self::ElasticConstants),
            "cutoff_factor" => Some(Self::CutoffFactor),
            "interpolate" => Some(Self::Interpolate),
            "dump" => Some(Self::Dump),
            _ => None,
        }
    }

    /// Parses the arguments following the keyword into the context.
    pub fn run(&self, args: &[&str], line: usize, ctx: &mut AnalysisContext) -> Result<()> {
        match self {
            Self::ReadData => {
                ctx.frames.push(args.get_required(0, line)?.to_string());
            }
            Self::Reference => {
                if ctx.reference.is_some() {
                    log::warn!("Line {}: replacing the earlier reference configuration", line);
                }
                ctx.reference = Some(args.get_required(0, line)?.to_string());
            }
            Self::LatticeConstant => {
                ctx.lattice_constant = Some(positive(args.parse_float_at(0, line)?, line)?);
            }
            Self::BondLength => {
                ctx.bond_length = Some(positive(args.parse_float_at(0, line)?, line)?);
            }
            Self::LatticeC => {
                ctx.c = Some(positive(args.parse_float_at(0, line)?, line)?);
            }
            Self::CVector => {
                let v = args.parse_floats_from(0, 3, line)?;
                ctx.c_vector = Some(Vector3::new(v[0], v[1], v[2]));
            }
            Self::System => {
                ctx.system = CoordinationSystem::from_str(args.get_required(0, line)?)?;
            }
            Self::ElasticConstants => {
                ctx.elastic_constants = Some(elastic_constants(args, line)?);
            }
            Self::CutoffFactor => {
                ctx.cutoff_factor = positive(args.parse_float_at(0, line)?, line)?;
            }
            Self::Interpolate => {
                ctx.interpolate = yes_no(args.get_required(0, line)?, line)?;
                let mut read_args = 1;
                while let Some(&keyword) = args.get(read_args) {
                    read_args += 1;
                    match keyword {
                        "species" => {
                            let z = args.parse_usize_at(read_args, line)?;
                            read_args += 1;
                            ctx.interpolate_species = Some(u32::try_from(z).map_err(|_| {
                                ElasticError::InvalidCommandArgument {
                                    string: z.to_string(),
                                    line,
                                }
                            })?);
                        }
                        other => {
                            return Err(ElasticError::InvalidCommandArgument {
                                string: other.to_string(),
                                line,
                            })
                        }
                    }
                }
            }
            Self::Dump => {
                ctx.dump = Some(args.get_required(0, line)?.to_string());
            }
        }
        Ok(())
    }
}

fn positive(value: f64, line: usize) -> Result<f64> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ElasticError::InvalidCommandArgument {
            string: value.to_string(),
            line,
        })
    }
}

fn yes_no(arg: &str, line: usize) -> Result<bool> {
    match arg {
        "yes" => Ok(true),
        "no" => Ok(false),
        other => Err(ElasticError::InvalidCommandArgument {
            string: other.to_string(),
            line,
        }),
    }
}

/// "elastic_constants cubic c11 c12 c44 [symmetry name]" or
/// "elastic_constants full c11 c12 ... c66 [symmetry name]", constants in GPa.
fn elastic_constants(args: &[&str], line: usize) -> Result<ElasticConstantsArgs> {
    let mut read_args = 0;
    let style = args.get_required(read_args, line)?;
    read_args += 1;

    let cij = match style {
        "cubic" => {
            let c = args.parse_floats_from(read_args, 3, line)?;
            read_args += 3;
            cubic(c[0], c[1], c[2])
        }
        "full" => {
            let c = args.parse_floats_from(read_args, 36, line)?;
            read_args += 36;
            Matrix6::from_row_slice(&c)
        }
        other => {
            return Err(ElasticError::InvalidCommandArgument {
                string: other.to_string(),
                line,
            })
        }
    };

    let mut symmetry = None;
    while let Some(&keyword) = args.get(read_args) {
        read_args += 1;
        match keyword {
            "symmetry" => {
                symmetry = Some(CrystalSymmetry::from_str(args.get_required(read_args, line)?)?);
                read_args += 1;
            }
            other => {
                return Err(ElasticError::InvalidCommandArgument {
                    string: other.to_string(),
                    line,
                })
            }
        }
    }

    Ok(ElasticConstantsArgs {
        cij,
        symmetry,
        line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(line: &str, ctx: &mut AnalysisContext) -> Result<()> {
        let split: Vec<&str> = line.split_whitespace().collect();
        Command::from_str(split[0])
            .ok_or(ElasticError::UnknownCommand {
                command: split[0].to_string(),
                line: 1,
            })?
            .run(&split[1..], 1, ctx)
    }

    #[test]
    fn frames_are_queued_in_order() {
        let mut ctx = AnalysisContext::default();
        run("read_data a.data", &mut ctx).unwrap();
        run("read_data b.data", &mut ctx).unwrap();
        assert_eq!(ctx.frames, vec!["a.data", "b.data"]);
    }

    #[test]
    fn cubic_constants_with_symmetry_check() {
        let mut ctx = AnalysisContext::default();
        run("elastic_constants cubic 165.7 63.9 79.6 symmetry cubic", &mut ctx).unwrap();
        let args = ctx.elastic_constants.unwrap();
        assert_eq!(args.cij, cubic(165.7, 63.9, 79.6));
        assert_eq!(args.symmetry, Some(CrystalSymmetry::Cubic));
    }

    #[test]
    fn full_constants_need_36_values() {
        let mut ctx = AnalysisContext::default();
        let values = vec!["1.0"; 35].join(" ");
        assert!(matches!(
            run(&format!("elastic_constants full {values}"), &mut ctx),
            Err(ElasticError::MissingArgument { line: 1 })
        ));
    }

    #[test]
    fn interpolation_with_species_filter() {
        let mut ctx = AnalysisContext::default();
        run("interpolate yes species 8", &mut ctx).unwrap();
        assert!(ctx.interpolate);
        assert_eq!(ctx.interpolate_species, Some(8));

        run("interpolate no", &mut ctx).unwrap();
        assert!(!ctx.interpolate);
        assert!(run("interpolate maybe", &mut ctx).is_err());
    }

    #[test]
    fn geometry_commands() {
        let mut ctx = AnalysisContext::default();
        run("system anatase", &mut ctx).unwrap();
        run("lattice_c 9.5", &mut ctx).unwrap();
        run("c_vector 0 0 1", &mut ctx).unwrap();
        run("bond_length 2.35", &mut ctx).unwrap();
        assert_eq!(ctx.system, CoordinationSystem::Anatase);
        assert_eq!(ctx.c, Some(9.5));
        assert_eq!(ctx.c_vector, Some(Vector3::z()));
        assert_eq!(ctx.bond_length, Some(2.35));
        assert!(run("lattice_constant -1", &mut ctx).is_err());
    }
}
