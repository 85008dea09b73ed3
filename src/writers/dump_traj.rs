use std::{
    fs::File,
    io::{self, BufWriter, Write},
};

use crate::{
    atoms::new::Atoms,
    elasticity::ElasticFields,
    errors::{ElasticError, Result},
    simulation_box::SimulationBox,
    writers::data_file::is_restricted_triclinic,
};

/// LAMMPS style dump of the per-atom strain and stress fields, one block per frame.
pub struct DumpTraj {
    path: String,
    out: BufWriter<File>,
}

impl DumpTraj {
    pub fn new(path: &str) -> Result<Self> {
        let file = File::create(path).map_err(|e| ElasticError::OutputFileError {
            path: path.to_string(),
            source: e,
        })?;
        Ok(DumpTraj {
            path: path.to_string(),
            out: BufWriter::new(file),
        })
    }

    fn write_timestep(&mut self, step: usize) -> io::Result<()> {
        writeln!(self.out, "ITEM: TIMESTEP")?;
        writeln!(self.out, "{}", step)?;
        Ok(())
    }

    fn write_natoms(&mut self, n_atoms: usize) -> io::Result<()> {
        writeln!(self.out, "ITEM: NUMBER OF ATOMS")?;
        writeln!(self.out, "{}", n_atoms)?;
        Ok(())
    }

    fn write_bounds(&mut self, sim_box: &SimulationBox) -> io::Result<()> {
        let h = &sim_box.h;
        let o = &sim_box.origin;
        let (xy, xz, yz) = (h[(0, 1)], h[(0, 2)], h[(1, 2)]);
        if !is_restricted_triclinic(h) {
            writeln!(self.out, "ITEM: BOX BOUNDS abc origin pp pp pp")?;
            for (axis, column) in h.column_iter().enumerate() {
                writeln!(self.out, "{} {} {} {}", column[0], column[1], column[2], o[axis])?;
            }
        } else if xy == 0.0 && xz == 0.0 && yz == 0.0 {
            writeln!(self.out, "ITEM: BOX BOUNDS pp pp pp")?;
            writeln!(self.out, "{} {}", o[0], o[0] + h[(0, 0)])?;
            writeln!(self.out, "{} {}", o[1], o[1] + h[(1, 1)])?;
            writeln!(self.out, "{} {}", o[2], o[2] + h[(2, 2)])?;
        } else {
            // bounding box of the tilted cell
            let xlo = o[0] + 0f64.min(xy).min(xz).min(xy + xz);
            let xhi = o[0] + h[(0, 0)] + 0f64.max(xy).max(xz).max(xy + xz);
            let ylo = o[1] + 0f64.min(yz);
            let yhi = o[1] + h[(1, 1)] + 0f64.max(yz);
            writeln!(self.out, "ITEM: BOX BOUNDS xy xz yz pp pp pp")?;
            writeln!(self.out, "{} {} {}", xlo, xhi, xy)?;
            writeln!(self.out, "{} {} {}", ylo, yhi, xz)?;
            writeln!(self.out, "{} {} {}", o[2], o[2] + h[(2, 2)], yz)?;
        }
        Ok(())
    }

    fn write_atoms_info(&mut self, atoms: &Atoms, fields: &ElasticFields) -> io::Result<()> {
        writeln!(
            self.out,
            "ITEM: ATOMS id type x y z defined exx eyy ezz eyz exz exy sxx syy szz syz sxz sxy sed s1 s2 s3"
        )?;
        for i in 0..atoms.n_atoms {
            let position = atoms.positions.column(i);
            write!(
                self.out,
                "{} {} {} {} {}",
                i + 1,
                atoms.type_ids[i],
                position[0],
                position[1],
                position[2]
            )?;
            match fields.get(i) {
                Some(state) => {
                    let defined = if state.interpolated { 2 } else { 1 };
                    write!(self.out, " {}", defined)?;
                    for e in state.strain.iter() {
                        write!(self.out, " {}", e)?;
                    }
                    match &state.stress {
                        Some(stress) => {
                            for s in stress.stress.iter() {
                                write!(self.out, " {}", s)?;
                            }
                            write!(self.out, " {}", stress.strain_energy_density)?;
                            for s in stress.eigenvalues.iter() {
                                write!(self.out, " {}", s)?;
                            }
                        }
                        None => write!(self.out, "{}", " 0".repeat(10))?,
                    }
                }
                None => write!(self.out, " 0{}", " 0".repeat(16))?,
            }
            writeln!(self.out)?;
        }
        Ok(())
    }

    pub fn write_step(&mut self, atoms: &Atoms, fields: &ElasticFields, step: usize) -> Result<()> {
        self.write_timestep(step)
            .and_then(|_| self.write_natoms(atoms.n_atoms))
            .and_then(|_| self.write_bounds(&atoms.sim_box))
            .and_then(|_| self.write_atoms_info(atoms, fields))
            .and_then(|_| self.out.flush())
            .map_err(|e| ElasticError::OutputFileError {
                path: self.path.clone(),
                source: e,
            })
    }
}
