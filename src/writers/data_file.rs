use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, BufWriter, Write},
};

use na::Matrix3;

use crate::{
    atoms::new::Atoms,
    errors::{ElasticError, Result},
};

/// Writes `atoms` in the data file format read by `DataReader`.
pub fn write_data(atoms: &Atoms, path: &str) -> Result<()> {
    let to_error = |e: io::Error| ElasticError::OutputFileError {
        path: path.to_string(),
        source: e,
    };
    let file = File::create(path).map_err(to_error)?;
    let mut out = BufWriter::new(file);
    write_to(&mut out, atoms)
        .and_then(|_| out.flush())
        .map_err(to_error)?;
    log::debug!("Wrote {} atoms to '{}'", atoms.n_atoms, path);
    Ok(())
}

/// Whether the cell fits the `xlo xhi` / `xy xz yz` form: a along x, b in the xy plane.
pub fn is_restricted_triclinic(h: &Matrix3<f64>) -> bool {
    h[(1, 0)] == 0.0 && h[(2, 0)] == 0.0 && h[(2, 1)] == 0.0
}

fn write_to<W: Write>(out: &mut W, atoms: &Atoms) -> io::Result<()> {
    let mut species_of_type = BTreeMap::new();
    for (&type_id, &z) in atoms.type_ids.iter().zip(&atoms.species) {
        species_of_type.entry(type_id).or_insert(z);
    }

    let h = &atoms.sim_box.h;
    let o = &atoms.sim_box.origin;

    writeln!(out, "# elastic-fields data file")?;
    writeln!(out)?;
    writeln!(out, "{} atoms", atoms.n_atoms)?;
    writeln!(out, "{} atom types", species_of_type.len())?;
    writeln!(out)?;
    if is_restricted_triclinic(h) {
        writeln!(out, "{} {} xlo xhi", o[0], o[0] + h[(0, 0)])?;
        writeln!(out, "{} {} ylo yhi", o[1], o[1] + h[(1, 1)])?;
        writeln!(out, "{} {} zlo zhi", o[2], o[2] + h[(2, 2)])?;
        if h[(0, 1)] != 0.0 || h[(0, 2)] != 0.0 || h[(1, 2)] != 0.0 {
            writeln!(out, "{} {} {} xy xz yz", h[(0, 1)], h[(0, 2)], h[(1, 2)])?;
        }
    } else {
        for (column, name) in h.column_iter().zip(["avec", "bvec", "cvec"]) {
            writeln!(out, "{} {} {} {}", column[0], column[1], column[2], name)?;
        }
        writeln!(out, "{} {} {} abc origin", o[0], o[1], o[2])?;
    }
    writeln!(out)?;

    writeln!(out, "Species")?;
    writeln!(out)?;
    for (type_id, z) in &species_of_type {
        writeln!(out, "{} {}", type_id, z)?;
    }
    writeln!(out)?;

    writeln!(out, "Atoms")?;
    writeln!(out)?;
    for i in 0..atoms.n_atoms {
        let r = atoms.positions.column(i);
        write!(out, "{} {} {} {} {}", i + 1, atoms.type_ids[i], r[0], r[1], r[2])?;
        if let Some(sites) = &atoms.primitive_index {
            write!(out, " {}", sites[i])?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::atoms::lattice::diamond_cubic;
    use crate::readers::data_reader::DataReader;

    use super::*;

    #[test]
    fn data_file_round_trip() {
        let mut atoms = diamond_cubic(5.43, 2, 2, 1, 14).unwrap();
        #[rustfmt::skip]
        let shear = Matrix3::new(
            1.0, 0.01, 0.0,
            0.0, 1.0,  0.0,
            0.0, 0.0,  1.0,
        );
        atoms.apply_deformation(&shear).unwrap();

        let path = std::env::temp_dir().join("elastic_fields_data_round_trip.data");
        let path = path.to_string_lossy().to_string();
        write_data(&atoms, &path).unwrap();
        let read = DataReader::new(path.clone()).read().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(read.n_atoms, atoms.n_atoms);
        assert_eq!(read.species, atoms.species);
        assert_eq!(read.primitive_index, atoms.primitive_index);
        assert_abs_diff_eq!(read.positions, atoms.positions, epsilon = 1e-12);
        assert_abs_diff_eq!(read.sim_box.h, atoms.sim_box.h, epsilon = 1e-12);
    }

    #[test]
    fn symmetric_shear_keeps_the_full_cell() {
        let mut atoms = diamond_cubic(5.43, 1, 1, 1, 14).unwrap();
        #[rustfmt::skip]
        let shear = Matrix3::new(
            1.0,   0.005, 0.0,
            0.005, 1.0,   0.0,
            0.0,   0.0,   1.0,
        );
        atoms.apply_deformation(&shear).unwrap();
        assert!(!is_restricted_triclinic(&atoms.sim_box.h));

        let path = std::env::temp_dir().join("elastic_fields_general_triclinic.data");
        let path = path.to_string_lossy().to_string();
        write_data(&atoms, &path).unwrap();
        let read = DataReader::new(path.clone()).read().unwrap();
        std::fs::remove_file(&path).ok();

        assert_abs_diff_eq!(read.sim_box.h, atoms.sim_box.h, epsilon = 1e-12);
        assert_abs_diff_eq!(read.positions, atoms.positions, epsilon = 1e-12);
    }
}
