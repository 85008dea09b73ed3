use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
};

use na::{Matrix3, Matrix3xX, Vector3};

use crate::{
    atoms::new::Atoms,
    errors::{ElasticError, Result},
    simulation_box::SimulationBox,
};

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Header,
    Species,
    Atoms,
}

/// Reader for LAMMPS style data files carrying atomic numbers and primitive site indices.
pub struct DataReader {
    infile: String,
}

impl DataReader {
    pub fn new(infile: String) -> Self {
        Self { infile }
    }

    fn malformed(&self, line: usize, reason: impl Into<String>) -> ElasticError {
        ElasticError::MalformedData {
            path: self.infile.clone(),
            line,
            reason: reason.into(),
        }
    }

    fn parse<T: std::str::FromStr>(&self, token: &str, line: usize) -> Result<T> {
        token
            .parse()
            .map_err(|_| self.malformed(line, format!("cannot parse '{}'", token)))
    }

    fn parse_vector(&self, line_split: &[&str], line: usize) -> Result<Vector3<f64>> {
        Ok(Vector3::new(
            self.parse(line_split[0], line)?,
            self.parse(line_split[1], line)?,
            self.parse(line_split[2], line)?,
        ))
    }

    pub fn read(&self) -> Result<Atoms> {
        let file = File::open(&self.infile).map_err(|e| ElasticError::InputFileError {
            path: self.infile.clone(),
            source: e,
        })?;
        let reader = BufReader::new(file);

        let mut section = Section::Header;
        let mut n_atoms: Option<usize> = None;

        let (mut xlo, mut xhi): (f64, f64) = (0.0, 1.0);
        let (mut ylo, mut yhi): (f64, f64) = (0.0, 1.0);
        let (mut zlo, mut zhi): (f64, f64) = (0.0, 1.0);
        let (mut xy, mut xz, mut yz): (f64, f64, f64) = (0.0, 0.0, 0.0);
        // general triclinic cell: "ax ay az avec" ... "ox oy oz abc origin"
        let mut cell_vectors: [Option<Vector3<f64>>; 3] = [None; 3];
        let mut general_origin: Option<Vector3<f64>> = None;

        let mut species_of_type: HashMap<usize, u32> = HashMap::new();

        let mut type_ids: Vec<usize> = Vec::new();
        let mut positions: Matrix3xX<f64> = Matrix3xX::zeros(0);
        let mut primitive_index: Vec<Option<usize>> = Vec::new();
        let mut seen: Vec<bool> = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line_num = line_num + 1;
            let line = line.map_err(|e| ElasticError::DataFileError {
                path: self.infile.clone(),
                line: line_num,
                source: e,
            })?;
            let line = line
                .split_once('#')
                .map(|(before, _)| before)
                .unwrap_or(line.as_str())
                .trim();

            if line.is_empty() {
                continue;
            }

            let line_split: Vec<&str> = line.split_whitespace().collect();

            match line_split[0] {
                "Species" => {
                    section = Section::Species;
                    continue;
                }
                "Atoms" => {
                    if n_atoms.is_none() {
                        return Err(self.malformed(line_num, "Atoms section before atom count"));
                    }
                    section = Section::Atoms;
                    continue;
                }
                _ => {}
            }

            if section == Section::Header {
                // "64 atoms", "1 atom types"
                if line_split.len() > 1 {
                    match line_split[1] {
                        "atoms" => {
                            let n: usize = self.parse(line_split[0], line_num)?;
                            n_atoms = Some(n);
                            type_ids = vec![0; n];
                            positions = Matrix3xX::zeros(n);
                            primitive_index = vec![None; n];
                            seen = vec![false; n];
                            continue;
                        }
                        "atom" => continue,
                        _ => {}
                    }
                }
                // "0.0 10.86 xlo xhi" and "0.0 0.0 0.0 xy xz yz"
                if line_split.len() > 2 {
                    match line_split[2] {
                        "xlo" => {
                            xlo = self.parse(line_split[0], line_num)?;
                            xhi = self.parse(line_split[1], line_num)?;
                            continue;
                        }
                        "ylo" => {
                            ylo = self.parse(line_split[0], line_num)?;
                            yhi = self.parse(line_split[1], line_num)?;
                            continue;
                        }
                        "zlo" => {
                            zlo = self.parse(line_split[0], line_num)?;
                            zhi = self.parse(line_split[1], line_num)?;
                            continue;
                        }
                        _ => {}
                    }
                }
                if line_split.len() > 3 {
                    let axis = match line_split[3] {
                        "avec" => Some(0),
                        "bvec" => Some(1),
                        "cvec" => Some(2),
                        _ => None,
                    };
                    if let Some(axis) = axis {
                        cell_vectors[axis] = Some(self.parse_vector(&line_split, line_num)?);
                        continue;
                    }
                    if line_split[3] == "abc" && line_split.get(4) == Some(&"origin") {
                        general_origin = Some(self.parse_vector(&line_split, line_num)?);
                        continue;
                    }
                }
                if line_split.len() > 3 && line_split[3] == "xy" {
                    xy = self.parse(line_split[0], line_num)?;
                    xz = self.parse(line_split[1], line_num)?;
                    yz = self.parse(line_split[2], line_num)?;
                    continue;
                }
                return Err(self.malformed(line_num, format!("unrecognised header line '{}'", line)));
            }

            match section {
                Section::Species => {
                    // "1 14": type id, atomic number
                    if line_split.len() < 2 {
                        return Err(self.malformed(line_num, "expected 'type Z'"));
                    }
                    let type_id: usize = self.parse(line_split[0], line_num)?;
                    let z: u32 = self.parse(line_split[1], line_num)?;
                    species_of_type.insert(type_id, z);
                }
                Section::Atoms => {
                    // "31 1 0.0 0.0 0.0 [site]": id, type, x, y, z, primitive site
                    if line_split.len() < 5 {
                        return Err(self.malformed(line_num, "expected 'id type x y z [site]'"));
                    }
                    let id: usize = self.parse(line_split[0], line_num)?;
                    let n = type_ids.len();
                    if id == 0 || id > n {
                        return Err(self.malformed(
                            line_num,
                            format!("atom id {} outside 1..={}", id, n),
                        ));
                    }
                    let id = id - 1;
                    if seen[id] {
                        return Err(self.malformed(line_num, format!("duplicate atom id {}", id + 1)));
                    }
                    seen[id] = true;
                    type_ids[id] = self.parse(line_split[1], line_num)?;
                    for k in 0..3 {
                        positions[(k, id)] = self.parse(line_split[2 + k], line_num)?;
                    }
                    if let Some(site) = line_split.get(5) {
                        primitive_index[id] = Some(self.parse(site, line_num)?);
                    }
                }
                Section::Header => {}
            }
        }

        let n_atoms = n_atoms.ok_or_else(|| self.malformed(0, "missing atom count"))?;
        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(self.malformed(0, format!("atom {} never defined", missing + 1)));
        }

        for type_id in &type_ids {
            if !species_of_type.contains_key(type_id) {
                log::warn!("No species given for atom type {}, using Z = 0", type_id);
                species_of_type.insert(*type_id, 0);
            }
        }
        let species = type_ids.iter().map(|type_id| species_of_type[type_id]).collect();

        let sim_box = match cell_vectors {
            [None, None, None] => {
                SimulationBox::from_lammps_data(xlo, xhi, ylo, yhi, zlo, zhi, xy, xz, yz)?
            }
            [Some(a), Some(b), Some(c)] => {
                let mut sim_box = SimulationBox::new(Matrix3::from_columns(&[a, b, c]), [true; 3])?;
                sim_box.origin = general_origin.unwrap_or(Vector3::zeros());
                sim_box
            }
            _ => return Err(self.malformed(0, "general triclinic cell needs avec, bvec and cvec")),
        };
        let mut atoms = Atoms::from_positions(positions, species, sim_box)?;
        atoms.type_ids = type_ids;

        let n_sites = primitive_index.iter().filter(|p| p.is_some()).count();
        if n_sites == n_atoms && n_atoms > 0 {
            atoms = atoms.with_primitive_index(primitive_index.into_iter().flatten().collect())?;
        } else if n_sites != 0 {
            return Err(self.malformed(
                0,
                format!("{} of {} atoms carry a primitive index", n_sites, n_atoms),
            ));
        }

        log::debug!("Read {} atoms from '{}'", n_atoms, self.infile);
        Ok(atoms)
    }
}
