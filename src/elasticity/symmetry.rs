use std::fmt;
use std::str::FromStr;

use na::Matrix6;

use crate::errors::{ElasticError, Result};
use crate::math::ApproxEqual;

/// Builds the elastic constant matrix of a cubic crystal.
pub fn cubic(c11: f64, c12: f64, c44: f64) -> Matrix6<f64> {
    let mut c = Matrix6::zeros();
    for i in 0..3 {
        for j in 0..3 {
            c[(i, j)] = if i == j { c11 } else { c12 };
        }
        c[(i + 3, i + 3)] = c44;
    }
    c
}

/// Crystal classes with a distinct elastic constant sparsity pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrystalSymmetry {
    Cubic,
    TrigonalHigh,
    TrigonalLow,
    TetragonalHigh,
    TetragonalLow,
    Orthorhombic,
    Monoclinic,
    Triclinic,
}

impl CrystalSymmetry {
    /// Pattern of independent constants: 0 is a vanishing entry, `k` the k-th constant
    /// and `-k` its negative.
    #[rustfmt::skip]
    pub fn pattern(&self) -> [[i8; 6]; 6] {
        match self {
            Self::Cubic => [
                [1, 7, 7, 0, 0, 0],
                [7, 1, 7, 0, 0, 0],
                [7, 7, 1, 0, 0, 0],
                [0, 0, 0, 4, 0, 0],
                [0, 0, 0, 0, 4, 0],
                [0, 0, 0, 0, 0, 4],
            ],
            Self::TrigonalHigh => [
                [1, 7, 8, 9, 10, 0],
                [7, 1, 8, 0, -9, 0],
                [8, 8, 3, 0, 0, 0],
                [9, -9, 0, 4, 0, 0],
                [10, 0, 0, 0, 4, 0],
                [0, 0, 0, 0, 0, 6],
            ],
            Self::TrigonalLow => [
                [1, 7, 8, 9, 10, 0],
                [7, 1, 8, -9, -10, 0],
                [8, 8, 3, 0, 0, 0],
                [9, -9, 0, 4, 0, -10],
                [10, -10, 0, 0, 4, 9],
                [0, 0, 0, -10, 9, 6],
            ],
            Self::TetragonalHigh => [
                [1, 7, 8, 0, 0, 0],
                [7, 1, 8, 0, 0, 0],
                [8, 8, 3, 0, 0, 0],
                [0, 0, 0, 4, 0, 0],
                [0, 0, 0, 0, 4, 0],
                [0, 0, 0, 0, 0, 6],
            ],
            Self::TetragonalLow => [
                [1, 7, 8, 0, 0, 11],
                [7, 1, 8, 0, 0, -11],
                [8, 8, 3, 0, 0, 0],
                [0, 0, 0, 4, 0, 0],
                [0, 0, 0, 0, 4, 0],
                [11, -11, 0, 0, 0, 6],
            ],
            Self::Orthorhombic => [
                [1, 7, 8, 0, 0, 0],
                [7, 2, 12, 0, 0, 0],
                [8, 12, 3, 0, 0, 0],
                [0, 0, 0, 4, 0, 0],
                [0, 0, 0, 0, 5, 0],
                [0, 0, 0, 0, 0, 6],
            ],
            Self::Monoclinic => [
                [1, 7, 8, 0, 10, 0],
                [7, 2, 12, 0, 14, 0],
                [8, 12, 3, 0, 17, 0],
                [0, 0, 0, 4, 0, 20],
                [10, 14, 17, 0, 5, 0],
                [0, 0, 0, 20, 0, 6],
            ],
            Self::Triclinic => [
                [1, 7, 8, 9, 10, 11],
                [7, 2, 12, 13, 14, 15],
                [8, 12, 3, 16, 17, 18],
                [9, 13, 16, 4, 19, 20],
                [10, 14, 17, 19, 5, 21],
                [11, 15, 18, 20, 21, 6],
            ],
        }
    }

    /// Checks that `cij` follows this class's sparsity pattern to within `tol`.
    pub fn check(&self, cij: &Matrix6<f64>, tol: f64) -> Result<()> {
        let pattern = self.pattern();
        // first value seen for each independent constant
        let mut reference: [Option<f64>; 22] = [None; 22];

        for row in 0..6 {
            for col in 0..6 {
                let code = pattern[row][col];
                let value = cij[(row, col)];
                let consistent = if code == 0 {
                    value.approx_eq(0.0, tol)
                } else {
                    let sign = f64::from(code.signum());
                    let slot = &mut reference[code.unsigned_abs() as usize];
                    match *slot {
                        Some(first) => value.approx_eq(sign * first, tol),
                        None => {
                            *slot = Some(sign * value);
                            true
                        }
                    }
                };

                if !consistent {
                    return Err(ElasticError::SymmetryPattern {
                        symmetry: self.to_string(),
                        row: row + 1,
                        col: col + 1,
                    });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for CrystalSymmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cubic => "cubic",
            Self::TrigonalHigh => "trigonal_high",
            Self::TrigonalLow => "trigonal_low",
            Self::TetragonalHigh => "tetragonal_high",
            Self::TetragonalLow => "tetragonal_low",
            Self::Orthorhombic => "orthorhombic",
            Self::Monoclinic => "monoclinic",
            Self::Triclinic => "triclinic",
        };
        f.write_str(name)
    }
}

impl FromStr for CrystalSymmetry {
    type Err = ElasticError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cubic" => Ok(Self::Cubic),
            "trigonal_high" => Ok(Self::TrigonalHigh),
            "trigonal_low" => Ok(Self::TrigonalLow),
            "tetragonal_high" => Ok(Self::TetragonalHigh),
            "tetragonal_low" => Ok(Self::TetragonalLow),
            "orthorhombic" => Ok(Self::Orthorhombic),
            "monoclinic" => Ok(Self::Monoclinic),
            "triclinic" => Ok(Self::Triclinic),
            other => Err(ElasticError::UnknownSymmetry(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_matrix_passes_cubic_check() {
        let c = cubic(165.7, 63.9, 79.6);
        assert!(CrystalSymmetry::Cubic.check(&c, 1e-8).is_ok());
        assert!(CrystalSymmetry::Orthorhombic.check(&c, 1e-8).is_ok());
        assert!(CrystalSymmetry::Triclinic.check(&c, 1e-8).is_ok());
    }

    #[test]
    fn perturbed_matrix_fails_cubic_check() {
        let mut c = cubic(165.7, 63.9, 79.6);
        c[(1, 1)] += 5.0;
        match CrystalSymmetry::Cubic.check(&c, 1e-8) {
            Err(ElasticError::SymmetryPattern { row, col, .. }) => assert_eq!((row, col), (2, 2)),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn names_round_trip() {
        for name in ["cubic", "trigonal_low", "monoclinic"] {
            let symmetry: CrystalSymmetry = name.parse().unwrap();
            assert_eq!(symmetry.to_string(), name);
        }
        assert!("hexagonal".parse::<CrystalSymmetry>().is_err());
    }
}
