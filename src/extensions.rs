use crate::errors::{ElasticError, Result};

/// Positional argument access for whitespace split command lines.
pub trait ArgsExt {
    fn get_required(&self, index: usize, line: usize) -> Result<&str>;
    fn parse_usize_at(&self, index: usize, line: usize) -> Result<usize>;
    fn parse_float_at(&self, index: usize, line: usize) -> Result<f64>;
    fn parse_floats_from(&self, start: usize, count: usize, line: usize) -> Result<Vec<f64>>;
}

impl ArgsExt for [&str] {
    fn get_required(&self, index: usize, line: usize) -> Result<&str> {
        self.get(index)
            .copied()
            .ok_or(ElasticError::MissingArgument { line })
    }

    fn parse_usize_at(&self, index: usize, line: usize) -> Result<usize> {
        let arg = self.get_required(index, line)?;
        arg.parse().map_err(|e| ElasticError::IntParseError {
            string: arg.to_string(),
            source: e,
        })
    }

    fn parse_float_at(&self, index: usize, line: usize) -> Result<f64> {
        let arg = self.get_required(index, line)?;
        arg.parse().map_err(|e| ElasticError::FloatParseError {
            string: arg.to_string(),
            source: e,
        })
    }

    fn parse_floats_from(&self, start: usize, count: usize, line: usize) -> Result<Vec<f64>> {
        (start..start + count)
            .map(|index| self.parse_float_at(index, line))
            .collect()
    }
}
