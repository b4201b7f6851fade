use std::fmt;

use rayon::prelude::*;

use super::{
    cluster::{self, CLUSTER_COUNT, PATTERN_MODULES},
    reed_solomon, Codeword, EcLevel, SymbolError, MAX_COLUMNS, MAX_ROWS, MODULUS,
};

/// Start pattern run lengths, 17 modules.
pub const START_PATTERN: [u8; 8] = [8, 1, 1, 1, 1, 1, 1, 3];

/// Stop pattern run lengths, 18 modules.
pub const STOP_PATTERN: [u8; 9] = [7, 1, 1, 3, 1, 1, 1, 2, 1];

pub const START_MODULES: usize = 17;

pub const STOP_MODULES: usize = 18;

/// Fills the unused positions of the last row.
pub const PAD_CODEWORD: Codeword = 900;

/// Grid of bar (`1`) and space (`0`) modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMatrix {
    width: usize,
    height: usize,
    columns: usize,
    ec_level: EcLevel,
    codewords: Vec<Codeword>,
    modules: Vec<u8>,
}

impl SymbolMatrix {
    /// Modules per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Data columns per row, row indicators excluded.
    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn ec_level(&self) -> EcLevel {
        self.ec_level
    }

    /// Data and error correction codewords, without padding.
    pub fn codewords(&self) -> &[Codeword] {
        &self.codewords
    }

    pub fn modules(&self) -> &[u8] {
        &self.modules
    }

    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y < self.height {
            Some(&self.modules[y * self.width..(y + 1) * self.width])
        } else {
            None
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.modules.chunks_exact(self.width)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width {
            self.row(y).map(|row| row[x])
        } else {
            None
        }
    }
}

impl fmt::Display for SymbolMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.rows() {
            for &m in row {
                f.write_str(if m == 1 { "█" } else { " " })?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Modules per row for the given number of data columns.
pub fn row_width(columns: usize) -> usize {
    START_MODULES + (columns + 2) * PATTERN_MODULES + STOP_MODULES
}

/// Left and right row indicator codewords.
///
/// Together the three clusters carry the row count, the column count and
/// the error correction level.
pub fn row_indicators(
    row: usize,
    rows: usize,
    columns: usize,
    ec_level: EcLevel,
) -> (Codeword, Codeword) {
    let base = (row / 3) * 30;
    let rows_value = (rows - 1) / 3;
    let level_value = ec_level.get() as usize * 3 + (rows - 1) % 3;
    let columns_value = columns - 1;

    let (left, right) = match row % CLUSTER_COUNT {
        0 => (rows_value, columns_value),
        1 => (level_value, rows_value),
        _ => (columns_value, level_value),
    };

    ((base + left) as Codeword, (base + right) as Codeword)
}

/// Appends error correction to `data` and lays the codewords out in rows.
pub fn assemble(
    data: &[Codeword],
    ec_level: EcLevel,
    max_columns: u8,
) -> Result<SymbolMatrix, SymbolError> {
    if !(1..=MAX_COLUMNS).contains(&max_columns) {
        return Err(SymbolError::InvalidColumns(max_columns));
    }

    if let Some((index, &value)) = data.iter().enumerate().find(|(_, c)| **c >= MODULUS) {
        return Err(SymbolError::InvalidCodeword { index, value });
    }

    let mut codewords = data.to_vec();
    codewords.extend(reed_solomon::error_correction(data, ec_level));

    let columns = codewords.len().clamp(1, max_columns as usize);
    let rows = codewords.len().div_ceil(columns);
    if rows > MAX_ROWS {
        return Err(SymbolError::TooManyRows {
            rows,
            max: MAX_ROWS,
        });
    }

    let width = row_width(columns);
    tracing::debug!(
        codewords = codewords.len(),
        rows,
        columns,
        ec_level = ec_level.get(),
        "assembling symbol"
    );

    let modules = (0..rows)
        .into_par_iter()
        .map(|y| {
            let start = (y * columns).min(codewords.len());
            let end = ((y + 1) * columns).min(codewords.len());
            render_row(y, rows, columns, ec_level, &codewords[start..end])
        })
        .collect::<Vec<Vec<u8>>>()
        .concat();

    Ok(SymbolMatrix {
        width,
        height: rows,
        columns,
        ec_level,
        codewords,
        modules,
    })
}

fn render_row(
    y: usize,
    rows: usize,
    columns: usize,
    ec_level: EcLevel,
    codewords: &[Codeword],
) -> Vec<u8> {
    let cluster = y % CLUSTER_COUNT;
    let (left, right) = row_indicators(y, rows, columns, ec_level);
    let padding = columns - codewords.len();

    let mut row = Vec::with_capacity(row_width(columns));
    cluster::push_modules(&mut row, &START_PATTERN);
    cluster::push_modules(&mut row, cluster::pattern(left, cluster));
    for &c in codewords
        .iter()
        .chain(std::iter::repeat(&PAD_CODEWORD).take(padding))
    {
        cluster::push_modules(&mut row, cluster::pattern(c, cluster));
    }
    cluster::push_modules(&mut row, cluster::pattern(right, cluster));
    cluster::push_modules(&mut row, &STOP_PATTERN);

    tracing::trace!(row = y, cluster, left, right, padding, "rendered row");
    row
}
