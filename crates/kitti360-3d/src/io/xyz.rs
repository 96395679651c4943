use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Write points as plain text, one `x y z` row per line in scientific notation.
///
/// The output can be read back by any `xyz` point cloud reader.
pub fn write_xyz_txt(path: impl AsRef<Path>, points: &[[f64; 3]]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for p in points {
        writeln!(writer, "{:.18e} {:.18e} {:.18e}", p[0], p[1], p[2])?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_xyz_txt() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("scene.txt");
        write_xyz_txt(&path, &[[1.0, -2.5, 0.0], [0.125, 3.0, 4.0]])?;

        let text = std::fs::read_to_string(&path)?;
        let rows = text
            .lines()
            .map(|l| {
                l.split_whitespace()
                    .map(|v| v.parse::<f64>())
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(rows, vec![vec![1.0, -2.5, 0.0], vec![0.125, 3.0, 4.0]]);
        Ok(())
    }
}
