use std::{fs, iter, path::Path};

use csv::{ReaderBuilder, Trim, Writer};
use log::debug;
use ndarray::{Array1, Array2, ArrayView2};
use solver::Trajectory;

use crate::{Result, SurrogateError};

/// Samples loaded from a text file, one sample per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    times: Option<Array1<f64>>,
    values: Array2<f64>,
}

impl Samples {
    /// The sampling times, if the file had a time column.
    pub fn times(&self) -> Option<&Array1<f64>> {
        self.times.as_ref()
    }

    /// The `(features, samples)` matrix.
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dim(&self) -> usize {
        self.values.nrows()
    }
}

/// Loads a file with one sample per line.
///
/// Fields may be separated by commas, tabs or runs of spaces, the separator is picked from the
/// first line. Lines starting with `#` are skipped.
///
/// # Arguments
/// * `path` - The file to read.
/// * `has_time_column` - Whether the first field of every line is the sampling time.
pub fn load_samples<P: AsRef<Path>>(path: P, has_time_column: bool) -> Result<Samples> {
    let path = path.as_ref();
    let bad = |msg: String| SurrogateError::BadData {
        path: path.to_path_buf(),
        msg,
    };

    let text = fs::read_to_string(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .delimiter(sniff_delimiter(&text))
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());

        let row = record
            .iter()
            .filter(|field| !field.is_empty())
            .map(|field| {
                field
                    .parse::<f64>()
                    .map_err(|_| bad(format!("line {line}: {field:?} is not a number")))
            })
            .collect::<Result<Vec<_>>>()?;

        if row.is_empty() {
            continue;
        }

        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(bad(format!(
                    "line {line} has {} fields, expected {}",
                    row.len(),
                    first.len()
                )));
            }
        }

        rows.push(row);
    }

    let Some(width) = rows.first().map(Vec::len) else {
        return Err(bad("no samples".to_string()));
    };

    let skip = usize::from(has_time_column);
    if width <= skip {
        return Err(bad("a time column but no features".to_string()));
    }

    let times = has_time_column.then(|| rows.iter().map(|row| row[0]).collect());
    let values = Array2::from_shape_fn((width - skip, rows.len()), |(i, j)| rows[j][i + skip]);

    debug!(path:? = path, features = values.nrows(), samples = values.ncols(); "loaded samples");
    Ok(Samples { times, values })
}

/// Writes a trajectory with one `t, x1, ..., xd` line per state.
///
/// The header line is commented out, so the file can be loaded back with `load_samples`.
pub fn write_trajectory<P: AsRef<Path>>(path: P, trajectory: &Trajectory) -> Result<()> {
    let mut writer = Writer::from_path(path)?;

    let header = (1..=trajectory.dim()).map(|i| format!("x{i}"));
    writer.write_record(iter::once("# t".to_string()).chain(header))?;

    for (t, state) in trajectory.times().iter().zip(trajectory.states().columns()) {
        let fields = iter::once(*t).chain(state.iter().copied());
        writer.write_record(fields.map(|v| v.to_string()))?;
    }

    writer.flush()?;
    Ok(())
}

fn sniff_delimiter(text: &str) -> u8 {
    let first = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .unwrap_or_default();

    if first.contains(',') {
        b','
    } else if first.contains('\t') {
        b'\t'
    } else {
        b' '
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use solver::Rk4;

    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn whitespace_file_with_time_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "data.txt",
            "0.00   1.0  -0.5\n0.01   0.9  -0.4\n\n0.02   0.8  -0.3\n",
        );

        let samples = load_samples(&path, true).unwrap();

        assert_eq!(samples.times().unwrap(), array![0., 0.01, 0.02]);
        assert_eq!(samples.values(), array![[1.0, 0.9, 0.8], [-0.5, -0.4, -0.3]]);
        assert_eq!((samples.dim(), samples.len()), (2, 3));
    }

    #[test]
    fn comma_file_without_time_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "derivative.csv", "# dx, dy\n1, 2\n3, 4\n");

        let samples = load_samples(&path, false).unwrap();

        assert!(samples.times().is_none());
        assert_eq!(samples.into_values(), array![[1., 3.], [2., 4.]]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "data.csv", "1,2\n3\n");

        assert!(matches!(
            load_samples(&path, false),
            Err(SurrogateError::BadData { .. })
        ));
    }

    #[test]
    fn non_numbers_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "data.csv", "1,2\n3,abc\n");

        let err = load_samples(&path, false).unwrap_err();
        assert!(err.to_string().contains("abc"), "{err}");
    }

    #[test]
    fn empty_and_time_only_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let empty = write(&dir, "empty.txt", "\n\n");
        assert!(load_samples(&empty, false).is_err());

        let times = write(&dir, "times.txt", "0.0\n0.1\n");
        assert!(load_samples(&times, true).is_err());
        assert!(load_samples(dir.path().join("missing.txt"), false).is_err());
    }

    #[test]
    fn trajectory_is_written_with_its_times() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trajectory.csv");
        let trajectory = Rk4::new(0.5)
            .unwrap()
            .integrate(|_| array![[0.], [0.]], array![1., 2.].view(), 3)
            .unwrap();

        write_trajectory(&path, &trajectory).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "# t,x1,x2\n0,1,2\n0.5,1,2\n1,1,2\n");

        let back = load_samples(&path, true).unwrap();
        assert_eq!(back.times().unwrap(), trajectory.times());
        assert_eq!(back.values(), trajectory.states());
    }
}
