use std::{
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use adlift_analysis::observation::ObservationTable;
use anyhow::Context;

/// Destination of a command's data output, stdout when no path is given.
#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Output::Stdout {
                writer: io::stdout().lock(),
            });
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    /// Writes `value` as pretty-printed JSON followed by a newline.
    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, value)
            .with_context(|| format!("Failed to write JSON to {self}"))?;
        writeln!(self).with_context(|| format!("Failed to write JSON to {self}"))?;
        self.finish()
    }

    /// Writes `table` as CSV with a header row.
    pub fn write_csv(&mut self, table: &ObservationTable) -> anyhow::Result<()> {
        table
            .write_csv(&mut *self)
            .with_context(|| format!("Failed to write CSV to {self}"))?;
        self.finish()
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.flush()
            .with_context(|| format!("Failed to flush output to {self}"))
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout { .. } => f.write_str("stdout"),
            Output::File { path, .. } => write!(f, "{}", path.display()),
        }
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_observations_file<P>(path: P) -> anyhow::Result<ObservationTable>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open experiment data file: {}", path.display()))?;
    let table = ObservationTable::from_csv_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse experiment data file: {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = table.len(), "loaded experiment data");
    Ok(table)
}

/// Formats an integer with `,` between groups of three digits.
pub fn thousands(value: usize) -> String {
    group_digits(&value.to_string())
}

/// Formats an amount as `$1,234.56`.
///
/// Negative amounts keep the sign after the currency symbol (`$-12.00`);
/// non-finite amounts print as-is (`$NaN`, `$inf`).
pub fn currency(value: f64) -> String {
    if !value.is_finite() {
        return format!("${value}");
    }
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));
    let sign = if value < 0.0 && formatted != "0.00" {
        "-"
    } else {
        ""
    };
    format!("${sign}{}.{frac_part}", group_digits(int_part))
}

fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats a number in scientific notation with a signed two-digit exponent
/// (`5.07e-01`).
///
/// Exponents beyond two digits keep all their digits; non-finite values print
/// as `nan`, `inf` and `-inf`.
pub fn scientific(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let formatted = format!("{value:.precision$e}");
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        return formatted;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return formatted;
    };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
}

/// Formats an optional rate as `1.234%`, or `-` when missing.
pub fn percent_or_dash(rate_percent: Option<f64>) -> String {
    rate_percent.map_or_else(|| "-".to_string(), |rate| format!("{rate:.3}%"))
}
