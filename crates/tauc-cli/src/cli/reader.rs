use std::fs;
use std::path::Path;
use tauc_core::domain::{Spectrum, TaucError, TaucResult};

pub(super) fn read_spectrum(path: &Path) -> TaucResult<Spectrum> {
    let source = fs::read_to_string(path).map_err(|source| {
        TaucError::io_system(
            "IO.SPECTRUM_READ",
            format!("failed to read spectrum '{}': {}", path.display(), source),
        )
    })?;
    parse_spectrum(&source, &path.display().to_string())
}

/// Two numeric columns separated by commas and/or whitespace. Blank lines and
/// `#` comments are skipped; the first data line may be a header. Files stored
/// in descending wavelength order are reversed.
pub(super) fn parse_spectrum(source: &str, origin: &str) -> TaucResult<Spectrum> {
    let mut wavelength_nm = Vec::new();
    let mut absorbance = Vec::new();
    let mut seen_content = false;

    for (line_index, raw_line) in source.lines().enumerate() {
        let line_number = line_index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields = split_fields(line);
        let first_content = !seen_content;
        seen_content = true;

        let parsed: Result<Vec<f64>, &str> = fields
            .iter()
            .map(|field| field.parse::<f64>().map_err(|_| *field))
            .collect();
        let values = match parsed {
            Ok(values) => values,
            Err(_) if first_content => continue,
            Err(field) => {
                return Err(TaucError::input_validation(
                    "INPUT.SPECTRUM_ROW",
                    format!(
                        "{}:{}: could not parse '{}' as a number",
                        origin, line_number, field
                    ),
                ));
            }
        };

        if values.len() != 2 {
            return Err(TaucError::input_validation(
                "INPUT.SPECTRUM_ROW",
                format!(
                    "{}:{}: expected 2 columns (wavelength, absorbance), found {}",
                    origin,
                    line_number,
                    values.len()
                ),
            ));
        }
        wavelength_nm.push(values[0]);
        absorbance.push(values[1]);
    }

    if let (Some(first), Some(last)) = (wavelength_nm.first(), wavelength_nm.last()) {
        if first > last {
            wavelength_nm.reverse();
            absorbance.reverse();
        }
    }

    Spectrum::new(wavelength_nm, absorbance)
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|field| !field.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_spectrum, read_spectrum};
    use std::fs;
    use tauc_core::domain::TaucError;
    use tempfile::TempDir;

    #[test]
    fn comma_and_whitespace_delimiters_are_accepted() {
        let source = "Wavelength (nm),Abs\n300,0.52\n301\t0.51\n302  ,  0.50\n";
        let spectrum = parse_spectrum(source, "mixed.txt").expect("spectrum should parse");
        assert_eq!(spectrum.wavelength_nm(), &[300.0, 301.0, 302.0]);
        assert_eq!(spectrum.absorbance(), &[0.52, 0.51, 0.50]);
    }

    #[test]
    fn headerless_files_and_comments_are_accepted() {
        let source = "# exported by spectrometer\n\n250.0 1.2e-1\n251.0 1.1e-1\n";
        let spectrum = parse_spectrum(source, "plain.txt").expect("spectrum should parse");
        assert_eq!(spectrum.len(), 2);
        assert_eq!(spectrum.absorbance()[0], 0.12);
    }

    #[test]
    fn descending_wavelengths_are_reversed() {
        let source = "nm abs\n702 0.1\n701 0.2\n700 0.3\n";
        let spectrum = parse_spectrum(source, "descending.txt").expect("spectrum should parse");
        assert_eq!(spectrum.wavelength_nm(), &[700.0, 701.0, 702.0]);
        assert_eq!(spectrum.absorbance(), &[0.3, 0.2, 0.1]);
    }

    #[test]
    fn malformed_rows_report_line_numbers() {
        let error = parse_spectrum("nm,abs\n300,0.1\n301,oops\n", "bad.txt")
            .expect_err("non-numeric value should fail");
        assert_eq!(error.placeholder(), "INPUT.SPECTRUM_ROW");
        assert!(error.to_string().contains("bad.txt:3"), "{error}");

        let extra = parse_spectrum("300,0.1,7\n", "extra.txt").expect_err("three columns");
        assert!(extra.to_string().contains("found 3"), "{extra}");
    }

    #[test]
    fn unordered_wavelengths_are_rejected_by_spectrum_validation() {
        let error = parse_spectrum("300 0.1\n310 0.2\n305 0.3\n", "unordered.txt")
            .expect_err("non-monotonic wavelengths");
        assert!(matches!(error, TaucError::Domain { index: 2, .. }));
    }

    #[test]
    fn header_only_file_is_empty_spectrum() {
        let error = parse_spectrum("Wavelength,Absorbance\n", "empty.txt").expect_err("empty");
        assert_eq!(error.placeholder(), "INPUT.SPECTRUM_SHAPE");
    }

    #[test]
    fn missing_file_is_io_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let error = read_spectrum(&temp.path().join("missing.txt")).expect_err("missing file");
        assert_eq!(error.placeholder(), "IO.SPECTRUM_READ");
        assert_eq!(error.exit_code(), 3);

        let path = temp.path().join("sample.txt");
        fs::write(&path, "300,0.4\r\n301,0.3\r\n").expect("sample should be written");
        assert_eq!(read_spectrum(&path).expect("crlf file").len(), 2);
    }
}
