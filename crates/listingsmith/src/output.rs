use listingsmith_common::{ListingSmithError, Result};
use listingsmith_eval::EvaluationReport;
use listingsmith_listing::{parse_listing, PropertyListing};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Read and validate the input listing file
pub fn read_input(path: &Path) -> Result<PropertyListing> {
    if !path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("input file not found: {}", path.display()),
        )
        .into());
    }
    if !path.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("input path is not a file: {}", path.display()),
        )
        .into());
    }

    let text = fs::read_to_string(path)?;
    let listing = parse_listing(&text)?;
    debug!("Input listing loaded from {}", path.display());

    Ok(listing)
}

/// Write the generated HTML to a file, or to stdout when no path is given
pub fn write_output(path: Option<&Path>, html: &str) -> Result<()> {
    match path {
        Some(path) => {
            write_atomic(path, html)?;
            info!("Output written to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            if !html.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Write the evaluation report as pretty JSON
pub fn write_report(path: &Path, report: &EvaluationReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    write_atomic(path, &json)?;
    info!("Evaluation report written to {}", path.display());

    Ok(())
}

/// Atomic file write (write to temp file, then rename)
pub fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let tmp_path = temp_path(path)?;

    // Write to temp file
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    drop(file);

    // Atomic rename
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(())
}

/// Sibling temp file: `listing.html` -> `listing.html.tmp`
fn temp_path(path: &Path) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        ListingSmithError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("output path has no file name: {}", path.display()),
        ))
    })?;

    let mut tmp_name = name.to_os_string();
    tmp_name.push(".tmp");
    Ok(path.with_file_name(tmp_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listing.html");

        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!dir.path().join("listing.html.tmp").exists());
    }

    #[test]
    fn test_write_atomic_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("listing.html");

        assert_matches!(write_atomic(&path, "x"), Err(ListingSmithError::Io(_)));
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(
            temp_path(Path::new("out/listing.html")).unwrap(),
            PathBuf::from("out/listing.html.tmp")
        );
        assert!(temp_path(Path::new("/")).is_err());
    }

    #[test]
    fn test_read_input_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = read_input(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(missing.exit_code(), 8);
        assert!(missing.to_string().contains("not found"));

        assert_matches!(read_input(dir.path()), Err(ListingSmithError::Io(_)));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert_eq!(read_input(&bad).unwrap_err().exit_code(), 2);

        let invalid = dir.path().join("invalid.json");
        fs::write(&invalid, r#"{"location": {}, "features": {}, "price": 1}"#).unwrap();
        assert_matches!(
            read_input(&invalid),
            Err(ListingSmithError::Validation { key, .. }) if key == "language"
        );
    }
}
