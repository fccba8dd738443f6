use anyhow::{Context, Result};
use dataset::{LotDataset, RawTable};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Scans `folder` for `Sale_<n>.csv` catalogue files and ingests them into a
/// normalized dataset.
///
/// Temp and hidden files are ignored; an unreadable sale file is skipped
/// with a warning rather than failing the whole load, since operators drop
/// new files into the folder by hand.
pub fn load_sales_folder(folder: &str) -> Result<LotDataset> {
    let dir = fs::read_dir(folder).with_context(|| {
        format!("Folder '{folder}' not found. Create it and add sale files like Sale_42.csv")
    })?;

    let mut entries: Vec<_> = dir.filter_map(|entry| entry.ok()).collect();
    entries.sort_by_key(|entry| entry.file_name());

    let mut tables = Vec::new();
    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('~') || name.starts_with('.') {
            continue;
        }
        let Some(sale_no) = sale_number(&name) else {
            continue;
        };
        match read_sale_csv(&entry.path()) {
            Ok(table) => {
                info!(file = %name, sale_no, rows = table.rows.len(), "loaded sale file");
                tables.push((sale_no, table));
            }
            Err(error) => {
                warn!(file = %name, %error, "could not read sale file, skipping");
            }
        }
    }

    let dataset = LotDataset::from_sales(tables)?;
    Ok(dataset)
}

/// Extracts the sale number from a file name like `Sale_42.csv` (the marker
/// may sit anywhere in the name).
fn sale_number(file_name: &str) -> Option<u32> {
    if !file_name.ends_with(".csv") {
        return None;
    }
    let start = file_name.find("Sale_")? + "Sale_".len();
    let digits: String = file_name[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn read_sale_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("reading headers of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("reading a row of {}", path.display()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_numbers_parse_from_file_names() {
        assert_eq!(sale_number("Sale_42.csv"), Some(42));
        assert_eq!(sale_number("2026_Sale_7.csv"), Some(7));
        assert_eq!(sale_number("Sale_42.xlsx"), None);
        assert_eq!(sale_number("catalogue.csv"), None);
        assert_eq!(sale_number("Sale_.csv"), None);
    }

    #[test]
    fn loads_sale_files_and_skips_noise() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Sale_41.csv"),
            "Broker,Grade,Sub Elevation,Total Weight,Price,Status\n\
             MPB,BP1,LOW GROWN,100,500,sold\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("Sale_42.csv"),
            "Broker,Grade,Sub Elevation,Total Weight,Price,Status\n\
             FW,BOPF,HIGH GROWN,50,,unsold\n",
        )
        .unwrap();
        fs::write(dir.path().join("~Sale_43.csv"), "junk").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a sale").unwrap();

        let dataset = load_sales_folder(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.sale_range(), Some((41, 42)));
    }

    #[test]
    fn missing_folder_is_a_helpful_error() {
        let error = load_sales_folder("no-such-folder").unwrap_err();
        assert!(error.to_string().contains("no-such-folder"));
    }
}
