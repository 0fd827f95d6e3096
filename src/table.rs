use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::ScrapeError;

/// CSV header shared by raw and normalized exports.
pub const CSV_HEADER: [&str; 4] = ["titre", "prix", "adresse", "image"];

/// One listing card as scraped. `price_text` is kept exactly as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    #[serde(rename = "titre", default)]
    pub title: String,
    #[serde(rename = "prix", default)]
    pub price_text: String,
    #[serde(rename = "adresse", default)]
    pub location: String,
    #[serde(rename = "image", default)]
    pub image_url: String,
}

/// Ordered, append-only accumulation of one scrape run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingTable {
    rows: Vec<RawListing>,
}

impl ListingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RawListing> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[RawListing] {
        &self.rows
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ScrapeError> {
        write_records(writer, &self.rows)
    }

    pub fn read_csv<R: Read>(reader: R) -> Result<Self, ScrapeError> {
        Ok(Self {
            rows: read_records(reader)?,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ScrapeError> {
        self.write_csv(File::create(path)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScrapeError> {
        Self::read_csv(File::open(path)?)
    }
}

impl Extend<RawListing> for ListingTable {
    fn extend<I: IntoIterator<Item = RawListing>>(&mut self, iter: I) {
        self.rows.extend(iter);
    }
}

impl FromIterator<RawListing> for ListingTable {
    fn from_iter<I: IntoIterator<Item = RawListing>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ListingTable {
    type Item = &'a RawListing;
    type IntoIter = std::slice::Iter<'a, RawListing>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Serialize any row type to CSV. The header is always written, even for
/// zero rows, so an empty export still has the expected columns.
pub fn write_records<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), ScrapeError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_records<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>, ScrapeError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

pub fn save_records<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), ScrapeError> {
    write_records(File::create(path)?, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::{normalize, normalize_default};

    fn listing(title: &str, price: &str) -> RawListing {
        RawListing {
            title: title.to_string(),
            price_text: price.to_string(),
            location: "Dakar".to_string(),
            image_url: format!("https://img.example/{title}.jpg"),
        }
    }

    #[test]
    fn csv_uses_site_column_names() {
        let table: ListingTable = vec![listing("Chemise", "15 000 CFA")].into_iter().collect();
        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("titre,prix,adresse,image"));
        assert_eq!(
            lines.next(),
            Some("Chemise,15 000 CFA,Dakar,https://img.example/Chemise.jpg")
        );
    }

    #[test]
    fn empty_table_still_has_header() {
        let mut buf = Vec::new();
        ListingTable::new().write_csv(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "titre,prix,adresse,image\n");
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        let table: ListingTable = vec![
            listing("Chemise, manches longues", "15 000 CFA"),
            listing("Jean", "Prix sur demande"),
        ]
        .into_iter()
        .collect();

        table.save(&path).unwrap();
        let loaded = ListingTable::load(&path).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn load_ignores_extra_columns_and_tolerates_blanks() {
        let csv = "Unnamed: 0,titre,prix,adresse,image\n0,Veste,20000,,http://i/1.jpg\n";
        let table = ListingTable::read_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!(row.title, "Veste");
        assert_eq!(row.price_text, "20000");
        assert_eq!(row.location, "");
    }

    #[test]
    fn normalized_export_reloads_to_same_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        let raw: ListingTable = vec![
            listing("A", "15 000 CFA"),
            listing("B", "Prix sur demande"),
            listing("C", "1250.5 CFA"),
        ]
        .into_iter()
        .collect();
        let rows = normalize(&raw, 1_000_000.0);

        save_records(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("titre,prix,adresse,image"));
        assert_eq!(lines.next(), Some("A,15000.0,Dakar,https://img.example/A.jpg"));
        assert_eq!(lines.next(), Some("C,1250.5,Dakar,https://img.example/C.jpg"));
        assert_eq!(lines.next(), None);

        let reloaded = ListingTable::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(normalize_default(&reloaded), rows);
    }
}
