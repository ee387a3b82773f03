//! Image-number ranges mapped to taxa.
//!
//! Digitization sessions photograph drawers in order, so camera image
//! numbers can be tied back to the taxon in the drawer. A range table is a
//! CSV with (at least) these columns:
//!
//! | Column            | Meaning                                  |
//! |-------------------|------------------------------------------|
//! | `ImageStart`      | first image number of the range          |
//! | `ImageStop`       | last image number of the range, included |
//! | `genus`           | genus for every image in the range       |
//! | `specificEpithet` | species epithet for every image          |
//!
//! Start and stop cells may contain non-digit characters (`IMG_0100`); only
//! the digits count.

use crate::error::{ErrorKind, Result};
use dmread_extract::digits_of;
use dmread_storage::BackendHandle;
use exn::ResultExt;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::instrument;

/// An inclusive image-number range and its taxon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeBound {
    pub lower: u64,
    pub upper: u64,
    pub taxon: Taxon,
}
impl RangeBound {
    pub fn contains(&self, number: u64) -> bool {
        (self.lower..=self.upper).contains(&number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxon {
    pub genus: String,
    pub specific_epithet: String,
}
impl Taxon {
    /// `_<genus>_<epithet>` with whitespace removed from both parts, ready to
    /// append to a file name.
    pub fn name_suffix(&self) -> String {
        let squash = |s: &str| s.split_whitespace().collect::<String>();
        format!("_{}_{}", squash(&self.genus), squash(&self.specific_epithet))
    }
}

#[derive(Deserialize)]
struct Row {
    #[serde(rename = "ImageStart")]
    start: String,
    #[serde(rename = "ImageStop")]
    stop: String,
    genus: String,
    #[serde(rename = "specificEpithet")]
    specific_epithet: String,
}

/// Ordered range bounds. Lookups are first-match in table order, so
/// overlapping ranges resolve to whichever row came first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeTable {
    bounds: Vec<RangeBound>,
}
impl RangeTable {
    pub fn new(bounds: Vec<RangeBound>) -> Self {
        Self { bounds }
    }

    /// Parses a range table from CSV. Extra columns are ignored.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut bounds = Vec::new();
        for (index, row) in csv.deserialize::<Row>().enumerate() {
            let row = row.or_raise(|| ErrorKind::RangeTable)?;
            let number = index + 1;
            let lower = parse_cell(number, "ImageStart", &row.start)?;
            let upper = parse_cell(number, "ImageStop", &row.stop)?;
            if lower > upper {
                exn::bail!(ErrorKind::MalformedRangeRow {
                    row: number,
                    column: "ImageStop",
                    value: row.stop,
                });
            }
            let taxon = Taxon { genus: row.genus, specific_epithet: row.specific_epithet };
            bounds.push(RangeBound { lower, upper, taxon });
        }
        Ok(Self { bounds })
    }

    /// Reads and parses a range table through a storage backend.
    #[instrument(skip(storage, path), fields(path = %path.display()))]
    pub async fn load(storage: &BackendHandle, path: &Path) -> Result<Self> {
        let bytes = storage.read(path).await.or_raise(|| ErrorKind::RangeTable)?;
        let table = Self::from_reader(bytes.as_slice())?;
        tracing::info!(bounds = table.len(), "Loaded range table");
        Ok(table)
    }

    /// The taxon of the first bound containing `number`.
    pub fn lookup(&self, number: u64) -> Option<&Taxon> {
        self.bounds.iter().find(|b| b.contains(number)).map(|b| &b.taxon)
    }

    pub fn contains(&self, number: u64) -> bool {
        self.lookup(number).is_some()
    }

    pub fn bounds(&self) -> &[RangeBound] {
        &self.bounds
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

fn parse_cell(row: usize, column: &'static str, value: &str) -> Result<u64> {
    match digits_of(value) {
        Some(n) => Ok(n),
        None => exn::bail!(ErrorKind::MalformedRangeRow { row, column, value: value.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmread_storage::backend::{MockBackend, StorageBackend};
    use rstest::rstest;
    use std::sync::Arc;

    const TABLE: &str = "\
ImageStart,ImageStop,genus,specificEpithet,notes
IMG_1000,IMG_1999,Genus A,species a,drawer 1
1500,2500,Overlap,ignored,
3000,3000,Single,image,
";

    fn table() -> RangeTable {
        RangeTable::from_reader(TABLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_from_reader() {
        let table = table();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.bounds()[0],
            RangeBound {
                lower: 1000,
                upper: 1999,
                taxon: Taxon { genus: "Genus A".to_string(), specific_epithet: "species a".to_string() },
            }
        );
    }

    #[rstest]
    #[case::below(999, None)]
    #[case::lower_edge(1000, Some("Genus A"))]
    #[case::overlap_first_wins(1500, Some("Genus A"))]
    #[case::upper_edge(1999, Some("Genus A"))]
    #[case::second_range(2000, Some("Overlap"))]
    #[case::gap(2501, None)]
    #[case::single(3000, Some("Single"))]
    fn test_lookup(#[case] number: u64, #[case] genus: Option<&str>) {
        let table = table();
        assert_eq!(table.lookup(number).map(|t| t.genus.as_str()), genus);
        assert_eq!(table.contains(number), genus.is_some());
    }

    #[test]
    fn test_name_suffix_squashes_whitespace() {
        let table = table();
        let taxon = &table.bounds()[0].taxon;
        assert_eq!(taxon.name_suffix(), "_GenusA_speciesa");
    }

    #[rstest]
    #[case::start_without_digits("start,10,G,s", 1, "ImageStart")]
    #[case::stop_without_digits("1,stop,G,s", 1, "ImageStop")]
    #[case::reversed("20,10,G,s", 1, "ImageStop")]
    fn test_malformed_row(#[case] row: &str, #[case] expected_row: usize, #[case] expected_column: &str) {
        let csv = format!("ImageStart,ImageStop,genus,specificEpithet\n{row}\n");
        let err = RangeTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            &*err,
            ErrorKind::MalformedRangeRow { row, column, .. } if *row == expected_row && *column == expected_column
        ));
    }

    #[test]
    fn test_missing_column() {
        let err = RangeTable::from_reader("ImageStart,ImageStop,genus\n1,2,G\n".as_bytes()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::RangeTable));
    }

    #[tokio::test]
    async fn test_load_through_storage() {
        let mock = MockBackend::default();
        mock.write_new(Path::new("/ranges.csv"), TABLE.as_bytes()).await.unwrap();
        let storage: BackendHandle = Arc::new(mock);
        let table = RangeTable::load(&storage, Path::new("/ranges.csv")).await.unwrap();
        assert_eq!(table.len(), 3);
        let err = RangeTable::load(&storage, Path::new("/missing.csv")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::RangeTable));
    }
}
