//! CSV loader for rental listings.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter. Values are
//! trimmed before parsing.
//!
//! | Column         | Required | Type    | Notes                          |
//! |----------------|----------|---------|--------------------------------|
//! | `address`      | yes      | string  | must not be blank              |
//! | `neighborhood` | yes      | string  | grouping key, case-sensitive   |
//! | `price`        | yes      | decimal | asking price, must be positive |
//! | `monthly_rent` | yes      | decimal | must not be negative           |
//! | `sq_meters`    | yes      | integer |                                |
//! | `bedrooms`     | yes      | integer |                                |
//! | `bathrooms`    | yes      | integer |                                |
//! | `source`       | yes      | string  | portal name, e.g. `Idealista`  |
//! | `image_url`    | no       | string  | leave the cell empty for none  |
//!
//! ```csv
//! address,neighborhood,price,monthly_rent,sq_meters,bedrooms,bathrooms,source,image_url
//! Carrer de Verdi 31,Gràcia,245000,1100,62,2,1,Idealista,
//! ```
use std::io::Read;
use std::path::Path;

use rental_core::{NewProperty, PropertyRepository, PropertyValidationError, RepositoryError};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading listing data.
#[derive(Debug, Error)]
pub enum PropertyLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    /// `row` is 1-based and does not count the header.
    #[error("invalid listing on row {row}: {reason}")]
    InvalidRow {
        row: usize,
        reason: PropertyValidationError,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for PropertyLoaderError {
    fn from(err: csv::Error) -> Self {
        PropertyLoaderError::CsvParse(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    address: String,
    neighborhood: String,
    price: Decimal,
    monthly_rent: Decimal,
    sq_meters: u32,
    bedrooms: u32,
    bathrooms: u32,
    source: String,
    image_url: Option<String>,
}

fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<NewProperty, PropertyLoaderError> {
    let property = NewProperty {
        address: row.address,
        neighborhood: row.neighborhood,
        price: row.price,
        monthly_rent: row.monthly_rent,
        sq_meters: row.sq_meters,
        bedrooms: row.bedrooms,
        bathrooms: row.bathrooms,
        source: row.source,
        image_url: row.image_url.filter(|url| !url.is_empty()),
    };

    property
        .validate()
        .map_err(|reason| PropertyLoaderError::InvalidRow {
            row: row_number,
            reason,
        })?;

    Ok(property)
}

/// Loader for listing data from CSV files.
///
/// Parsing and storing are separate steps so callers can inspect or filter
/// the parsed records (the refresh operation hands them to
/// [`SourceCatalog`](crate::SourceCatalog) instead of storing them directly).
pub struct PropertyLoader;

impl PropertyLoader {
    /// Parse and validate listings from any `Read` source. Rows come back in
    /// file order.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<NewProperty>, PropertyLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        csv_reader
            .deserialize::<CsvRow>()
            .enumerate()
            .map(|(idx, result)| convert_row(result?, idx + 1))
            .collect()
    }

    pub fn parse_str(input: &str) -> Result<Vec<NewProperty>, PropertyLoaderError> {
        Self::parse(input.as_bytes())
    }

    pub fn parse_file(path: &Path) -> Result<Vec<NewProperty>, PropertyLoaderError> {
        let file = std::fs::File::open(path).map_err(|source| PropertyLoaderError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let records = Self::parse(file)?;
        debug!(path = %path.display(), records = records.len(), "parsed listings");
        Ok(records)
    }

    /// Insert `records` into `repo` in order. Returns the number stored.
    ///
    /// Loading stops at the first repository error; listings inserted before
    /// it stay in the store.
    pub async fn load<R: PropertyRepository + ?Sized>(
        repo: &R,
        records: &[NewProperty],
    ) -> Result<usize, PropertyLoaderError> {
        let mut inserted = 0;

        for record in records {
            repo.add_property(record.clone()).await?;
            inserted += 1;
        }

        info!(inserted, "loaded listings");
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const HEADER: &str =
        "address,neighborhood,price,monthly_rent,sq_meters,bedrooms,bathrooms,source,image_url";

    fn csv(rows: &[&str]) -> String {
        let mut out = HEADER.to_string();
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_parse_single_row() {
        let input = csv(&["Carrer de Verdi 31,Gràcia,245000,1100,62,2,1,Idealista,"]);

        let records = PropertyLoader::parse_str(&input).expect("Failed to parse CSV");

        assert_eq!(
            records,
            vec![NewProperty {
                address: "Carrer de Verdi 31".to_string(),
                neighborhood: "Gràcia".to_string(),
                price: dec!(245000),
                monthly_rent: dec!(1100),
                sq_meters: 62,
                bedrooms: 2,
                bathrooms: 1,
                source: "Idealista".to_string(),
                image_url: None,
            }]
        );
    }

    #[test]
    fn test_parse_keeps_image_url_and_decimals() {
        let input = csv(&[
            "Carrer del Rec 22,Born,375000.50,1600.25,72,2,2,Fotocasa,https://images.example.com/rec-22.jpg",
        ]);

        let records = PropertyLoader::parse_str(&input).expect("Failed to parse CSV");

        assert_eq!(records[0].price, dec!(375000.50));
        assert_eq!(records[0].monthly_rent, dec!(1600.25));
        assert_eq!(
            records[0].image_url.as_deref(),
            Some("https://images.example.com/rec-22.jpg")
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let input = csv(&[" Carrer de Blai 14 , Poble-sec , 175000 , 925 ,50,2,1, Fotocasa ,"]);

        let records = PropertyLoader::parse_str(&input).expect("Failed to parse CSV");

        assert_eq!(records[0].address, "Carrer de Blai 14");
        assert_eq!(records[0].neighborhood, "Poble-sec");
        assert_eq!(records[0].source, "Fotocasa");
    }

    #[test]
    fn test_parse_image_url_column_is_optional() {
        let input = "address,neighborhood,price,monthly_rent,sq_meters,bedrooms,bathrooms,source\n\
                     Carrer del Clot 73,Clot,195000,980,64,3,1,Habitaclia";

        let records = PropertyLoader::parse_str(input).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].image_url, None);
    }

    #[test]
    fn test_parse_empty_csv() {
        let records = PropertyLoader::parse_str(HEADER).expect("Failed to parse CSV");

        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_missing_column() {
        let input = "address,neighborhood,price\nCarrer de Verdi 31,Gràcia,245000";

        let err = PropertyLoader::parse_str(input).expect_err("Should fail for missing column");

        let PropertyLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_bad_number() {
        let input = csv(&["Carrer de Verdi 31,Gràcia,245000,1100,sixty,2,1,Idealista,"]);

        let err = PropertyLoader::parse_str(&input).expect_err("Should fail for bad integer");

        assert!(matches!(err, PropertyLoaderError::CsvParse(_)), "got {err:?}");
    }

    #[test]
    fn test_parse_reports_invalid_row_number() {
        let input = csv(&[
            "Carrer de Verdi 31,Gràcia,245000,1100,62,2,1,Idealista,",
            "Carrer de Sants 155,Sants,185000,950,58,2,1,Idealista,",
            "Carrer del Rec 22,Born,0,1600,72,2,2,Fotocasa,",
        ]);

        let err = PropertyLoader::parse_str(&input).expect_err("Should reject zero price");

        match err {
            PropertyLoaderError::InvalidRow { row, reason } => {
                assert_eq!(row, 3);
                assert_eq!(reason, PropertyValidationError::NonPositivePrice(dec!(0)));
            }
            other => panic!("expected InvalidRow, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_blank_neighborhood() {
        let input = csv(&["Carrer de Verdi 31,  ,245000,1100,62,2,1,Idealista,"]);

        let err = PropertyLoader::parse_str(&input).expect_err("Should reject blank neighborhood");

        assert!(matches!(
            err,
            PropertyLoaderError::InvalidRow {
                row: 1,
                reason: PropertyValidationError::EmptyNeighborhood
            }
        ));
    }

    #[test]
    fn test_parse_file_missing() {
        let err = PropertyLoader::parse_file(Path::new("does/not/exist.csv"))
            .expect_err("Should fail for missing file");

        let PropertyLoaderError::Io { path, .. } = err else {
            panic!("Expected Io error, got: {:?}", err);
        };
        assert_eq!(path, "does/not/exist.csv");
    }
}
