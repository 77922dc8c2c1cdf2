use crate::error::{MatchError, Result};

/// Customer key column
pub const CUSTOMER_KEY_COLUMN: &str = "KundenNr";

/// Raw query column
pub const SEARCH_STRING_COLUMN: &str = "SearchString";

/// Scraped place name column
pub const TITLE_COLUMN: &str = "title";

/// Scraped street column
pub const STREET_COLUMN: &str = "street";

/// Columns every input table must carry
pub const REQUIRED_COLUMNS: [&str; 4] = [
    CUSTOMER_KEY_COLUMN,
    SEARCH_STRING_COLUMN,
    TITLE_COLUMN,
    STREET_COLUMN,
];

/// One scraped result row.
///
/// `fields` holds the complete original row in input column order and is
/// what the output partitions carry; the named fields are views used for
/// grouping and scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    /// Zero-based data row index in the source table
    pub row: usize,

    /// Customer key (`KundenNr`)
    pub customer_key: String,

    /// Raw query text (`SearchString`)
    pub search_string: String,

    /// Place name (`title`)
    pub title: String,

    /// Street (`street`)
    pub street: String,

    /// Full original row
    pub fields: Vec<String>,
}

impl CandidateRecord {
    /// Create a record whose row consists of exactly the required columns
    pub fn new(
        row: usize,
        customer_key: impl Into<String>,
        search_string: impl Into<String>,
        title: impl Into<String>,
        street: impl Into<String>,
    ) -> Self {
        let customer_key = customer_key.into();
        let search_string = search_string.into();
        let title = title.into();
        let street = street.into();
        let fields = vec![
            customer_key.clone(),
            search_string.clone(),
            title.clone(),
            street.clone(),
        ];

        Self {
            row,
            customer_key,
            search_string,
            title,
            street,
            fields,
        }
    }

    /// Whether the record can be grouped at all
    pub fn has_customer_key(&self) -> bool {
        !self.customer_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    customer_key: usize,
    search_string: usize,
    title: usize,
    street: usize,
}

impl ColumnIndex {
    fn resolve(source_name: &str, headers: &[String]) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| {
                    MatchError::input_format(
                        source_name,
                        format!("required column '{}' not found", name),
                    )
                })
        };

        Ok(Self {
            customer_key: find(CUSTOMER_KEY_COLUMN)?,
            search_string: find(SEARCH_STRING_COLUMN)?,
            title: find(TITLE_COLUMN)?,
            street: find(STREET_COLUMN)?,
        })
    }
}

/// Header row plus every candidate record of one input dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    records: Vec<CandidateRecord>,
}

impl Table {
    /// Build a table from raw rows, validating the required columns.
    ///
    /// Rows shorter than the header are padded with empty strings, so a
    /// missing `SearchString` or `title` value reads as empty. A row with
    /// more fields than the header is an input format error.
    pub fn from_rows(
        source_name: &str,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Result<Self> {
        let index = ColumnIndex::resolve(source_name, &headers)?;
        let width = headers.len();

        let mut records = Vec::with_capacity(rows.len());
        for (row, mut fields) in rows.into_iter().enumerate() {
            if fields.len() > width {
                // line numbers count the header as line 1
                return Err(MatchError::input_format(
                    source_name,
                    format!(
                        "row {} has {} fields, header has {}",
                        row + 2,
                        fields.len(),
                        width
                    ),
                ));
            }
            fields.resize(width, String::new());
            records.push(CandidateRecord {
                row,
                customer_key: fields[index.customer_key].trim().to_string(),
                search_string: fields[index.search_string].clone(),
                title: fields[index.title].clone(),
                street: fields[index.street].clone(),
                fields,
            });
        }

        Ok(Self { headers, records })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[CandidateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
