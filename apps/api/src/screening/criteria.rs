//! Criteria spreadsheet parsing and column projection.
//!
//! Parsing can fail (a broken upload aborts the whole invocation);
//! projection is total: every data row yields a `CriteriaRow`, with fixed
//! placeholders standing in for unmapped columns, absent headers, and empty
//! cells.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, DataType, Reader};

use crate::errors::AppError;

pub const FALLBACK_ROLE: &str = "Unknown Role";
pub const FALLBACK_SKILLS: &str = "General";
pub const FALLBACK_EXPERIENCE: &str = "Not Specified";

/// Raw worksheet content: one header row plus stringified data rows, in
/// sheet order.
#[derive(Debug, Clone)]
pub struct CriteriaTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Caller-selected column names for the three criteria fields.
/// `None` means the caller left the field unmapped.
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    pub role: Option<String>,
    pub skills: Option<String>,
    pub experience: Option<String>,
}

/// One target role and its requirements, as fed to the scoring prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaRow {
    pub role: String,
    pub skills: String,
    pub experience: String,
}

/// Reads the first worksheet of an uploaded workbook. The first row is the
/// header; everything below is data.
pub fn parse_criteria(bytes: &[u8]) -> Result<CriteriaTable, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::InvalidSpreadsheet(format!("Unable to open the spreadsheet: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| {
            AppError::InvalidSpreadsheet("The workbook does not contain any worksheets".to_string())
        })?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .ok_or_else(|| {
            AppError::InvalidSpreadsheet(format!("Unable to read the worksheet named '{sheet_name}'"))
        })?
        .map_err(|e| {
            AppError::InvalidSpreadsheet(format!("Unable to read the worksheet data: {e}"))
        })?;

    let mut rows_iter = range.rows();
    let headers = rows_iter
        .next()
        .ok_or_else(|| AppError::InvalidSpreadsheet("The worksheet is empty".to_string()))?
        .iter()
        .map(cell_to_string)
        .collect();
    let rows = rows_iter
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(CriteriaTable { headers, rows })
}

/// Projects every data row through the column mapping. Total: never fails,
/// one `CriteriaRow` per input row, order preserved.
pub fn project(table: &CriteriaTable, mapping: &ColumnMapping) -> Vec<CriteriaRow> {
    let role_idx = column_index(&table.headers, mapping.role.as_deref());
    let skills_idx = column_index(&table.headers, mapping.skills.as_deref());
    let experience_idx = column_index(&table.headers, mapping.experience.as_deref());

    table
        .rows
        .iter()
        .map(|row| CriteriaRow {
            role: field(row, role_idx, FALLBACK_ROLE),
            skills: field(row, skills_idx, FALLBACK_SKILLS),
            experience: field(row, experience_idx, FALLBACK_EXPERIENCE),
        })
        .collect()
}

fn column_index(headers: &[String], name: Option<&str>) -> Option<usize> {
    let name = name?;
    headers.iter().position(|header| header == name)
}

fn field(row: &[String], idx: Option<usize>, fallback: &str) -> String {
    idx.and_then(|i| row.get(i))
        .filter(|value| !value.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| fallback.to_string())
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn build_workbook(headers: &[&str], rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header).unwrap();
        }
        for (row_idx, row) in rows.iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                worksheet
                    .write_string(row_idx as u32 + 1, col as u16, *value)
                    .unwrap();
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    fn full_mapping() -> ColumnMapping {
        ColumnMapping {
            role: Some("Role".to_string()),
            skills: Some("Skills".to_string()),
            experience: Some("Experience".to_string()),
        }
    }

    #[test]
    fn test_parse_reads_headers_and_rows() {
        let bytes = build_workbook(
            &["Role", "Skills", "Experience"],
            &[
                &["Backend Engineer", "Rust, SQL", "5 years"],
                &["Data Analyst", "Python, Pandas", "2 years"],
            ],
        );
        let table = parse_criteria(&bytes).unwrap();
        assert_eq!(table.headers, vec!["Role", "Skills", "Experience"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], "Backend Engineer");
        assert_eq!(table.rows[1][1], "Python, Pandas");
    }

    #[test]
    fn test_parse_rejects_garbage_bytes() {
        let err = parse_criteria(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, AppError::InvalidSpreadsheet(_)));
    }

    #[test]
    fn test_project_with_full_mapping() {
        let bytes = build_workbook(
            &["Role", "Skills", "Experience"],
            &[&["Backend Engineer", "Rust, SQL", "5 years"]],
        );
        let table = parse_criteria(&bytes).unwrap();
        let rows = project(&table, &full_mapping());
        assert_eq!(
            rows,
            vec![CriteriaRow {
                role: "Backend Engineer".to_string(),
                skills: "Rust, SQL".to_string(),
                experience: "5 years".to_string(),
            }]
        );
    }

    #[test]
    fn test_project_all_unmapped_yields_placeholders() {
        let bytes = build_workbook(&["A", "B"], &[&["x", "y"], &["z", "w"]]);
        let table = parse_criteria(&bytes).unwrap();
        let rows = project(&table, &ColumnMapping::default());
        assert_eq!(rows.len(), 2);
        for row in rows {
            assert_eq!(row.role, FALLBACK_ROLE);
            assert_eq!(row.skills, FALLBACK_SKILLS);
            assert_eq!(row.experience, FALLBACK_EXPERIENCE);
        }
    }

    #[test]
    fn test_project_missing_skills_column_falls_back_per_row() {
        // The mapping names a column the sheet does not have.
        let bytes = build_workbook(
            &["Role", "Experience"],
            &[&["Backend Engineer", "5 years"], &["Data Analyst", "2 years"]],
        );
        let table = parse_criteria(&bytes).unwrap();
        let mapping = ColumnMapping {
            role: Some("Role".to_string()),
            skills: Some("Skills".to_string()),
            experience: Some("Experience".to_string()),
        };
        let rows = project(&table, &mapping);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.skills == FALLBACK_SKILLS));
        assert_eq!(rows[0].role, "Backend Engineer");
        assert_eq!(rows[1].experience, "2 years");
    }

    #[test]
    fn test_project_empty_cell_falls_back() {
        let bytes = build_workbook(
            &["Role", "Skills", "Experience"],
            &[&["Backend Engineer", "", "5 years"]],
        );
        let table = parse_criteria(&bytes).unwrap();
        let rows = project(&table, &full_mapping());
        assert_eq!(rows[0].skills, FALLBACK_SKILLS);
        assert_eq!(rows[0].role, "Backend Engineer");
    }

    #[test]
    fn test_project_is_total_over_ragged_rows() {
        // A row shorter than the header must still project cleanly.
        let table = CriteriaTable {
            headers: vec!["Role".to_string(), "Skills".to_string()],
            rows: vec![vec!["Backend Engineer".to_string()]],
        };
        let mapping = ColumnMapping {
            role: Some("Role".to_string()),
            skills: Some("Skills".to_string()),
            experience: None,
        };
        let rows = project(&table, &mapping);
        assert_eq!(rows[0].role, "Backend Engineer");
        assert_eq!(rows[0].skills, FALLBACK_SKILLS);
        assert_eq!(rows[0].experience, FALLBACK_EXPERIENCE);
    }
}
