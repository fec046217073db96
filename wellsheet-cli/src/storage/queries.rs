//! SQL statements for the measurement table
//!
//! All statements are built from one [`TablePlan`], whose column order is
//! the order of every inserted row.

use crate::config::ReportSettings;

/// Columns holding this token are stored as integers
const INTEGER_TOKEN: &str = "_data";

/// Name of the synthesized date column
pub const DATE_COLUMN: &str = "date";

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Table name plus the pinned column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePlan {
    table: String,
    columns: Vec<String>,
}

impl TablePlan {
    pub fn new(table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Column order shared by CREATE, INSERT and every data row
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn drop_statement(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", quote_ident(&self.table))
    }

    /// Storage type of a derived column
    pub fn column_type(column: &str) -> &'static str {
        if column.contains(INTEGER_TOKEN) {
            "INTEGER"
        } else {
            "TEXT"
        }
    }

    pub fn create_statement(&self) -> String {
        let mut statement = format!(
            "CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY",
            quote_ident(&self.table)
        );
        for column in &self.columns {
            statement.push_str(&format!(
                ", {} {}",
                quote_ident(column),
                Self::column_type(column)
            ));
        }
        statement.push_str(");");
        statement
    }

    pub fn insert_statement(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(|c| quote_ident(c)).collect();
        let placeholders = vec!["?"; self.columns.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&self.table),
            columns.join(", "),
            placeholders
        )
    }

    pub fn add_date_column_statement(&self) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {} DATE",
            quote_ident(&self.table),
            quote_ident(DATE_COLUMN)
        )
    }

    /// Fill the date of the first row that has none; run once per date
    pub fn backfill_date_statement(&self) -> String {
        let table = quote_ident(&self.table);
        let date = quote_ident(DATE_COLUMN);
        format!(
            "UPDATE {table} SET {date} = ? WHERE rowid = \
             (SELECT rowid FROM {table} WHERE {date} IS NULL ORDER BY rowid LIMIT 1)"
        )
    }
}

/// Error building the totals query from the derived columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// The identifier column was not derived from the header
    MissingColumn { column: String },
    /// A result group has no column for a measure
    NoMeasureColumns { group: String, measure: String },
}

impl std::fmt::Display for PlanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanError::MissingColumn { column } => {
                write!(f, "Column '{}' is missing from the derived schema", column)
            }
            PlanError::NoMeasureColumns { group, measure } => write!(
                f,
                "No '{}_{}_*' columns in the derived schema",
                group, measure
            ),
        }
    }
}

impl std::error::Error for PlanError {}

#[derive(Debug, Clone, PartialEq, Eq)]
struct GroupColumns {
    group: String,
    liquid: Vec<String>,
    oil: Vec<String>,
}

/// Per date/company/result-group totals of the liquid and oil measures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsPlan {
    id_column: String,
    groups: Vec<GroupColumns>,
}

impl TotalsPlan {
    pub fn new(plan: &TablePlan, settings: &ReportSettings) -> Result<Self, PlanError> {
        if !plan.columns().contains(&settings.id_column) {
            return Err(PlanError::MissingColumn {
                column: settings.id_column.clone(),
            });
        }

        let measure_columns = |group: &str, measure: &str| -> Result<Vec<String>, PlanError> {
            let prefix = format!("{}_{}_", group, measure);
            let columns: Vec<String> = plan
                .columns()
                .iter()
                .filter(|c| c.starts_with(&prefix))
                .cloned()
                .collect();
            if columns.is_empty() {
                return Err(PlanError::NoMeasureColumns {
                    group: group.to_string(),
                    measure: measure.to_string(),
                });
            }
            Ok(columns)
        };

        let groups = settings
            .result_groups
            .iter()
            .map(|group| -> Result<GroupColumns, PlanError> {
                Ok(GroupColumns {
                    group: group.clone(),
                    liquid: measure_columns(group, &settings.liquid_measure)?,
                    oil: measure_columns(group, &settings.oil_measure)?,
                })
            })
            .collect::<Result<Vec<_>, PlanError>>()?;

        Ok(Self {
            id_column: settings.id_column.clone(),
            groups,
        })
    }

    /// Totals query; yields `(date, company, results, total_qliq, total_qoil)`
    pub fn statement(&self, table: &str) -> String {
        let table = quote_ident(table);
        let date = quote_ident(DATE_COLUMN);
        let id = quote_ident(&self.id_column);
        let sum = |columns: &[String]| -> String {
            columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(" + ")
        };

        let branches: Vec<String> = self
            .groups
            .iter()
            .map(|g| {
                format!(
                    "SELECT {date} AS date, {id} AS company, {} AS results, \
                     {} AS qliq, {} AS qoil FROM {table}",
                    quote_literal(&g.group),
                    sum(&g.liquid),
                    sum(&g.oil)
                )
            })
            .collect();

        format!(
            "SELECT date, company, results, SUM(qliq) AS total_qliq, SUM(qoil) AS total_qoil \
             FROM ({}) GROUP BY date, company, results ORDER BY date, company, results",
            branches.join(" UNION ALL ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> TablePlan {
        TablePlan::new(
            "ursip",
            vec![
                "company".to_string(),
                "fact_Qliq_data1".to_string(),
                "fact_Qliq_data2".to_string(),
                "fact_Qoil_data1".to_string(),
                "forecast_Qliq_data1".to_string(),
                "forecast_Qoil_data1".to_string(),
            ],
        )
    }

    #[test]
    fn test_create_statement_types_data_columns() {
        let statement = plan().create_statement();

        assert!(statement.starts_with("CREATE TABLE IF NOT EXISTS \"ursip\" (id INTEGER PRIMARY KEY"));
        assert!(statement.contains("\"company\" TEXT"));
        assert!(statement.contains("\"fact_Qliq_data1\" INTEGER"));
        assert!(statement.ends_with(");"));
    }

    #[test]
    fn test_insert_statement_follows_column_order() {
        let plan = TablePlan::new("t", vec!["b".to_string(), "a".to_string()]);

        assert_eq!(
            plan.insert_statement(),
            "INSERT INTO \"t\" (\"b\", \"a\") VALUES (?, ?)"
        );
    }

    #[test]
    fn test_identifiers_are_quoted() {
        let plan = TablePlan::new("my \"table\"", vec![]);
        assert_eq!(plan.drop_statement(), "DROP TABLE IF EXISTS \"my \"\"table\"\"\"");
    }

    #[test]
    fn test_totals_statement_sums_measure_columns() {
        let totals = TotalsPlan::new(&plan(), &ReportSettings::default()).unwrap();

        let statement = totals.statement("ursip");

        assert!(statement.contains("'fact' AS results"));
        assert!(statement.contains("\"fact_Qliq_data1\" + \"fact_Qliq_data2\" AS qliq"));
        assert!(statement.contains("\"fact_Qoil_data1\" AS qoil"));
        assert!(statement.contains("'forecast' AS results"));
        assert!(statement.contains(" UNION ALL "));
        assert!(statement.contains("GROUP BY date, company, results"));
    }

    #[test]
    fn test_totals_require_id_column() {
        let plan = TablePlan::new("t", vec!["fact_Qliq_data1".to_string()]);

        let err = TotalsPlan::new(&plan, &ReportSettings::default()).unwrap_err();

        assert_eq!(
            err,
            PlanError::MissingColumn {
                column: "company".to_string()
            }
        );
    }

    #[test]
    fn test_totals_require_measure_columns() {
        let plan = TablePlan::new(
            "t",
            vec!["company".to_string(), "fact_Qliq_data1".to_string()],
        );

        let err = TotalsPlan::new(&plan, &ReportSettings::default()).unwrap_err();

        assert_eq!(
            err,
            PlanError::NoMeasureColumns {
                group: "fact".to_string(),
                measure: "Qoil".to_string()
            }
        );
    }
}
