//! SQLite-backed record sources.
//!
//! Every content type lives in its own table with its own column names; a
//! [`TableSpec`] describes one such table and [`SqliteSource`] turns it into
//! a [`RecordSource`].

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use super::{RecordSource, SourceError, SourceResult};
use crate::record::{CapabilityMask, FeatureFlags, Record, RecordId};

/// How a table stores per-record feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagColumns {
    /// No flags stored; they are inferred from the text when reparsing.
    None,
    /// One integer column per feature.
    Separate {
        bbcode: &'static str,
        magic_url: &'static str,
        smilies: &'static str,
    },
    /// A single option bitmask column (see [`CapabilityMask`]).
    Options(&'static str),
}

/// Column layout of one content table. `table` excludes the table prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub table: &'static str,
    pub id_column: &'static str,
    pub text_column: &'static str,
    pub uid_column: &'static str,
    pub bitfield_column: Option<&'static str>,
    pub flags: FlagColumns,
}

impl TableSpec {
    fn select_sql(&self, table: &str) -> String {
        let bitfield = self.bitfield_column.unwrap_or("NULL");
        let flags = match self.flags {
            FlagColumns::None => "NULL, NULL, NULL, NULL".to_string(),
            FlagColumns::Separate {
                bbcode,
                magic_url,
                smilies,
            } => format!("{}, {}, {}, NULL", bbcode, magic_url, smilies),
            FlagColumns::Options(column) => format!("NULL, NULL, NULL, {}", column),
        };
        format!(
            "SELECT {id}, {text}, {uid}, {bitfield}, {flags} FROM {table} \
             WHERE {id} BETWEEN ?1 AND ?2 ORDER BY {id}",
            id = self.id_column,
            text = self.text_column,
            uid = self.uid_column,
            bitfield = bitfield,
            flags = flags,
            table = table,
        )
    }
}

/// Record source over one table of a SQLite database.
pub struct SqliteSource<'c> {
    conn: &'c Connection,
    name: String,
    table: String,
    spec: TableSpec,
}

impl<'c> SqliteSource<'c> {
    /// Create a source for `spec`, using `prefix` in front of the table name.
    pub fn new(
        conn: &'c Connection,
        name: impl Into<String>,
        prefix: &str,
        spec: TableSpec,
    ) -> SourceResult<Self> {
        validate_prefix(prefix)?;
        Ok(Self {
            conn,
            name: name.into(),
            table: format!("{}{}", prefix, spec.table),
            spec,
        })
    }

    /// Fully qualified table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }
}

impl RecordSource for SqliteSource<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_id(&self) -> SourceResult<RecordId> {
        let sql = format!(
            "SELECT COALESCE(MAX({}), 0) FROM {}",
            self.spec.id_column, self.table
        );
        let max: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(max.max(0) as RecordId)
    }

    fn fetch_range(&self, min_id: RecordId, max_id: RecordId) -> SourceResult<Vec<Record>> {
        if min_id > max_id {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(&self.spec.select_sql(&self.table))?;
        let flags = self.spec.flags;
        let records = stmt
            .query_map(params![to_sql_id(min_id), to_sql_id(max_id)], |row| {
                let id: i64 = row.get(0)?;
                let text: Option<String> = row.get(1)?;
                let uid: Option<String> = row.get(2)?;
                let bitfield: Option<String> = row.get(3)?;
                let bbcode: Option<i64> = row.get(4)?;
                let magic_url: Option<i64> = row.get(5)?;
                let smilies: Option<i64> = row.get(6)?;
                let options: Option<i64> = row.get(7)?;

                let (feature_flags, options) = match flags {
                    FlagColumns::None => (None, None),
                    FlagColumns::Separate { .. } => match (bbcode, magic_url, smilies) {
                        (Some(b), Some(m), Some(s)) => (
                            Some(FeatureFlags {
                                bbcode: b != 0,
                                magic_url: m != 0,
                                smilies: s != 0,
                            }),
                            None,
                        ),
                        _ => (None, None),
                    },
                    FlagColumns::Options(_) => match options {
                        Some(bits) => {
                            let bits = bits.max(0) as u32;
                            (
                                Some(FeatureFlags::from_mask(CapabilityMask::from_bits(bits))),
                                Some(bits),
                            )
                        }
                        None => (None, None),
                    },
                };

                Ok(Record {
                    id: id.max(0) as RecordId,
                    text: text.unwrap_or_default(),
                    markup_uid: uid.unwrap_or_default(),
                    feature_flags,
                    bitfield,
                    options,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn persist(&self, record: &Record) -> SourceResult<()> {
        let mut assignments = vec![format!("{} = ?", self.spec.text_column)];
        let mut values = vec![Value::Text(record.text.clone())];

        if let (Some(column), Some(bitfield)) = (self.spec.bitfield_column, &record.bitfield) {
            assignments.push(format!("{} = ?", column));
            values.push(Value::Text(bitfield.clone()));
        }
        if let (FlagColumns::Options(column), Some(options)) = (self.spec.flags, record.options) {
            assignments.push(format!("{} = ?", column));
            values.push(Value::Integer(i64::from(options)));
        }
        values.push(Value::Integer(to_sql_id(record.id)));

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            self.table,
            assignments.join(", "),
            self.spec.id_column
        );
        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            return Err(SourceError::MissingRecord {
                source_name: self.name.clone(),
                id: record.id,
            });
        }
        Ok(())
    }
}

fn to_sql_id(id: RecordId) -> i64 {
    i64::try_from(id).unwrap_or(i64::MAX)
}

fn validate_prefix(prefix: &str) -> SourceResult<()> {
    if prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(())
    } else {
        Err(SourceError::InvalidPrefix(prefix.to_string()))
    }
}
