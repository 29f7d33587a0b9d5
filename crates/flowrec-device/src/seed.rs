//! Sample data and the SQL / shell text used to install it.
//!
//! Values are rendered through [`SqlValue`] and remote commands through
//! [`shell_command`] so that quotes in store names or paths cannot change
//! the meaning of the generated text.

use std::fmt;

/// A value in a generated SQL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Text(String),
    /// Trusted SQL expression emitted verbatim.
    Expr(&'static str),
}

impl SqlValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Current Unix time, evaluated by `SQLite`.
    pub const NOW: Self = Self::Expr("strftime('%s', 'now')");
}

impl From<Option<String>> for SqlValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Expr(expr) => f.write_str(expr),
        }
    }
}

/// A multi-row `INSERT` statement.
#[derive(Debug, Clone)]
pub struct Insert {
    table: &'static str,
    columns: &'static [&'static str],
    rows: Vec<Vec<SqlValue>>,
}

impl Insert {
    pub const fn new(table: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            table,
            columns,
            rows: Vec::new(),
        }
    }

    /// Adds a row. Panics in debug builds if the arity is wrong.
    pub fn row(mut self, values: Vec<SqlValue>) -> Self {
        debug_assert_eq!(values.len(), self.columns.len(), "row arity for {}", self.table);
        self.rows.push(values);
        self
    }
}

impl fmt::Display for Insert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {} ({}) VALUES", self.table, self.columns.join(", "))?;
        for (i, row) in self.rows.iter().enumerate() {
            let values: Vec<String> = row.iter().map(ToString::to_string).collect();
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}({})", values.join(", "))?;
        }
        f.write_str(";")
    }
}

/// A card group in the sample data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedGroup {
    pub id: String,
    pub name: String,
}

/// A loyalty card in the sample data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedCard {
    pub id: i64,
    pub store: String,
    pub note: String,
    pub card_id: String,
    pub barcode_id: Option<String>,
    pub header_color: i64,
    pub barcode_type: String,
    pub starred: bool,
    pub group: Option<String>,
}

/// The sample data installed on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedData {
    pub groups: Vec<SeedGroup>,
    pub cards: Vec<SeedCard>,
}

impl Default for SeedData {
    fn default() -> Self {
        Self {
            groups: vec![SeedGroup {
                id: "Test".to_string(),
                name: "Test Cards".to_string(),
            }],
            cards: vec![
                SeedCard {
                    id: 1,
                    store: "Test Store 1".to_string(),
                    note: "QR Code card".to_string(),
                    card_id: "1234567890".to_string(),
                    barcode_id: None,
                    header_color: 1_256_210,
                    barcode_type: "QR_CODE".to_string(),
                    starred: false,
                    group: Some("Test".to_string()),
                },
                SeedCard {
                    id: 2,
                    store: "Test Store 2".to_string(),
                    note: "Barcode card".to_string(),
                    card_id: "9876543210".to_string(),
                    barcode_id: None,
                    header_color: -5317,
                    barcode_type: "CODE_128".to_string(),
                    starred: true,
                    group: Some("Test".to_string()),
                },
            ],
        }
    }
}

impl SeedData {
    /// SQL script that replaces all cards and groups with this data.
    pub fn to_sql(&self) -> String {
        let mut statements = vec![
            "DELETE FROM LoyaltyCards;".to_string(),
            "DELETE FROM LoyaltyCardGroups;".to_string(),
            "DELETE FROM CardGroups;".to_string(),
        ];

        if !self.groups.is_empty() {
            let insert = self.groups.iter().fold(
                Insert::new("CardGroups", &["_id", "groupName"]),
                |insert, group| {
                    insert.row(vec![SqlValue::text(&group.id), SqlValue::text(&group.name)])
                },
            );
            statements.push(insert.to_string());
        }

        if !self.cards.is_empty() {
            let insert = self.cards.iter().fold(
                Insert::new(
                    "LoyaltyCards",
                    &[
                        "_id",
                        "store",
                        "note",
                        "cardid",
                        "barcodeid",
                        "headercolor",
                        "barcodetype",
                        "starstatus",
                        "lastused",
                        "archiveStatus",
                        "zoomLevel",
                    ],
                ),
                |insert, card| {
                    insert.row(vec![
                        SqlValue::Integer(card.id),
                        SqlValue::text(&card.store),
                        SqlValue::text(&card.note),
                        SqlValue::text(&card.card_id),
                        SqlValue::from(card.barcode_id.clone()),
                        SqlValue::Integer(card.header_color),
                        SqlValue::text(&card.barcode_type),
                        SqlValue::Integer(i64::from(card.starred)),
                        SqlValue::NOW,
                        SqlValue::Integer(0),
                        SqlValue::Integer(100),
                    ])
                },
            );
            statements.push(insert.to_string());
        }

        let memberships = self
            .cards
            .iter()
            .filter_map(|card| card.group.as_ref().map(|group| (card.id, group)))
            .fold(
                Insert::new("LoyaltyCardGroups", &["cardId", "groupId"]),
                |insert, (card_id, group)| {
                    insert.row(vec![SqlValue::Integer(card_id), SqlValue::text(group)])
                },
            );
        if !memberships.rows.is_empty() {
            statements.push(memberships.to_string());
        }

        statements.join("\n")
    }
}

/// Quotes one word for a POSIX shell.
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Joins words into one command line for the device shell.
pub fn shell_command<'a>(words: impl IntoIterator<Item = &'a str>) -> String {
    words
        .into_iter()
        .map(shell_quote)
        .collect::<Vec<_>>()
        .join(" ")
}
