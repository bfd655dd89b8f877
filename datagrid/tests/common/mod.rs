//! Shared fixtures for grid tests.

#![allow(dead_code)]

use datagrid::{CellValue, ColumnDefinition, GridRow};

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub key: String,
    pub name: String,
    pub size: i64,
    pub ratio: f64,
}

impl GridRow for Item {
    fn key(&self) -> String {
        self.key.clone()
    }
}

pub fn item(key: &str, name: &str, size: i64) -> Item {
    Item {
        key: key.to_string(),
        name: name.to_string(),
        size,
        ratio: 0.0,
    }
}

/// Rows A..E with sizes that reverse their key order.
pub fn items() -> Vec<Item> {
    vec![
        item("A", "alpha", 50),
        item("B", "bravo", 40),
        item("C", "charlie", 30),
        item("D", "delta", 20),
        item("E", "echo", 10),
    ]
}

/// Name, Size (descending first), Ratio and a disabled Added column.
pub fn columns() -> Vec<ColumnDefinition<Item>> {
    vec![
        ColumnDefinition::new("Name", |i: &Item| CellValue::from(&i.name)),
        ColumnDefinition::new("Size", |i: &Item| CellValue::from(i.size)).descending(),
        ColumnDefinition::new("Ratio", |i: &Item| CellValue::from(i.ratio)).width(60),
        ColumnDefinition::new("Added", |_: &Item| CellValue::Empty).disabled(),
    ]
}

/// Bare columns with ids `a`, `b`, ... for resolver tests.
pub fn named(names: &[&str]) -> Vec<ColumnDefinition<Item>> {
    names
        .iter()
        .map(|name| ColumnDefinition::new(*name, |_: &Item| CellValue::Empty))
        .collect()
}

pub fn keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

pub fn ids(columns: &[ColumnDefinition<Item>]) -> Vec<String> {
    columns.iter().map(|c| c.id.clone()).collect()
}
