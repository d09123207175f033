//! Table observer for pretty-printing counters.
//!
//! [`TableObserver`] renders a collection of [`Observable`] counters with the
//! `tabled` crate, either as a `Name | Value` table or, in compact mode, as a
//! grid of `name: value` cells.
//!
//! # Feature Flag
//!
//! This module requires the `table` feature.
//!
//! # Examples
//!
//! ```rust
//! use stripe_adder::counters::long_adder::LongAdder;
//! use stripe_adder::counters::Observable;
//! use stripe_adder::observers::table::{TableObserver, TableStyle};
//! use stripe_adder::striped::probe::Probe;
//!
//! let requests = LongAdder::new().with_name("requests");
//! let mut probe = Probe::new();
//! requests.add(&mut probe, 1000);
//!
//! let counters: Vec<&dyn Observable> = vec![&requests];
//! let output = TableObserver::new()
//!     .with_style(TableStyle::Ascii)
//!     .render(counters.into_iter());
//! assert!(output.contains("requests"));
//! assert!(output.contains("1000"));
//! ```

use std::io::Write;

use crate::counters::Observable;
use crate::observers::Result;
use tabled::settings::object::Rows;
use tabled::settings::{Remove, Style};
use tabled::{builder::Builder, Table, Tabled};

/// Available table styles for rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableStyle {
    /// ASCII table with simple characters: +, -, |
    Ascii,
    /// Modern rounded corners (default)
    #[default]
    Rounded,
    /// Sharp corners with box-drawing characters
    Sharp,
    /// Modern style with clean lines
    Modern,
    /// GitHub-flavored Markdown table
    Markdown,
    /// No borders, just spacing
    Blank,
}

/// Configuration for the table observer.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// The style to use for rendering.
    pub style: TableStyle,
    /// Whether to show the header row (only in non-compact mode).
    pub show_header: bool,
    /// Custom title printed above the table.
    pub title: Option<String>,
    /// Whether to use compact format (`name: value` in cells).
    pub compact: bool,
    /// Number of columns in compact mode.
    pub columns: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            style: TableStyle::default(),
            show_header: true,
            title: None,
            compact: false,
            columns: 1,
        }
    }
}

#[derive(Tabled)]
struct CounterRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: i64,
}

/// An observer that renders counters as a formatted table.
#[derive(Debug, Clone, Default)]
pub struct TableObserver {
    config: TableConfig,
}

impl TableObserver {
    /// Creates a new table observer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new table observer with the specified configuration.
    pub fn with_config(config: TableConfig) -> Self {
        Self { config }
    }

    /// Sets the table style.
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.config.style = style;
        self
    }

    /// Sets whether to show the header row.
    pub fn with_header(mut self, show: bool) -> Self {
        self.config.show_header = show;
        self
    }

    /// Sets a title printed above the table.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    /// Enables or disables compact mode.
    pub fn compact(mut self, enabled: bool) -> Self {
        self.config.compact = enabled;
        self
    }

    /// Sets the number of columns in compact mode. Values below 1 count as 1.
    pub fn columns(mut self, count: usize) -> Self {
        self.config.columns = count.max(1);
        self
    }

    /// Renders the counters as a table.
    pub fn render<'a>(&self, counters: impl Iterator<Item = &'a dyn Observable>) -> String {
        let values = counters.map(|c| (display_name(c), c.value())).collect();
        self.render_values(values)
    }

    /// Renders the counters as a table, resetting each of them.
    pub fn render_and_reset<'a>(
        &self,
        counters: impl Iterator<Item = &'a dyn Observable>,
    ) -> String {
        let values = counters
            .map(|c| (display_name(c), c.value_and_reset()))
            .collect();
        self.render_values(values)
    }

    /// Renders the counters and writes the table, plus a newline, to `writer`.
    pub fn write_to<'a, W: Write>(
        &self,
        mut writer: W,
        counters: impl Iterator<Item = &'a dyn Observable>,
    ) -> Result<()> {
        writeln!(writer, "{}", self.render(counters))?;
        Ok(())
    }

    fn render_values(&self, values: Vec<(String, i64)>) -> String {
        let table = if self.config.compact {
            if values.is_empty() {
                return String::new();
            }
            self.compact_table(values)
        } else {
            self.standard_table(values)
        };

        match &self.config.title {
            Some(title) => format!("{}\n{}", title, table),
            None => table.to_string(),
        }
    }

    fn standard_table(&self, values: Vec<(String, i64)>) -> Table {
        let rows: Vec<CounterRow> = values
            .into_iter()
            .map(|(name, value)| CounterRow { name, value })
            .collect();

        let mut table = Table::new(rows);
        self.apply_style(&mut table);
        if !self.config.show_header {
            table.with(Remove::row(Rows::first()));
        }
        table
    }

    fn compact_table(&self, values: Vec<(String, i64)>) -> Table {
        let cells: Vec<String> = values
            .into_iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect();

        let cols = self.config.columns;
        let mut builder = Builder::default();
        for chunk in cells.chunks(cols) {
            let mut row = chunk.to_vec();
            row.resize(cols, String::new());
            builder.push_record(row);
        }

        let mut table = builder.build();
        self.apply_style(&mut table);
        table
    }

    fn apply_style(&self, table: &mut Table) {
        match self.config.style {
            TableStyle::Ascii => table.with(Style::ascii()),
            TableStyle::Rounded => table.with(Style::rounded()),
            TableStyle::Sharp => table.with(Style::sharp()),
            TableStyle::Modern => table.with(Style::modern()),
            TableStyle::Markdown => table.with(Style::markdown()),
            TableStyle::Blank => table.with(Style::blank()),
        };
    }
}

fn display_name(counter: &dyn Observable) -> String {
    if counter.name().is_empty() {
        "(unnamed)".to_string()
    } else {
        counter.name().to_string()
    }
}
