//! Receipt
//!
//! Renders a quoted order as a table, followed by the subtotal, discount and
//! total lines.

use std::io;

use rusty_money::MoneyError;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::orders::OrderQuote;

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// A printable receipt for a quoted order.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'q, 'a> {
    quote: &'q OrderQuote<'a>,
}

impl<'q, 'a> Receipt<'q, 'a> {
    /// Create a receipt for `quote`.
    pub fn new(quote: &'q OrderQuote<'a>) -> Self {
        Self { quote }
    }

    /// Write the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if money arithmetic or writing fails.
    pub fn write_to(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let table = self.table();

        writeln!(out, "{table}").map_err(|_err| ReceiptError::IO)?;

        for (label, value) in self.summary()? {
            writeln!(out, "{label:>10} {value}").map_err(|_err| ReceiptError::IO)?;
        }

        Ok(())
    }

    fn table(&self) -> String {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Price", "Total", "After offer"]);

        for line in self.quote.lines() {
            builder.push_record([
                line.name.clone(),
                line.quantity.to_string(),
                line.unit_price.to_string(),
                line.total.to_string(),
                line.discounted_total.to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(1..), Alignment::right());
        table.modify(Rows::first(), Alignment::center());

        table.to_string()
    }

    fn summary(&self) -> Result<Vec<(String, String)>, ReceiptError> {
        let mut lines = vec![
            ("Items:".to_string(), self.quote.unit_count().to_string()),
            ("Subtotal:".to_string(), self.quote.subtotal().to_string()),
        ];

        if let (Some(title), Some(percentage)) = (self.quote.offer_title(), self.quote.percentage())
        {
            lines.push((
                "Discount:".to_string(),
                format!(
                    "-{} ({title}, {}%)",
                    self.quote.discount()?,
                    percentage.normalize()
                ),
            ));
        }

        lines.push(("Total:".to_string(), self.quote.total().to_string()));

        Ok(lines)
    }
}
