use std::fmt::Write as _;

use crate::{
    book::Book,
    events::{JournalEntry, LibraryEvent},
    ledger::ReturnReceipt,
    loan::Loan,
    report::{LateFeeQuote, PatronStatus},
};

/// Text renderings of catalog, patron and journal state
#[derive(Debug)]
pub struct LibraryDisplay;

impl LibraryDisplay {
    /// Generate a markdown table of books
    #[must_use]
    pub fn catalog_table(books: &[&Book]) -> String {
        if books.is_empty() {
            return "No books found.".to_string();
        }

        let mut table = String::from("| ISBN | Title | Author | Available |\n");
        table.push_str("|------|-------|--------|-----------|\n");
        for book in books {
            let _ = writeln!(
                table,
                "| {} | {} | {} | {}/{} |",
                book.isbn(),
                book.title(),
                book.author().unwrap_or("-"),
                book.available_copies(),
                book.total_copies()
            );
        }
        table
    }

    /// One-line confirmation of a new loan
    #[must_use]
    pub fn loan_line(loan: &Loan, title: &str) -> String {
        format!(
            "Successfully borrowed \"{title}\" (ISBN {}). Due date: {}.",
            loan.isbn,
            loan.due_date.format("%Y-%m-%d")
        )
    }

    /// One-line confirmation of a return, with the late fee if any
    #[must_use]
    pub fn receipt_line(receipt: &ReturnReceipt) -> String {
        if receipt.days_overdue == 0 {
            format!("Successfully returned \"{}\".", receipt.title)
        } else {
            format!(
                "Successfully returned \"{}\", {} days late. Late fee: {}.",
                receipt.title, receipt.days_overdue, receipt.late_fee
            )
        }
    }

    #[must_use]
    pub fn fee_line(quote: &LateFeeQuote) -> String {
        if quote.overdue {
            format!(
                "Patron {} owes {} for ISBN {} ({} days overdue).",
                quote.patron_id, quote.fee, quote.isbn, quote.days_overdue
            )
        } else {
            format!("Patron {} has no late fee for ISBN {}.", quote.patron_id, quote.isbn)
        }
    }

    /// Summary plus a markdown table of the patron's history
    #[must_use]
    pub fn status_report(status: &PatronStatus) -> String {
        let mut out = format!(
            "Patron {}: {} books borrowed, total late fees {}\n",
            status.patron_id, status.borrowed_count, status.total_late_fees
        );
        if status.history.is_empty() {
            out.push_str("No borrowing history.\n");
            return out;
        }

        out.push_str("\n| ISBN | Title | Borrowed | Due | Returned | Fee |\n");
        out.push_str("|------|-------|----------|-----|----------|-----|\n");
        for entry in &status.history {
            let returned =
                entry.return_date.map_or_else(|| "on loan".to_string(), |d| d.to_string());
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} | {} |",
                entry.isbn,
                entry.title,
                entry.borrow_date,
                entry.due_date,
                returned,
                entry.fee_incurred
            );
        }
        out
    }

    /// Generate a markdown table of the activity journal
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)]
    pub fn journal_table(entries: &[JournalEntry]) -> String {
        if entries.is_empty() {
            return "No activity recorded yet.".to_string();
        }

        let mut table = String::from("| # | Date | Event |\n");
        table.push_str("|---|------|-------|\n");
        for (i, entry) in entries.iter().enumerate() {
            let _ = writeln!(
                table,
                "| {} | {} | {} |",
                i + 1,
                entry.date,
                Self::describe(&entry.event)
            );
        }
        table
    }

    /// Format an event for display
    fn describe(event: &LibraryEvent) -> String {
        match event {
            LibraryEvent::BookAdded { isbn, title, copies } => {
                format!("Added \"{title}\" ({isbn}), {copies} copies")
            }
            LibraryEvent::Borrowed { patron_id, isbn, due_date } => {
                format!("{patron_id} borrowed {isbn}, due {due_date}")
            }
            LibraryEvent::Returned { patron_id, isbn, days_overdue: 0, .. } => {
                format!("{patron_id} returned {isbn}")
            }
            LibraryEvent::Returned { patron_id, isbn, days_overdue, late_fee } => {
                format!("{patron_id} returned {isbn}, {days_overdue} days late ({late_fee})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{error::LibraryResult, patron::PatronId, policy::Money};

    #[test]
    fn catalog_table_lists_each_book() -> LibraryResult<()> {
        let a = Book::new("111", "Book A", None, 2)?;
        let b = Book::new("222", "Dune", Some("Frank Herbert"), 1)?;
        let table = LibraryDisplay::catalog_table(&[&a, &b]);

        assert!(table.contains("| 111 | Book A | - | 2/2 |"));
        assert!(table.contains("| 222 | Dune | Frank Herbert | 1/1 |"));
        assert_eq!(LibraryDisplay::catalog_table(&[]), "No books found.");
        Ok(())
    }

    #[test]
    fn journal_table_describes_late_returns() -> LibraryResult<()> {
        let entry = JournalEntry {
            date: NaiveDate::from_ymd_opt(2024, 3, 20).unwrap_or_default(),
            event: LibraryEvent::Returned {
                patron_id: PatronId::parse("123456")?,
                isbn: "111".to_string(),
                days_overdue: 5,
                late_fee: Money::from_cents(250),
            },
        };
        let table = LibraryDisplay::journal_table(&[entry]);
        assert!(table.contains("| 1 | 2024-03-20 | 123456 returned 111, 5 days late ($2.50) |"));
        Ok(())
    }
}
