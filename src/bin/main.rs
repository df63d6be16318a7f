// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 The lendit-rs Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use chrono::{DateTime, Utc};
use clap::Parser;
use csv::{ReaderBuilder, Trim};
use lendit_rs::{BookingId, ItemId, RentalEngine, RequestId, UserId};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;

/// Rental scenario driver.
///
/// Reads rental operations from a CSV file, applies them to a fresh engine
/// and writes the resulting bookings to stdout as JSON lines. Rows that
/// violate a business rule are reported on stderr and skipped.
#[derive(Parser, Debug)]
#[command(name = "lendit-rs")]
#[command(about = "A rental engine that processes operation CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with operations
    ///
    /// Expected format: op,actor,target,arg1,arg2,arg3
    /// Example: cargo run -- scenario.csv > bookings.jsonl
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    init_logger();
    let args = Args::parse();

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let engine = match process_operations(BufReader::new(file)) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error processing operations: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = write_bookings(&engine, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

fn init_logger() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Raw CSV record matching the input format.
///
/// Fields: `op, actor, target, arg1, arg2, arg3`
#[derive(Debug, serde::Deserialize)]
struct CsvRecord {
    op: String,
    actor: Option<u64>,
    target: Option<u64>,
    arg1: Option<String>,
    arg2: Option<String>,
    arg3: Option<String>,
}

/// One parsed driver operation.
#[derive(Debug)]
enum Operation {
    AddUser { name: String, email: String },
    AddItem { owner: UserId, name: String, description: String, available: bool },
    Book { booker: UserId, item: ItemId, start: DateTime<Utc>, end: DateTime<Utc> },
    Decide { owner: UserId, booking: BookingId, approved: bool },
    Comment { author: UserId, item: ItemId, text: String },
    Request { requester: UserId, description: String },
    AddItemForRequest { owner: UserId, request: RequestId, name: String, description: String },
}

impl CsvRecord {
    /// Converts a CSV record into an operation.
    ///
    /// Returns `None` for unknown op names or missing required fields.
    fn into_operation(self) -> Option<Operation> {
        match self.op.to_lowercase().as_str() {
            "user" => Some(Operation::AddUser {
                name: self.arg1?,
                email: self.arg2?,
            }),
            "item" => Some(Operation::AddItem {
                owner: UserId(self.actor?),
                name: self.arg1?,
                description: self.arg2?,
                available: self.arg3.as_deref().map_or(true, |v| v != "false"),
            }),
            "book" => Some(Operation::Book {
                booker: UserId(self.actor?),
                item: ItemId(self.target?),
                start: self.arg1?.parse().ok()?,
                end: self.arg2?.parse().ok()?,
            }),
            "approve" => Some(Operation::Decide {
                owner: UserId(self.actor?),
                booking: BookingId(self.target?),
                approved: true,
            }),
            "reject" => Some(Operation::Decide {
                owner: UserId(self.actor?),
                booking: BookingId(self.target?),
                approved: false,
            }),
            "comment" => Some(Operation::Comment {
                author: UserId(self.actor?),
                item: ItemId(self.target?),
                text: self.arg1?,
            }),
            "request" => Some(Operation::Request {
                requester: UserId(self.actor?),
                description: self.arg1?,
            }),
            "answer" => Some(Operation::AddItemForRequest {
                owner: UserId(self.actor?),
                request: RequestId(self.target?),
                name: self.arg1?,
                description: self.arg2.unwrap_or_default(),
            }),
            _ => None,
        }
    }
}

/// Applies every operation in the CSV to a fresh engine.
///
/// Malformed rows and rows rejected by a business rule are reported on
/// stderr and skipped; the remaining rows still apply.
fn process_operations<R: Read>(reader: R) -> Result<RentalEngine, Box<dyn std::error::Error>> {
    let engine = RentalEngine::in_memory();

    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    for (line, record) in csv_reader.deserialize::<CsvRecord>().enumerate() {
        let row = line + 2; // header is line 1
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                eprintln!("row {}: skipping malformed record: {}", row, e);
                continue;
            }
        };

        let Some(operation) = record.into_operation() else {
            eprintln!("row {}: skipping unrecognized operation", row);
            continue;
        };

        let result = match operation {
            Operation::AddUser { name, email } => {
                engine.create_user(name, email);
                Ok(())
            }
            Operation::AddItem { owner, name, description, available } => engine
                .create_item(owner, name, description, available, None)
                .map(|_| ()),
            Operation::Book { booker, item, start, end } => {
                engine.create_booking(booker, item, start, end).map(|_| ())
            }
            Operation::Decide { owner, booking, approved } => {
                engine.decide_booking(owner, booking, approved).map(|_| ())
            }
            Operation::Comment { author, item, text } => {
                engine.add_comment(author, item, text).map(|_| ())
            }
            Operation::Request { requester, description } => {
                engine.create_request(requester, description).map(|_| ())
            }
            Operation::AddItemForRequest { owner, request, name, description } => engine
                .create_item(owner, name, description, true, Some(request))
                .map(|_| ()),
        };

        if let Err(e) = result {
            eprintln!("row {}: rejected ({:?}): {}", row, e.kind(), e);
        }
    }

    Ok(engine)
}

/// Writes every booking to `writer` as one JSON object per line, grouped by
/// booker in user-id order.
fn write_bookings<W: Write>(
    engine: &RentalEngine,
    mut writer: W,
) -> Result<(), Box<dyn std::error::Error>> {
    for user in engine.list_users() {
        let bookings = engine.bookings_for_booker(user.id, "ALL", 0, i64::MAX)?;
        for booking in bookings {
            serde_json::to_writer(&mut writer, &booking)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(op: &str, actor: Option<u64>, target: Option<u64>, args: [&str; 3]) -> CsvRecord {
        CsvRecord {
            op: op.into(),
            actor,
            target,
            arg1: (!args[0].is_empty()).then(|| args[0].to_string()),
            arg2: (!args[1].is_empty()).then(|| args[1].to_string()),
            arg3: (!args[2].is_empty()).then(|| args[2].to_string()),
        }
    }

    #[test]
    fn parses_user_and_item_rows() {
        let op = record("user", None, None, ["ann", "ann@example.com", ""])
            .into_operation()
            .unwrap();
        assert!(matches!(op, Operation::AddUser { .. }));

        let op = record("item", Some(1), None, ["drill", "cordless", "true"])
            .into_operation()
            .unwrap();
        assert!(matches!(op, Operation::AddItem { available: true, .. }));
    }

    #[test]
    fn rejects_unknown_ops_and_missing_fields() {
        assert!(record("frobnicate", Some(1), None, ["", "", ""]).into_operation().is_none());
        assert!(record("book", Some(1), None, ["", "", ""]).into_operation().is_none());
    }

    #[test]
    fn end_to_end_scenario() {
        let start = Utc::now() + Duration::days(1);
        let end = start + Duration::days(2);
        let csv = format!(
            "op,actor,target,arg1,arg2,arg3\n\
             user,,,ann,ann@example.com,\n\
             user,,,bob,bob@example.com,\n\
             item,1,,drill,cordless drill,true\n\
             book,2,3,{},{},\n\
             approve,1,4,,,\n",
            start.to_rfc3339(),
            end.to_rfc3339()
        );

        let engine = process_operations(csv.as_bytes()).unwrap();
        let mut out = Vec::new();
        write_bookings(&engine, &mut out).unwrap();

        let line = String::from_utf8(out).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(line.lines().next().unwrap()).unwrap();
        assert_eq!(parsed["status"], "APPROVED");
        assert_eq!(parsed["booker"]["name"], "bob");
    }
}
