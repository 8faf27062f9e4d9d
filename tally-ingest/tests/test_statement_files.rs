use rust_decimal::Decimal;
use std::fs;

use tally_core::Field;
use tally_ingest::{Layout, NormalizeOptions, SourceInput, detect_layout, normalize, read_csv};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn test_latin1_swedbank_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("statement.csv");
    // \xE9 alone is not valid UTF-8; the reader falls back to Latin-1
    let mut bytes = b"Data;Paaiskinimai;Suma;Valiuta;D/K\n".to_vec();
    bytes.extend_from_slice(b"2025-11-05;Caf\xE9 Vilnius;4,50;EUR;D\n");
    bytes.extend_from_slice(b"2025-11-06;Gr\xE0zinimas;1 234,56;EUR;K\n");
    fs::write(&path, bytes).unwrap();

    let rows = read_csv(&path).unwrap();
    assert_eq!(detect_layout(&rows), Layout::Swedbank);

    let out = normalize(&rows, "Swedbank", &NormalizeOptions::default()).unwrap();
    assert_eq!(out.transactions[0].description, "Café Vilnius");
    assert_eq!(out.transactions[0].amount, dec("-4.50"));
    assert_eq!(out.transactions[1].amount, dec("1234.56"));
}

#[test]
fn test_split_column_bank_with_bad_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credit_union.csv");
    fs::write(
        &path,
        "Posted Date,Payee,Withdrawal,Deposit\n\
         05.11.2025,Rent,\"1,100.00\",\n\
         06.11.2025,Salary,,2500.00\n\
         07.11.2025,Broken,abc,\n",
    )
    .unwrap();

    let src = SourceInput::from_path(&path, None).unwrap();
    assert_eq!(src.tag, "credit_union");

    let out = normalize(&src.rows, &src.tag, &NormalizeOptions::default()).unwrap();
    assert_eq!(out.transactions.len(), 2);
    assert_eq!(out.transactions[0].amount, dec("-1100.00"));
    assert_eq!(out.transactions[0].date.to_string(), "2025-11-05");
    assert_eq!(out.transactions[1].amount, dec("2500.00"));

    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].field, Field::Debit);
    assert_eq!(out.diagnostics[0].line, 4);
    assert_eq!(out.diagnostics[0].to_string(), "credit_union line 4: debit \"abc\" (not a number)");
}
