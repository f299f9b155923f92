//! Integration tests for the BQL query engine.
//!
//! Queries run against a small household ledger loaded from text.

use rust_decimal_macros::dec;
use wazbean_core::{Amount, Ledger, NaiveDate, Posting, Transaction};
use wazbean_query::{execute, parse, ExecError, ParseErrorKind, QueryResult, Value};

// ============================================================================
// Helper Functions
// ============================================================================

const HOUSEHOLD: &str = r#"
2024-01-15 * "AcmeCo" "Salary deposit"
  Assets:BofA:Checking    3000.00 USD
  Income:Salary:AcmeCo   -3000.00 USD

2024-01-16 * "Whole Foods" "Weekly groceries"
  Expenses:Food:Groceries   87.34 USD
  Assets:BofA:Checking     -87.34 USD

2024-01-20 * "Olive Garden" "Dinner with family"
  Expenses:Food:Restaurant  72.15 USD
  Liabilities:CreditCard:Visa

2024-02-03 * "Trader Joe's" "Groceries"
  Expenses:Food:Groceries  112.60 USD
  Assets:BofA:Checking    -112.60 USD

2024-02-12 * "AcmeCo" "Salary deposit"
  Assets:BofA:Checking    3000.00 USD
  Income:Salary:AcmeCo   -3000.00 USD

2024-02-25 * "Landlord Properties LLC" "February rent"
  Expenses:Rent           1500.00 USD
  Assets:BofA:Checking   -1500.00 USD
"#;

fn household() -> Ledger {
    wazbean_loader::load(HOUSEHOLD).unwrap()
}

fn run(source: &str) -> QueryResult {
    execute(&parse(source).unwrap(), &household()).unwrap()
}

fn text(s: &str) -> Value {
    Value::from(s)
}

fn assert_close(value: &Value, expected: f64) {
    match value {
        Value::Number(n) => assert!((n - expected).abs() < 1e-9, "{n} != {expected}"),
        other => panic!("expected a number, got {other:?}"),
    }
}

// ============================================================================
// Projection
// ============================================================================

#[test]
fn test_select_all_postings() {
    let result = run("SELECT account, date, narration");
    assert_eq!(result.columns, vec!["account", "date", "narration"]);
    assert_eq!(result.len(), 12);
    assert_eq!(
        result.rows[0],
        vec![
            text("Assets:BofA:Checking"),
            text("2024-01-15"),
            text("Salary deposit"),
        ]
    );
}

#[test]
fn test_auto_posting_projects_null_amount() {
    let result = run("SELECT account, amount, position WHERE payee = 'Olive Garden'");
    assert_eq!(result.len(), 2);

    assert_eq!(result.rows[0][0], text("Expenses:Food:Restaurant"));
    assert_close(&result.rows[0][1], 72.15);
    assert_eq!(result.rows[0][2], text("72.15 USD"));

    assert_eq!(
        result.rows[1],
        vec![text("Liabilities:CreditCard:Visa"), Value::Null, text("")]
    );
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_from_keeps_whole_transactions() {
    let ledger: Ledger = std::iter::once(
        Transaction::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), "Lunch")
            .with_posting(Posting::new(
                "Expenses:Food",
                Amount::new(dec!(10), "USD"),
            ))
            .with_posting(Posting::new(
                "Assets:Cash",
                Amount::new(dec!(-10), "USD"),
            )),
    )
    .collect();

    let query = parse("SELECT account FROM 'Expenses'").unwrap();
    let result = execute(&query, &ledger).unwrap();
    assert_eq!(
        result.rows,
        vec![vec![text("Expenses:Food")], vec![text("Assets:Cash")]]
    );
}

#[test]
fn test_from_on_household() {
    let result = run("SELECT account FROM 'Expenses:Food'");
    // three transactions touch Expenses:Food, two postings each
    assert_eq!(result.len(), 6);

    assert!(run("SELECT account FROM 'Equity'").is_empty());
}

#[test]
fn test_where_exact_match() {
    let result = run("SELECT account, amount WHERE account = 'Expenses:Food:Groceries'");
    assert_eq!(result.len(), 2);
    for row in &result.rows {
        assert_eq!(row[0], text("Expenses:Food:Groceries"));
    }
    assert_close(&result.rows[0][1], 87.34);
    assert_close(&result.rows[1][1], 112.60);

    // no prefix or case folding on values
    assert!(run("SELECT account WHERE account = 'Expenses:Food'").is_empty());
    assert!(run("SELECT account WHERE payee = 'acmeco'").is_empty());
}

#[test]
fn test_from_and_where_combined() {
    let result = run("SELECT account, payee FROM 'Expenses:Rent' WHERE account = 'Assets:BofA:Checking'");
    assert_eq!(
        result.rows,
        vec![vec![
            text("Assets:BofA:Checking"),
            text("Landlord Properties LLC"),
        ]]
    );
}

// ============================================================================
// Grouping and Aggregation
// ============================================================================

#[test]
fn test_group_sum() {
    let result = run("SELECT account, SUM(amount) GROUP BY account");
    assert_eq!(result.columns, vec!["account", "sum(amount)"]);

    let groceries = result
        .rows
        .iter()
        .find(|row| row[0] == text("Expenses:Food:Groceries"))
        .unwrap();
    assert_close(&groceries[1], 199.94);

    let visa = result
        .rows
        .iter()
        .find(|row| row[0] == text("Liabilities:CreditCard:Visa"))
        .unwrap();
    assert_close(&visa[1], 0.0);
}

#[test]
fn test_group_count() {
    let result = run("SELECT account, COUNT(*) GROUP BY account");
    let checking = result
        .rows
        .iter()
        .find(|row| row[0] == text("Assets:BofA:Checking"))
        .unwrap();
    assert_eq!(checking[1], Value::Number(5.0));
}

#[test]
fn test_groups_keep_first_seen_order() {
    let result = run("SELECT account GROUP BY account");
    let accounts: Vec<String> = result.rows.iter().map(|r| r[0].to_string()).collect();
    assert_eq!(
        accounts,
        vec![
            "Assets:BofA:Checking",
            "Income:Salary:AcmeCo",
            "Expenses:Food:Groceries",
            "Expenses:Food:Restaurant",
            "Liabilities:CreditCard:Visa",
            "Expenses:Rent",
        ]
    );
}

#[test]
fn test_group_by_multiple_keys() {
    let result = run("SELECT payee, account, COUNT(*) GROUP BY payee, account");
    assert_eq!(result.len(), 10);
    assert_eq!(
        result.rows[0],
        vec![text("AcmeCo"), text("Assets:BofA:Checking"), Value::Number(2.0)]
    );
}

#[test]
fn test_aggregate_without_group_by_rejected() {
    let query = parse("SELECT SUM(amount)").unwrap();
    let err = execute(&query, &household()).unwrap_err();
    assert!(matches!(err, ExecError::AggregateWithoutGroupBy(_)));
}

#[test]
fn test_unknown_aggregate_rejected() {
    let query = parse("SELECT account, MAX(amount) GROUP BY account").unwrap();
    let err = execute(&query, &household()).unwrap_err();
    assert_eq!(err.to_string(), "unknown aggregate function: MAX");
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_order_by_desc() {
    let result = run(
        "SELECT account, amount WHERE account = 'Expenses:Food:Groceries' ORDER BY amount DESC",
    );
    assert_close(&result.rows[0][1], 112.60);
    assert_close(&result.rows[1][1], 87.34);
}

#[test]
fn test_order_by_is_stable() {
    let result = run("SELECT payee, narration ORDER BY payee");
    let payees: Vec<String> = result.rows.iter().map(|r| r[0].to_string()).collect();
    assert_eq!(payees[..4], ["AcmeCo", "AcmeCo", "AcmeCo", "AcmeCo"]);

    // ties on payee keep ledger order: January salary before February salary
    let dates = run("SELECT payee, date ORDER BY payee");
    assert_eq!(dates.rows[0][1], text("2024-01-15"));
    assert_eq!(dates.rows[1][1], text("2024-01-15"));
    assert_eq!(dates.rows[2][1], text("2024-02-12"));
}

#[test]
fn test_order_by_aggregate() {
    let result =
        run("SELECT account, SUM(amount) GROUP BY account ORDER BY sum(amount) DESC, account");
    assert_eq!(result.rows[0][0], text("Assets:BofA:Checking"));
    assert_close(&result.rows[0][1], 4300.06);
    assert_eq!(
        result.rows.last().unwrap()[0],
        text("Income:Salary:AcmeCo")
    );
}

#[test]
fn test_order_by_column_not_selected_is_ignored() {
    let ordered = run("SELECT account ORDER BY amount DESC");
    let unordered = run("SELECT account");
    assert_eq!(ordered, unordered);
}

// ============================================================================
// Parse Failures
// ============================================================================

#[test]
fn test_invalid_queries() {
    assert!(parse("account").is_err());
    assert!(parse("SELECT account, 123 invalid").is_err());
    assert_eq!(
        parse("SELECT account FROM 'Expenses:Cash").unwrap_err().kind,
        ParseErrorKind::UnterminatedString
    );
}
