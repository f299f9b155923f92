//! wazbean-query - Query ledger files with BQL.

fn main() -> std::process::ExitCode {
    wazbean::cmd::query::main()
}
