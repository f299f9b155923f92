//! wazbean-check - Check ledger files for syntax errors.

fn main() -> std::process::ExitCode {
    wazbean::cmd::check::main()
}
