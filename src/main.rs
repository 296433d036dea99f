use std::process::ExitCode;

fn main() -> ExitCode {
    codevision::cli::run()
}
