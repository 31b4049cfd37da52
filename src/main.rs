use std::process::ExitCode;

fn main() -> ExitCode {
    csvbridge_lib::run()
}
