use std::process::ExitCode;

fn main() -> ExitCode {
    let matches = e2e_plan_cli::command().get_matches();
    e2e_plan_cli::init_tracing(&matches);

    let mut stdout = std::io::stdout().lock();
    match e2e_plan_cli::run(&matches, &mut stdout) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
