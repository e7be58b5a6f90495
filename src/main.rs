use std::process::ExitCode;

fn main() -> ExitCode {
    match lane_race::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
