mod cli;
mod evaluate;
mod infra;
mod programs;

use parcel_eligibility::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
