//! `salekit <input.csv> [output_dir]`

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use env_logger::Env;
use log::{error, info};
use salekit_report::{SpecPipelineOptions, run};

const C_DIR_OUT_DEFAULT: &str = "outputs";

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let l_args: Vec<String> = env::args().skip(1).collect();
    let (path_file_in, path_dir_out) = match l_args.as_slice() {
        [file_in] => (PathBuf::from(file_in), PathBuf::from(C_DIR_OUT_DEFAULT)),
        [file_in, dir_out] => (PathBuf::from(file_in), PathBuf::from(dir_out)),
        _ => {
            error!("usage: salekit <input.csv> [output_dir]");
            return ExitCode::from(2);
        }
    };

    match run(&path_file_in, &path_dir_out, &SpecPipelineOptions::default()) {
        Ok(output) => {
            info!(
                "dashboard written: {} ({} record(s))",
                output.path_file_out.display(),
                output.n_records
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
