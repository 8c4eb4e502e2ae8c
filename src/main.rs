use flexi_logger::{Duplicate, FileSpec, FlexiLoggerError, Logger, LoggerHandle};
use log::{error, info};
use pauc::param::{self, General};
use pauc::run;
use std::env;
use std::process;

fn init_logger(general: &General) -> Result<LoggerHandle, FlexiLoggerError> {
    let logger = Logger::try_with_env_or_str(&general.log_level)?;

    if general.log_base.is_empty() {
        logger.start()
    } else {
        logger
            .log_to_file(
                FileSpec::default()
                    .basename(general.log_base.clone())
                    .suffix(general.log_suffix.clone()),
            )
            .duplicate_to_stdout(Duplicate::Info)
            .start()
    }
}

fn main() {
    let param_path = env::args().nth(1).unwrap_or_else(|| "param.yaml".to_string());

    let param = match param::get(&param_path) {
        Ok(param) => param,
        Err(e) => {
            eprintln!("Unable to read parameters from {}: {}", param_path, e);
            process::exit(1);
        }
    };

    let _logger = match init_logger(&param.general) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Unable to start logger: {}", e);
            process::exit(1);
        }
    };

    info!("pauc {} | parameters loaded from {}", pauc::version(), param_path);

    let exp = match run(&param) {
        Ok(exp) => exp,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    info!("\n{}", exp);

    if !param.general.save_exp.is_empty() {
        match exp.save_auto(&param.general.save_exp) {
            Ok(()) => info!("Experiment saved to {}", param.general.save_exp),
            Err(e) => {
                error!("Unable to save experiment to {}: {}", param.general.save_exp, e);
                process::exit(1);
            }
        }
    }
}
