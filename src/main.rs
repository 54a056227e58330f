// Copyright 2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod assemble;
mod classify;
mod cli;
mod columns;
mod config;
mod error;
mod extract;
mod format;
mod locale;
mod notify;
mod report;
mod runner;
mod session;
mod sheet;
mod table;
mod types;
mod ui;

use notify::{Notifier, SmtpNotifier};
use session::StaticPageSession;
use sheet::XlsxSheetWriter;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse CLI arguments
    let args = cli::CliArgs::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        ui::print_error(&e);
        std::process::exit(1);
    }

    // Resolve configuration
    let config = match config::build_job_config(&args) {
        Ok(c) => c,
        Err(e) => {
            ui::print_error(&format!("Configuration error: {}", e));
            std::process::exit(1);
        }
    };

    let session = match StaticPageSession::open(&config.session) {
        Ok(s) => s,
        Err(e) => fail(&e),
    };

    let smtp = config.mail.clone().map(SmtpNotifier::new);
    let notifier = smtp.as_ref().map(|n| n as &dyn Notifier);

    let summary = match runner::run_job(&config, session, &XlsxSheetWriter, notifier, |stage| {
        ui::stage(stage.describe())
    }) {
        Ok(summary) => summary,
        Err(e) => fail(&e),
    };

    report::print_summary(&summary);

    if let Some(json_path) = &args.json {
        match report::export_json_summary(&summary, json_path) {
            Ok(_) => ui::status(&format!("JSON summary saved to: {}", json_path.display())),
            Err(e) => log::warn!("Failed to save JSON summary: {}", e),
        }
    }
}

fn fail(e: &error::RunError) -> ! {
    log::error!("run failed at {} stage: {}", e.kind(), e);
    ui::print_error(&e.to_string());
    std::process::exit(1);
}
