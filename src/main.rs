use anyhow::Result;
use rs_content::{
    exit_code, init_tracing_with_file, local_offset_or_utc, open_store, AlertConfig, Collector,
    CollectorOptions, DateKey, PushshiftClient, SmtpAlerter,
};
use std::fs;
use std::process::ExitCode;
use time::OffsetDateTime;

fn main() -> Result<ExitCode> {
    // Resolve the local offset while the process is still single-threaded.
    let resolved = local_offset_or_utc();
    let offset = resolved.offset;
    let opts = CollectorOptions::from_env().with_utc_offset(offset);

    let today = DateKey::from_date(OffsetDateTime::now_utc().to_offset(offset).date()).to_string();
    init_tracing_with_file(&opts.log_path(&today))?;
    resolved.log_fallback();
    fs::create_dir_all(&opts.data_dir)?;

    let source = PushshiftClient::new(opts.endpoint.clone())?;
    let store = open_store(&opts)?;
    let alerts = SmtpAlerter::new(AlertConfig::from_env());

    let result = Collector::with_options(opts).run_once(&source, store.as_ref(), &alerts);
    if let Err(e) = &result {
        tracing::error!("Run failed: {}", e);
    }
    Ok(ExitCode::from(exit_code(&result) as u8))
}
