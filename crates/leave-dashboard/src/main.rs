mod bootstrap;

use anyhow::Result;
use leave_core::error::LeaveError;
use leave_core::settings::Settings;
use leave_data::analysis::build_report;
use leave_data::reader::load_leave_records;
use leave_ui::app::App;
use leave_ui::text_report::render_text_report;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Leave Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Employee: {}, Theme: {}",
        settings.view,
        settings.employee,
        settings.theme
    );

    let data_path = bootstrap::resolve_data_path(settings.data_file.as_deref());
    let dataset = match load_leave_records(&data_path, settings.invalid_row_policy()) {
        Ok(dataset) => dataset,
        Err(e @ (LeaveError::MissingSource(_) | LeaveError::Schema { .. } | LeaveError::Data { .. })) => {
            tracing::error!("{}", e);
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let skipped = dataset.row_errors.len();
    if skipped > 0 {
        tracing::warn!(
            "{} of {} rows in {} were skipped",
            skipped,
            dataset.rows_read,
            dataset.source.display()
        );
    }

    let filter = settings.filter_state();
    let top_n = settings.top_n as usize;

    match settings.view.as_str() {
        "report" => {
            let report = build_report(&dataset.rows, &filter, top_n);
            print!("{}", render_text_report(&report));
            if skipped > 0 {
                eprintln!("Note: {skipped} invalid rows were skipped");
            }
        }

        "json" => {
            let report = build_report(&dataset.rows, &filter, top_n);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        _ => {
            tracing::info!("Starting interactive dashboard...");
            let app = App::new(dataset.rows, filter, top_n, &settings.theme, skipped);

            // The TUI exits on 'q' / Ctrl+C itself; the signal branch covers
            // interrupts delivered outside raw mode.
            tokio::select! {
                result = app.run() => {
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down");
                    App::restore_terminal()?;
                }
            }
        }
    }

    Ok(())
}
