use anyhow::Result;
use tracing::{info, Subscriber};
use tracing_subscriber::{layer::SubscriberExt, registry::LookupSpan, Layer};
use tracing_subscriber::{registry, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "warn,coursegate=info,coursegate_core=info";
const DEBUG_LOG_FILTER: &str = "info,coursegate=debug,coursegate_core=debug";

pub fn build_reduced_logger_text<S>() -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if cfg!(debug_assertions) {
        Box::new(
            tracing_subscriber::fmt::layer()
                .with_line_number(false)
                .with_thread_names(false)
                .with_timer(tracing_subscriber::fmt::time::SystemTime)
                .with_target(true)
                .with_span_events(tracing_subscriber::fmt::format::FmtSpan::NONE)
                .event_format(tracing_subscriber::fmt::format().compact()),
        )
    } else {
        Box::new(
            tracing_subscriber::fmt::layer()
                .with_timer(tracing_subscriber::fmt::time::SystemTime)
                .with_target(true),
        )
    }
}

/// Filter from `RUST_LOG`, falling back to a quiet default
pub fn build_loglevel_filter_layer(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug {
            DEBUG_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        })
    })
}

pub fn init_tracing(debug: bool) -> Result<()> {
    let subscriber = registry()
        .with(build_loglevel_filter_layer(debug))
        .with(build_reduced_logger_text());
    tracing::subscriber::set_global_default(subscriber)?;

    info!("init logging & tracing");
    Ok(())
}
