//! Diagnostics go to stderr through `tracing`; stdout carries only events.

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "AUTOTYPE_LOG";
pub const DEFAULT_FILTER: &str = "autotype=info";

/// Filter precedence: `AUTOTYPE_LOG`, then the `--log` flag, then the
/// settings file, then [`DEFAULT_FILTER`]. Invalid directives fall through.
pub fn resolve_filter(
    env: Option<&str>,
    cli: Option<&str>,
    settings: Option<&str>,
) -> EnvFilter {
    [env, cli, settings]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .find_map(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Plain-text fmt subscriber writing to `writer`.
pub fn subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true),
    )
}

/// Install the global subscriber. Returns false if one was already set.
pub fn init(cli: Option<&str>, settings: Option<&str>) -> bool {
    let env = std::env::var(LOG_ENV).ok();
    let filter = resolve_filter(env.as_deref(), cli, settings);

    if subscriber(filter, std::io::stderr).try_init().is_err() {
        return false;
    }

    std::panic::set_hook(Box::new(|panic_info| {
        tracing::error!(panic = %panic_info, "panic");
    }));
    true
}

/// In-memory log writer for tests.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(std::sync::Arc<parking_lot::Mutex<Vec<u8>>>);

#[cfg(test)]
impl CapturedLogs {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

#[cfg(test)]
impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
