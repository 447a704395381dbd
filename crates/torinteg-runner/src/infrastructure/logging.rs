//! `tracing` subscriber setup.
//!
//! The subscriber is installed before anything is loaded, so events emitted
//! while reading and layering the settings file are not lost. At that point
//! the runlevel is not known yet: the filter starts from `RUST_LOG`, or off
//! when it is unset. Once the settings are resolved, [`LogControl::apply`]
//! swaps in the runlevel filter through a `reload` layer. `RUST_LOG` always
//! wins, so the swap is skipped when it was set.

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use torinteg_core::Runlevel;

/// Filter used until a runlevel is known, when `RUST_LOG` is unset.
const INITIAL_FILTER: &str = "off";

type AnsiSwitch = Box<dyn Fn(bool) -> Result<(), reload::Error> + Send + Sync>;

/// Handle for adjusting the installed subscriber once settings are known.
pub struct LogControl {
    filter: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
    set_ansi: AnsiSwitch,
}

impl LogControl {
    /// Whether the filter came from `RUST_LOG`.
    pub fn filter_from_env(&self) -> bool {
        self.from_env
    }

    /// Switches the filter to `level` (off when `None`) unless `RUST_LOG`
    /// was set, and turns ANSI colors off when `no_color` is set.
    ///
    /// # Errors
    ///
    /// Returns [`reload::Error`] if the subscriber has been dropped.
    pub fn apply(&self, level: Option<Runlevel>, no_color: bool) -> Result<(), reload::Error> {
        if !self.from_env {
            let directive = level.map_or(INITIAL_FILTER, Runlevel::filter_directive);
            self.filter.reload(EnvFilter::new(directive))?;
        }
        (self.set_ansi)(!no_color)
    }
}

/// Builds the subscriber and its control handle, writing to `make_writer`.
///
/// `rust_log` is the value of `RUST_LOG`, if set. A value that does not
/// parse as a filter is treated as unset.
pub fn build<W>(
    make_writer: W,
    rust_log: Option<&str>,
) -> (Box<dyn Subscriber + Send + Sync>, LogControl)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter = rust_log.and_then(|directives| EnvFilter::try_new(directives).ok());
    let from_env = env_filter.is_some();

    let (filter_layer, filter) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new(INITIAL_FILTER)));
    let (fmt_layer, fmt_handle) = reload::Layer::new(fmt::layer().with_writer(make_writer));

    let subscriber = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer);

    let set_ansi: AnsiSwitch =
        Box::new(move |ansi| fmt_handle.modify(|layer| layer.set_ansi(ansi)));

    (
        Box::new(subscriber),
        LogControl {
            filter,
            from_env,
            set_ansi,
        },
    )
}

/// Installs the global subscriber writing to stderr.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init() -> Result<LogControl, tracing::subscriber::SetGlobalDefaultError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (subscriber, control) = build(std::io::stderr, rust_log.as_deref());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(control)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
