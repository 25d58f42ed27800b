use anyhow::{Context, Result};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` directives are layered on top of
/// `filter`.
pub fn init_tracing(filter: &str) -> Result<()> {
    let directive: Directive = filter
        .parse()
        .with_context(|| format!("invalid log directive '{}'", filter))?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
    Ok(())
}
