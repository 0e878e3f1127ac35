pub mod cli;
pub mod config;
pub mod dashboard;
pub mod parser;
pub mod render;
pub mod sections;
pub mod source;

use std::ffi::OsString;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use dashboard::{
  DashboardData,
  Note,
  SectionKind,
  Task
};
pub use parser::{
  MissionControlParser,
  SentinelPolicy
};
pub use source::{
  DocumentError,
  DocumentOrigin
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    format = ?cli.format,
    "starting mission control"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.missionrc.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let origin =
    config::resolve_document_origin(
      &cfg,
      cli.file.as_deref()
    )
    .context(
      "failed to resolve mission \
       control document"
    )?;

  let renderer =
    render::Renderer::new(&cfg)?;
  let parser =
    MissionControlParser::with_policy(
      cfg.sentinel_policy()
    )?;

  let text =
    source::load_document(&origin)?;
  let data = parser.parse(&text);

  renderer.print_dashboard(
    &data,
    cli.format,
    Utc::now()
  )?;

  info!("done");
  Ok(())
}
