use std::io::Write;

use anyhow::Context;
use clap::Args;

use crate::session::Session;
use crate::shared::config::UpsConfig;

#[derive(Args, Clone, PartialEq, Eq)]
pub struct OpenArgs {
    /// Review id, e.g. DEMO-CR-42
    pub review_id: String,

    /// Print the URL instead of opening a browser
    #[arg(long)]
    pub print: bool,
}

pub fn run(args: &OpenArgs, session: &Session) -> anyhow::Result<()> {
    let config = session.load_config()?;
    let url = url_for(&config, &args.review_id);
    let mut stdout = std::io::stdout().lock();

    if args.print {
        writeln!(stdout, "{url}")?;
        return Ok(());
    }
    writeln!(stdout, "Opening {url}")?;
    open::that(&url).with_context(|| format!("failed to open {url}"))?;
    Ok(())
}

fn url_for(config: &UpsConfig, review_id: &str) -> String {
    crate::infra::upsource::review_url(&config.url, &config.project_id, review_id)
}
