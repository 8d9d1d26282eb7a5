use crate::{command::ConfigArg, util::Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ShowConfigArg {
    #[clap(flatten)]
    config: ConfigArg,
}

pub(crate) fn run(arg: &ShowConfigArg) -> anyhow::Result<()> {
    let config = arg.config.load()?;
    Output::stdout().write_json(&config)
}
