use std::io::Write as _;

use churnscope_data::catalog::FilterKind;

use super::view::{OutputArg, ViewArg};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CatalogArg {
    #[clap(flatten)]
    pub view: ViewArg,
    #[clap(flatten)]
    pub output: OutputArg,
}

pub(crate) fn run(arg: &CatalogArg) -> anyhow::Result<()> {
    let loaded = arg.view.load()?;
    let catalog = &loaded.catalog;

    let mut output = arg.output.open()?;
    if arg.output.json {
        return output.write_json(catalog);
    }
    output.write_report(|out| {
        writeln!(out, "Core filters")?;
        writeln!(out, "  {:<24} {}", "Contract", catalog.core.contract.join(", "))?;
        writeln!(
            out,
            "  {:<24} {}",
            "InternetService",
            catalog.core.internet.join(", ")
        )?;
        writeln!(
            out,
            "  {:<24} {}..{}",
            "tenure", catalog.core.tenure.0, catalog.core.tenure.1
        )?;
        writeln!(out)?;
        writeln!(out, "Dynamic filters ({})", catalog.dynamic.len())?;
        for spec in &catalog.dynamic {
            match &spec.kind {
                FilterKind::Range { min, max } => {
                    writeln!(out, "  {:<24} range {min}..{max}", spec.column)?;
                }
                FilterKind::DiscreteSet { domain } => {
                    writeln!(out, "  {:<24} set   {}", spec.column, domain.join(", "))?;
                }
            }
        }
        Ok(())
    })
}
