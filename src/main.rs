use anyhow::{Context, Result};
use clap::Parser;
use func2widgets::cli::Cli;
use func2widgets::{FunctionInfoParser, ParseOptions};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let source = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;

    let options = ParseOptions {
        ignore_self: !cli.keep_self,
        parse_class: !cli.no_classes,
        raw_docstring_as_description: cli.raw_description,
        prose_default_fallback: cli.prose_defaults,
        strict_widget_configs: cli.strict,
    };
    let info = FunctionInfoParser::with_options(options).parse(&source, &cli.target)?;

    let output = if cli.pretty {
        serde_json::to_string_pretty(&info)?
    } else {
        serde_json::to_string(&info)?
    };
    println!("{output}");
    Ok(())
}
