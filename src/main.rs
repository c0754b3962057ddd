use std::io;
use std::process;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command as ClapCommand};
use mdbook::preprocess::{CmdPreprocessor, Preprocessor};
use tracing::{error, warn};

use mdbook_command_json_output::help::HelpDescriptor;
use mdbook_command_json_output::render::{render_definition_list, render_diagnostic};
use mdbook_command_json_output::{logging, Command, CommandJsonOutput, CommandOutput};

fn make_app() -> ClapCommand {
    ClapCommand::new("mdbook-command-json-output")
        .about("A mdbook preprocessor that renders JSON command-line help as HTML")
        .subcommand(
            ClapCommand::new("supports")
                .arg(Arg::new("renderer").required(true))
                .about("Check whether a renderer is supported by this preprocessor"),
        )
        .subcommand(
            ClapCommand::new("render")
                .arg(Arg::new("command").required(true))
                .about("Run a command and print the HTML it would be replaced with"),
        )
}

fn main() {
    logging::init();

    let matches = make_app().get_matches();
    let preprocessor = CommandJsonOutput::default();

    let result = match matches.subcommand() {
        Some(("supports", sub_args)) => handle_supports(&preprocessor, sub_args),
        Some(("render", sub_args)) => handle_render(sub_args),
        _ => handle_preprocessing(&preprocessor),
    };

    if let Err(e) = result {
        error!("{:?}", e);
        process::exit(1);
    }
}

fn handle_preprocessing(pre: &dyn Preprocessor) -> Result<()> {
    let (ctx, book) = CmdPreprocessor::parse_input(io::stdin())?;

    if ctx.mdbook_version != mdbook::MDBOOK_VERSION {
        warn!(
            "The {} plugin was built against version {} of mdbook, \
             but we're being called from version {}",
            pre.name(),
            mdbook::MDBOOK_VERSION,
            ctx.mdbook_version
        );
    }

    let processed_book = pre.run(&ctx, book)?;
    serde_json::to_writer(io::stdout(), &processed_book)?;

    Ok(())
}

fn handle_supports(pre: &dyn Preprocessor, sub_args: &ArgMatches) -> Result<()> {
    let renderer = sub_args
        .get_one::<String>("renderer")
        .context("Required argument")?;

    // Signal whether the renderer is supported by exiting with 1 or 0.
    if pre.supports_renderer(renderer) {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn handle_render(sub_args: &ArgMatches) -> Result<()> {
    let line = sub_args
        .get_one::<String>("command")
        .context("Required argument")?;
    let command = Command::new(line);

    let html = match command.get_output()? {
        CommandOutput::Diagnostic(text) => render_diagnostic(&text),
        CommandOutput::Json(value) => {
            let help = HelpDescriptor::from_value(&value)
                .with_context(|| format!("Output of `{}` is not a help descriptor", command))?;
            render_definition_list(&help, false)
        }
    };
    println!("{}", html);

    Ok(())
}
