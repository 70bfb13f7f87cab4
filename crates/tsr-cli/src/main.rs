#![allow(clippy::print_stderr)]

mod tracing_config;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::debug;

use tsr_common::{ScopeId, SourceLocation, TypeId, Warning};
use tsr_literal::{LiteralGenerator, LiteralNode, LiteralOptions, print_literal, print_literal_pretty};
use tsr_reflect::{FixtureHost, ReflectContext, ReflectOptions, Reflector, SymbolId, TypeHost};

/// Output encoding of the generated literals.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    /// `const Name = { ... };` per class
    Js,
    /// One JSON object keyed by class name
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "tsr",
    version,
    about = "Print literal type descriptions for the classes of a type fixture"
)]
struct CliArgs {
    /// JSON fixture describing the checked program's types and symbols.
    fixture: PathBuf,

    /// Only emit this class.
    #[arg(long)]
    class: Option<String>,

    /// Nesting limit for reflection and literal generation.
    #[arg(long = "max-depth")]
    max_depth: Option<u32>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Js)]
    format: OutputFormat,

    /// Spread `js` output over multiple lines.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_config::init_tracing();

    let args = CliArgs::parse();
    let text = std::fs::read_to_string(&args.fixture)
        .with_context(|| format!("failed to read {}", args.fixture.display()))?;
    let host = FixtureHost::from_json_str(&text)
        .with_context(|| format!("invalid fixture {}", args.fixture.display()))?;

    let classes = match &args.class {
        Some(name) => match host.declared_type(name) {
            Some(id) => vec![id],
            None => bail!("no class named `{name}` in {}", args.fixture.display()),
        },
        None => host.classes(),
    };

    let file = args.fixture.display().to_string();
    let mut literals = Vec::with_capacity(classes.len());
    for id in classes {
        let name = class_name(&host, id);
        let literal = generate(&host, &args, &file, &name, id)
            .with_context(|| format!("failed to describe class `{name}`"))?;
        literals.push((name, literal));
    }

    match args.format {
        OutputFormat::Js => {
            for (name, literal) in &literals {
                let body = if args.pretty {
                    print_literal_pretty(literal)
                } else {
                    print_literal(literal)
                };
                println!("const {name} = {body};");
            }
        }
        OutputFormat::Json => {
            let mut out = serde_json::Map::new();
            for (name, literal) in &literals {
                out.insert(name.clone(), serde_json::to_value(literal)?);
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn class_name(host: &FixtureHost, id: TypeId) -> String {
    host.symbol_of_type(&id)
        .map_or_else(|| format!("Type{id}"), |symbol| host.symbol_name(&symbol))
}

/// One reflection pass plus literal generation for a single class.
fn generate(
    host: &FixtureHost,
    args: &CliArgs,
    file: &str,
    name: &str,
    id: TypeId,
) -> Result<LiteralNode> {
    let mut warnings: Vec<Warning> = Vec::new();
    let mut referenced: Vec<SymbolId> = Vec::new();
    let mut mark = |symbol: &SymbolId| referenced.push(*symbol);

    let reflect_options = args
        .max_depth
        .map_or_else(ReflectOptions::default, |max_depth| ReflectOptions { max_depth });
    let node = {
        let mut ctx = ReflectContext::new(
            ScopeId::FILE,
            SourceLocation::new(file, 0, 0, format!("class {name}")),
            &mut warnings,
        )
        .with_mark_referenced(&mut mark);
        Reflector::with_options(host, reflect_options).reflect_class(&mut ctx, &id)?
    };

    for warning in &warnings {
        eprintln!("{warning}");
    }
    for symbol in &referenced {
        debug!(class = name, symbol = host.symbol_key(*symbol), "referenced");
    }

    let mut literal_options = LiteralOptions::default();
    if let Some(max_depth) = args.max_depth {
        literal_options.max_depth = max_depth;
    }
    Ok(LiteralGenerator::new(literal_options).make_literal(&node, None)?)
}
